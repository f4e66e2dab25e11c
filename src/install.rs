use crate::types::{LoadState, SubscriptionData};

pub const INSTALL_TITLE: &str = "Private repository?";
pub const INSTALL_SUBTITLE: &str =
    "Install the GitHub App to unlock private access. No code permission required.";

/// Builds the GitHub App installation deep link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLink {
    app_slug: String,
    redirect_uri: Option<String>,
}

impl InstallLink {
    pub fn new(app_slug: impl Into<String>, redirect_uri: Option<String>) -> Self {
        Self {
            app_slug: app_slug.into(),
            redirect_uri,
        }
    }

    pub fn uri(&self, suggested_target_id: u64) -> String {
        let mut uri = format!(
            "https://github.com/apps/{}/installations/new/permissions?suggested_target_id={}",
            urlencoding::encode(&self.app_slug),
            suggested_target_id
        );
        if let Some(redirect) = self.redirect_uri.as_deref().filter(|r| !r.is_empty()) {
            uri.push_str("&redirect_uri=");
            uri.push_str(&urlencoding::encode(redirect));
        }
        uri
    }
}

/// "Install the app" prompt shown for a column that looks private
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPrompt {
    pub owner_id: u64,
    pub href: String,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub disabled: bool,
    pub loading: bool,
}

impl InstallPrompt {
    pub fn new(
        owner_id: u64,
        link: &InstallLink,
        data: &SubscriptionData,
        installations_load_state: LoadState,
    ) -> Self {
        let subscription_loading = data.load_state.is_loading();
        Self {
            owner_id,
            href: link.uri(owner_id),
            title: INSTALL_TITLE,
            subtitle: INSTALL_SUBTITLE,
            disabled: subscription_loading,
            loading: installations_load_state == LoadState::Loading || subscription_loading,
        }
    }
}

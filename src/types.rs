use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Load state of a subscription or of the installations list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    #[default]
    NotLoaded,
    Loading,
    LoadingFirst,
    Loaded,
    Error,
}

impl LoadState {
    /// `loading` or `loading_first`
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading | LoadState::LoadingFirst)
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadState::NotLoaded => write!(f, "not_loaded"),
            LoadState::Loading => write!(f, "loading"),
            LoadState::LoadingFirst => write!(f, "loading_first"),
            LoadState::Loaded => write!(f, "loaded"),
            LoadState::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFilters {
    /// Items updated at or before this point are considered cleared
    pub cleared_at: Option<DateTime<Utc>>,
    /// Only show bookmarked items
    #[serde(default)]
    pub saved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    #[serde(default)]
    pub filters: ColumnFilters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectType {
    Issue,
    PullRequest,
    #[default]
    Both,
}

/// What a subscription fetches: a single repository or everything under an owner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionParams {
    #[serde(default)]
    pub subject_type: SubjectType,
    /// `owner/name`
    pub repo: Option<String>,
    pub owner: Option<String>,
}

impl SubscriptionParams {
    /// Owner or organization the subscription points at, if any
    pub fn owner_or_org(&self) -> Option<&str> {
        if let Some(owner) = self.owner.as_deref().filter(|o| !o.is_empty()) {
            return Some(owner);
        }
        self.repo
            .as_deref()
            .and_then(|full_name| full_name.split('/').next())
            .filter(|o| !o.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionData {
    pub items: Vec<IssueOrPullRequest>,
    pub error_message: Option<String>,
    pub load_state: LoadState,
    pub last_fetch_success_at: Option<DateTime<Utc>>,
    /// Server reported another page
    pub can_fetch_more: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub params: SubscriptionParams,
    #[serde(default)]
    pub data: SubscriptionData,
}

/// Stable identity of an issue or pull request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemIdentity {
    NodeId(String),
    Id(u64),
}

/// GitHub issue or pull request, reduced to what columns need
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueOrPullRequest {
    pub id: u64,
    pub node_id: Option<String>,
    pub number: u64,
    pub title: String,
    pub repo: String,
    pub author: String,
    pub is_pull_request: bool,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub saved: bool,
}

impl IssueOrPullRequest {
    pub fn identity(&self) -> ItemIdentity {
        match &self.node_id {
            Some(node_id) if !node_id.is_empty() => ItemIdentity::NodeId(node_id.clone()),
            _ => ItemIdentity::Id(self.id),
        }
    }
}

/// The three tokens, checked for presence only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub app_token: Option<String>,
    pub github_app_token: Option<String>,
    pub github_token: Option<String>,
}

impl Credentials {
    pub fn has_app_token(&self) -> bool {
        present(&self.app_token)
    }

    pub fn has_github_app_token(&self) -> bool {
        present(&self.github_app_token)
    }

    pub fn has_github_token(&self) -> bool {
        present(&self.github_token)
    }

    /// Token used for column fetches: the GitHub App token reaches private repos
    pub fn fetch_token(&self) -> Option<&str> {
        self.github_app_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| self.github_token.as_deref().filter(|t| !t.is_empty()))
    }
}

fn present(token: &Option<String>) -> bool {
    token.as_deref().is_some_and(|t| !t.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbeLoadingState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error,
}

/// Public profile of a GitHub user or organization
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OwnerProfile {
    pub id: u64,
    pub login: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeResult {
    pub loading_state: ProbeLoadingState,
    pub data: Option<OwnerProfile>,
}

impl ProbeResult {
    pub fn loading() -> Self {
        Self {
            loading_state: ProbeLoadingState::Loading,
            data: None,
        }
    }

    pub fn owner_id(&self) -> Option<u64> {
        self.data.as_ref().map(|d| d.id).filter(|id| *id != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_or_org_prefers_explicit_owner() {
        let params = SubscriptionParams {
            subject_type: SubjectType::Issue,
            repo: Some("rust-lang/rust".to_string()),
            owner: Some("tokio-rs".to_string()),
        };
        assert_eq!(params.owner_or_org(), Some("tokio-rs"));
    }

    #[test]
    fn owner_or_org_from_repo_full_name() {
        let params = SubscriptionParams {
            repo: Some("rust-lang/rust".to_string()),
            ..Default::default()
        };
        assert_eq!(params.owner_or_org(), Some("rust-lang"));
    }

    #[test]
    fn owner_or_org_missing() {
        assert_eq!(SubscriptionParams::default().owner_or_org(), None);
        let params = SubscriptionParams {
            repo: Some("/orphan".to_string()),
            owner: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(params.owner_or_org(), None);
    }

    #[test]
    fn identity_prefers_node_id() {
        let mut item = IssueOrPullRequest {
            id: 42,
            node_id: Some("I_kwDO".to_string()),
            number: 1,
            title: "t".to_string(),
            repo: "o/r".to_string(),
            author: "a".to_string(),
            is_pull_request: false,
            updated_at: Utc::now(),
            saved: false,
        };
        assert_eq!(item.identity(), ItemIdentity::NodeId("I_kwDO".to_string()));
        item.node_id = None;
        assert_eq!(item.identity(), ItemIdentity::Id(42));
    }

    #[test]
    fn empty_tokens_count_as_missing() {
        let creds = Credentials {
            app_token: Some(String::new()),
            github_app_token: None,
            github_token: Some("ghp_x".to_string()),
        };
        assert!(!creds.has_app_token());
        assert!(!creds.has_github_app_token());
        assert!(creds.has_github_token());
        assert_eq!(creds.fetch_token(), Some("ghp_x"));
    }

    #[test]
    fn load_state_serializes_snake_case() {
        let json = serde_json::to_string(&LoadState::LoadingFirst).unwrap();
        assert_eq!(json, "\"loading_first\"");
        assert!(LoadState::Loading.is_loading());
        assert!(!LoadState::Error.is_loading());
    }
}

use async_trait::async_trait;
use octocrab::Octocrab;

use crate::action::FetchParams;
use crate::error::{ColviewError, Result};
use crate::probe::OwnerLookup;
use crate::types::{IssueOrPullRequest, OwnerProfile, SubjectType, SubscriptionParams};

pub struct GitHub {
    client: Octocrab,
}

impl std::fmt::Debug for GitHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHub").finish_non_exhaustive()
    }
}

/// Keep GitHub's own message so "Not Found" / "Bad credentials" reach the column
impl From<octocrab::Error> for ColviewError {
    fn from(err: octocrab::Error) -> Self {
        match err {
            octocrab::Error::GitHub { source, .. } => ColviewError::Api(api_message(
                &source.message,
                source.errors.as_deref().unwrap_or_default(),
            )),
            other => ColviewError::Api(other.to_string()),
        }
    }
}

/// Top-level message plus the `errors[].message` details.
///
/// Search answers a hidden repository with a bare "Validation Failed"; the
/// reason only appears in the details.
fn api_message(message: &str, errors: &[serde_json::Value]) -> String {
    let details: Vec<&str> = errors
        .iter()
        .filter_map(|e| e.get("message").and_then(|m| m.as_str()).or_else(|| e.as_str()))
        .collect();
    if details.is_empty() {
        message.to_string()
    } else {
        format!("{}: {}", message, details.join("; "))
    }
}

impl GitHub {
    /// Anonymous client when no token is available
    pub fn new(token: Option<&str>) -> Result<Self> {
        let mut builder = Octocrab::builder();
        if let Some(token) = token {
            builder = builder.personal_token(token.to_string());
        }
        let client = builder
            .build()
            .map_err(|e| ColviewError::Auth(e.to_string()))?;

        Ok(Self { client })
    }

    /// One page of issues / pull requests for a subscription, most recently updated first
    pub async fn list_items(
        &self,
        params: &SubscriptionParams,
        page: FetchParams,
    ) -> Result<Vec<IssueOrPullRequest>> {
        let query = search_query(params)
            .ok_or_else(|| ColviewError::Config("subscription has no repo or owner".into()))?;
        let url = format!(
            "/search/issues?q={}&sort=updated&order=desc&per_page={}&page={}",
            urlencoding::encode(&query),
            page.per_page,
            page.page
        );
        tracing::debug!(%url, "fetching column page");
        let response: serde_json::Value = self.client.get(&url, None::<&()>).await?;

        let items = response
            .get("items")
            .and_then(|i| i.as_array())
            .map(|items| items.iter().filter_map(parse_item).collect())
            .unwrap_or_default();

        Ok(items)
    }
}

#[async_trait]
impl OwnerLookup for GitHub {
    async fn get_owner(&self, username: &str) -> Result<OwnerProfile> {
        let url = format!("/users/{}", urlencoding::encode(username));
        let profile: OwnerProfile = self.client.get(&url, None::<&()>).await?;
        Ok(profile)
    }
}

fn search_query(params: &SubscriptionParams) -> Option<String> {
    let scope = match (&params.repo, &params.owner) {
        (Some(repo), _) => format!("repo:{}", repo),
        (None, Some(owner)) => format!("user:{}", owner),
        (None, None) => return None,
    };
    Some(match params.subject_type {
        SubjectType::Issue => format!("{} is:issue", scope),
        SubjectType::PullRequest => format!("{} is:pr", scope),
        SubjectType::Both => scope,
    })
}

fn parse_item(value: &serde_json::Value) -> Option<IssueOrPullRequest> {
    Some(IssueOrPullRequest {
        id: value.get("id")?.as_u64()?,
        node_id: value
            .get("node_id")
            .and_then(|n| n.as_str())
            .map(str::to_string),
        number: value.get("number")?.as_u64()?,
        title: value.get("title")?.as_str()?.to_string(),
        repo: value
            .get("repository_url")
            .and_then(|u| u.as_str())
            .and_then(|u| u.split("/repos/").nth(1))
            .unwrap_or("unknown")
            .to_string(),
        author: value
            .get("user")
            .and_then(|u| u.get("login"))
            .and_then(|l| l.as_str())
            .unwrap_or("unknown")
            .to_string(),
        is_pull_request: value.get("pull_request").is_some(),
        updated_at: value
            .get("updated_at")
            .and_then(|d| d.as_str())
            .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
            .map(|d| d.with_timezone(&chrono::Utc))?,
        saved: false,
    })
}

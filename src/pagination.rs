use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::action::{Action, FetchParams, Intent};
use crate::types::{Column, Credentials, IssueOrPullRequest, SubscriptionData};

/// Page size for issue / pull request columns, shared by every fetch path
pub const ISSUE_OR_PR_PER_PAGE: u32 = 30;

/// Error message GitHub returns for an expired or revoked token
const BAD_CREDENTIALS: &str = "Bad credentials";

/// Anything that can carry an intent to the stores
pub trait Dispatch {
    fn dispatch(&self, intent: Intent);
}

impl Dispatch for mpsc::UnboundedSender<Action> {
    fn dispatch(&self, intent: Intent) {
        tracing::debug!(?intent, "dispatch");
        self.send(Action::Dispatch(intent)).ok();
    }
}

/// A prepared intent handed to the list view in place of a callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger(Intent);

impl Trigger {
    pub fn intent(&self) -> &Intent {
        &self.0
    }

    pub fn fire(&self, dispatcher: &impl Dispatch) {
        dispatcher.dispatch(self.0.clone());
    }
}

/// Oldest `updated_at` among the loaded items
pub fn older_item_date(items: &[IssueOrPullRequest]) -> Option<DateTime<Utc>> {
    items.iter().map(|item| item.updated_at).min()
}

/// Whether another page may be requested.
///
/// Once a column has been cleared, paging stops unless something strictly
/// older than the clear point is already loaded; otherwise the server flag wins.
pub fn can_fetch_more(
    column: Option<&Column>,
    all_items: &[IssueOrPullRequest],
    data: Option<&SubscriptionData>,
) -> bool {
    let server_has_more = data.is_some_and(|d| d.can_fetch_more);

    let Some(cleared_at) = column.and_then(|c| c.filters.cleared_at) else {
        return server_has_more;
    };

    match older_item_date(all_items) {
        Some(older) if older < cleared_at => server_has_more,
        _ => false,
    }
}

/// Page after the last full page: `floor(item_count / per_page) + 1`
pub fn next_page(item_count: usize, per_page: u32) -> u32 {
    if per_page == 0 {
        return 1;
    }
    let current_page = (item_count / per_page as usize) as u32;
    current_page + 1
}

/// Builds fetch and refresh intents for one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchController {
    column_id: String,
    per_page: u32,
}

impl FetchController {
    pub fn new(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            per_page: ISSUE_OR_PR_PER_PAGE,
        }
    }

    /// Pagination is additive, items are never replaced from here
    pub fn fetch_data(&self, page: Option<u32>) -> Intent {
        Intent::FetchColumnSubscription {
            column_id: self.column_id.clone(),
            params: FetchParams {
                page: page.filter(|p| *p > 0).unwrap_or(1),
                per_page: self.per_page,
            },
            replace_all_items: false,
        }
    }

    pub fn fetch_next_page(&self, item_count: usize) -> Intent {
        self.fetch_data(Some(next_page(item_count, self.per_page)))
    }

    /// Expired tokens need a credential refresh, anything else a plain re-fetch
    pub fn refresh(&self, error_message: Option<&str>, credentials: &Credentials) -> Intent {
        if error_message == Some(BAD_CREDENTIALS) && credentials.has_app_token() {
            Intent::RefreshInstallations {
                include_installation_token: true,
            }
        } else {
            self.fetch_data(None)
        }
    }

    pub fn next_page_trigger(&self, item_count: usize, can_fetch_more: bool) -> Option<Trigger> {
        can_fetch_more.then(|| Trigger(self.fetch_next_page(item_count)))
    }

    pub fn refresh_trigger(&self, error_message: Option<&str>, credentials: &Credentials) -> Trigger {
        Trigger(self.refresh(error_message, credentials))
    }
}

use crate::error::ColviewError;
use crate::types::{Credentials, IssueOrPullRequest, OwnerProfile};

/// Page request sent along with a subscription fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchParams {
    pub page: u32,
    pub per_page: u32,
}

/// Mutations the column core asks the stores to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    FetchColumnSubscription {
        column_id: String,
        params: FetchParams,
        replace_all_items: bool,
    },
    RefreshInstallations {
        include_installation_token: bool,
    },
}

/// Result of one page fetch, routed back to the subscription store
#[derive(Debug, Clone)]
pub struct PageFetched {
    pub column_id: String,
    pub params: FetchParams,
    pub replace_all_items: bool,
    pub result: Result<Vec<IssueOrPullRequest>, String>,
}

#[derive(Debug, Clone)]
pub enum Action {
    Quit,
    ScrollUp,
    ScrollDown,
    NextColumn,
    PrevColumn,

    // Column data
    LoadColumns,
    Dispatch(Intent),
    FetchNextPage,
    Refresh,
    PageFetched(Box<PageFetched>),

    // Owner probe
    OwnerProbed {
        username: String,
        result: Result<OwnerProfile, String>,
    },

    // Installations
    InstallationsRefreshed(Result<Credentials, String>),
    OpenInstallLink,
    YankInstallLink,

    // Column edits
    ToggleBookmark,
    ClearColumn,

    Error(String),
    None,
}

impl From<ColviewError> for Action {
    fn from(err: ColviewError) -> Self {
        Action::Error(err.to_string())
    }
}

impl From<Intent> for Action {
    fn from(intent: Intent) -> Self {
        Action::Dispatch(intent)
    }
}

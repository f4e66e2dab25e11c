//! Decides what a column shows from the current store snapshots.
//!
//! Evaluation order matters: no subscription, missing tokens, the
//! private-resource branch, a missing column, then the card list. The private
//! branch falls through to the card list when the owner probe neither loads
//! nor yields an owner id.

use chrono::{DateTime, Utc};

use crate::install::{InstallLink, InstallPrompt};
use crate::pagination::{can_fetch_more, FetchController, Trigger};
use crate::privacy::maybe_private;
use crate::store::ColumnData;
use crate::types::{
    Column, Credentials, IssueOrPullRequest, ItemIdentity, LoadState, ProbeLoadingState,
    ProbeResult, Subscription,
};

/// Which login a "connect account" prompt asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHubAppType {
    /// Only the personal (OAuth) login is missing
    Oauth,
    /// Only the GitHub App is missing
    App,
    Both,
}

/// Snapshot of everything a column view depends on
#[derive(Debug, Clone)]
pub struct ViewInputs<'a> {
    pub column_id: &'a str,
    pub column: Option<&'a Column>,
    pub has_crossed_columns_limit: bool,
    pub subscription: Option<&'a Subscription>,
    pub credentials: &'a Credentials,
    pub owner_probe: ProbeResult,
    pub installations_load_state: LoadState,
    pub column_data: ColumnData<'a>,
    pub install_link: &'a InstallLink,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrivateProbing {
    /// No GitHub App token, ask to connect it
    ConnectApp { github_app_type: GitHubAppType },
    /// Owner lookup in progress
    Loading,
    Install(InstallPrompt),
}

/// Props for the card list
#[derive(Debug, Clone)]
pub struct CardsProps<'a> {
    pub column_id: &'a str,
    pub error_message: String,
    /// Absent when there are no more pages
    pub fetch_next_page: Option<Trigger>,
    pub is_showing_only_bookmarks: bool,
    pub item_identities: Vec<ItemIdentity>,
    pub last_fetch_success_at: Option<DateTime<Utc>>,
    pub refresh: Trigger,
    column_data: ColumnData<'a>,
}

impl<'a> CardsProps<'a> {
    pub fn get_item_by_identity(&self, identity: &ItemIdentity) -> Option<&'a IssueOrPullRequest> {
        self.column_data.get_item_by_identity(identity)
    }

    /// Visible items in display order
    pub fn items(&self) -> impl Iterator<Item = &'a IssueOrPullRequest> + '_ {
        self.item_identities
            .iter()
            .filter_map(|id| self.get_item_by_identity(id))
    }
}

#[derive(Debug, Clone)]
pub enum ViewState<'a> {
    NoSubscription,
    NoToken { github_app_type: GitHubAppType },
    PrivateProbing(PrivateProbing),
    ColumnMissing,
    Cards(CardsProps<'a>),
}

pub fn decide(inputs: ViewInputs<'_>) -> ViewState<'_> {
    let Some(subscription) = inputs.subscription else {
        return ViewState::NoSubscription;
    };
    let credentials = inputs.credentials;

    if !(credentials.has_app_token() && credentials.has_github_token()) {
        let github_app_type = if credentials.has_github_app_token() {
            GitHubAppType::Oauth
        } else {
            GitHubAppType::Both
        };
        return ViewState::NoToken { github_app_type };
    }

    let data = &subscription.data;
    if maybe_private(data.error_message.as_deref()) && !inputs.has_crossed_columns_limit {
        if !credentials.has_github_app_token() {
            return ViewState::PrivateProbing(PrivateProbing::ConnectApp {
                github_app_type: GitHubAppType::App,
            });
        }

        if inputs.owner_probe.loading_state == ProbeLoadingState::Loading {
            return ViewState::PrivateProbing(PrivateProbing::Loading);
        }

        if let Some(owner_id) = inputs.owner_probe.owner_id() {
            return ViewState::PrivateProbing(PrivateProbing::Install(InstallPrompt::new(
                owner_id,
                inputs.install_link,
                data,
                inputs.installations_load_state,
            )));
        }
    }

    let Some(column) = inputs.column else {
        return ViewState::ColumnMissing;
    };

    let controller = FetchController::new(inputs.column_id);
    let all_items = inputs.column_data.all_items;
    let has_more = can_fetch_more(Some(column), all_items, Some(data));

    ViewState::Cards(CardsProps {
        column_id: inputs.column_id,
        error_message: data.error_message.clone().unwrap_or_default(),
        fetch_next_page: controller.next_page_trigger(all_items.len(), has_more),
        is_showing_only_bookmarks: column.filters.saved,
        item_identities: inputs.column_data.filtered_item_ids.clone(),
        last_fetch_success_at: data.last_fetch_success_at,
        refresh: controller.refresh_trigger(data.error_message.as_deref(), credentials),
        column_data: inputs.column_data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{FetchParams, Intent};
    use crate::pagination::ISSUE_OR_PR_PER_PAGE;
    use crate::types::{ColumnFilters, OwnerProfile, SubscriptionData, SubscriptionParams};
    use chrono::Duration;

    struct Fixture {
        column: Option<Column>,
        crossed: bool,
        subscription: Option<Subscription>,
        credentials: Credentials,
        probe: ProbeResult,
        installations: LoadState,
        link: InstallLink,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                column: Some(Column {
                    id: "col".to_string(),
                    filters: ColumnFilters::default(),
                }),
                crossed: false,
                subscription: Some(Subscription {
                    id: "col-main".to_string(),
                    params: SubscriptionParams {
                        repo: Some("acme/secret".to_string()),
                        ..Default::default()
                    },
                    data: SubscriptionData {
                        load_state: LoadState::Loaded,
                        can_fetch_more: true,
                        ..Default::default()
                    },
                }),
                credentials: Credentials {
                    app_token: Some("app".to_string()),
                    github_app_token: Some("ghs".to_string()),
                    github_token: Some("ghp".to_string()),
                },
                probe: ProbeResult::default(),
                installations: LoadState::Loaded,
                link: InstallLink::new("devhub", None),
            }
        }

        fn error(mut self, message: &str) -> Self {
            if let Some(sub) = self.subscription.as_mut() {
                sub.data.error_message = Some(message.to_string());
                sub.data.load_state = LoadState::Error;
            }
            self
        }

        fn items(mut self, items: Vec<IssueOrPullRequest>) -> Self {
            if let Some(sub) = self.subscription.as_mut() {
                sub.data.items = items;
            }
            self
        }

        fn owner(mut self, id: u64) -> Self {
            self.probe = ProbeResult {
                loading_state: ProbeLoadingState::Loaded,
                data: Some(OwnerProfile {
                    id,
                    login: "acme".to_string(),
                }),
            };
            self
        }

        fn decide(&self) -> ViewState<'_> {
            let items = self
                .subscription
                .as_ref()
                .map(|s| s.data.items.as_slice())
                .unwrap_or(&[]);
            decide(ViewInputs {
                column_id: "col",
                column: self.column.as_ref(),
                has_crossed_columns_limit: self.crossed,
                subscription: self.subscription.as_ref(),
                credentials: &self.credentials,
                owner_probe: self.probe.clone(),
                installations_load_state: self.installations,
                column_data: ColumnData::new(items, self.column.as_ref()),
                install_link: &self.link,
            })
        }
    }

    fn item(id: u64, updated_at: DateTime<Utc>) -> IssueOrPullRequest {
        IssueOrPullRequest {
            id,
            node_id: None,
            number: id,
            title: format!("item {}", id),
            repo: "acme/secret".to_string(),
            author: "octocat".to_string(),
            is_pull_request: true,
            updated_at,
            saved: false,
        }
    }

    fn cards<'a>(state: ViewState<'a>) -> CardsProps<'a> {
        match state {
            ViewState::Cards(props) => props,
            other => panic!("expected cards, got {:?}", other),
        }
    }

    #[test]
    fn no_subscription_wins_over_everything() {
        let mut f = Fixture::new().error("Not Found").owner(1);
        f.subscription = None;
        f.column = None;
        f.credentials = Credentials::default();
        assert!(matches!(f.decide(), ViewState::NoSubscription));
    }

    #[test]
    fn missing_tokens_ask_for_both() {
        let mut f = Fixture::new();
        f.credentials = Credentials::default();
        assert!(matches!(
            f.decide(),
            ViewState::NoToken {
                github_app_type: GitHubAppType::Both
            }
        ));
    }

    #[test]
    fn missing_personal_token_with_app_token_asks_for_oauth() {
        let mut f = Fixture::new().error("Not Found").owner(1);
        f.credentials.github_token = None;
        assert!(matches!(
            f.decide(),
            ViewState::NoToken {
                github_app_type: GitHubAppType::Oauth
            }
        ));

        let mut f = Fixture::new();
        f.credentials.app_token = None;
        assert!(matches!(
            f.decide(),
            ViewState::NoToken {
                github_app_type: GitHubAppType::Oauth
            }
        ));
    }

    #[test]
    fn private_without_app_token_asks_to_connect_app() {
        let mut f = Fixture::new().error("Not Found");
        f.credentials.github_app_token = None;
        assert!(matches!(
            f.decide(),
            ViewState::PrivateProbing(PrivateProbing::ConnectApp {
                github_app_type: GitHubAppType::App
            })
        ));
    }

    #[test]
    fn private_while_probing_shows_loading() {
        let mut f = Fixture::new().error("Resource does not exist");
        f.probe = ProbeResult::loading();
        assert!(matches!(
            f.decide(),
            ViewState::PrivateProbing(PrivateProbing::Loading)
        ));
    }

    #[test]
    fn private_with_owner_offers_install() {
        let f = Fixture::new().error("Permission denied").owner(4242);
        match f.decide() {
            ViewState::PrivateProbing(PrivateProbing::Install(prompt)) => {
                assert_eq!(prompt.owner_id, 4242);
                assert_eq!(prompt.href, f.link.uri(4242));
                assert!(!prompt.disabled);
                assert!(!prompt.loading);
            }
            other => panic!("expected install prompt, got {:?}", other),
        }
    }

    #[test]
    fn install_prompt_reflects_loading() {
        let mut f = Fixture::new().error("Not Found").owner(1);
        f.installations = LoadState::Loading;
        match f.decide() {
            ViewState::PrivateProbing(PrivateProbing::Install(prompt)) => {
                assert!(!prompt.disabled);
                assert!(prompt.loading);
            }
            other => panic!("expected install prompt, got {:?}", other),
        }

        let mut f = Fixture::new().error("Not Found").owner(1);
        f.subscription.as_mut().unwrap().data.load_state = LoadState::LoadingFirst;
        match f.decide() {
            ViewState::PrivateProbing(PrivateProbing::Install(prompt)) => {
                assert!(prompt.disabled);
                assert!(prompt.loading);
            }
            other => panic!("expected install prompt, got {:?}", other),
        }
    }

    #[test]
    fn probe_error_falls_through_to_cards() {
        let mut f = Fixture::new().error("Not Found");
        f.probe = ProbeResult {
            loading_state: ProbeLoadingState::Error,
            data: None,
        };
        let props = cards(f.decide());
        assert_eq!(props.error_message, "Not Found");
    }

    #[test]
    fn idle_probe_falls_through_to_cards() {
        let f = Fixture::new().error("Not Found");
        assert!(matches!(f.decide(), ViewState::Cards(_)));
    }

    #[test]
    fn crossed_limit_skips_private_branch() {
        let mut f = Fixture::new().error("Not Found").owner(1);
        f.crossed = true;
        f.credentials.github_app_token = None;
        assert!(matches!(f.decide(), ViewState::Cards(_)));

        let mut f = Fixture::new().error("Not Found").owner(1);
        f.crossed = true;
        assert!(matches!(f.decide(), ViewState::Cards(_)));
    }

    #[test]
    fn missing_column_renders_nothing() {
        let mut f = Fixture::new().error("Rate limit exceeded");
        f.column = None;
        assert!(matches!(f.decide(), ViewState::ColumnMissing));
    }

    #[test]
    fn cards_carry_column_state() {
        let now = Utc::now();
        let mut f = Fixture::new().items(vec![item(1, now), item(2, now - Duration::hours(1))]);
        f.subscription.as_mut().unwrap().data.last_fetch_success_at = Some(now);
        f.column.as_mut().unwrap().filters.saved = true;
        f.subscription.as_mut().unwrap().data.items[1].saved = true;

        let props = cards(f.decide());
        assert_eq!(props.error_message, "");
        assert!(props.is_showing_only_bookmarks);
        assert_eq!(props.item_identities, vec![ItemIdentity::Id(2)]);
        assert_eq!(props.items().map(|i| i.id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(props.get_item_by_identity(&ItemIdentity::Id(1)).map(|i| i.id), Some(1));
        assert_eq!(props.last_fetch_success_at, Some(now));
        assert_eq!(
            props.fetch_next_page.as_ref().map(|t| t.intent().clone()),
            Some(Intent::FetchColumnSubscription {
                column_id: "col".to_string(),
                params: FetchParams {
                    page: 1,
                    per_page: ISSUE_OR_PR_PER_PAGE,
                },
                replace_all_items: false,
            })
        );
    }

    #[test]
    fn cleared_column_hides_next_page() {
        let now = Utc::now();
        let mut f = Fixture::new().items(vec![item(1, now)]);
        f.column.as_mut().unwrap().filters.cleared_at = Some(now - Duration::days(1));
        let props = cards(f.decide());
        assert!(props.fetch_next_page.is_none());
    }

    #[test]
    fn bad_credentials_refresh_goes_to_installations() {
        let f = Fixture::new().error("Bad credentials");
        let props = cards(f.decide());
        assert_eq!(
            props.refresh.intent(),
            &Intent::RefreshInstallations {
                include_installation_token: true,
            }
        );
    }

    #[derive(Debug, PartialEq, Eq)]
    enum Shape {
        NoSubscription,
        NoToken(GitHubAppType),
        ConnectApp,
        Loading,
        Install,
        ColumnMissing,
        Cards,
    }

    fn shape(state: &ViewState<'_>) -> Shape {
        match state {
            ViewState::NoSubscription => Shape::NoSubscription,
            ViewState::NoToken { github_app_type } => Shape::NoToken(*github_app_type),
            ViewState::PrivateProbing(PrivateProbing::ConnectApp { .. }) => Shape::ConnectApp,
            ViewState::PrivateProbing(PrivateProbing::Loading) => Shape::Loading,
            ViewState::PrivateProbing(PrivateProbing::Install(_)) => Shape::Install,
            ViewState::ColumnMissing => Shape::ColumnMissing,
            ViewState::Cards(_) => Shape::Cards,
        }
    }

    #[test]
    fn every_combination_yields_expected_state() {
        for has_sub in [false, true] {
            for has_column in [false, true] {
                for tokens in 0..8u8 {
                    for crossed in [false, true] {
                        for probe in 0..4u8 {
                            for (error, private) in
                                [("Not Found", true), ("Rate limit exceeded", false)]
                            {
                                let has_app = tokens & 1 != 0;
                                let has_github_app = tokens & 2 != 0;
                                let has_github = tokens & 4 != 0;

                                let mut f = Fixture::new().error(error);
                                if !has_sub {
                                    f.subscription = None;
                                }
                                if !has_column {
                                    f.column = None;
                                }
                                f.credentials = Credentials {
                                    app_token: has_app.then(|| "a".to_string()),
                                    github_app_token: has_github_app.then(|| "b".to_string()),
                                    github_token: has_github.then(|| "c".to_string()),
                                };
                                f.crossed = crossed;
                                f = match probe {
                                    0 => f,
                                    1 => {
                                        f.probe = ProbeResult::loading();
                                        f
                                    }
                                    2 => f.owner(3),
                                    _ => {
                                        f.probe.loading_state = ProbeLoadingState::Error;
                                        f
                                    }
                                };

                                let rest = if has_column {
                                    Shape::Cards
                                } else {
                                    Shape::ColumnMissing
                                };
                                let expected = if !has_sub {
                                    Shape::NoSubscription
                                } else if !(has_app && has_github) {
                                    Shape::NoToken(if has_github_app {
                                        GitHubAppType::Oauth
                                    } else {
                                        GitHubAppType::Both
                                    })
                                } else if !private || crossed {
                                    rest
                                } else if !has_github_app {
                                    Shape::ConnectApp
                                } else {
                                    match probe {
                                        1 => Shape::Loading,
                                        2 => Shape::Install,
                                        _ => rest,
                                    }
                                };

                                let state = f.decide();
                                assert_eq!(
                                    shape(&state),
                                    expected,
                                    "sub={} column={} tokens={:03b} crossed={} probe={} error={}",
                                    has_sub,
                                    has_column,
                                    tokens,
                                    crossed,
                                    probe,
                                    error
                                );
                            }
                        }
                    }
                }
            }
        }
    }
}

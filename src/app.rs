use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use tokio::sync::mpsc;

use crate::action::{Action, Intent, PageFetched};
use crate::auth;
use crate::cache;
use crate::config::Config;
use crate::container::ColumnContainer;
use crate::error::{ColviewError, Result};
use crate::event::Event;
use crate::github::GitHub;
use crate::install::InstallLink;
use crate::pagination::{FetchController, Trigger};
use crate::probe::{self, OwnerLookup};
use crate::store::{MemoryStore, SubscriptionStore};
use crate::types::{Credentials, ItemIdentity, LoadState};
use crate::view::{PrivateProbing, ViewState};

pub struct App {
    pub store: MemoryStore,
    pub credentials: Credentials,
    pub containers: Vec<ColumnContainer>,
    pub column_index: usize,
    pub item_index: usize,
    pub install_link: InstallLink,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub should_quit: bool,
    config: Config,
    /// Column fetches, with the GitHub App token when there is one
    github: Arc<GitHub>,
    /// Owner lookups, with the personal token
    owner_lookup: Arc<dyn OwnerLookup>,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    pub fn new(
        config: Config,
        credentials: Credentials,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Result<Self> {
        let mut store = MemoryStore::new(config.general.columns_limit);
        let mut containers = Vec::with_capacity(config.columns.len());
        for column in &config.columns {
            store.add_column(column.column(), column.params());
            if let Some(data) = cache::read_column(&column.id) {
                store.seed(&column.id, data);
            }
            containers.push(ColumnContainer::new(column.id.clone()));
        }

        let github = GitHub::new(credentials.fetch_token())?;
        let owner_lookup = GitHub::new(credentials.github_token.as_deref())?;

        Ok(Self {
            store,
            credentials,
            containers,
            column_index: 0,
            item_index: 0,
            install_link: config.install_link(),
            error: None,
            notice: None,
            should_quit: false,
            config,
            github: Arc::new(github),
            owner_lookup: Arc::new(owner_lookup),
            action_tx,
        })
    }

    /// View state of the selected column
    pub fn current_view(&self) -> Option<ViewState<'_>> {
        let container = self.containers.get(self.column_index)?;
        Some(container.view(
            &self.store,
            &self.credentials,
            self.store.installations_load_state,
            &self.install_link,
        ))
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Init => Action::LoadColumns,
            Event::Key(key) => self.handle_key(key),
            Event::Render => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
            KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => Action::NextColumn,
            KeyCode::Char('h') | KeyCode::Left | KeyCode::BackTab => Action::PrevColumn,
            KeyCode::Char('n') | KeyCode::Char(' ') => Action::FetchNextPage,
            KeyCode::Char('r') => Action::Refresh,
            KeyCode::Char('i') | KeyCode::Enter => Action::OpenInstallLink,
            KeyCode::Char('y') => Action::YankInstallLink,
            KeyCode::Char('b') => Action::ToggleBookmark,
            KeyCode::Char('c') => Action::ClearColumn,
            _ => Action::None,
        }
    }

    pub fn update(&mut self, action: Action) {
        if self.error.is_some() && !matches!(action, Action::Quit | Action::None) {
            self.error = None;
        }
        if matches!(
            action,
            Action::ScrollUp
                | Action::ScrollDown
                | Action::NextColumn
                | Action::PrevColumn
                | Action::Refresh
                | Action::FetchNextPage
        ) {
            self.notice = None;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::ScrollUp => {
                self.item_index = self.item_index.saturating_sub(1);
            }
            Action::ScrollDown => {
                let count = self.visible_count();
                if count > 0 && self.item_index < count - 1 {
                    self.item_index += 1;
                }
            }
            Action::NextColumn => {
                if !self.containers.is_empty() {
                    self.column_index = (self.column_index + 1) % self.containers.len();
                    self.item_index = 0;
                }
            }
            Action::PrevColumn => {
                if !self.containers.is_empty() {
                    self.column_index =
                        (self.column_index + self.containers.len() - 1) % self.containers.len();
                    self.item_index = 0;
                }
            }

            Action::LoadColumns => {
                for container in &self.containers {
                    let intent = FetchController::new(container.column_id()).fetch_data(None);
                    self.action_tx.send(Action::Dispatch(intent)).ok();
                }
            }
            Action::Dispatch(intent) => self.dispatch(intent),
            Action::FetchNextPage => {
                if let Some(trigger) = self.next_page_trigger() {
                    trigger.fire(&self.action_tx);
                }
            }
            Action::Refresh => {
                if let Some(trigger) = self.refresh_trigger() {
                    trigger.fire(&self.action_tx);
                }
            }
            Action::PageFetched(page) => {
                if self.store.apply_page(&page) {
                    if let Some(sub) = self.store.resolve_main_subscription(&page.column_id) {
                        cache::write_column(&page.column_id, &sub.data);
                    }
                }
                self.clamp_selection();
                self.sync_probes();
            }

            Action::OwnerProbed { username, result } => {
                for container in &mut self.containers {
                    container.resolve_probe(&username, result.clone());
                }
            }

            Action::InstallationsRefreshed(result) => match result {
                Ok(credentials) => {
                    self.store.installations_load_state = LoadState::Loaded;
                    self.set_credentials(credentials);
                    self.update(Action::LoadColumns);
                }
                Err(e) => {
                    self.store.installations_load_state = LoadState::Error;
                    self.error = Some(e);
                }
            },
            Action::OpenInstallLink => {
                if let Some((href, disabled)) = self.install_href() {
                    if disabled {
                        self.notice = Some("Column is still loading".to_string());
                    } else if let Err(e) = open::that(&href) {
                        self.error = Some(format!("Could not open browser: {}", e));
                    }
                }
            }
            Action::YankInstallLink => {
                if let Some((href, _)) = self.install_href() {
                    match arboard::Clipboard::new().and_then(|mut c| c.set_text(href)) {
                        Ok(()) => self.notice = Some("Install link copied".to_string()),
                        Err(e) => self.error = Some(format!("Clipboard error: {}", e)),
                    }
                }
            }

            Action::ToggleBookmark => {
                if let Some(identity) = self.selected_identity() {
                    let column_id = self.current_column_id();
                    self.store.toggle_bookmark(&column_id, &identity);
                    self.clamp_selection();
                }
            }
            Action::ClearColumn => {
                let column_id = self.current_column_id();
                self.store.clear_column(&column_id);
                self.item_index = 0;
            }

            Action::Error(msg) => {
                self.error = Some(msg);
            }
            Action::None => {}
        }
    }

    fn dispatch(&mut self, intent: Intent) {
        match intent {
            Intent::FetchColumnSubscription {
                column_id,
                params,
                replace_all_items,
            } => {
                if !self.store.begin_fetch(&column_id) {
                    return;
                }
                let Some(sub) = self.store.resolve_main_subscription(&column_id) else {
                    return;
                };
                let subscription_params = sub.params.clone();
                let tx = self.action_tx.clone();
                let github = Arc::clone(&self.github);
                tokio::spawn(async move {
                    let result = github
                        .list_items(&subscription_params, params)
                        .await
                        .map_err(|e| match e {
                            ColviewError::Api(message) => message,
                            other => other.to_string(),
                        });
                    tx.send(Action::PageFetched(Box::new(PageFetched {
                        column_id,
                        params,
                        replace_all_items,
                        result,
                    })))
                    .ok();
                });
            }
            Intent::RefreshInstallations {
                include_installation_token,
            } => {
                if self.store.installations_load_state == LoadState::Loading {
                    return;
                }
                self.store.installations_load_state = LoadState::Loading;
                self.spawn_refresh_installations(include_installation_token);
            }
        }
    }

    fn spawn_refresh_installations(&self, include_installation_token: bool) {
        let tx = self.action_tx.clone();
        let auth_config = self.config.auth.clone();
        let current = self.credentials.clone();
        tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(move || {
                auth::refresh_credentials(&auth_config, &current, include_installation_token)
            })
            .await
            .map_err(|e| e.to_string());
            tx.send(Action::InstallationsRefreshed(result)).ok();
        });
    }

    fn spawn_probe(&self, username: String) {
        let tx = self.action_tx.clone();
        let lookup = Arc::clone(&self.owner_lookup);
        tokio::spawn(async move {
            let result = probe::lookup_owner(lookup.as_ref(), &username).await;
            tx.send(Action::OwnerProbed { username, result }).ok();
        });
    }

    /// Start owner lookups for columns whose probe key changed
    fn sync_probes(&mut self) {
        let requests: Vec<String> = self
            .containers
            .iter_mut()
            .filter_map(|container| container.sync_probe(&self.store))
            .collect();
        for username in requests {
            self.spawn_probe(username);
        }
    }

    fn set_credentials(&mut self, credentials: Credentials) {
        match (
            GitHub::new(credentials.fetch_token()),
            GitHub::new(credentials.github_token.as_deref()),
        ) {
            (Ok(github), Ok(owner_lookup)) => {
                self.github = Arc::new(github);
                self.owner_lookup = Arc::new(owner_lookup);
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "keeping previous GitHub client");
            }
        }
        self.credentials = credentials;
    }

    fn current_column_id(&self) -> String {
        self.containers
            .get(self.column_index)
            .map(|c| c.column_id().to_string())
            .unwrap_or_default()
    }

    fn visible_count(&self) -> usize {
        match self.current_view() {
            Some(ViewState::Cards(props)) => props.item_identities.len(),
            _ => 0,
        }
    }

    fn clamp_selection(&mut self) {
        let count = self.visible_count();
        self.item_index = self.item_index.min(count.saturating_sub(1));
    }

    fn selected_identity(&self) -> Option<ItemIdentity> {
        match self.current_view()? {
            ViewState::Cards(props) => props.item_identities.get(self.item_index).cloned(),
            _ => None,
        }
    }

    fn next_page_trigger(&self) -> Option<Trigger> {
        match self.current_view()? {
            ViewState::Cards(props) => props.fetch_next_page,
            _ => None,
        }
    }

    fn refresh_trigger(&self) -> Option<Trigger> {
        refresh_of(self.current_view()?)
    }

    fn install_href(&self) -> Option<(String, bool)> {
        match self.current_view()? {
            ViewState::PrivateProbing(PrivateProbing::Install(prompt)) => {
                Some((prompt.href, prompt.disabled))
            }
            _ => None,
        }
    }
}

/// Only the card list carries a refresh
fn refresh_of(view: ViewState<'_>) -> Option<Trigger> {
    match view {
        ViewState::Cards(props) => Some(props.refresh),
        _ => None,
    }
}

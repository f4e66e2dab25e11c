use crate::install::InstallLink;
use crate::privacy;
use crate::probe::OwnerProbe;
use crate::store::{ColumnDataSource, ColumnStore, SubscriptionStore};
use crate::types::{Credentials, LoadState, OwnerProfile};
use crate::view::{decide, ViewInputs, ViewState};

/// Wires the stores into the decision engine for one column
#[derive(Debug, Clone)]
pub struct ColumnContainer {
    column_id: String,
    probe: OwnerProbe,
}

impl ColumnContainer {
    pub fn new(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            probe: OwnerProbe::new(),
        }
    }

    pub fn column_id(&self) -> &str {
        &self.column_id
    }

    /// Re-key the owner probe from the current subscription.
    /// Returns a username when a new lookup has to be started.
    pub fn sync_probe<S: SubscriptionStore>(&mut self, store: &S) -> Option<String> {
        let subscription = store.resolve_main_subscription(&self.column_id);
        self.probe.request(privacy::probe_username(subscription))
    }

    pub fn resolve_probe(&mut self, username: &str, result: Result<OwnerProfile, String>) -> bool {
        self.probe.resolve(username, result)
    }

    pub fn view<'a, S>(
        &'a self,
        store: &'a S,
        credentials: &'a Credentials,
        installations_load_state: LoadState,
        install_link: &'a InstallLink,
    ) -> ViewState<'a>
    where
        S: ColumnStore + SubscriptionStore + ColumnDataSource,
    {
        let resolved = store.resolve_column(&self.column_id);
        decide(ViewInputs {
            column_id: &self.column_id,
            column: resolved.column,
            has_crossed_columns_limit: resolved.has_crossed_columns_limit,
            subscription: store.resolve_main_subscription(&self.column_id),
            credentials,
            owner_probe: self.probe.result().clone(),
            installations_load_state,
            column_data: store.column_data(&self.column_id, false),
            install_link,
        })
    }
}

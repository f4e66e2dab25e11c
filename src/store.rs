use std::collections::{HashMap, HashSet};

use chrono::Utc;

use crate::action::PageFetched;
use crate::types::{
    Column, IssueOrPullRequest, ItemIdentity, LoadState, Subscription, SubscriptionData,
    SubscriptionParams,
};

/// Column lookup result
#[derive(Debug, Clone, Copy)]
pub struct ResolvedColumn<'a> {
    pub column: Option<&'a Column>,
    pub has_crossed_columns_limit: bool,
}

pub trait ColumnStore {
    fn resolve_column(&self, column_id: &str) -> ResolvedColumn<'_>;
}

pub trait SubscriptionStore {
    /// Columns carry a single subscription for now; this picks it
    fn resolve_main_subscription(&self, column_id: &str) -> Option<&Subscription>;
}

pub trait ColumnDataSource {
    fn column_data(&self, column_id: &str, merge_similar: bool) -> ColumnData<'_>;
}

/// Items of a column plus the visible, filtered subset
#[derive(Debug, Clone, Default)]
pub struct ColumnData<'a> {
    pub all_items: &'a [IssueOrPullRequest],
    pub filtered_item_ids: Vec<ItemIdentity>,
    index: HashMap<ItemIdentity, usize>,
}

impl<'a> ColumnData<'a> {
    pub fn new(all_items: &'a [IssueOrPullRequest], column: Option<&Column>) -> Self {
        let index = all_items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.identity(), i))
            .collect();

        let cleared_at = column.and_then(|c| c.filters.cleared_at);
        let only_saved = column.is_some_and(|c| c.filters.saved);

        let filtered_item_ids = all_items
            .iter()
            .filter(|item| cleared_at.map_or(true, |cleared| item.updated_at > cleared))
            .filter(|item| !only_saved || item.saved)
            .map(IssueOrPullRequest::identity)
            .collect();

        Self {
            all_items,
            filtered_item_ids,
            index,
        }
    }

    pub fn get_item_by_identity(&self, identity: &ItemIdentity) -> Option<&'a IssueOrPullRequest> {
        let all_items = self.all_items;
        self.index.get(identity).and_then(|&i| all_items.get(i))
    }
}

/// In-process column and subscription store
#[derive(Debug, Default)]
pub struct MemoryStore {
    columns: Vec<Column>,
    subscriptions: HashMap<String, Subscription>,
    columns_limit: usize,
    in_flight: HashSet<String>,
    pub installations_load_state: LoadState,
}

impl MemoryStore {
    pub fn new(columns_limit: usize) -> Self {
        Self {
            columns_limit,
            ..Default::default()
        }
    }

    pub fn add_column(&mut self, column: Column, params: SubscriptionParams) {
        let subscription = Subscription {
            id: format!("{}-main", column.id),
            params,
            data: SubscriptionData::default(),
        };
        self.subscriptions.insert(column.id.clone(), subscription);
        self.columns.push(column);
    }

    /// Restore previously cached data; ignored for unknown columns
    pub fn seed(&mut self, column_id: &str, data: SubscriptionData) {
        if let Some(sub) = self.subscriptions.get_mut(column_id) {
            sub.data = data;
        }
    }

    /// Mark a fetch as started. Returns false if one is already running for the column.
    pub fn begin_fetch(&mut self, column_id: &str) -> bool {
        let Some(sub) = self.subscriptions.get_mut(column_id) else {
            return false;
        };
        if !self.in_flight.insert(column_id.to_string()) {
            tracing::debug!(column_id, "fetch already in flight, dropping");
            return false;
        }

        sub.data.load_state = if sub.data.items.is_empty() {
            LoadState::LoadingFirst
        } else {
            LoadState::Loading
        };
        tracing::debug!(column_id, subscription = %sub.id, load_state = %sub.data.load_state, "fetch started");
        true
    }

    /// Apply a finished page. Returns false if the column is unknown.
    pub fn apply_page(&mut self, page: &PageFetched) -> bool {
        self.in_flight.remove(&page.column_id);
        let Some(sub) = self.subscriptions.get_mut(&page.column_id) else {
            return false;
        };
        let data = &mut sub.data;

        match &page.result {
            Ok(items) => {
                if page.replace_all_items {
                    data.items.clear();
                }
                merge_items(&mut data.items, items);
                data.can_fetch_more = items.len() >= page.params.per_page as usize;
                data.load_state = LoadState::Loaded;
                data.error_message = None;
                data.last_fetch_success_at = Some(Utc::now());
            }
            Err(message) => {
                tracing::warn!(column_id = %page.column_id, error = %message, "column fetch failed");
                data.load_state = LoadState::Error;
                data.error_message = Some(message.clone());
            }
        }
        true
    }

    pub fn toggle_bookmark(&mut self, column_id: &str, identity: &ItemIdentity) {
        let Some(sub) = self.subscriptions.get_mut(column_id) else {
            return;
        };
        if let Some(item) = sub
            .data
            .items
            .iter_mut()
            .find(|item| &item.identity() == identity)
        {
            item.saved = !item.saved;
        }
    }

    /// Hide everything loaded so far
    pub fn clear_column(&mut self, column_id: &str) {
        let newest = self
            .subscriptions
            .get(column_id)
            .and_then(|sub| sub.data.items.iter().map(|i| i.updated_at).max());
        if let Some(column) = self.columns.iter_mut().find(|c| c.id == column_id) {
            column.filters.cleared_at = newest.or_else(|| Some(Utc::now()));
        }
    }
}

/// Merge a page into the loaded items, keeping local bookmarks, newest first
fn merge_items(items: &mut Vec<IssueOrPullRequest>, page: &[IssueOrPullRequest]) {
    for incoming in page {
        let identity = incoming.identity();
        match items.iter_mut().find(|existing| existing.identity() == identity) {
            Some(existing) => {
                let saved = existing.saved;
                *existing = incoming.clone();
                existing.saved = saved;
            }
            None => items.push(incoming.clone()),
        }
    }
    items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

impl ColumnStore for MemoryStore {
    fn resolve_column(&self, column_id: &str) -> ResolvedColumn<'_> {
        let position = self.columns.iter().position(|c| c.id == column_id);
        ResolvedColumn {
            column: position.map(|i| &self.columns[i]),
            has_crossed_columns_limit: position.is_some_and(|i| i >= self.columns_limit),
        }
    }
}

impl SubscriptionStore for MemoryStore {
    fn resolve_main_subscription(&self, column_id: &str) -> Option<&Subscription> {
        self.subscriptions.get(column_id)
    }
}

impl ColumnDataSource for MemoryStore {
    // Issue columns never merge similar items
    fn column_data(&self, column_id: &str, _merge_similar: bool) -> ColumnData<'_> {
        let column = self.resolve_column(column_id).column;
        let items = self
            .subscriptions
            .get(column_id)
            .map(|sub| sub.data.items.as_slice())
            .unwrap_or(&[]);
        ColumnData::new(items, column)
    }
}

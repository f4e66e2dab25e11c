use serde::{de::DeserializeOwned, Serialize};
use std::path::PathBuf;

use crate::types::{LoadState, SubscriptionData};

/// XDG-compatible cache directory: ~/.cache/colview/ (Linux) or ~/Library/Caches/colview/ (macOS)
fn cache_dir() -> Option<PathBuf> {
    let dir = dirs::cache_dir()?.join("colview");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

fn cache_path(key: &str) -> Option<PathBuf> {
    Some(cache_dir()?.join(format!("{}.json", key)))
}

/// Read a cached value. Returns None if missing or corrupt.
pub fn read<T: DeserializeOwned>(key: &str) -> Option<T> {
    let path = cache_path(key)?;
    let data = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&data).ok()
}

/// Write a value to cache. Silently ignores errors.
pub fn write<T: Serialize>(key: &str, value: &T) {
    if let Some(path) = cache_path(key) {
        if let Ok(data) = serde_json::to_string(value) {
            let _ = std::fs::write(path, data);
        }
    }
}

/// Cache key for a column's subscription data
pub fn column_key(column_id: &str) -> String {
    let safe: String = column_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("column_{}", safe)
}

/// Cached subscription data, only if it was a successful load
pub fn read_column(column_id: &str) -> Option<SubscriptionData> {
    let data: SubscriptionData = read(&column_key(column_id))?;
    (data.load_state == LoadState::Loaded).then_some(data)
}

pub fn write_column(column_id: &str, data: &SubscriptionData) {
    if data.load_state == LoadState::Loaded {
        write(&column_key(column_id), data);
    }
}

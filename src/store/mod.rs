//! Key-value stores backing the response cache.
//!
//! Plays the role browser local storage plays for the web client: a flat
//! string-to-string namespace shared by everything in the process.

use crate::error::{Error, Result};
use dashmap::DashMap;

pub mod file;
pub mod inmemory;

pub use file::FileStore;
pub use inmemory::InMemoryStore;

/// Trait for key-value store implementations.
///
/// All methods take `&self`; implementations use interior mutability and
/// are cheap to clone (clones share storage).
///
/// **ASYNC:** All methods are async and must be awaited.
#[allow(async_fn_in_trait)]
pub trait KeyValueStore: Send + Sync + Clone {
    /// Retrieve a value by key.
    ///
    /// # Returns
    /// - `Ok(Some(value))` - key present
    /// - `Ok(None)` - key absent
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, replacing any previous one.
    ///
    /// # Errors
    /// Returns `Error::QuotaExceeded` when the store is full, or
    /// `Error::StoreError` for any other failure.
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Remove a key. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// List every key starting with `prefix`.
    async fn scan(&self, prefix: &str) -> Result<Vec<String>>;

    /// Check if key exists.
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Bulk delete. Default implementation calls `delete()` for each key.
    async fn mdelete(&self, keys: &[String]) -> Result<()> {
        for key in keys {
            self.delete(key).await?;
        }
        Ok(())
    }
}

/// Store usage statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub total_entries: usize,
    pub total_bytes: usize,
}

pub(crate) fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

pub(crate) fn stats_of(map: &DashMap<String, String>) -> StoreStats {
    StoreStats {
        total_entries: map.len(),
        total_bytes: map.iter().map(|e| entry_size(e.key(), e.value())).sum(),
    }
}

/// Reject a write that would push `map` past `quota` bytes.
///
/// The existing value under `key`, if any, does not count against the new one.
pub(crate) fn check_quota(
    map: &DashMap<String, String>,
    quota: Option<usize>,
    key: &str,
    value: &str,
) -> Result<()> {
    let Some(limit) = quota else {
        return Ok(());
    };

    let replaced = map
        .get(key)
        .map(|old| entry_size(key, old.value()))
        .unwrap_or(0);
    let used = stats_of(map).total_bytes - replaced;
    let needed = entry_size(key, value);

    if used + needed > limit {
        return Err(Error::QuotaExceeded(format!(
            "writing {} ({} bytes) would exceed {} byte quota ({} in use)",
            key, needed, limit, used
        )));
    }
    Ok(())
}

pub(crate) fn scan_map(map: &DashMap<String, String>, prefix: &str) -> Vec<String> {
    let mut keys: Vec<String> = map
        .iter()
        .filter(|e| e.key().starts_with(prefix))
        .map(|e| e.key().clone())
        .collect();
    keys.sort();
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_exists_default() {
        let store = InMemoryStore::new();
        store
            .set("key", "value".to_string())
            .await
            .expect("Failed to set key");
        assert!(store.exists("key").await.expect("Failed to check exists"));
        assert!(!store
            .exists("nonexistent")
            .await
            .expect("Failed to check exists"));
    }

    #[test]
    fn test_check_quota_ignores_replaced_value() {
        let map = DashMap::new();
        map.insert("k".to_string(), "12345".to_string());

        // 6 bytes in use; replacing "k" with a value of the same size fits in 6.
        assert!(check_quota(&map, Some(6), "k", "abcde").is_ok());
        assert!(matches!(
            check_quota(&map, Some(6), "other", "x"),
            Err(Error::QuotaExceeded(_))
        ));
        assert!(check_quota(&map, None, "other", "x").is_ok());
    }
}

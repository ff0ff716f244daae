//! In-memory key-value store (default, thread-safe, async).
//!
//! Uses DashMap for lock-free concurrent access with per-key sharding.
//! An optional byte quota mimics the size limit of browser local storage.

use super::{check_quota, scan_map, stats_of, KeyValueStore, StoreStats};
use crate::error::Result;
use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe async in-memory store.
///
/// # Example
///
/// ```no_run
/// use mrate_client::store::{InMemoryStore, KeyValueStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = InMemoryStore::new();
///
///     store.set("omdb_cache_movie_tt1375666", "{}".to_string()).await?;
///     assert!(store.get("omdb_cache_movie_tt1375666").await?.is_some());
///
///     Ok(())
/// }
/// ```
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<DashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl InMemoryStore {
    /// Create an unbounded in-memory store.
    pub fn new() -> Self {
        InMemoryStore {
            entries: Arc::new(DashMap::new()),
            quota_bytes: None,
        }
    }

    /// Create a store that rejects writes beyond `bytes` (keys plus values).
    pub fn with_quota(bytes: usize) -> Self {
        InMemoryStore {
            entries: Arc::new(DashMap::new()),
            quota_bytes: Some(bytes),
        }
    }

    /// Get the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get usage statistics.
    pub fn stats(&self) -> StoreStats {
        stats_of(&self.entries)
    }
}

impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self.entries.get(key).map(|v| v.value().clone());
        debug!(
            "✓ InMemory GET {} -> {}",
            key,
            if value.is_some() { "HIT" } else { "MISS" }
        );
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        check_quota(&self.entries, self.quota_bytes, key, &value)?;
        self.entries.insert(key.to_string(), value);
        debug!("✓ InMemory SET {}", key);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        debug!("✓ InMemory DELETE {}", key);
        Ok(())
    }

    async fn scan(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(scan_map(&self.entries, prefix))
    }

    async fn mdelete(&self, keys: &[String]) -> Result<()> {
        for key in keys {
            self.entries.remove(key);
        }
        debug!("✓ InMemory MDELETE {} keys", keys.len());
        Ok(())
    }
}

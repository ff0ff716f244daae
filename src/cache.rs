//! Response cache - timestamp-expiring JSON cache over a [`KeyValueStore`].
//!
//! Reads never fail: an absent, expired or unreadable entry is a miss, and
//! expired or unreadable entries are deleted on the read that finds them.
//! Writes are best-effort: a full store is purged of expired entries and the
//! write retried once; any remaining failure is logged and dropped.

use crate::clock::{Clock, SystemClock};
use crate::entry::{peek_timestamp, CacheEntry, DEFAULT_EXPIRY};
use crate::error::{Error, Result};
use crate::key::{CacheKeyBuilder, CACHE_PREFIX};
use crate::observability::{CacheMetrics, NoOpMetrics};
use crate::store::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Expiring response cache.
///
/// # Example
///
/// ```ignore
/// use mrate_client::{cache::ResponseCache, store::InMemoryStore};
///
/// let cache = ResponseCache::new(InMemoryStore::new());
/// cache.set("movie_tt1375666", &movie).await;
/// let hit: Option<Movie> = cache.get("movie_tt1375666").await;
/// ```
pub struct ResponseCache<S: KeyValueStore> {
    store: S,
    prefix: String,
    expiry: Duration,
    clock: Arc<dyn Clock>,
    metrics: Box<dyn CacheMetrics>,
}

impl<S: KeyValueStore> ResponseCache<S> {
    /// Create a cache over `store` with the `omdb_cache_` prefix and a
    /// 24-hour expiry window.
    pub fn new(store: S) -> Self {
        ResponseCache {
            store,
            prefix: CACHE_PREFIX.to_string(),
            expiry: DEFAULT_EXPIRY,
            clock: Arc::new(SystemClock),
            metrics: Box::new(NoOpMetrics),
        }
    }

    /// Set the key namespace prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the expiry window.
    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.expiry = expiry;
        self
    }

    /// Set the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set custom metrics handler.
    pub fn with_metrics(mut self, metrics: Box<dyn CacheMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Get store reference (for advanced use).
    pub fn store(&self) -> &S {
        &self.store
    }

    fn full_key(&self, key: &str) -> String {
        CacheKeyBuilder::namespaced(&self.prefix, key)
    }

    /// Look up `key`, returning the cached value only if it is unexpired.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let timer = Instant::now();
        let full_key = self.full_key(key);

        let raw = match self.store.get(&full_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.metrics.record_miss(&full_key, timer.elapsed());
                return None;
            }
            Err(e) => {
                error!("Error retrieving {} from cache: {}", full_key, e);
                self.metrics.record_error(&full_key, &e.to_string());
                return None;
            }
        };

        let entry = match CacheEntry::<T>::from_json(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Discarding unreadable cache entry {}: {}", full_key, e);
                self.evict(&full_key).await;
                self.metrics.record_miss(&full_key, timer.elapsed());
                return None;
            }
        };

        if entry.is_expired(self.clock.now_millis(), self.expiry) {
            debug!(
                "Cache entry {} expired (age {:?})",
                full_key,
                entry.age(self.clock.now_millis())
            );
            self.evict(&full_key).await;
            self.metrics.record_miss(&full_key, timer.elapsed());
            return None;
        }

        self.metrics.record_hit(&full_key, timer.elapsed());
        Some(entry.data)
    }

    /// Store `value` under `key` with the current timestamp.
    ///
    /// Returns whether the value was stored. Never fails: a quota error
    /// triggers one purge-and-retry, everything else is logged.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let timer = Instant::now();
        let full_key = self.full_key(key);

        let payload = match CacheEntry::new(value, self.clock.now_millis()).to_json() {
            Ok(payload) => payload,
            Err(e) => {
                error!("Error serializing {} for cache: {}", full_key, e);
                self.metrics.record_error(&full_key, &e.to_string());
                return false;
            }
        };

        match self.store.set(&full_key, payload.clone()).await {
            Ok(()) => {
                self.metrics.record_set(&full_key, timer.elapsed());
                true
            }
            Err(Error::QuotaExceeded(msg)) => {
                warn!("Cache full writing {} ({}), purging expired entries", full_key, msg);
                let purged = self.purge_expired().await;
                debug!("Purged {} expired entries, retrying {}", purged, full_key);

                match self.store.set(&full_key, payload).await {
                    Ok(()) => {
                        self.metrics.record_set(&full_key, timer.elapsed());
                        true
                    }
                    Err(e) => {
                        error!("Error saving {} to cache after cleanup: {}", full_key, e);
                        self.metrics.record_error(&full_key, &e.to_string());
                        false
                    }
                }
            }
            Err(e) => {
                error!("Error saving {} to cache: {}", full_key, e);
                self.metrics.record_error(&full_key, &e.to_string());
                false
            }
        }
    }

    /// Delete every expired or unreadable entry under the prefix.
    ///
    /// Returns the number of entries removed. Errors are logged.
    pub async fn purge_expired(&self) -> usize {
        let keys = match self.store.scan(&self.prefix).await {
            Ok(keys) => keys,
            Err(e) => {
                error!("Error scanning cache for expired entries: {}", e);
                return 0;
            }
        };

        let now = self.clock.now_millis();
        let mut stale = Vec::new();

        for key in keys {
            let raw = match self.store.get(&key).await {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Error reading {} during purge: {}", key, e);
                    continue;
                }
            };

            let expired = match peek_timestamp(&raw) {
                Some(ts) => CacheEntry::new((), ts).is_expired(now, self.expiry),
                None => true,
            };
            if expired {
                stale.push(key);
            }
        }

        if stale.is_empty() {
            return 0;
        }

        if let Err(e) = self.store.mdelete(&stale).await {
            error!("Error clearing old cache: {}", e);
            return 0;
        }
        for key in &stale {
            self.metrics.record_evict(key);
        }
        info!("Purged {} expired cache entries", stale.len());
        stale.len()
    }

    /// Remove every entry under the prefix, returning how many were removed.
    ///
    /// Keys outside the prefix are untouched.
    ///
    /// # Errors
    /// Returns `Err` if the store cannot be scanned or written.
    pub async fn clear(&self) -> Result<usize> {
        let keys = self.store.scan(&self.prefix).await?;
        self.store.mdelete(&keys).await?;
        warn!("⚠ Cleared {} cache entries under {}", keys.len(), self.prefix);
        Ok(keys.len())
    }

    async fn evict(&self, full_key: &str) {
        match self.store.delete(full_key).await {
            Ok(()) => self.metrics.record_evict(full_key),
            Err(e) => {
                warn!("Error removing {} from cache: {}", full_key, e);
                self.metrics.record_error(full_key, &e.to_string());
            }
        }
    }
}

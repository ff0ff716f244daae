//! Metrics hooks for the response cache.
//!
//! Implement [`CacheMetrics`] to feed cache behaviour into your monitoring
//! system. The default, [`NoOpMetrics`], records nothing; [`LogMetrics`]
//! uses the trait's default bodies, which log through the `log` crate.
//!
//! ```ignore
//! use mrate_client::observability::CacheMetrics;
//! use std::time::Duration;
//!
//! struct Counters;
//!
//! impl CacheMetrics for Counters {
//!     fn record_hit(&self, _key: &str, _duration: Duration) {
//!         // counter!("omdb_cache_hits").inc();
//!     }
//! }
//!
//! // let cache = ResponseCache::new(store).with_metrics(Box::new(Counters));
//! ```

use std::time::Duration;

/// Trait for cache metrics collection.
pub trait CacheMetrics: Send + Sync {
    /// Record a fresh cache hit.
    fn record_hit(&self, key: &str, duration: Duration) {
        debug!("Cache HIT: {} took {:?}", key, duration);
    }

    /// Record a cache miss (absent, expired or unreadable).
    fn record_miss(&self, key: &str, duration: Duration) {
        debug!("Cache MISS: {} took {:?}", key, duration);
    }

    /// Record a cache write.
    fn record_set(&self, key: &str, duration: Duration) {
        debug!("Cache SET: {} took {:?}", key, duration);
    }

    /// Record entries removed because they expired or were purged.
    fn record_evict(&self, key: &str) {
        debug!("Cache EVICT: {}", key);
    }

    /// Record a swallowed error.
    fn record_error(&self, key: &str, error: &str) {
        warn!("Cache ERROR for {}: {}", key, error);
    }
}

/// Default metrics implementation (no-op).
#[derive(Clone, Default)]
pub struct NoOpMetrics;

impl CacheMetrics for NoOpMetrics {
    fn record_hit(&self, _key: &str, _duration: Duration) {}
    fn record_miss(&self, _key: &str, _duration: Duration) {}
    fn record_set(&self, _key: &str, _duration: Duration) {}
    fn record_evict(&self, _key: &str) {}
    fn record_error(&self, _key: &str, _error: &str) {}
}

/// Metrics that only log.
#[derive(Clone, Default)]
pub struct LogMetrics;

impl CacheMetrics for LogMetrics {}

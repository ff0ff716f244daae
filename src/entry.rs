//! Timestamped cache entries.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Window after which a cached OMDb response is considered stale.
pub const DEFAULT_EXPIRY: Duration = Duration::from_secs(24 * 60 * 60);

/// A cached value together with the time it was stored.
///
/// Stored as JSON `{"data": ..., "timestamp": <millis since epoch>}`.
///
/// # Example
///
/// ```
/// use mrate_client::entry::CacheEntry;
/// use std::time::Duration;
///
/// let entry = CacheEntry::new(vec!["Inception".to_string()], 1_000);
/// let window = Duration::from_secs(60);
///
/// assert!(!entry.is_expired(61_000, window));
/// assert!(entry.is_expired(61_001, window));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    pub timestamp: i64,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T, timestamp: i64) -> Self {
        CacheEntry { data, timestamp }
    }

    /// Age of the entry at `now` (zero if the timestamp is in the future).
    pub fn age(&self, now_millis: i64) -> Duration {
        Duration::from_millis(now_millis.saturating_sub(self.timestamp).max(0) as u64)
    }

    /// An entry is expired once its age strictly exceeds `window`.
    pub fn is_expired(&self, now_millis: i64, window: Duration) -> bool {
        self.age(now_millis) > window
    }
}

impl<T: Serialize> CacheEntry<T> {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl<T: for<'de> Deserialize<'de>> CacheEntry<T> {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Read only the timestamp of a stored entry, whatever its payload type.
///
/// Returns `None` for anything that is not a `{data, timestamp}` object.
pub fn peek_timestamp(raw: &str) -> Option<i64> {
    #[derive(Deserialize)]
    struct Stamp {
        timestamp: Option<i64>,
    }

    serde_json::from_str::<Stamp>(raw).ok()?.timestamp
}

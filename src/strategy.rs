//! Fetch strategies for cached OMDb lookups.
//!
//! Replaces the boolean `forceRefresh` flag with an explicit enum.
//!
//! | Strategy | Cache Hit | Cache Miss | Use Case |
//! |----------|-----------|-----------|----------|
//! | **Refresh** | Return | API, then cache | Default |
//! | **Force** | Ignore | API, then cache | User asked for fresh data |

/// Strategy enum controlling cache behaviour of a lookup.
///
/// # Examples
///
/// ```
/// use mrate_client::strategy::FetchStrategy;
///
/// assert_eq!(FetchStrategy::default(), FetchStrategy::Refresh);
/// assert_eq!(FetchStrategy::from(true), FetchStrategy::Force);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FetchStrategy {
    /// **Refresh**: Try cache first, fall back to the API on miss or expiry.
    ///
    /// Flow:
    /// 1. Check cache
    /// 2. If fresh hit: return cached value
    /// 3. Otherwise: call the API
    /// 4. Store successful result in cache
    /// 5. Return value
    #[default]
    Refresh,

    /// **Force**: Skip the cache read, always call the API.
    ///
    /// The result still replaces whatever was cached.
    Force,
}

impl FetchStrategy {
    pub fn reads_cache(self) -> bool {
        matches!(self, FetchStrategy::Refresh)
    }
}

impl From<bool> for FetchStrategy {
    /// `true` means "force refresh".
    fn from(force_refresh: bool) -> Self {
        if force_refresh {
            FetchStrategy::Force
        } else {
            FetchStrategy::Refresh
        }
    }
}

impl std::fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchStrategy::Refresh => write!(f, "Refresh"),
            FetchStrategy::Force => write!(f, "Force"),
        }
    }
}

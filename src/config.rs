//! Client configuration.

use crate::error::{Error, Result};
use crate::omdb::OMDB_BASE_URL;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default quiet period for the debounced search box.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Settings shared by the API client, the OMDb client and the cache.
///
/// Built either with the `with_*` methods or from the environment:
///
/// | Variable | Fallback | Field |
/// |---|---|---|
/// | `OMDB_API_KEY` | `NEXT_PUBLIC_OMDB` | `omdb_api_key` |
/// | `MRATE_API_URL` | `NEXT_PUBLIC_API_URL` | `api_base_url` |
/// | `OMDB_BASE_URL` | | `omdb_base_url` |
/// | `MRATE_CACHE_FILE` | | `cache_file` |
/// | `MRATE_HTTP_TIMEOUT_SECS` | | `http_timeout` |
/// | `MRATE_DEBOUNCE_MS` | | `debounce` |
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub api_base_url: Option<String>,
    pub omdb_api_key: Option<String>,
    pub omdb_base_url: String,
    pub cache_file: Option<PathBuf>,
    pub http_timeout: Option<Duration>,
    pub debounce: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_base_url: None,
            omdb_api_key: None,
            omdb_base_url: OMDB_BASE_URL.to_string(),
            cache_file: None,
            http_timeout: None,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    pub fn with_omdb_api_key(mut self, key: impl Into<String>) -> Self {
        self.omdb_api_key = Some(key.into());
        self
    }

    pub fn with_omdb_base_url(mut self, url: impl Into<String>) -> Self {
        self.omdb_base_url = url.into();
        self
    }

    pub fn with_cache_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_file = Some(path.into());
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    pub fn with_debounce(mut self, quiet: Duration) -> Self {
        self.debounce = quiet;
        self
    }

    /// Read settings from process environment variables.
    ///
    /// # Errors
    ///
    /// `Error::ConfigError` if `MRATE_HTTP_TIMEOUT_SECS` or
    /// `MRATE_DEBOUNCE_MS` is set but is not a whole number.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut config = ClientConfig {
            api_base_url: get("MRATE_API_URL").or_else(|| get("NEXT_PUBLIC_API_URL")),
            omdb_api_key: get("OMDB_API_KEY").or_else(|| get("NEXT_PUBLIC_OMDB")),
            cache_file: get("MRATE_CACHE_FILE").map(PathBuf::from),
            ..Default::default()
        };

        if let Some(url) = get("OMDB_BASE_URL") {
            config.omdb_base_url = url;
        }

        if let Some(raw) = get("MRATE_HTTP_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                Error::ConfigError(format!(
                    "MRATE_HTTP_TIMEOUT_SECS must be a whole number of seconds, got {:?}",
                    raw
                ))
            })?;
            config.http_timeout = Some(Duration::from_secs(secs));
        }

        if let Some(raw) = get("MRATE_DEBOUNCE_MS") {
            let millis: u64 = raw.trim().parse().map_err(|_| {
                Error::ConfigError(format!(
                    "MRATE_DEBOUNCE_MS must be a whole number of milliseconds, got {:?}",
                    raw
                ))
            })?;
            config.debounce = Duration::from_millis(millis);
        }

        debug!(
            "Loaded config (api: {}, omdb key: {}, cache file: {:?})",
            config.api_base_url.as_deref().unwrap_or("<unset>"),
            if config.omdb_api_key.is_some() { "set" } else { "unset" },
            config.cache_file
        );
        Ok(config)
    }

    /// Backend base URL without a trailing slash.
    ///
    /// # Errors
    ///
    /// `Error::ConfigError` when no base URL is configured.
    pub fn require_api_base_url(&self) -> Result<&str> {
        self.api_base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .ok_or_else(|| Error::ConfigError("Backend API base URL is not configured".to_string()))
    }
}

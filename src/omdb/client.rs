//! OMDb HTTP client and the [`MetadataSource`] seam used by the cache.

use super::models::{Movie, MovieEnvelope, SearchResults};
use crate::error::{Error, Result};
use reqwest::Client;
use std::time::Duration;

pub const OMDB_BASE_URL: &str = "https://www.omdbapi.com/";

/// Trait for movie metadata sources.
///
/// Abstracts the external metadata API so the caching layer can be tested
/// without network access.
#[allow(async_fn_in_trait)]
pub trait MetadataSource: Send + Sync {
    /// Fetch full details for one movie.
    ///
    /// # Errors
    /// - `Error::ConfigError` if the source is not configured
    /// - `Error::NetworkError` on transport failure or non-2xx status
    /// - `Error::NotFound` when the API reports no match
    async fn fetch_movie(&self, imdb_id: &str) -> Result<Movie>;

    /// Search movies by title. An API-level "no results" is returned as an
    /// unsuccessful [`SearchResults`], not an error.
    ///
    /// # Errors
    /// - `Error::ConfigError` if the source is not configured
    /// - `Error::NetworkError` on transport failure or non-2xx status
    async fn search(&self, query: &str) -> Result<SearchResults>;
}

/// OMDb API client.
#[derive(Clone)]
pub struct OmdbClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OmdbClient {
    /// Create a client for the public OMDb endpoint.
    ///
    /// A missing key is not rejected here; every request fails with
    /// `Error::ConfigError` instead, which keeps cached data readable.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::builder(api_key, OMDB_BASE_URL, None)
    }

    /// Create a client against a custom endpoint with an optional timeout.
    pub fn builder(
        api_key: Option<String>,
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(OmdbClient {
            client,
            base_url: base_url.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| Error::ConfigError("OMDB API key is not configured".to_string()))
    }

    async fn get_json<T>(&self, params: &[(&str, &str)], what: &str) -> Result<T>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let response = self
            .client
            .get(&self.base_url)
            .query(params)
            .send()
            .await
            .map_err(|e| Error::NetworkError(format!("OMDb {} request failed: {}", what, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::NetworkError(format!(
                "Failed to fetch {}: {}",
                what,
                status.as_u16()
            )));
        }

        response.json::<T>().await.map_err(|e| {
            Error::DeserializationError(format!("Failed to parse OMDb {} response: {}", what, e))
        })
    }
}

impl MetadataSource for OmdbClient {
    async fn fetch_movie(&self, imdb_id: &str) -> Result<Movie> {
        let api_key = self.api_key()?;
        debug!("Fetching OMDb movie {}", imdb_id);

        let envelope: MovieEnvelope = self
            .get_json(
                &[("i", imdb_id), ("apikey", api_key), ("plot", "full")],
                "movie",
            )
            .await?;

        if !envelope.response.is_true() {
            return Err(Error::NotFound(
                envelope
                    .error
                    .unwrap_or_else(|| "Movie not found".to_string()),
            ));
        }

        envelope.movie.ok_or_else(|| {
            Error::DeserializationError(format!("OMDb returned an incomplete record for {}", imdb_id))
        })
    }

    async fn search(&self, query: &str) -> Result<SearchResults> {
        let api_key = self.api_key()?;
        debug!("Searching OMDb for {:?}", query);

        self.get_json(
            &[("s", query), ("type", "movie"), ("apikey", api_key)],
            "search",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_api_key_is_config_error() {
        let client = OmdbClient::new(None).expect("Failed to build client");

        let err = client
            .fetch_movie("tt1375666")
            .await
            .expect_err("Should fail without key");
        assert!(matches!(err, Error::ConfigError(_)));

        let err = client
            .search("inception")
            .await
            .expect_err("Should fail without key");
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let client = OmdbClient::new(Some("   ".to_string())).expect("Failed to build client");
        assert!(client.api_key().is_err());
    }
}

//! Cached movie lookups.
//!
//! Wraps a [`MetadataSource`] with a [`ResponseCache`] in `Arc`s so the
//! service can be cloned into every view that needs movie data.

use super::client::MetadataSource;
use super::models::{Movie, SearchResults};
use crate::cache::ResponseCache;
use crate::error::{Error, Result};
use crate::key::CacheKeyBuilder;
use crate::store::KeyValueStore;
use crate::strategy::FetchStrategy;
use futures::future::join_all;
use std::sync::Arc;

/// Movie metadata with a time-expiring cache in front of the API.
///
/// # Example
///
/// ```ignore
/// use mrate_client::{MovieService, FetchStrategy, omdb::OmdbClient, store::InMemoryStore};
///
/// let movies = MovieService::new(InMemoryStore::new(), OmdbClient::new(Some(key))?);
/// let inception = movies.fetch_movie_by_id("tt1375666", FetchStrategy::Refresh).await?;
/// ```
pub struct MovieService<S: KeyValueStore, M: MetadataSource> {
    cache: Arc<ResponseCache<S>>,
    source: Arc<M>,
}

impl<S: KeyValueStore, M: MetadataSource> Clone for MovieService<S, M> {
    fn clone(&self) -> Self {
        MovieService {
            cache: Arc::clone(&self.cache),
            source: Arc::clone(&self.source),
        }
    }
}

impl<S: KeyValueStore, M: MetadataSource> MovieService<S, M> {
    /// Create a service with a default cache over `store`.
    pub fn new(store: S, source: M) -> Self {
        Self::with_cache(ResponseCache::new(store), source)
    }

    /// Create a service around a pre-configured cache.
    pub fn with_cache(cache: ResponseCache<S>, source: M) -> Self {
        MovieService {
            cache: Arc::new(cache),
            source: Arc::new(source),
        }
    }

    /// Fetch a movie by IMDb id.
    ///
    /// With [`FetchStrategy::Refresh`] a fresh cached copy is returned without
    /// calling the API. Successful lookups are cached under `movie_<id>`.
    ///
    /// # Errors
    ///
    /// - `Error::ValidationError`: `imdb_id` is empty
    /// - `Error::ConfigError`: API key not configured
    /// - `Error::NetworkError`: transport failure or bad status
    /// - `Error::NotFound`: the API reports no match
    pub async fn fetch_movie_by_id(&self, imdb_id: &str, strategy: FetchStrategy) -> Result<Movie> {
        let imdb_id = imdb_id.trim();
        if imdb_id.is_empty() {
            return Err(Error::ValidationError("IMDB ID is required".to_string()));
        }

        let key = CacheKeyBuilder::movie(imdb_id);
        debug!("» Movie lookup for {} (strategy: {})", key, strategy);

        if strategy.reads_cache() {
            if let Some(movie) = self.cache.get::<Movie>(&key).await {
                debug!("✓ Cache hit for {}", key);
                return Ok(movie);
            }
        }

        match self.source.fetch_movie(imdb_id).await {
            Ok(movie) => {
                self.cache.set(&key, &movie).await;
                Ok(movie)
            }
            Err(e) => {
                error!("Error fetching movie {}: {}", imdb_id, e);
                Err(e)
            }
        }
    }

    /// Search movies by title.
    ///
    /// A blank query returns empty results without calling the API. Queries
    /// are trimmed and lower-cased before lookup; only successful, non-empty
    /// results are cached under `search_<query>`.
    ///
    /// # Errors
    ///
    /// - `Error::ConfigError`: API key not configured
    /// - `Error::NetworkError`: transport failure or bad status
    pub async fn search_movies(&self, query: &str, strategy: FetchStrategy) -> Result<SearchResults> {
        let normalized = CacheKeyBuilder::normalize_query(query);
        if normalized.is_empty() {
            return Ok(SearchResults::empty());
        }

        let key = CacheKeyBuilder::search(&normalized);
        debug!("» Search for {} (strategy: {})", key, strategy);

        if strategy.reads_cache() {
            if let Some(results) = self.cache.get::<SearchResults>(&key).await {
                debug!("✓ Cache hit for {}", key);
                return Ok(results);
            }
        }

        match self.source.search(&normalized).await {
            Ok(results) => {
                if results.is_success() {
                    self.cache.set(&key, &results).await;
                } else {
                    debug!(
                        "Search {:?} returned no results ({}), not caching",
                        normalized,
                        results.error.as_deref().unwrap_or("no error text")
                    );
                }
                Ok(results)
            }
            Err(e) => {
                error!("Error searching movies for {:?}: {}", normalized, e);
                Err(e)
            }
        }
    }

    /// Fetch many movies concurrently, keeping input order.
    ///
    /// Lookups that fail are logged and left out of the result.
    pub async fn fetch_movies<I>(&self, imdb_ids: I) -> Vec<Movie>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let ids: Vec<String> = imdb_ids
            .into_iter()
            .map(|id| id.as_ref().to_string())
            .collect();

        let lookups = ids
            .iter()
            .map(|id| self.fetch_movie_by_id(id, FetchStrategy::Refresh));
        let results = join_all(lookups).await;

        ids.iter()
            .zip(results)
            .filter_map(|(id, result)| match result {
                Ok(movie) => Some(movie),
                Err(e) => {
                    warn!("Dropping movie {} from batch: {}", id, e);
                    None
                }
            })
            .collect()
    }

    /// Remove every cached OMDb response. Returns the number removed, or 0
    /// if the store could not be cleared.
    pub async fn clear_cache(&self) -> usize {
        match self.cache.clear().await {
            Ok(count) => count,
            Err(e) => {
                error!("Error clearing cache: {}", e);
                0
            }
        }
    }

    /// Remove only expired cached responses.
    pub async fn purge_expired(&self) -> usize {
        self.cache.purge_expired().await
    }

    pub fn cache(&self) -> &ResponseCache<S> {
        &self.cache
    }

    pub fn source(&self) -> &M {
        &self.source
    }
}

//! Search box with debounce.
//!
//! Every keystroke calls [`DebouncedSearch::submit`]. Each call takes a
//! ticket from a shared generation counter, waits out the quiet period,
//! and only proceeds if no newer ticket was issued meanwhile. Results are
//! checked against the counter again on arrival, so a response for a
//! superseded query is dropped even if the request was already in flight.

use crate::config::{ClientConfig, DEFAULT_DEBOUNCE};
use crate::error::Result;
use crate::omdb::{MetadataSource, MovieService, SearchResults};
use crate::store::KeyValueStore;
use crate::strategy::FetchStrategy;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub struct DebouncedSearch<S: KeyValueStore, M: MetadataSource> {
    movies: MovieService<S, M>,
    quiet: Duration,
    generation: Arc<AtomicU64>,
}

impl<S: KeyValueStore, M: MetadataSource> Clone for DebouncedSearch<S, M> {
    fn clone(&self) -> Self {
        DebouncedSearch {
            movies: self.movies.clone(),
            quiet: self.quiet,
            generation: Arc::clone(&self.generation),
        }
    }
}

impl<S: KeyValueStore, M: MetadataSource> DebouncedSearch<S, M> {
    pub fn new(movies: MovieService<S, M>) -> Self {
        Self::with_quiet_period(movies, DEFAULT_DEBOUNCE)
    }

    /// Use the quiet period configured in `config`.
    pub fn from_config(movies: MovieService<S, M>, config: &ClientConfig) -> Self {
        Self::with_quiet_period(movies, config.debounce)
    }

    pub fn with_quiet_period(movies: MovieService<S, M>, quiet: Duration) -> Self {
        DebouncedSearch {
            movies,
            quiet,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Latest ticket handed out.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Invalidate every pending submission, e.g. when the page goes away.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    /// Submit `query` and wait for its results.
    ///
    /// Returns `None` if a newer submission (or [`cancel`](Self::cancel))
    /// superseded this one, before or after the request.
    pub async fn submit(&self, query: &str) -> Option<Result<SearchResults>> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::time::sleep(self.quiet).await;
        if !self.is_current(ticket) {
            debug!("Search {:?} superseded before request", query);
            return None;
        }

        let result = self.movies.search_movies(query, FetchStrategy::Refresh).await;
        if !self.is_current(ticket) {
            debug!("Dropping stale results for {:?}", query);
            return None;
        }
        Some(result)
    }
}

//! In-memory metadata source for tests and offline use.
//!
//! Behaves like OMDb without the network: unknown ids are `NotFound`,
//! unknown searches come back as `Response: "False"`. Every call is counted,
//! so tests can assert whether the cache was consulted.

use super::client::MetadataSource;
use super::models::{ApiFlag, Movie, SearchHit, SearchResults};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct InMemorySource {
    movies: HashMap<String, Movie>,
    searches: HashMap<String, Vec<SearchHit>>,
    fail_with: Option<Error>,
    calls: Arc<AtomicUsize>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update a movie by its IMDb id.
    pub fn insert_movie(&mut self, movie: Movie) {
        self.movies.insert(movie.imdb_id.clone(), movie);
    }

    /// Register hits for a (normalized) query.
    pub fn insert_search(&mut self, query: &str, hits: Vec<SearchHit>) {
        self.searches.insert(query.to_string(), hits);
    }

    /// Make every call fail with `error`, as if the network were down.
    pub fn failing(mut self, error: Error) -> Self {
        self.fail_with = Some(error);
        self
    }

    /// Number of calls made so far (shared between clones).
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

impl MetadataSource for InMemorySource {
    async fn fetch_movie(&self, imdb_id: &str) -> Result<Movie> {
        self.record_call()?;
        self.movies
            .get(imdb_id)
            .cloned()
            .ok_or_else(|| Error::NotFound("Incorrect IMDb ID.".to_string()))
    }

    async fn search(&self, query: &str) -> Result<SearchResults> {
        self.record_call()?;
        Ok(match self.searches.get(query) {
            Some(hits) if !hits.is_empty() => SearchResults {
                hits: hits.clone(),
                total_results: Some(hits.len().to_string()),
                response: ApiFlag::True,
                error: None,
            },
            _ => SearchResults {
                hits: Vec::new(),
                total_results: None,
                response: ApiFlag::False,
                error: Some("Movie not found!".to_string()),
            },
        })
    }
}

/// Minimal movie record, handy for fixtures.
pub fn movie_stub(imdb_id: &str, title: &str, year: &str) -> Movie {
    Movie {
        imdb_id: imdb_id.to_string(),
        title: title.to_string(),
        year: Some(year.to_string()),
        rated: None,
        released: None,
        runtime: None,
        genre: None,
        director: None,
        writer: None,
        actors: None,
        plot: None,
        language: None,
        country: None,
        awards: None,
        poster: None,
        ratings: Vec::new(),
        metascore: None,
        imdb_rating: None,
        imdb_votes: None,
        kind: Some("movie".to_string()),
    }
}

/// Search hit matching [`movie_stub`].
pub fn hit_stub(imdb_id: &str, title: &str, year: &str) -> SearchHit {
    SearchHit {
        imdb_id: imdb_id.to_string(),
        title: title.to_string(),
        year: Some(year.to_string()),
        kind: Some("movie".to_string()),
        poster: None,
    }
}

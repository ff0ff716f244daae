//! Personal watchlist page state.
//!
//! Edits are optimistic: the local list changes first, the backend toggle
//! follows, and a failed call puts the list back the way it was.

use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{Watchlist, WatchlistEntry};
use crate::omdb::{MetadataSource, Movie, MovieService};
use crate::store::KeyValueStore;
use std::cmp::Ordering;
use std::fmt;

/// Backend call behind every add/remove.
#[allow(async_fn_in_trait)]
pub trait WatchlistBackend: Send + Sync {
    /// Add the movie if absent, remove it if present.
    async fn toggle(&self, imdb_id: &str) -> Result<()>;
}

impl WatchlistBackend for ApiClient {
    async fn toggle(&self, imdb_id: &str) -> Result<()> {
        self.toggle_watchlist(imdb_id).await
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WatchedFilter {
    #[default]
    All,
    Watched,
    Unwatched,
}

impl WatchedFilter {
    pub fn accepts(self, watched: bool) -> bool {
        match self {
            WatchedFilter::All => true,
            WatchedFilter::Watched => watched,
            WatchedFilter::Unwatched => !watched,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    DateAdded,
    Title,
    Year,
    /// Average member rating; only meaningful on shared lists.
    Rating,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

/// Filter and sort controls. Defaults to everything, newest first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListQuery {
    pub text: String,
    pub watched: WatchedFilter,
    pub sort: SortKey,
    pub order: SortOrder,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_watched(mut self, filter: WatchedFilter) -> Self {
        self.watched = filter;
        self
    }

    pub fn sorted_by(mut self, sort: SortKey, order: SortOrder) -> Self {
        self.sort = sort;
        self.order = order;
        self
    }
}

/// Case-insensitive substring match on any of `fields`. An empty needle
/// matches everything.
pub(crate) fn text_matches(needle: &str, fields: &[Option<&str>]) -> bool {
    let needle = needle.trim().to_lowercase();
    needle.is_empty()
        || fields
            .iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
}

pub(crate) fn compare_titles(a: &Movie, b: &Movie) -> Ordering {
    a.title.to_lowercase().cmp(&b.title.to_lowercase())
}

pub(crate) fn compare_years(a: &Movie, b: &Movie) -> Ordering {
    a.year_number().cmp(&b.year_number())
}

/// A watchlist row: movie details joined with the backend entry.
#[derive(Clone, Debug, PartialEq)]
pub struct WatchlistItem {
    pub movie: Movie,
    pub entry: WatchlistEntry,
}

impl WatchlistItem {
    pub fn imdb_id(&self) -> &str {
        &self.movie.imdb_id
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WatchlistStats {
    pub total: usize,
    pub watched: usize,
    pub unwatched: usize,
    /// Rounded to the nearest whole percent; 0 for an empty list.
    pub watched_percentage: u32,
}

pub(crate) fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        0
    } else {
        ((part as f64 / total as f64) * 100.0).round() as u32
    }
}

/// Local copy of the user's watchlist.
#[derive(Clone, Debug, Default)]
pub struct WatchlistState {
    items: Vec<WatchlistItem>,
}

impl WatchlistState {
    pub fn new(items: Vec<WatchlistItem>) -> Self {
        WatchlistState { items }
    }

    /// Join a backend watchlist with movie details fetched concurrently
    /// through the cache. Movies whose details fail to load are left out.
    pub async fn hydrate<S, M>(watchlist: Watchlist, movies: &MovieService<S, M>) -> Self
    where
        S: KeyValueStore,
        M: MetadataSource,
    {
        let mut entries: Vec<(String, WatchlistEntry)> = watchlist.movies.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let details = movies.fetch_movies(entries.iter().map(|(id, _)| id)).await;
        let items = details
            .into_iter()
            .filter_map(|movie| {
                let (_, entry) = entries.iter().find(|(id, _)| *id == movie.imdb_id)?;
                Some(WatchlistItem {
                    movie,
                    entry: entry.clone(),
                })
            })
            .collect();
        WatchlistState { items }
    }

    pub fn items(&self) -> &[WatchlistItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, imdb_id: &str) -> bool {
        self.position(imdb_id).is_some()
    }

    fn position(&self, imdb_id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.imdb_id() == imdb_id)
    }

    /// Rows matching `query`, in display order.
    ///
    /// Text matches title, director or cast. Ties keep list order.
    pub fn view(&self, query: &ListQuery) -> Vec<&WatchlistItem> {
        let mut rows: Vec<&WatchlistItem> = self
            .items
            .iter()
            .filter(|item| {
                text_matches(
                    &query.text,
                    &[
                        Some(item.movie.title.as_str()),
                        item.movie.director.as_deref(),
                        item.movie.actors.as_deref(),
                    ],
                )
            })
            .filter(|item| query.watched.accepts(item.entry.watched))
            .collect();

        rows.sort_by(|a, b| {
            let ordering = match query.sort {
                SortKey::DateAdded => a.entry.added_date.cmp(&b.entry.added_date),
                SortKey::Title => compare_titles(&a.movie, &b.movie),
                SortKey::Year => compare_years(&a.movie, &b.movie),
                SortKey::Rating => a
                    .entry
                    .rating
                    .partial_cmp(&b.entry.rating)
                    .unwrap_or(Ordering::Equal),
            };
            query.order.apply(ordering)
        });
        rows
    }

    pub fn stats(&self) -> WatchlistStats {
        let total = self.items.len();
        let watched = self.items.iter().filter(|i| i.entry.watched).count();
        WatchlistStats {
            total,
            watched,
            unwatched: total - watched,
            watched_percentage: percentage(watched, total),
        }
    }

    /// Flip the local watched flag. Returns false if the movie is not listed.
    pub fn set_watched(&mut self, imdb_id: &str, watched: bool) -> bool {
        match self.position(imdb_id) {
            Some(index) => {
                self.items[index].entry.watched = watched;
                true
            }
            None => false,
        }
    }

    /// Record a rating locally and mark the movie watched.
    pub fn record_rating(&mut self, imdb_id: &str, rating: f64) -> bool {
        match self.position(imdb_id) {
            Some(index) => {
                let entry = &mut self.items[index].entry;
                entry.rating = Some(rating);
                entry.watched = true;
                true
            }
            None => false,
        }
    }

    /// Remove a movie now, then tell the backend. On failure the row is
    /// restored at its old position and the error returned.
    ///
    /// Removing a movie that is not listed is a no-op.
    pub async fn remove<B: WatchlistBackend>(&mut self, backend: &B, imdb_id: &str) -> Result<()> {
        let Some(index) = self.position(imdb_id) else {
            return Ok(());
        };
        let removed = self.items.remove(index);

        if let Err(e) = backend.toggle(imdb_id).await {
            error!("Error removing {} from watchlist: {}", imdb_id, e);
            self.items.insert(index, removed);
            return Err(e);
        }
        debug!("✓ Removed {} from watchlist", imdb_id);
        Ok(())
    }

    /// Append a movie now, then tell the backend. On failure the row is
    /// dropped again and the error returned.
    ///
    /// Adding a movie that is already listed is a no-op.
    pub async fn add<B: WatchlistBackend>(&mut self, backend: &B, item: WatchlistItem) -> Result<()> {
        if self.contains(item.imdb_id()) {
            return Ok(());
        }
        let imdb_id = item.imdb_id().to_string();
        self.items.push(item);

        if let Err(e) = backend.toggle(&imdb_id).await {
            error!("Error adding {} to watchlist: {}", imdb_id, e);
            self.items.retain(|i| i.imdb_id() != imdb_id);
            return Err(e);
        }
        debug!("✓ Added {} to watchlist", imdb_id);
        Ok(())
    }
}

/// "In my watchlist" button on a movie page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MembershipToggle {
    present: bool,
}

impl MembershipToggle {
    pub fn new(present: bool) -> Self {
        MembershipToggle { present }
    }

    pub fn is_present(self) -> bool {
        self.present
    }

    /// Flip locally, call the backend, flip back if it fails.
    pub async fn toggle<B: WatchlistBackend>(&mut self, backend: &B, imdb_id: &str) -> Result<bool> {
        self.present = !self.present;
        if let Err(e) = backend.toggle(imdb_id).await {
            error!("Error toggling watchlist for {}: {}", imdb_id, e);
            self.present = !self.present;
            return Err(e);
        }
        Ok(self.present)
    }
}

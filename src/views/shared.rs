//! Shared watchlist page state.
//!
//! A movie on a shared list counts as watched once every member has rated
//! it. The backend sets the same flag when a rating lands; deriving it here
//! keeps the page right between a local rating and the next reload.

use super::watchlist::{compare_titles, compare_years, percentage, text_matches, ListQuery, SortKey};
use crate::models::{SharedWatchlist, SharedWatchlistEntry};
use crate::omdb::{MetadataSource, Movie, MovieService};
use crate::store::KeyValueStore;
use std::cmp::Ordering;

/// True when every member in `member_ids` has a rating on `entry`.
///
/// A list without members has nobody left to watch, so this is true.
pub fn all_members_rated<S: AsRef<str>>(entry: &SharedWatchlistEntry, member_ids: &[S]) -> bool {
    member_ids
        .iter()
        .all(|id| entry.ratings.contains_key(id.as_ref()))
}

/// Mean of all member ratings, `None` if nobody has rated yet.
pub fn average_rating(entry: &SharedWatchlistEntry) -> Option<f64> {
    if entry.ratings.is_empty() {
        return None;
    }
    Some(entry.ratings.values().sum::<f64>() / entry.ratings.len() as f64)
}

#[derive(Clone, Debug, PartialEq)]
pub struct SharedItem {
    pub movie: Movie,
    pub entry: SharedWatchlistEntry,
}

/// Local copy of one shared watchlist with its movie details.
#[derive(Clone, Debug, Default)]
pub struct SharedWatchlistState {
    list: SharedWatchlist,
    items: Vec<SharedItem>,
}

impl SharedWatchlistState {
    pub fn new(list: SharedWatchlist, items: Vec<SharedItem>) -> Self {
        SharedWatchlistState { list, items }
    }

    /// Fetch details for every movie on `list` through the cache.
    pub async fn hydrate<S, M>(list: SharedWatchlist, movies: &MovieService<S, M>) -> Self
    where
        S: KeyValueStore,
        M: MetadataSource,
    {
        let mut ids: Vec<&String> = list.movies.keys().collect();
        ids.sort();

        let details = movies.fetch_movies(ids).await;
        let items = details
            .into_iter()
            .filter_map(|movie| {
                let entry = list.movies.get(&movie.imdb_id)?.clone();
                Some(SharedItem { movie, entry })
            })
            .collect();
        SharedWatchlistState { list, items }
    }

    pub fn list(&self) -> &SharedWatchlist {
        &self.list
    }

    pub fn items(&self) -> &[SharedItem] {
        &self.items
    }

    pub fn members(&self) -> &[String] {
        &self.list.user_ids
    }

    pub fn is_watched(&self, item: &SharedItem) -> bool {
        all_members_rated(&item.entry, &self.list.user_ids)
    }

    pub fn has_rated(&self, item: &SharedItem, user_id: &str) -> bool {
        item.entry.ratings.contains_key(user_id)
    }

    /// Percentage of movies every member has rated.
    pub fn progress(&self) -> u32 {
        let watched = self.items.iter().filter(|i| self.is_watched(i)).count();
        percentage(watched, self.items.len())
    }

    /// Record `user_id`'s rating locally and refresh the watched flag.
    pub fn record_rating(&mut self, imdb_id: &str, user_id: &str, rating: f64) -> bool {
        let members = self.list.user_ids.clone();
        let Some(item) = self.items.iter_mut().find(|i| i.movie.imdb_id == imdb_id) else {
            return false;
        };
        item.entry.ratings.insert(user_id.to_string(), rating);
        item.entry.watched = all_members_rated(&item.entry, &members);
        if let Some(entry) = self.list.movies.get_mut(imdb_id) {
            *entry = item.entry.clone();
        }
        true
    }

    /// Rows matching `query`. Text matches the title only.
    pub fn view(&self, query: &ListQuery) -> Vec<&SharedItem> {
        let mut rows: Vec<&SharedItem> = self
            .items
            .iter()
            .filter(|item| text_matches(&query.text, &[Some(item.movie.title.as_str())]))
            .filter(|item| query.watched.accepts(self.is_watched(item)))
            .collect();

        rows.sort_by(|a, b| {
            let ordering = match query.sort {
                SortKey::DateAdded => a.entry.added_date.cmp(&b.entry.added_date),
                SortKey::Title => compare_titles(&a.movie, &b.movie),
                SortKey::Year => compare_years(&a.movie, &b.movie),
                SortKey::Rating => {
                    let avg = |item: &SharedItem| average_rating(&item.entry).unwrap_or(0.0);
                    avg(a).partial_cmp(&avg(b)).unwrap_or(Ordering::Equal)
                }
            };
            query.order.apply(ordering)
        });
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::omdb::memory::movie_stub;
    use crate::views::watchlist::{SortOrder, WatchedFilter};
    use std::collections::HashMap;

    fn entry(ratings: &[(&str, f64)]) -> SharedWatchlistEntry {
        SharedWatchlistEntry {
            ratings: ratings.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            ..Default::default()
        }
    }

    fn state() -> SharedWatchlistState {
        let items = vec![
            SharedItem {
                movie: movie_stub("tt1", "Inception", "2010"),
                entry: entry(&[("a", 8.0), ("b", 9.0)]),
            },
            SharedItem {
                movie: movie_stub("tt2", "Up", "2009"),
                entry: entry(&[("a", 7.0)]),
            },
        ];
        let list = SharedWatchlist {
            id: Some("s1".into()),
            name: "Friday".into(),
            user_ids: vec!["a".into(), "b".into()],
            movies: items
                .iter()
                .map(|i| (i.movie.imdb_id.clone(), i.entry.clone()))
                .collect::<HashMap<_, _>>(),
            ..Default::default()
        };
        SharedWatchlistState::new(list, items)
    }

    #[test]
    fn test_watched_requires_every_member() {
        let members = ["a", "b"];
        assert!(all_members_rated(&entry(&[("a", 5.0), ("b", 6.0)]), &members));
        assert!(!all_members_rated(&entry(&[("a", 5.0)]), &members));
        assert!(all_members_rated(&entry(&[]), &[] as &[&str]));
    }

    #[test]
    fn test_average_rating() {
        assert_eq!(average_rating(&entry(&[("a", 8.0), ("b", 9.0)])), Some(8.5));
        assert_eq!(average_rating(&entry(&[])), None);
    }

    #[test]
    fn test_progress_and_local_rating() {
        let mut s = state();
        assert_eq!(s.progress(), 50);

        assert!(s.record_rating("tt2", "b", 6.0));
        assert_eq!(s.progress(), 100);
        assert!(s.list().movies["tt2"].watched);
        assert!(!s.record_rating("tt404", "b", 6.0));
    }

    #[test]
    fn test_view() {
        let s = state();
        let unwatched = ListQuery::new().with_watched(WatchedFilter::Unwatched);
        let rows = s.view(&unwatched);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].movie.imdb_id, "tt2");

        let by_rating = ListQuery::new().sorted_by(SortKey::Rating, SortOrder::Asc);
        let rows = s.view(&by_rating);
        assert_eq!(rows[0].movie.imdb_id, "tt2");
        assert!(s.has_rated(rows[1], "b"));
    }
}

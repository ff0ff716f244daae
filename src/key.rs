//! Cache key management utilities.

/// Namespace prefix for every OMDb response in the store.
pub const CACHE_PREFIX: &str = "omdb_cache_";

/// Builder for cache keys.
///
/// Keys are `<kind>_<id>`; the response cache adds the namespace prefix
/// when it touches the store.
pub struct CacheKeyBuilder;

impl CacheKeyBuilder {
    /// Key for a movie detail lookup: `movie_<imdbId>`.
    pub fn movie(imdb_id: &str) -> String {
        format!("movie_{}", imdb_id)
    }

    /// Key for a title search: `search_<normalized query>`.
    pub fn search(query: &str) -> String {
        format!("search_{}", Self::normalize_query(query))
    }

    /// Trim and lower-case a search query so equivalent searches share a key.
    pub fn normalize_query(query: &str) -> String {
        query.trim().to_lowercase()
    }

    /// Full store key under `prefix`.
    pub fn namespaced(prefix: &str, key: &str) -> String {
        format!("{}{}", prefix, key)
    }
}

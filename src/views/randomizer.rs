//! "Spin the wheel": a shareable URL carrying a set of movies, and an
//! equal-weight draw among them.
//!
//! The `options` query parameter holds comma-separated `Name=imdbId` pairs.
//! Names are percent-encoded on the way out and decoded on the way in, so
//! titles containing `,` or `=` survive the round trip.

use crate::error::{Error, Result};
use crate::omdb::{MetadataSource, Movie, MovieService};
use crate::store::KeyValueStore;
use crate::strategy::FetchStrategy;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::Rng;

pub const WHEEL_PATH: &str = "/spin-the-wheel";
pub const OPTIONS_PARAM: &str = "options";

/// Fewest movies worth spinning for.
pub const MIN_SELECTION: usize = 2;

/// Shown when the URL has no `options` parameter.
pub const EMPTY_PLACEHOLDER: [&str; 4] = [
    "Add movies in URL",
    "Example: ?options=Inception=tt1375666",
    "No movies found",
    "Try again",
];

/// Shown when `options` is present but malformed.
pub const INVALID_PLACEHOLDER: [&str; 3] = [
    "Invalid format",
    "Use: Name=imdbId,Name2=imdbId2",
    "Try again",
];

/// Everything but `A-Z a-z 0-9 - _ . ! ~ * ' ( )` is escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// One movie on the wheel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovieOption {
    pub name: String,
    pub imdb_id: String,
}

impl MovieOption {
    pub fn new(name: impl Into<String>, imdb_id: impl Into<String>) -> Self {
        MovieOption {
            name: name.into(),
            imdb_id: imdb_id.into(),
        }
    }
}

/// Encode a selection as the `options` value.
///
/// # Errors
///
/// `Error::ValidationError` for fewer than [`MIN_SELECTION`] movies or an
/// empty name or id.
pub fn encode_options(selection: &[MovieOption]) -> Result<String> {
    if selection.len() < MIN_SELECTION {
        return Err(Error::ValidationError(format!(
            "Select at least {} movies to spin, got {}",
            MIN_SELECTION,
            selection.len()
        )));
    }

    let mut pairs = Vec::with_capacity(selection.len());
    for option in selection {
        let name = option.name.trim();
        let imdb_id = option.imdb_id.trim();
        if name.is_empty() || imdb_id.is_empty() {
            return Err(Error::ValidationError(format!(
                "Wheel option {:?} needs both a name and an IMDb id",
                option
            )));
        }
        pairs.push(format!(
            "{}={}",
            utf8_percent_encode(name, COMPONENT),
            utf8_percent_encode(imdb_id, COMPONENT)
        ));
    }
    Ok(pairs.join(","))
}

/// Relative URL of the wheel page for `selection`.
pub fn wheel_url(selection: &[MovieOption]) -> Result<String> {
    Ok(format!(
        "{}?{}={}",
        WHEEL_PATH,
        OPTIONS_PARAM,
        encode_options(selection)?
    ))
}

/// Parse an `options` value. Case-sensitive; entries are trimmed.
///
/// # Errors
///
/// `Error::ValidationError` if any entry lacks `=`, or has an empty name or
/// id. One bad entry rejects the whole value.
pub fn parse_options(raw: &str) -> Result<Vec<MovieOption>> {
    raw.split(',')
        .map(|item| {
            let (name, imdb_id) = item
                .split_once('=')
                .ok_or_else(|| Error::ValidationError(format!("Invalid format: {:?}", item)))?;
            let name = decode(name)?;
            let imdb_id = decode(imdb_id)?;
            if name.is_empty() || imdb_id.is_empty() {
                return Err(Error::ValidationError(format!("Invalid format: {:?}", item)));
            }
            Ok(MovieOption { name, imdb_id })
        })
        .collect()
}

fn decode(raw: &str) -> Result<String> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|s| s.trim().to_string())
        .map_err(|e| Error::ValidationError(format!("Invalid encoding: {}", e)))
}

/// Raw (still percent-encoded) value of `name` in a query string.
fn query_param<'a>(query: &'a str, name: &str) -> Option<&'a str> {
    query
        .trim_start_matches('?')
        .split('&')
        .find_map(|pair| match pair.split_once('=') {
            Some((key, value)) if key == name => Some(value),
            _ => None,
        })
}

/// What the wheel shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Wheel {
    Movies(Vec<MovieOption>),
    /// Fallback labels; spinning still works but never yields a movie.
    Placeholder(Vec<String>),
}

impl Wheel {
    /// Build the wheel from the page's query string (`?options=...`).
    pub fn from_query(query: &str) -> Self {
        match query_param(query, OPTIONS_PARAM).filter(|v| !v.is_empty()) {
            None => Self::placeholder(&EMPTY_PLACEHOLDER),
            Some(raw) => Self::from_options(raw),
        }
    }

    /// Build the wheel from an `options` value.
    pub fn from_options(raw: &str) -> Self {
        match parse_options(raw) {
            Ok(options) => Wheel::Movies(options),
            Err(e) => {
                warn!("Error parsing wheel options: {}", e);
                Self::placeholder(&INVALID_PLACEHOLDER)
            }
        }
    }

    fn placeholder(labels: &[&str]) -> Self {
        Wheel::Placeholder(labels.iter().map(|l| l.to_string()).collect())
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Wheel::Placeholder(_))
    }

    pub fn len(&self) -> usize {
        match self {
            Wheel::Movies(options) => options.len(),
            Wheel::Placeholder(labels) => labels.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Segment labels, in wheel order.
    pub fn labels(&self) -> Vec<&str> {
        match self {
            Wheel::Movies(options) => options.iter().map(|o| o.name.as_str()).collect(),
            Wheel::Placeholder(labels) => labels.iter().map(String::as_str).collect(),
        }
    }

    /// Pick a segment uniformly at random.
    pub fn spin_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        Some(rng.random_range(0..self.len()))
    }

    pub fn spin(&self) -> Option<usize> {
        self.spin_with(&mut rand::rng())
    }

    /// Movie at segment `index`; placeholders have none.
    pub fn winner(&self, index: usize) -> Option<&MovieOption> {
        match self {
            Wheel::Movies(options) => options.get(index),
            Wheel::Placeholder(_) => None,
        }
    }

    /// Full details of the movie at segment `index`, through the cache.
    pub async fn winner_details<S, M>(
        &self,
        index: usize,
        movies: &MovieService<S, M>,
    ) -> Result<Option<Movie>>
    where
        S: KeyValueStore,
        M: MetadataSource,
    {
        match self.winner(index) {
            Some(option) => movies
                .fetch_movie_by_id(&option.imdb_id, FetchStrategy::Refresh)
                .await
                .map(Some),
            None => Ok(None),
        }
    }
}

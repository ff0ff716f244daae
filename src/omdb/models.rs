//! OMDb response types.
//!
//! OMDb answers every request with a `Response: "True" | "False"` envelope
//! and marks absent fields with the string `"N/A"`. Both are normalised here:
//! the envelope becomes [`ApiFlag`] and `"N/A"` becomes `None`.

use serde::{Deserialize, Deserializer, Serialize};

/// The `Response` field of every OMDb payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ApiFlag {
    True,
    #[default]
    False,
}

impl ApiFlag {
    pub fn is_true(self) -> bool {
        matches!(self, ApiFlag::True)
    }
}

impl Serialize for ApiFlag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(match self {
            ApiFlag::True => "True",
            ApiFlag::False => "False",
        })
    }
}

impl<'de> Deserialize<'de> for ApiFlag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(if raw.eq_ignore_ascii_case("true") {
            ApiFlag::True
        } else {
            ApiFlag::False
        })
    }
}

/// Deserialize a string field, mapping `"N/A"`, `""` and `null` to `None`.
pub(crate) fn na_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| {
        let trimmed = s.trim();
        !trimmed.is_empty() && trimmed != "N/A"
    }))
}

/// Third-party score attached to a movie (IMDb, Rotten Tomatoes, Metacritic).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceRating {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Value")]
    pub value: String,
}

/// Full movie record from `?i=<id>&plot=full`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default, deserialize_with = "na_as_none")]
    pub year: Option<String>,
    #[serde(rename = "Rated", default, deserialize_with = "na_as_none")]
    pub rated: Option<String>,
    #[serde(rename = "Released", default, deserialize_with = "na_as_none")]
    pub released: Option<String>,
    #[serde(rename = "Runtime", default, deserialize_with = "na_as_none")]
    pub runtime: Option<String>,
    #[serde(rename = "Genre", default, deserialize_with = "na_as_none")]
    pub genre: Option<String>,
    #[serde(rename = "Director", default, deserialize_with = "na_as_none")]
    pub director: Option<String>,
    #[serde(rename = "Writer", default, deserialize_with = "na_as_none")]
    pub writer: Option<String>,
    #[serde(rename = "Actors", default, deserialize_with = "na_as_none")]
    pub actors: Option<String>,
    #[serde(rename = "Plot", default, deserialize_with = "na_as_none")]
    pub plot: Option<String>,
    #[serde(rename = "Language", default, deserialize_with = "na_as_none")]
    pub language: Option<String>,
    #[serde(rename = "Country", default, deserialize_with = "na_as_none")]
    pub country: Option<String>,
    #[serde(rename = "Awards", default, deserialize_with = "na_as_none")]
    pub awards: Option<String>,
    #[serde(rename = "Poster", default, deserialize_with = "na_as_none")]
    pub poster: Option<String>,
    #[serde(rename = "Ratings", default)]
    pub ratings: Vec<SourceRating>,
    #[serde(rename = "Metascore", default, deserialize_with = "na_as_none")]
    pub metascore: Option<String>,
    #[serde(rename = "imdbRating", default, deserialize_with = "na_as_none")]
    pub imdb_rating: Option<String>,
    #[serde(rename = "imdbVotes", default, deserialize_with = "na_as_none")]
    pub imdb_votes: Option<String>,
    #[serde(rename = "Type", default, deserialize_with = "na_as_none")]
    pub kind: Option<String>,
}

impl Movie {
    /// Release year as a number (first four digits, so `"2010–2014"` → 2010).
    pub fn year_number(&self) -> Option<i32> {
        parse_year(self.year.as_deref()?)
    }

    /// IMDb score out of 10.
    pub fn imdb_score(&self) -> Option<f64> {
        self.imdb_rating.as_deref()?.parse().ok()
    }

    /// Genres as a list (`"Action, Sci-Fi"` → `["Action", "Sci-Fi"]`).
    pub fn genres(&self) -> Vec<&str> {
        split_list(self.genre.as_deref())
    }

    /// Cast as a list.
    pub fn cast(&self) -> Vec<&str> {
        split_list(self.actors.as_deref())
    }
}

/// Raw detail response: the movie fields plus the envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct MovieEnvelope {
    #[serde(rename = "Response", default)]
    pub response: ApiFlag,
    #[serde(rename = "Error")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub movie: Option<Movie>,
}

/// One row of a title search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default, deserialize_with = "na_as_none")]
    pub year: Option<String>,
    #[serde(rename = "Type", default, deserialize_with = "na_as_none")]
    pub kind: Option<String>,
    #[serde(rename = "Poster", default, deserialize_with = "na_as_none")]
    pub poster: Option<String>,
}

impl SearchHit {
    pub fn year_number(&self) -> Option<i32> {
        parse_year(self.year.as_deref()?)
    }
}

/// Title search response from `?s=<query>&type=movie`.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(rename = "Search", default)]
    pub hits: Vec<SearchHit>,
    #[serde(rename = "totalResults", default, deserialize_with = "na_as_none")]
    pub total_results: Option<String>,
    #[serde(rename = "Response", default)]
    pub response: ApiFlag,
    #[serde(rename = "Error", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResults {
    /// Empty result set returned for a blank query.
    pub fn empty() -> Self {
        SearchResults::default()
    }

    /// `Response: "True"` with at least one hit. Only these get cached.
    pub fn is_success(&self) -> bool {
        self.response.is_true() && !self.hits.is_empty()
    }

    pub fn total(&self) -> usize {
        self.total_results
            .as_deref()
            .and_then(|t| t.parse().ok())
            .unwrap_or(self.hits.len())
    }
}

fn parse_year(raw: &str) -> Option<i32> {
    let digits: String = raw.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() == 4 {
        digits.parse().ok()
    } else {
        None
    }
}

fn split_list(raw: Option<&str>) -> Vec<&str> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const INCEPTION: &str = r#"{
        "Title": "Inception", "Year": "2010", "Rated": "PG-13",
        "Released": "16 Jul 2010", "Runtime": "148 min",
        "Genre": "Action, Adventure, Sci-Fi", "Director": "Christopher Nolan",
        "Writer": "Christopher Nolan", "Actors": "Leonardo DiCaprio, Joseph Gordon-Levitt",
        "Plot": "A thief who steals corporate secrets...", "Language": "English",
        "Country": "United States", "Awards": "Won 4 Oscars",
        "Poster": "https://m.media-amazon.com/images/inception.jpg",
        "Ratings": [{"Source": "Internet Movie Database", "Value": "8.8/10"}],
        "Metascore": "74", "imdbRating": "8.8", "imdbVotes": "2,500,000",
        "imdbID": "tt1375666", "Type": "movie", "DVD": "N/A",
        "BoxOffice": "$292,587,330", "Production": "N/A", "Website": "N/A",
        "Response": "True"
    }"#;

    #[test]
    fn test_movie_envelope_success() {
        let envelope: MovieEnvelope = serde_json::from_str(INCEPTION).expect("Failed to parse");
        assert!(envelope.response.is_true());

        let movie = envelope.movie.expect("Movie missing");
        assert_eq!(movie.imdb_id, "tt1375666");
        assert_eq!(movie.year_number(), Some(2010));
        assert_eq!(movie.imdb_score(), Some(8.8));
        assert_eq!(movie.genres(), vec!["Action", "Adventure", "Sci-Fi"]);
        assert_eq!(movie.ratings.len(), 1);
    }

    #[test]
    fn test_movie_envelope_failure() {
        let envelope: MovieEnvelope =
            serde_json::from_str(r#"{"Response":"False","Error":"Incorrect IMDb ID."}"#)
                .expect("Failed to parse");
        assert!(!envelope.response.is_true());
        assert_eq!(envelope.error.as_deref(), Some("Incorrect IMDb ID."));
        assert!(envelope.movie.is_none());
    }

    #[test]
    fn test_na_sentinel_becomes_none() {
        let movie: Movie = serde_json::from_str(
            r#"{"imdbID":"tt0","Title":"Obscure","Year":"N/A","Poster":"N/A","Plot":""}"#,
        )
        .expect("Failed to parse");
        assert_eq!(movie.year, None);
        assert_eq!(movie.poster, None);
        assert_eq!(movie.plot, None);
        assert!(movie.cast().is_empty());
    }

    #[test]
    fn test_movie_survives_reserialization() {
        let envelope: MovieEnvelope = serde_json::from_str(INCEPTION).expect("Failed to parse");
        let movie = envelope.movie.expect("Movie missing");

        let json = serde_json::to_string(&movie).expect("Failed to serialize");
        let back: Movie = serde_json::from_str(&json).expect("Failed to parse back");
        assert_eq!(back, movie);
    }

    #[test]
    fn test_search_results() {
        let results: SearchResults = serde_json::from_str(
            r#"{"Search":[{"Title":"Up","Year":"2009","imdbID":"tt1049413","Type":"movie","Poster":"N/A"}],
                "totalResults":"12","Response":"True"}"#,
        )
        .expect("Failed to parse");
        assert!(results.is_success());
        assert_eq!(results.total(), 12);
        assert_eq!(results.hits[0].year_number(), Some(2009));
        assert_eq!(results.hits[0].poster, None);

        let none: SearchResults =
            serde_json::from_str(r#"{"Response":"False","Error":"Movie not found!"}"#)
                .expect("Failed to parse");
        assert!(!none.is_success());
        assert_eq!(none.total(), 0);
    }

    #[test]
    fn test_year_ranges() {
        assert_eq!(parse_year("2010–2014"), Some(2010));
        assert_eq!(parse_year("19"), None);
    }
}

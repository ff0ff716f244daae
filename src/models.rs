//! Backend REST models.
//!
//! Field names follow the backend's camelCase JSON. Timestamps are local
//! date-times without an offset.

use crate::error::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Account role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "USER"),
            Role::Admin => write!(f, "ADMIN"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(Error::ValidationError(format!("Unknown role: {}", other))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub shared_watchlists: Vec<String>,
    #[serde(default)]
    pub profile_pic_id: Option<String>,
    #[serde(default)]
    pub joined: Option<NaiveDate>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A movie score in `[1, 10]` with one decimal of precision.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Score(f64);

impl Score {
    pub const MIN: f64 = 1.0;
    pub const MAX: f64 = 10.0;

    /// Round `value` to one decimal and check the range.
    ///
    /// # Errors
    ///
    /// `Error::ValidationError` if the rounded value is outside `[1, 10]` or
    /// not finite.
    pub fn new(value: f64) -> Result<Self> {
        let rounded = (value * 10.0).round() / 10.0;
        if !rounded.is_finite() || !(Self::MIN..=Self::MAX).contains(&rounded) {
            return Err(Error::ValidationError(format!(
                "Rating must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )));
        }
        Ok(Score(rounded))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Score {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Score::new(value)
    }
}

impl From<Score> for f64 {
    fn from(score: Score) -> f64 {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// A user's rating of one movie.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub imdb_id: String,
    pub rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<NaiveDateTime>,
}

/// Body of `POST /rating` and of shared-watchlist rating calls.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    pub rating: Score,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    #[serde(default)]
    pub watched: bool,
    #[serde(default)]
    pub added_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub rating: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Watchlist {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub movies: HashMap<String, WatchlistEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedWatchlistEntry {
    #[serde(default)]
    pub watched: bool,
    #[serde(default)]
    pub added_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub added_by_username: Option<String>,
    /// Member user id → score.
    #[serde(default)]
    pub ratings: HashMap<String, f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedWatchlist {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub user_ids: Vec<String>,
    #[serde(default)]
    pub movies: HashMap<String, SharedWatchlistEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<NaiveDateTime>,
}

impl SharedWatchlist {
    /// New list as sent to `POST /shared-watchlist`.
    pub fn draft(name: impl Into<String>, description: Option<String>) -> Self {
        SharedWatchlist {
            name: name.into(),
            description,
            ..Default::default()
        }
    }
}

/// Credentials for `/auth/authenticate` and `/auth/register`.
#[derive(Clone, Serialize)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for AuthRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthRequest")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_rounds_and_validates() {
        assert_eq!(Score::new(7.34).expect("valid").value(), 7.3);
        assert_eq!(Score::new(9.96).expect("valid").value(), 10.0);
        assert_eq!(Score::new(1.0).expect("valid").to_string(), "1.0");
        assert!(Score::new(0.9).is_err());
        assert!(Score::new(10.2).is_err());
        assert!(Score::new(f64::NAN).is_err());
    }

    #[test]
    fn test_score_serde() {
        let score: Score = serde_json::from_str("8.25").expect("Failed to parse");
        assert_eq!(score.value(), 8.3);
        assert!(serde_json::from_str::<Score>("11").is_err());

        let body = RatingRequest {
            imdb_id: Some("tt1375666".to_string()),
            rating: score,
        };
        assert_eq!(
            serde_json::to_string(&body).expect("Failed to serialize"),
            r#"{"imdbId":"tt1375666","rating":8.3}"#
        );
    }

    #[test]
    fn test_watchlist_json() {
        let list: Watchlist = serde_json::from_str(
            r#"{"id":"w1","userId":"u1","movies":{
                "tt1375666":{"watched":true,"addedDate":"2024-05-01T12:30:00","rating":8.5},
                "tt1049413":{"watched":false,"addedDate":"2024-05-02T09:00:00.123","rating":null}}}"#,
        )
        .expect("Failed to parse");

        assert_eq!(list.movies.len(), 2);
        let inception = &list.movies["tt1375666"];
        assert!(inception.watched);
        assert_eq!(inception.rating, Some(8.5));
        assert_eq!(
            inception.added_date.map(|d| d.to_string()).as_deref(),
            Some("2024-05-01 12:30:00")
        );
        assert_eq!(list.movies["tt1049413"].rating, None);
    }

    #[test]
    fn test_user_json() {
        let user: User = serde_json::from_str(
            r#"{"id":"u1","username":"ronan","role":"ADMIN","sharedWatchlists":["s1"],
                "profilePicId":"","joined":"2024-01-15"}"#,
        )
        .expect("Failed to parse");
        assert!(user.is_admin());
        assert_eq!(user.joined, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!("user".parse::<Role>().expect("valid"), Role::User);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_auth_request_hides_password() {
        let req = AuthRequest {
            username: "ronan".into(),
            password: "hunter2".into(),
        };
        assert!(!format!("{:?}", req).contains("hunter2"));
    }
}

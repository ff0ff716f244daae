//! Backend REST client.

use super::session::Session;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::{
    AuthRequest, AuthResponse, Rating, RatingRequest, Role, Score, SharedWatchlist, User,
    Watchlist, WatchlistEntry,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

/// Endpoints that must never carry a bearer token.
pub const UNAUTHENTICATED_PATHS: [&str; 2] = ["/auth/register", "/auth/authenticate"];

/// Characters escaped inside a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// True unless `path` targets one of the auth endpoints.
pub fn should_attach_token(path: &str) -> bool {
    !UNAUTHENTICATED_PATHS.iter().any(|p| path.contains(p))
}

fn segment(raw: &str) -> String {
    utf8_percent_encode(raw, PATH_SEGMENT).to_string()
}

/// HTTP client for the M-Rate backend.
///
/// Every request goes through [`ApiClient::request`], which attaches
/// `Authorization: Bearer <token>` from the shared [`Session`] except on
/// the auth endpoints.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: Session) -> Result<Self> {
        Self::build(base_url.into(), session, None)
    }

    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// `Error::ConfigError` if no backend base URL is configured or the HTTP
    /// client cannot be built.
    pub fn from_config(config: &ClientConfig, session: Session) -> Result<Self> {
        let base_url = config.require_api_base_url()?.to_string();
        Self::build(base_url, session, config.http_timeout)
    }

    fn build(base_url: String, session: Session, timeout: Option<Duration>) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::ConfigError(
                "Backend API base URL is not configured".to_string(),
            ));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(ApiClient {
            client,
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Start a request to `path`, with the bearer token when allowed.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        if !should_attach_token(path) {
            return builder;
        }
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, what: &str) -> Result<reqwest::Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| Error::NetworkError(format!("{} request failed: {}", what, e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        warn!("{} failed with status {}", what, status.as_u16());
        Err(Error::ApiError {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder, what: &str) -> Result<T> {
        let response = self.send(builder, what).await?;
        response.json::<T>().await.map_err(|e| {
            Error::DeserializationError(format!("Failed to parse {} response: {}", what, e))
        })
    }

    async fn send_empty(&self, builder: RequestBuilder, what: &str) -> Result<()> {
        self.send(builder, what).await.map(|_| ())
    }

    /// Log in and store the issued token in the session.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String> {
        self.exchange_credentials("/auth/authenticate", username, password)
            .await
    }

    /// Create an account and store the issued token in the session.
    pub async fn register(&self, username: &str, password: &str) -> Result<String> {
        self.exchange_credentials("/auth/register", username, password)
            .await
    }

    async fn exchange_credentials(&self, path: &str, username: &str, password: &str) -> Result<String> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(Error::ValidationError(
                "Username and password are required".to_string(),
            ));
        }

        let body = AuthRequest {
            username: username.trim().to_string(),
            password: password.to_string(),
        };
        let response: AuthResponse = self
            .send_json(self.request(Method::POST, path).json(&body), path)
            .await?;

        self.session.set_token(response.token.clone());
        info!("✓ Signed in as {}", body.username);
        Ok(response.token)
    }

    pub fn logout(&self) {
        self.session.clear();
    }

    pub async fn current_user(&self) -> Result<User> {
        self.send_json(self.request(Method::GET, "/users/me"), "current user")
            .await
    }

    pub async fn user_by_id(&self, id: &str) -> Result<User> {
        let path = format!("/users/{}", segment(id));
        self.send_json(self.request(Method::GET, &path), "user").await
    }

    pub async fn user_by_username(&self, username: &str) -> Result<User> {
        let path = format!("/users/username/{}", segment(username));
        self.send_json(self.request(Method::GET, &path), "user").await
    }

    /// All accounts. Admin only.
    pub async fn all_users(&self) -> Result<Vec<User>> {
        self.send_json(self.request(Method::GET, "/users"), "users")
            .await
    }

    /// Change a user's role. Admin only.
    pub async fn update_user_role(&self, id: &str, role: Role) -> Result<User> {
        let path = format!("/users/{}/role", segment(id));
        let role = role.to_string();
        self.send_json(
            self.request(Method::PUT, &path).query(&[("role", role.as_str())]),
            "role update",
        )
        .await
    }

    /// Delete an account. Admin only.
    pub async fn delete_user(&self, id: &str) -> Result<()> {
        let path = format!("/users/{}", segment(id));
        self.send_empty(self.request(Method::DELETE, &path), "user delete")
            .await
    }

    pub async fn update_password(&self, current: &str, new: &str) -> Result<()> {
        self.send_empty(
            self.request(Method::PUT, "/users/me/password")
                .query(&[("currentPassword", current), ("newPassword", new)]),
            "password update",
        )
        .await
    }

    /// The current user's rating of a movie; `None` if not rated yet.
    pub async fn rating(&self, imdb_id: &str) -> Result<Option<Rating>> {
        let response = match self
            .send(
                self.request(Method::GET, "/rating").query(&[("imdbId", imdb_id)]),
                "rating",
            )
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };

        // an unrated movie comes back as 200 with an empty body
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn rate(&self, imdb_id: &str, score: Score) -> Result<Rating> {
        let body = RatingRequest {
            imdb_id: Some(imdb_id.to_string()),
            rating: score,
        };
        self.send_json(self.request(Method::POST, "/rating").json(&body), "rating")
            .await
    }

    pub async fn all_ratings(&self) -> Result<Vec<Rating>> {
        self.send_json(self.request(Method::GET, "/rating/all"), "ratings")
            .await
    }

    pub async fn watchlist(&self) -> Result<HashMap<String, WatchlistEntry>> {
        self.send_json(self.request(Method::GET, "/watchlist"), "watchlist")
            .await
    }

    pub async fn full_watchlist(&self) -> Result<Watchlist> {
        self.send_json(self.request(Method::GET, "/watchlist/full"), "watchlist")
            .await
    }

    /// Add the movie if absent, remove it if present.
    pub async fn toggle_watchlist(&self, imdb_id: &str) -> Result<()> {
        let path = format!("/watchlist/{}", segment(imdb_id));
        self.send_empty(self.request(Method::POST, &path), "watchlist toggle")
            .await
    }

    pub async fn is_in_watchlist(&self, imdb_id: &str) -> Result<bool> {
        self.send_json(
            self.request(Method::GET, "/watchlist/isPresent")
                .query(&[("imdbId", imdb_id)]),
            "watchlist lookup",
        )
        .await
    }

    pub async fn shared_watchlists(&self) -> Result<Vec<SharedWatchlist>> {
        self.send_json(
            self.request(Method::GET, "/shared-watchlist"),
            "shared watchlists",
        )
        .await
    }

    pub async fn create_shared_watchlist(&self, draft: &SharedWatchlist) -> Result<SharedWatchlist> {
        if draft.name.trim().is_empty() {
            return Err(Error::ValidationError(
                "Shared watchlist name is required".to_string(),
            ));
        }
        self.send_json(
            self.request(Method::POST, "/shared-watchlist").json(draft),
            "shared watchlist create",
        )
        .await
    }

    pub async fn shared_watchlist(&self, id: &str) -> Result<SharedWatchlist> {
        let path = format!("/shared-watchlist/{}", segment(id));
        self.send_json(self.request(Method::GET, &path), "shared watchlist")
            .await
    }

    pub async fn update_shared_watchlist(
        &self,
        id: &str,
        watchlist: &SharedWatchlist,
    ) -> Result<SharedWatchlist> {
        let path = format!("/shared-watchlist/{}", segment(id));
        self.send_json(
            self.request(Method::PUT, &path).json(watchlist),
            "shared watchlist update",
        )
        .await
    }

    pub async fn delete_shared_watchlist(&self, id: &str) -> Result<()> {
        let path = format!("/shared-watchlist/{}", segment(id));
        self.send_empty(self.request(Method::DELETE, &path), "shared watchlist delete")
            .await
    }

    pub async fn add_member(&self, id: &str, username: &str) -> Result<()> {
        let path = format!("/shared-watchlist/{}/user/{}", segment(id), segment(username));
        self.send_empty(self.request(Method::POST, &path), "member add")
            .await
    }

    pub async fn remove_member(&self, id: &str, username: &str) -> Result<()> {
        let path = format!("/shared-watchlist/{}/user/{}", segment(id), segment(username));
        self.send_empty(self.request(Method::DELETE, &path), "member remove")
            .await
    }

    pub async fn add_shared_movie(&self, id: &str, imdb_id: &str) -> Result<()> {
        let path = format!("/shared-watchlist/{}/movie/{}", segment(id), segment(imdb_id));
        self.send_empty(self.request(Method::POST, &path), "shared movie add")
            .await
    }

    pub async fn remove_shared_movie(&self, id: &str, imdb_id: &str) -> Result<()> {
        let path = format!("/shared-watchlist/{}/movie/{}", segment(id), segment(imdb_id));
        self.send_empty(self.request(Method::DELETE, &path), "shared movie remove")
            .await
    }

    pub async fn rate_shared_movie(&self, id: &str, imdb_id: &str, score: Score) -> Result<()> {
        let path = format!(
            "/shared-watchlist/{}/movie/{}/rating",
            segment(id),
            segment(imdb_id)
        );
        let body = RatingRequest {
            imdb_id: None,
            rating: score,
        };
        self.send_empty(self.request(Method::POST, &path).json(&body), "shared rating")
            .await
    }
}

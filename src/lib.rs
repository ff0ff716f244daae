//! # mrate-client
//!
//! Client core for the M-Rate movie rating app: everything the pages need
//! except rendering.
//!
//! ## Features
//!
//! - **Metadata cache:** OMDb lookups behind a 24-hour expiring cache over
//!   any [`KeyValueStore`](store::KeyValueStore), with purge-and-retry when
//!   the store runs out of space
//! - **Route guard:** allow / redirect / clear-session decisions from the
//!   session token's expiry and roles, without verifying the signature
//! - **Backend client:** bearer-token HTTP client for ratings, personal and
//!   shared watchlists, and accounts
//! - **Page logic:** debounced search, optimistic watchlist edits with
//!   rollback, category ratings and the movie randomizer
//!
//! ## Quick Start
//!
//! ```ignore
//! use mrate_client::{
//!     FetchStrategy, MovieService, RouteGuard,
//!     omdb::OmdbClient,
//!     store::InMemoryStore,
//! };
//!
//! // 1. Cached movie lookups
//! let movies = MovieService::new(InMemoryStore::new(), OmdbClient::new(Some(api_key))?);
//! let up = movies.fetch_movie_by_id("tt1049413", FetchStrategy::Refresh).await?;
//! let hits = movies.search_movies("inception", FetchStrategy::Refresh).await?;
//!
//! // 2. Navigation check
//! let outcome = RouteGuard::new().evaluate("/admin", session.token().as_deref());
//! ```

#[macro_use]
extern crate log;

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod entry;
pub mod error;
pub mod guard;
pub mod key;
pub mod models;
pub mod observability;
pub mod omdb;
pub mod store;
pub mod strategy;
pub mod token;
pub mod views;

// Re-exports for convenience
pub use api::{ApiClient, Session};
pub use cache::ResponseCache;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use guard::{GuardAction, GuardOutcome, RouteGuard};
pub use omdb::MovieService;
pub use store::KeyValueStore;
pub use strategy::FetchStrategy;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

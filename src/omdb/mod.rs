//! OMDb (Open Movie Database) access: response models, HTTP client and the
//! cached lookup service.

pub mod client;
pub mod memory;
pub mod models;
pub mod service;

pub use client::{MetadataSource, OmdbClient, OMDB_BASE_URL};
pub use memory::InMemorySource;
pub use models::{ApiFlag, Movie, SearchHit, SearchResults, SourceRating};
pub use service::MovieService;

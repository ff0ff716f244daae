//! Backend REST access: the shared session and the HTTP client.

pub mod client;
pub mod session;

pub use client::{should_attach_token, ApiClient, UNAUTHENTICATED_PATHS};
pub use session::Session;

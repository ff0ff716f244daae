//! Error types for the M-Rate client.

use std::fmt;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the M-Rate client.
///
/// Data-fetch operations return these to the caller. Cache writes and token
/// decoding recover locally and only log them.
#[derive(Debug, Clone)]
pub enum Error {
    /// Required configuration is missing or invalid.
    ///
    /// Common causes:
    /// - OMDb API key not set
    /// - Backend base URL not set or not parseable
    ConfigError(String),

    /// The requested resource does not exist.
    ///
    /// Raised when OMDb answers `Response: "False"` for a lookup, or the
    /// backend returns 404.
    NotFound(String),

    /// Transport failure or unexpected HTTP status from an external service.
    NetworkError(String),

    /// Backend REST service rejected the request.
    ApiError {
        /// HTTP status code
        status: u16,
        /// Response body, if any
        message: String,
    },

    /// The key-value store refused a write because it is full.
    ///
    /// **Recovery:** the response cache purges expired entries and retries once.
    QuotaExceeded(String),

    /// The key-value store failed for a reason other than quota.
    StoreError(String),

    /// Serialization failed when converting a value to JSON.
    SerializationError(String),

    /// Deserialization failed when reading JSON from a response or the store.
    DeserializationError(String),

    /// Input rejected before any I/O happened.
    ValidationError(String),

    /// Session token could not be decoded.
    InvalidToken(String),

    /// Generic error with custom message.
    Other(String),
}

impl Error {
    /// True for errors that mean "nothing there" rather than "something broke".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_)) || matches!(self, Error::ApiError { status: 404, .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConfigError(msg) => write!(f, "Config error: {}", msg),
            Error::NotFound(msg) => write!(f, "Not found: {}", msg),
            Error::NetworkError(msg) => write!(f, "Network error: {}", msg),
            Error::ApiError { status, message } => {
                write!(f, "API error ({}): {}", status, message)
            }
            Error::QuotaExceeded(msg) => write!(f, "Storage quota exceeded: {}", msg),
            Error::StoreError(msg) => write!(f, "Store error: {}", msg),
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Error::DeserializationError(msg) => write!(f, "Deserialization error: {}", msg),
            Error::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Error::InvalidToken(msg) => write!(f, "Invalid token: {}", msg),
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            Error::StoreError(e.to_string())
        } else if e.is_syntax() || e.is_data() || e.is_eof() {
            Error::DeserializationError(e.to_string())
        } else {
            Error::SerializationError(e.to_string())
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Error::DeserializationError(e.to_string())
        } else {
            Error::NetworkError(e.to_string())
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::StoreError(e.to_string())
    }
}

impl From<String> for Error {
    fn from(e: String) -> Self {
        Error::Other(e)
    }
}

impl From<&str> for Error {
    fn from(e: &str) -> Self {
        Error::Other(e.to_string())
    }
}

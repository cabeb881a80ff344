//! Error types for AI provider operations.

use std::fmt;

/// Provider-agnostic error. Implementations map their native failures onto these
/// variants so callers never need to know which vendor answered.
#[derive(Debug)]
pub enum Error {
    /// The API key was missing, invalid, or lacks permission.
    Authentication(String),

    /// Connection, DNS or TLS failure. Usually transient.
    Network(String),

    /// A required setting (API key, base URL, model name) is absent or malformed.
    Configuration(String),

    /// The provider answered with an error status or refused the request.
    Provider(String),

    /// The request took longer than the client allowed.
    Timeout(String),

    /// Provider rate limit exceeded. Wait before retrying.
    RateLimited { retry_after_seconds: u64 },

    /// The provider's response body could not be parsed.
    Deserialization(String),

    /// Catch-all for errors that don't fit other categories.
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Authentication(msg) => write!(f, "Authentication failed: {}", msg),
            Error::Network(msg) => write!(f, "Network error: {}", msg),
            Error::Configuration(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::Provider(msg) => write!(f, "Provider error: {}", msg),
            Error::Timeout(msg) => write!(f, "Timeout: {}", msg),
            Error::RateLimited {
                retry_after_seconds,
            } => {
                write!(f, "Rate limited: retry after {}s", retry_after_seconds)
            }
            Error::Deserialization(msg) => write!(f, "Deserialization error: {}", msg),
            Error::Other(err) => write!(f, "Other error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Deserialization(err.to_string())
    }
}

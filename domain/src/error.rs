//! Error types for the `domain` layer.
use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. The intent is to translate errors between layers while maintaining
/// layer boundaries. Ex. `domain` is dependent on `entity_api`, and `web` is dependent on `domain`.
/// but `web` should not be dependent, directly, on `entity_api`. Ultimately the various
/// `error_kind`s are used by `web` to return appropriate HTTP status codes and messages to the client.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
    /// Problems with what the caller asked for. The message is safe to show to the client.
    Request(RequestErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
    /// A setting needed for this operation (usually an API key) is missing.
    Config(String),
    Other(String),
}

/// Enum representing the various kinds of entity errors that can bubble up from the "Entity" layer (`entity_api` and `entity`).
/// These errors are translated from the `entity_api` layer to the `domain` layer and reduced to a subset of error kinds
/// that are relevant to the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    NotFound,
    Invalid,
    Unauthenticated,
    Duplicate,
    DbTransaction,
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    /// An AI, image or media tool answered with something unusable.
    Provider(String),
    Other(String),
}

#[derive(Debug, PartialEq)]
pub enum RequestErrorKind {
    Invalid(String),
    Unauthenticated(String),
    Forbidden(String),
    NotFound(String),
}

impl Error {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::request(RequestErrorKind::Invalid(message.into()))
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::request(RequestErrorKind::Unauthenticated(message.into()))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::request(RequestErrorKind::Forbidden(message.into()))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::request(RequestErrorKind::NotFound(message.into()))
    }

    pub fn config(setting: impl Into<String>) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config(setting.into())),
        }
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Provider(message.into())),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(message.into())),
        }
    }

    fn request(kind: RequestErrorKind) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Request(kind),
        }
    }

    /// Message that is safe to show to API clients.
    pub fn client_message(&self) -> String {
        match &self.error_kind {
            DomainErrorKind::Request(
                RequestErrorKind::Invalid(msg)
                | RequestErrorKind::Unauthenticated(msg)
                | RequestErrorKind::Forbidden(msg)
                | RequestErrorKind::NotFound(msg),
            ) => msg.clone(),
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::NotFound)) => {
                "Not found".to_string()
            }
            DomainErrorKind::Internal(InternalErrorKind::Config(setting)) => {
                format!("{setting} is not configured")
            }
            DomainErrorKind::External(ExternalErrorKind::Network) => {
                "An external service could not be reached".to_string()
            }
            DomainErrorKind::External(ExternalErrorKind::Provider(msg))
            | DomainErrorKind::External(ExternalErrorKind::Other(msg)) => msg.clone(),
            DomainErrorKind::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// True when the error means the looked-up record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::NotFound))
                | DomainErrorKind::Request(RequestErrorKind::NotFound(_))
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "Domain Error: {:?}: {source}", self.error_kind),
            None => write!(f, "Domain Error: {:?}", self.error_kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `entity_api` layer to the `domain` layer.
impl From<EntityApiError> for Error {
    fn from(err: EntityApiError) -> Self {
        let entity_error_kind = match err.error_kind {
            EntityApiErrorKind::RecordNotFound => EntityErrorKind::NotFound,
            EntityApiErrorKind::RecordUnauthenticated => EntityErrorKind::Unauthenticated,
            EntityApiErrorKind::DuplicateRecord => EntityErrorKind::Duplicate,
            EntityApiErrorKind::RecordNotUpdated => EntityErrorKind::Invalid,
            EntityApiErrorKind::SystemError => EntityErrorKind::DbTransaction,
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(entity_error_kind)),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the reqwest::Client instance. This
        // type of error will occur prior to any network calls being made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build reqwest client".to_string(),
                )),
            }
        // Errors that result from issues with the network call itself.
        } else {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        }
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "JWT encoding related error".to_string(),
            )),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "Filesystem or process I/O failed".to_string(),
            )),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "JSON serialization failed".to_string(),
            )),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "Zip archive error".to_string(),
            )),
        }
    }
}

impl From<study_ai::Error> for Error {
    fn from(err: study_ai::Error) -> Self {
        let error_kind = match &err {
            study_ai::Error::Network(_) | study_ai::Error::Timeout(_) => {
                DomainErrorKind::External(ExternalErrorKind::Network)
            }
            study_ai::Error::Configuration(msg) => {
                DomainErrorKind::Internal(InternalErrorKind::Config(msg.clone()))
            }
            _ => DomainErrorKind::External(ExternalErrorKind::Provider(err.to_string())),
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

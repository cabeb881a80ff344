//! Error types for entity API
use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;

use sea_orm::error::DbErr;

/// Errors while executing operations related to entities.
/// The intent is to categorize errors into two major types:
///  * Errors related to data. Ex DbError::RecordNotFound
///  * Errors related to interactions with the database itself. Ex DbError::Conn
#[derive(Debug, PartialEq)]
pub struct Error {
    // Underlying error emitted from seaORM internals
    pub source: Option<DbErr>,
    // Enum representing which category of error
    pub error_kind: EntityApiErrorKind,
}

#[derive(Debug, PartialEq, Serialize)]
pub enum EntityApiErrorKind {
    // Record not found
    RecordNotFound,
    // Record not updated
    RecordNotUpdated,
    // Credentials did not match the stored record
    RecordUnauthenticated,
    // A unique constraint (e.g. user email) rejected the write
    DuplicateRecord,
    // Errors related to interactions with the database itself. Ex DbError::Conn
    SystemError,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "Entity API Error: {:?} ({source})", self.error_kind),
            None => write!(f, "Entity API Error: {:?}", self.error_kind),
        }
    }
}

impl StdError for Error {}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        let error_kind = match &err {
            DbErr::RecordNotFound(_) => EntityApiErrorKind::RecordNotFound,
            DbErr::RecordNotUpdated => EntityApiErrorKind::RecordNotUpdated,
            _ if matches!(err.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_))) => {
                EntityApiErrorKind::DuplicateRecord
            }
            _ => EntityApiErrorKind::SystemError,
        };

        Error {
            source: Some(err),
            error_kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_not_found_maps_to_its_kind() {
        let error: Error = DbErr::RecordNotFound("contents".to_string()).into();
        assert_eq!(error.error_kind, EntityApiErrorKind::RecordNotFound);
    }

    #[test]
    fn connection_problems_are_system_errors() {
        let error: Error = DbErr::Custom("pool closed".to_string()).into();
        assert_eq!(error.error_kind, EntityApiErrorKind::SystemError);
        assert!(error.to_string().contains("pool closed"));
    }
}

use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use domain::error::{
    DomainErrorKind, EntityErrorKind, Error as DomainError, ExternalErrorKind, InternalErrorKind,
    RequestErrorKind,
};

use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

impl Error {
    pub(crate) fn status_code(&self) -> StatusCode {
        match &self.0.error_kind {
            DomainErrorKind::Request(request_error_kind) => match request_error_kind {
                RequestErrorKind::Invalid(_) => StatusCode::BAD_REQUEST,
                RequestErrorKind::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
                RequestErrorKind::Forbidden(_) => StatusCode::FORBIDDEN,
                RequestErrorKind::NotFound(_) => StatusCode::NOT_FOUND,
            },
            DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
                InternalErrorKind::Entity(entity_error_kind) => match entity_error_kind {
                    EntityErrorKind::NotFound => StatusCode::NOT_FOUND,
                    EntityErrorKind::Invalid | EntityErrorKind::Duplicate => {
                        StatusCode::BAD_REQUEST
                    }
                    EntityErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
                    EntityErrorKind::DbTransaction | EntityErrorKind::Other(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                },
                InternalErrorKind::Config(_) | InternalErrorKind::Other(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            DomainErrorKind::External(external_error_kind) => match external_error_kind {
                ExternalErrorKind::Network | ExternalErrorKind::Provider(_) => {
                    StatusCode::BAD_GATEWAY
                }
                ExternalErrorKind::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = self.0.client_message();

        if status.is_server_error() {
            error!("{status}: {}", self.0);
        } else {
            warn!("{status}: {}", self.0);
        }

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_of(err: Error) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn request_errors_keep_their_message() {
        let (status, body) = body_of(DomainError::forbidden("Access denied").into()).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({"detail": "Access denied"}));
    }

    #[tokio::test]
    async fn missing_settings_are_server_errors() {
        let (status, body) = body_of(DomainError::config("GROQ_API_KEY").into()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "GROQ_API_KEY is not configured");
    }

    #[tokio::test]
    async fn provider_failures_are_bad_gateway() {
        let (status, body) =
            body_of(DomainError::provider("Failed to generate presentation structure").into())
                .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["detail"], "Failed to generate presentation structure");
    }

    #[test]
    fn status_codes_follow_the_error_kind() {
        let cases = [
            (DomainError::invalid("No input provided"), StatusCode::BAD_REQUEST),
            (
                DomainError::unauthenticated("Invalid credentials"),
                StatusCode::UNAUTHORIZED,
            ),
            (
                DomainError::not_found("Content not found"),
                StatusCode::NOT_FOUND,
            ),
            (
                DomainError::internal("boom"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(Error::from(err).status_code(), expected);
        }
    }

    #[tokio::test]
    async fn internal_details_stay_in_the_log() {
        let (_, body) = body_of(DomainError::internal("connection pool exhausted").into()).await;

        assert_eq!(body["detail"], "Internal server error");
    }
}

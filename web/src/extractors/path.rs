use crate::Error;
use axum::{
    async_trait,
    extract::{FromRequestParts, Path as AxumPath},
    http::request::Parts,
};
use domain::error::Error as DomainError;
use log::*;
use serde::de::DeserializeOwned;

/// `axum::extract::Path` whose rejection is reported as a regular `{"detail"}` error.
pub(crate) struct Path<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AxumPath::<T>::from_request_parts(parts, state).await {
            Ok(AxumPath(value)) => Ok(Path(value)),
            Err(rejection) => {
                debug!("Rejected path {}: {rejection}", parts.uri.path());
                Err(DomainError::invalid(rejection.body_text()).into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use domain::Id;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new().route(
            "/items/:id",
            get(|Path(id): Path<Id>| async move { id.to_string() }),
        )
    }

    #[tokio::test]
    async fn malformed_ids_are_reported_as_json_errors() {
        let request = Request::builder()
            .uri("/items/not-a-uuid")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["detail"].as_str().is_some_and(|detail| !detail.is_empty()));
    }

    #[tokio::test]
    async fn well_formed_ids_are_extracted() {
        let id = Id::new_v4();
        let request = Request::builder()
            .uri(format!("/items/{id}"))
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(bytes, id.to_string().as_bytes());
    }
}

use crate::middleware::auth::INVALID_CREDENTIALS;
use crate::Error;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::error::Error as DomainError;
use domain::users;

pub(crate) struct AuthenticatedUser(pub users::Model);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    // The user is put in place by the `require_auth` middleware. A handler mounted
    // without that middleware always rejects.
    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<users::Model>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or_else(|| DomainError::unauthenticated(INVALID_CREDENTIALS).into())
    }
}

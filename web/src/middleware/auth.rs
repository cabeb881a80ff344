use crate::{AppState, Error};
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use domain::error::Error as DomainError;
use domain::user as UserApi;
use log::*;

pub(crate) const INVALID_CREDENTIALS: &str = "Invalid authentication credentials";

/// The token of an `Authorization: Bearer <token>` header, if there is one.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

/// Authentication middleware for bearer tokens.
///
/// Resolves the token to a user and stores it in the request extensions, where
/// the `AuthenticatedUser` extractor picks it up. Every failure is a 401.
pub async fn require_auth(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Error> {
    let token = bearer_token(request.headers()).ok_or_else(|| {
        trace!("Request without a bearer token");
        DomainError::unauthenticated(INVALID_CREDENTIALS)
    })?;

    let user =
        UserApi::authenticate_token(app_state.db_conn_ref(), &app_state.config, &token).await?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

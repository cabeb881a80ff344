//! Issuing and validating the HS256 bearer tokens used for API authentication.
//!
//! Tokens are signed with `Config::jwt_secret` and expire after
//! `Config::jwt_expiration_minutes`.

use crate::error::Error;
use chrono::{Duration, Utc};
use entity::access_token::AccessToken;
use entity::users;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use service::config::Config;

pub use claims::AccessClaims;

mod claims;

/// Signs a fresh access token for `user`.
pub fn issue_access_token(config: &Config, user: &users::Model) -> Result<AccessToken, Error> {
    let now = Utc::now();
    let expires_at = now + Duration::minutes(config.jwt_expiration_minutes);

    let claims = AccessClaims {
        user_id: user.id,
        email: user.email.clone(),
        exp: expires_at.timestamp().max(0) as usize,
        iat: now.timestamp().max(0) as usize,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret().as_bytes()),
    )?;

    Ok(AccessToken::bearer(token))
}

/// Checks the signature and expiry of `token` and returns its claims.
///
/// Every failure is reported the same way so callers cannot tell a forged token
/// from an expired one.
pub fn validate_access_token(config: &Config, token: &str) -> Result<AccessClaims, Error> {
    let validation = Validation::new(Algorithm::HS256);

    decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret().as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|err| {
        debug!("Rejected access token: {err}");
        Error::unauthenticated("Invalid authentication credentials")
    })
}

//! Claims carried by the bearer tokens issued at login.

use entity::Id;
use serde::{Deserialize, Serialize};

/// Payload of an access token.
///
/// `exp` and `iat` are seconds since the Unix epoch, as `jsonwebtoken` expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub user_id: Id,
    pub email: String,
    pub exp: usize,
    pub iat: usize,
}

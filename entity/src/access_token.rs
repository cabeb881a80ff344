use serde::Serialize;
use utoipa::ToSchema;

/// A signed bearer token handed to a client after a successful login.
/// Note: This struct does not have a corresponding entity in the database.
#[derive(Serialize, Debug, Clone, PartialEq, ToSchema)]
#[schema(as = access_token::AccessToken)]
pub struct AccessToken {
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
}

impl AccessToken {
    pub fn bearer(token: String) -> Self {
        Self {
            access_token: token,
            token_type: "bearer".to_string(),
        }
    }
}

use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::params::auth::{LoginParams, SignupParams};
use crate::response::{CurrentUser, MessageResponse};
use crate::{AppState, Error};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use domain::user as UserApi;
use log::*;

/// POST register a new account
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupParams,
    responses(
        (status = 200, description = "Account created"),
        (status = 400, description = "Missing fields or email already registered"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn signup(
    State(app_state): State<AppState>,
    Json(params): Json<SignupParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST signup");

    UserApi::signup(
        app_state.db_conn_ref(),
        &params.name,
        &params.email,
        &params.password,
    )
    .await?;

    Ok(Json(MessageResponse {
        message: "User created successfully",
    }))
}

/// Exchanges an email and password for a bearer token.
///
/// Pass the token back on every other call, e.g.:
/// curl --header "Authorization: Bearer <access_token>" http://localhost:8000/content/history
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginParams,
    responses(
        (status = 200, description = "Logged in", body = domain::access_token::AccessToken),
        (status = 401, description = "Invalid credentials"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(params): Json<LoginParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST login");

    let token = UserApi::login(
        app_state.db_conn_ref(),
        &app_state.config,
        &params.email,
        &params.password,
    )
    .await?;

    Ok(Json(token))
}

/// GET the user the bearer token belongs to
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "The authenticated user"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me(AuthenticatedUser(user): AuthenticatedUser) -> impl IntoResponse {
    Json(CurrentUser::from(user))
}

use crate::controller::ApiResponse;
use crate::extractors::{authenticated_user::AuthenticatedUser, path::Path};
use crate::{AppState, Error};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::transcription as TranscriptionApi;
use domain::Id;
use log::*;

/// GET the user's transcriptions, newest first
#[utoipa::path(
    get,
    path = "/transcriptions",
    responses(
        (status = 200, description = "Transcriptions", body = [domain::transcriptions::Model]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn index(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET transcriptions of user {}", user.id);

    let transcriptions = TranscriptionApi::list(app_state.db_conn_ref(), user.id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), transcriptions)))
}

/// GET one transcription
#[utoipa::path(
    get,
    path = "/transcriptions/{id}",
    params(
        ("id" = String, Path, format = Uuid, description = "Transcription id")
    ),
    responses(
        (status = 200, description = "The transcription", body = domain::transcriptions::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Transcription not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn read(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET transcription {id}");

    let transcription = TranscriptionApi::find(app_state.db_conn_ref(), id, user.id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), transcription)))
}

/// DELETE a transcription
#[utoipa::path(
    delete,
    path = "/transcriptions/{id}",
    params(
        ("id" = String, Path, format = Uuid, description = "Transcription id")
    ),
    responses(
        (status = 200, description = "Transcription deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Transcription not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE transcription {id}");

    TranscriptionApi::delete(app_state.db_conn_ref(), id, user.id).await?;

    Ok(Json(ApiResponse::<()>::no_content(
        StatusCode::NO_CONTENT.into(),
    )))
}

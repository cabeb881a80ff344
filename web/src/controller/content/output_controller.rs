use crate::controller::ApiResponse;
use crate::extractors::{authenticated_user::AuthenticatedUser, form_data::FormData, path::Path};
use crate::{AppState, Error};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::generated_output::{self as GeneratedOutputApi, ScoreSubmission};
use domain::Id;
use log::*;

/// GET a generated output with its full payload
#[utoipa::path(
    get,
    path = "/content/output/{id}",
    params(
        ("id" = String, Path, format = Uuid, description = "Output id")
    ),
    responses(
        (status = 200, description = "The output", body = domain::generated_outputs::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Output not found")
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
    debug!("GET output {id}");

    let output = GeneratedOutputApi::find_owned(app_state.db_conn_ref(), id, user.id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), output)))
}

/// DELETE a generated output
#[utoipa::path(
    delete,
    path = "/content/output/{id}",
    params(
        ("id" = String, Path, format = Uuid, description = "Output id")
    ),
    responses(
        (status = 200, description = "Output deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Output not found")
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
    debug!("DELETE output {id}");

    GeneratedOutputApi::delete(app_state.db_conn_ref(), id, user.id).await?;

    Ok(Json(ApiResponse::<()>::no_content(
        StatusCode::NO_CONTENT.into(),
    )))
}

/// POST a self-reported score for a quiz output
#[utoipa::path(
    post,
    path = "/content/output/{id}/score",
    params(
        ("id" = String, Path, format = Uuid, description = "Quiz output id")
    ),
    request_body(content_type = "multipart/form-data", description = "`score`, `total`, `percentage`, optional `user_answers` JSON"),
    responses(
        (status = 200, description = "The scored output", body = domain::generated_outputs::Model),
        (status = 400, description = "Missing fields or not a quiz"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Output not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn score(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    form: FormData,
) -> Result<impl IntoResponse, Error> {
    let submission = ScoreSubmission::try_from(form)?;
    debug!(
        "POST score {}/{} for output {id}",
        submission.score, submission.total
    );

    let output =
        GeneratedOutputApi::record_score(app_state.db_conn_ref(), id, user.id, submission).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), output)))
}

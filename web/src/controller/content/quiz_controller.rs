use crate::controller::ApiResponse;
use crate::extractors::{authenticated_user::AuthenticatedUser, form_data::FormData};
use crate::params::content::AttemptsParams;
use crate::params::generation::QuizParams;
use crate::{AppState, Error};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::gateway;
use domain::quiz as QuizApi;
use domain::quiz_attempt::{self as QuizAttemptApi, EvaluationRequest};
use log::*;

/// POST generate a multiple-choice quiz from a content record
#[utoipa::path(
    post,
    path = "/content/quiz",
    request_body(content_type = "multipart/form-data", description = "`content_id`, optional `number_of_questions` (1 to 50, default 10), `difficulty` and `mode`"),
    responses(
        (status = 200, description = "`{content_id, quiz: {questions}, output_id}`"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Content not found"),
        (status = 502, description = "The language model failed")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    form: FormData,
) -> Result<impl IntoResponse, Error> {
    let params = QuizParams::try_from(form)?;
    debug!("POST quiz: {params:?}");

    let provider = gateway::openrouter_chat(&app_state.config)?;
    let quiz = QuizApi::create(
        app_state.db_conn_ref(),
        &app_state.config,
        &provider,
        user.id,
        params.content_id,
        params.options,
    )
    .await?;

    Ok(Json(quiz))
}

/// POST grade answers to a stored quiz and record the attempt
#[utoipa::path(
    post,
    path = "/content/quiz/evaluate",
    request_body(content_type = "application/json", description = "`{quiz_id, mode, responses: [{question_id, selected_option}]}`"),
    responses(
        (status = 200, description = "Per-question results, score and completion message"),
        (status = 400, description = "The output is not a quiz"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Output not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn evaluate(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Json(request): Json<EvaluationRequest>,
) -> Result<impl IntoResponse, Error> {
    debug!(
        "POST evaluate quiz {} with {} responses",
        request.quiz_id,
        request.responses.len()
    );

    let evaluation = QuizAttemptApi::evaluate(app_state.db_conn_ref(), user.id, request).await?;

    Ok(Json(evaluation))
}

/// GET the user's quiz attempts, newest first
#[utoipa::path(
    get,
    path = "/content/quiz/attempts",
    params(AttemptsParams),
    responses(
        (status = 200, description = "Quiz attempts", body = [domain::quiz_attempts::Model]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn attempts(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Query(params): Query<AttemptsParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET quiz attempts: {params:?}");

    let attempts =
        QuizAttemptApi::list(app_state.db_conn_ref(), user.id, params.content_id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), attempts)))
}

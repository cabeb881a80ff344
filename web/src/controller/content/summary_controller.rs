use crate::extractors::{authenticated_user::AuthenticatedUser, form_data::FormData};
use crate::params::generation::SummaryParams;
use crate::{AppState, Error};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use domain::gateway;
use domain::summary as SummaryApi;
use log::*;

/// POST summarize a content record
#[utoipa::path(
    post,
    path = "/content/summary",
    request_body(content_type = "multipart/form-data", description = "`content_id`, optional `summary_type` (brief | detailed | exam, default detailed)"),
    responses(
        (status = 200, description = "`{content_id, summary, summary_type, output_id}`"),
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
    let params = SummaryParams::try_from(form)?;
    debug!("POST summary: {params:?}");

    let provider = gateway::groq_chat(&app_state.config)?;
    let summary = SummaryApi::create(
        app_state.db_conn_ref(),
        &app_state.config,
        &provider,
        user.id,
        params.content_id,
        params.summary_type,
    )
    .await?;

    Ok(Json(summary))
}

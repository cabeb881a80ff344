use crate::extractors::{authenticated_user::AuthenticatedUser, form_data::FormData};
use crate::params::generation::ChatParams;
use crate::{AppState, Error};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use domain::chat as ChatApi;
use domain::gateway;
use log::*;

/// POST ask a question about a content record.
///
/// When `chat_history` is omitted the stored conversation for the content record is used.
#[utoipa::path(
    post,
    path = "/content/chat",
    request_body(content_type = "multipart/form-data", description = "`content_id`, `question` (or `user_question`), optional `chat_history` JSON array of `{role, content}`"),
    responses(
        (status = 200, description = "`{content_id, question, answer, output_id}`"),
        (status = 400, description = "Empty question or malformed history"),
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
    let params = ChatParams::try_from(form)?;
    debug!(
        "POST chat about content {} with {} history messages",
        params.content_id,
        params.chat_history.as_ref().map_or(0, Vec::len)
    );

    let provider = gateway::groq_chat(&app_state.config)?;
    let answer = ChatApi::ask(
        app_state.db_conn_ref(),
        &app_state.config,
        &provider,
        user.id,
        params.content_id,
        &params.question,
        params.chat_history,
    )
    .await?;

    Ok(Json(answer))
}

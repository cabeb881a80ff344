use crate::extractors::{authenticated_user::AuthenticatedUser, form_data::FormData};
use crate::params::generation::FlashcardParams;
use crate::{AppState, Error};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use domain::flashcards as FlashcardsApi;
use domain::gateway;
use log::*;

/// POST generate flashcards from a content record
#[utoipa::path(
    post,
    path = "/content/flashcards",
    request_body(content_type = "multipart/form-data", description = "`content_id`, optional `flashcard_type` and `number_of_cards` (5 to 20, default 10)"),
    responses(
        (status = 200, description = "`{content_id, flashcards, output_id}`"),
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
    let params = FlashcardParams::try_from(form)?;
    debug!("POST flashcards: {params:?}");

    let provider = gateway::openrouter_chat(&app_state.config)?;
    let flashcards = FlashcardsApi::create(
        app_state.db_conn_ref(),
        &app_state.config,
        &provider,
        user.id,
        params.content_id,
        params.options,
    )
    .await?;

    Ok(Json(flashcards))
}

use crate::extractors::{authenticated_user::AuthenticatedUser, form_data::FormData};
use crate::{AppState, Error};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use domain::content::UploadedFile;
use domain::error::Error as DomainError;
use domain::gateway;
use domain::transcription as TranscriptionApi;
use log::*;

pub(crate) fn required_file(form: FormData) -> Result<UploadedFile, Error> {
    form.file
        .filter(|file| !file.file_name.trim().is_empty())
        .ok_or_else(|| DomainError::invalid("file is required").into())
}

/// POST transcribe an audio or video file
#[utoipa::path(
    post,
    path = "/audio/transcribe",
    request_body(content_type = "multipart/form-data", description = "`file`: mp3, wav, m4a, flac, ogg, aac or a video"),
    responses(
        (status = 200, description = "`{transcript, filename, transcription_id}`"),
        (status = 400, description = "Unsupported file format"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Speech-to-text failed")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn transcribe(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    form: FormData,
) -> Result<impl IntoResponse, Error> {
    let file = required_file(form)?;
    debug!("POST audio transcribe {} ({} bytes)", file.file_name, file.bytes.len());

    let transcriber = gateway::groq_whisper(&app_state.config)?;
    let result = TranscriptionApi::transcribe_media(
        app_state.db_conn_ref(),
        &app_state.config,
        &transcriber,
        user.id,
        &file,
    )
    .await?;

    Ok(Json(result))
}

/// POST transcribe an audio or video file, then summarize the transcript
#[utoipa::path(
    post,
    path = "/audio/transcribe-and-summarize",
    request_body(content_type = "multipart/form-data", description = "`file`: mp3, wav, m4a, flac, ogg, aac or a video"),
    responses(
        (status = 200, description = "`{transcript, summary, filename, transcription_id}`"),
        (status = 400, description = "Unsupported file format"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Speech-to-text or the language model failed")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn transcribe_and_summarize(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    form: FormData,
) -> Result<impl IntoResponse, Error> {
    let file = required_file(form)?;
    debug!(
        "POST audio transcribe-and-summarize {} ({} bytes)",
        file.file_name,
        file.bytes.len()
    );

    let transcriber = gateway::groq_whisper(&app_state.config)?;
    let provider = gateway::groq_chat(&app_state.config)?;
    let result = TranscriptionApi::transcribe_and_summarize(
        app_state.db_conn_ref(),
        &app_state.config,
        &transcriber,
        &provider,
        user.id,
        &file,
    )
    .await?;

    Ok(Json(result))
}

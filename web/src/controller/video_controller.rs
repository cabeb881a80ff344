use crate::controller::audio_controller::required_file;
use crate::extractors::{authenticated_user::AuthenticatedUser, form_data::FormData};
use crate::response::VideoTranscript;
use crate::{AppState, Error};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use domain::gateway;
use domain::transcription as TranscriptionApi;
use log::*;

/// POST transcribe the audio track of a video file
#[utoipa::path(
    post,
    path = "/video/transcribe",
    request_body(content_type = "multipart/form-data", description = "`file`: mp4, avi, mov, mkv, flv or wmv"),
    responses(
        (status = 200, description = "`{transcript, transcription_id}`"),
        (status = 400, description = "Not a video file"),
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
    debug!("POST video transcribe {} ({} bytes)", file.file_name, file.bytes.len());

    let transcriber = gateway::groq_whisper(&app_state.config)?;
    let result = TranscriptionApi::transcribe_video_file(
        app_state.db_conn_ref(),
        &app_state.config,
        &transcriber,
        user.id,
        &file,
    )
    .await?;

    Ok(Json(VideoTranscript {
        transcript: result.transcript,
        transcription_id: result.transcription_id,
    }))
}

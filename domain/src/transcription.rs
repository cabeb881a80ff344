//! Speech-to-text for uploaded audio and video files, with a per-user record of
//! every transcript produced.

use crate::content::normalize::{transcribe_audio, transcribe_video, UploadedFile};
use crate::error::Error;
use crate::gateway::media;
use crate::summary;
use crate::text_processing::clean_text;
use crate::transcriptions;
use entity::media_kind::MediaKind;
use entity::Id;
use log::*;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use service::config::Config;
use study_ai::traits::{chat, transcription};

const UNSUPPORTED_MEDIA: &str = "Unsupported file format. Please upload audio or video file.";
const UNSUPPORTED_VIDEO: &str = "Unsupported file format. Please upload a video file.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptionResult {
    pub transcript: String,
    pub filename: String,
    pub transcription_id: Id,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummarizedTranscription {
    pub transcript: String,
    pub summary: String,
    pub filename: String,
    pub transcription_id: Id,
}

async fn transcribe_file(
    config: &Config,
    transcriber: &dyn transcription::Provider,
    file: &UploadedFile,
    accept_audio: bool,
) -> Result<(MediaKind, String), Error> {
    if media::is_video(&file.file_name) {
        let transcript = transcribe_video(config, transcriber, file).await?;
        Ok((MediaKind::Video, clean_text(&transcript)))
    } else if accept_audio && media::is_audio(&file.file_name) {
        let transcript = transcribe_audio(config, transcriber, file).await?;
        Ok((MediaKind::Audio, transcript.trim().to_string()))
    } else if accept_audio {
        Err(Error::invalid(UNSUPPORTED_MEDIA))
    } else {
        Err(Error::invalid(UNSUPPORTED_VIDEO))
    }
}

async fn transcribe_and_store(
    db: &DatabaseConnection,
    config: &Config,
    transcriber: &dyn transcription::Provider,
    user_id: Id,
    file: &UploadedFile,
    accept_audio: bool,
) -> Result<TranscriptionResult, Error> {
    let (kind, transcript) = transcribe_file(config, transcriber, file, accept_audio).await?;
    let record = entity_api::transcription::create(
        db,
        user_id,
        file.file_name.clone(),
        kind,
        transcript.clone(),
    )
    .await?;
    info!(
        "Transcribed {kind} file {} for user {user_id} ({} chars)",
        file.file_name,
        transcript.len()
    );

    Ok(TranscriptionResult {
        transcript,
        filename: file.file_name.clone(),
        transcription_id: record.id,
    })
}

/// Transcribes an audio or video file.
pub async fn transcribe_media(
    db: &DatabaseConnection,
    config: &Config,
    transcriber: &dyn transcription::Provider,
    user_id: Id,
    file: &UploadedFile,
) -> Result<TranscriptionResult, Error> {
    transcribe_and_store(db, config, transcriber, user_id, file, true).await
}

/// Transcribes a video file. Audio files are rejected.
pub async fn transcribe_video_file(
    db: &DatabaseConnection,
    config: &Config,
    transcriber: &dyn transcription::Provider,
    user_id: Id,
    file: &UploadedFile,
) -> Result<TranscriptionResult, Error> {
    transcribe_and_store(db, config, transcriber, user_id, file, false).await
}

/// Transcribes an audio or video file and summarizes the transcript in detail.
pub async fn transcribe_and_summarize(
    db: &DatabaseConnection,
    config: &Config,
    transcriber: &dyn transcription::Provider,
    provider: &dyn chat::Provider,
    user_id: Id,
    file: &UploadedFile,
) -> Result<SummarizedTranscription, Error> {
    let result = transcribe_media(db, config, transcriber, user_id, file).await?;
    let summary = summary::generate_summary(
        provider,
        config.fast_model(),
        &result.transcript,
        summary::DEFAULT_SUMMARY_TYPE,
    )
    .await?;

    Ok(SummarizedTranscription {
        transcript: result.transcript,
        summary,
        filename: result.filename,
        transcription_id: result.transcription_id,
    })
}

/// A user's transcriptions, newest first.
pub async fn list(
    db: &DatabaseConnection,
    user_id: Id,
) -> Result<Vec<transcriptions::Model>, Error> {
    Ok(entity_api::transcription::find_by_user(db, user_id).await?)
}

pub async fn find(
    db: &DatabaseConnection,
    id: Id,
    user_id: Id,
) -> Result<transcriptions::Model, Error> {
    entity_api::transcription::find_by_id_and_user(db, id, user_id)
        .await
        .map_err(|e| not_found_as_request(e.into()))
}

pub async fn delete(db: &DatabaseConnection, id: Id, user_id: Id) -> Result<(), Error> {
    entity_api::transcription::delete_by_id_and_user(db, id, user_id)
        .await
        .map_err(|e| not_found_as_request(e.into()))
}

fn not_found_as_request(err: Error) -> Error {
    if err.is_not_found() {
        Error::not_found("Transcription not found")
    } else {
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, RequestErrorKind};
    use crate::test_utils::MockTranscriber;

    fn config(temp: &std::path::Path) -> Config {
        Config::from_args(["edugen", "--temp-dir", temp.to_str().unwrap()])
    }

    fn upload(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            bytes: b"fake media".to_vec(),
        }
    }

    #[tokio::test]
    async fn unsupported_files_are_rejected_before_transcribing() {
        let temp = tempfile::tempdir().unwrap();
        let transcriber = MockTranscriber::new();

        let err = transcribe_file(&config(temp.path()), &transcriber, &upload("notes.txt"), true)
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Request(RequestErrorKind::Invalid(UNSUPPORTED_MEDIA.to_string()))
        );
    }

    #[tokio::test]
    async fn the_video_route_rejects_audio() {
        let temp = tempfile::tempdir().unwrap();
        let transcriber = MockTranscriber::new();

        let err = transcribe_file(&config(temp.path()), &transcriber, &upload("talk.mp3"), false)
            .await
            .unwrap_err();

        assert_eq!(err.client_message(), UNSUPPORTED_VIDEO);
    }

    #[tokio::test]
    async fn audio_transcripts_are_trimmed() {
        let temp = tempfile::tempdir().unwrap();
        let mut transcriber = MockTranscriber::new();
        transcriber
            .expect_transcribe()
            .withf(|audio| audio.file_name == "input.mp3")
            .returning(|_| Ok("  hello class \n".to_string()));

        let (kind, transcript) =
            transcribe_file(&config(temp.path()), &transcriber, &upload("talk.MP3"), true)
                .await
                .unwrap();

        assert_eq!(kind, MediaKind::Audio);
        assert_eq!(transcript, "hello class");
    }
}

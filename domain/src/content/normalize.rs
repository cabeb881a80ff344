//! Turns an upload (file, YouTube link or pasted text) into normalized plain text.

use super::extract;
use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use crate::gateway::media;
use crate::text_processing::clean_text;
use entity::input_type::InputType;
use entity::Id;
use log::*;
use serde::Serialize;
use service::config::Config;
use study_ai::traits::transcription;
use study_ai::types::transcription::AudioInput;
use tempfile::TempDir;

/// A file received in a multipart upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// The raw inputs of an upload. Exactly one of them must be present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentInput {
    pub file: Option<UploadedFile>,
    pub youtube_url: Option<String>,
    pub text: Option<String>,
}

impl ContentInput {
    /// Blank strings and nameless empty files count as absent.
    fn present(self) -> (Option<UploadedFile>, Option<String>, Option<String>) {
        let file = self
            .file
            .filter(|f| !(f.file_name.trim().is_empty() && f.bytes.is_empty()));
        let youtube_url = self
            .youtube_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        let text = self.text.filter(|t| !t.trim().is_empty());
        (file, youtube_url, text)
    }

    /// Uploaded filename or YouTube URL, kept for display.
    pub fn source_name(&self) -> Option<String> {
        match (&self.file, &self.youtube_url) {
            (Some(file), _) if !file.file_name.trim().is_empty() => Some(file.file_name.clone()),
            (_, Some(url)) if !url.trim().is_empty() => Some(url.trim().to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Received,
    Processing,
    Saving,
    Complete,
    Error,
}

/// One progress update of a streamed upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressEvent {
    pub stage: Stage,
    pub message: String,
    pub percentage: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_type: Option<InputType>,
}

impl ProgressEvent {
    pub fn new(stage: Stage, message: impl Into<String>, percentage: u8) -> Self {
        Self {
            stage,
            message: message.into(),
            percentage,
            content_id: None,
            input_type: None,
        }
    }
}

/// Receives progress updates while an upload is processed.
pub trait ProgressSink: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Discards progress, for plain request/response uploads.
impl ProgressSink for () {
    fn report(&self, _event: ProgressEvent) {}
}

impl ProgressSink for tokio::sync::mpsc::UnboundedSender<ProgressEvent> {
    fn report(&self, event: ProgressEvent) {
        if self.send(event).is_err() {
            debug!("Upload progress receiver went away");
        }
    }
}

fn scratch_dir(config: &Config) -> Result<TempDir, Error> {
    std::fs::create_dir_all(config.temp_dir())?;
    Ok(tempfile::Builder::new()
        .prefix("upload-")
        .tempdir_in(config.temp_dir())?)
}

fn require_transcriber(
    transcriber: Option<&dyn transcription::Provider>,
) -> Result<&dyn transcription::Provider, Error> {
    transcriber.ok_or_else(|| {
        warn!("Speech-to-text is needed but GROQ_API_KEY is not configured");
        Error::config("GROQ_API_KEY")
    })
}

/// Extracts the audio track of a video file and transcribes it.
pub async fn transcribe_video(
    config: &Config,
    transcriber: &dyn transcription::Provider,
    file: &UploadedFile,
) -> Result<String, Error> {
    // The scratch directory and everything in it is removed when `dir` drops
    let dir = scratch_dir(config)?;
    let video_path = dir
        .path()
        .join(format!("input{}", media::extension(&file.file_name)));
    tokio::fs::write(&video_path, &file.bytes).await?;

    let audio_path = media::extract_audio(config, &video_path).await?;
    Ok(transcriber.transcribe(AudioInput::new(audio_path)).await?)
}

/// Transcribes an uploaded audio file as is.
pub async fn transcribe_audio(
    config: &Config,
    transcriber: &dyn transcription::Provider,
    file: &UploadedFile,
) -> Result<String, Error> {
    let dir = scratch_dir(config)?;
    let audio_path = dir
        .path()
        .join(format!("input{}", media::extension(&file.file_name)));
    tokio::fs::write(&audio_path, &file.bytes).await?;

    Ok(transcriber.transcribe(AudioInput::new(audio_path)).await?)
}

async fn transcribe_youtube(
    config: &Config,
    transcriber: &dyn transcription::Provider,
    url: &str,
) -> Result<String, Error> {
    let dir = scratch_dir(config)?;
    let audio_path = media::download_youtube_audio(config, url, dir.path()).await?;
    Ok(transcriber.transcribe(AudioInput::new(audio_path)).await?)
}

async fn normalize_file(
    config: &Config,
    transcriber: Option<&dyn transcription::Provider>,
    file: UploadedFile,
) -> Result<(InputType, String), Error> {
    let ext = media::extension(&file.file_name);
    debug!("Normalizing uploaded file with extension {ext:?}");

    if media::is_video(&file.file_name) {
        let transcript = transcribe_video(config, require_transcriber(transcriber)?, &file).await?;
        return Ok((InputType::Video, clean_text(&transcript)));
    }

    match ext.as_str() {
        ".pdf" => {
            let text = extract::pdf_text(file.bytes).await?;
            if text.trim().is_empty() {
                return Err(Error::invalid(
                    "No readable text found in PDF. It may be scanned or image-based.",
                ));
            }
            Ok((InputType::Pdf, clean_text(&text)))
        }
        ".docx" | ".doc" => {
            let text = extract::docx_text(&file.bytes)?;
            if text.trim().is_empty() {
                return Err(Error::invalid("No readable text found in Word document."));
            }
            Ok((InputType::Word, clean_text(&text)))
        }
        _ => Err(Error::invalid("Unsupported file format")),
    }
}

/// Validates that exactly one input is present and normalizes it to plain text.
pub async fn process_content(
    config: &Config,
    transcriber: Option<&dyn transcription::Provider>,
    input: ContentInput,
) -> Result<(InputType, String), Error> {
    let (file, youtube_url, text) = input.present();

    let provided = [file.is_some(), youtube_url.is_some(), text.is_some()]
        .into_iter()
        .filter(|present| *present)
        .count();
    if provided == 0 {
        return Err(Error::invalid("No input provided"));
    }
    if provided > 1 {
        return Err(Error::invalid("Only one input type allowed"));
    }

    if let Some(file) = file {
        return normalize_file(config, transcriber, file).await;
    }

    if let Some(url) = youtube_url {
        let transcriber = require_transcriber(transcriber)?;
        return match transcribe_youtube(config, transcriber, &url).await {
            Ok(transcript) => Ok((InputType::Youtube, clean_text(&transcript))),
            Err(err)
                if matches!(
                    err.error_kind,
                    DomainErrorKind::Internal(InternalErrorKind::Config(_))
                ) =>
            {
                Err(err)
            }
            Err(err) => {
                warn!("YouTube ingestion failed for {url}: {err}");
                Err(Error::invalid(format!(
                    "YouTube download failed: {}",
                    err.client_message()
                )))
            }
        };
    }

    Ok((InputType::Text, clean_text(&text.unwrap_or_default())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::extract::tests::docx_with_body;
    use crate::error::RequestErrorKind;
    use crate::test_utils::MockTranscriber;
    use std::path::Path;

    fn config(temp: &Path) -> Config {
        Config::from_args([
            "edugen",
            "--temp-dir",
            temp.to_str().unwrap(),
            "--ffmpeg-path",
            "/nonexistent/ffmpeg",
            "--yt-dlp-path",
            "/nonexistent/yt-dlp",
        ])
    }

    fn invalid(message: &str) -> DomainErrorKind {
        DomainErrorKind::Request(RequestErrorKind::Invalid(message.to_string()))
    }

    fn file(name: &str, bytes: &[u8]) -> Option<UploadedFile> {
        Some(UploadedFile {
            file_name: name.to_string(),
            bytes: bytes.to_vec(),
        })
    }

    #[tokio::test]
    async fn text_is_cleaned() {
        let temp = tempfile::tempdir().unwrap();
        let input = ContentInput {
            text: Some("  Cells \n\n divide.  ".to_string()),
            ..Default::default()
        };

        let (input_type, text) = process_content(&config(temp.path()), None, input)
            .await
            .unwrap();

        assert_eq!(input_type, InputType::Text);
        assert_eq!(text, "Cells divide.");
    }

    #[tokio::test]
    async fn no_input_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let input = ContentInput {
            text: Some("   ".to_string()),
            youtube_url: Some(String::new()),
            ..Default::default()
        };

        let err = process_content(&config(temp.path()), None, input)
            .await
            .unwrap_err();

        assert_eq!(err.error_kind, invalid("No input provided"));
    }

    #[tokio::test]
    async fn two_inputs_are_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let input = ContentInput {
            text: Some("hello".to_string()),
            youtube_url: Some("https://youtu.be/abc".to_string()),
            ..Default::default()
        };

        let err = process_content(&config(temp.path()), None, input)
            .await
            .unwrap_err();

        assert_eq!(err.error_kind, invalid("Only one input type allowed"));
    }

    #[tokio::test]
    async fn unsupported_extensions_are_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let input = ContentInput {
            file: file("slides.key", b"..."),
            ..Default::default()
        };

        let err = process_content(&config(temp.path()), None, input)
            .await
            .unwrap_err();

        assert_eq!(err.error_kind, invalid("Unsupported file format"));
    }

    #[tokio::test]
    async fn word_documents_are_extracted() {
        let temp = tempfile::tempdir().unwrap();
        let docx = docx_with_body(
            "<w:p><w:r><w:t>Enzymes speed up</w:t></w:r></w:p><w:p><w:r><w:t>reactions.</w:t></w:r></w:p>",
        );
        let input = ContentInput {
            file: file("Notes.DOCX", &docx),
            ..Default::default()
        };

        let (input_type, text) = process_content(&config(temp.path()), None, input)
            .await
            .unwrap();

        assert_eq!(input_type, InputType::Word);
        assert_eq!(text, "Enzymes speed up reactions.");
    }

    #[tokio::test]
    async fn empty_word_documents_are_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let input = ContentInput {
            file: file("empty.docx", &docx_with_body("<w:p></w:p>")),
            ..Default::default()
        };

        let err = process_content(&config(temp.path()), None, input)
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            invalid("No readable text found in Word document.")
        );
    }

    #[tokio::test]
    async fn videos_need_a_transcriber() {
        let temp = tempfile::tempdir().unwrap();
        let input = ContentInput {
            file: file("lecture.mp4", b"fake"),
            ..Default::default()
        };

        let err = process_content(&config(temp.path()), None, input)
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Config("GROQ_API_KEY".to_string()))
        );
    }

    #[tokio::test]
    async fn video_scratch_files_are_removed_even_on_failure() {
        let temp = tempfile::tempdir().unwrap();
        let mut transcriber = MockTranscriber::new();
        transcriber.expect_transcribe().never();
        let input = ContentInput {
            file: file("lecture.mp4", b"fake"),
            ..Default::default()
        };

        let result = process_content(&config(temp.path()), Some(&transcriber), input).await;

        assert!(result.is_err());
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn audio_files_are_transcribed() {
        let temp = tempfile::tempdir().unwrap();
        let mut transcriber = MockTranscriber::new();
        transcriber
            .expect_transcribe()
            .withf(|audio| audio.file_name == "input.mp3")
            .returning(|_| Ok("hello class".to_string()));

        let transcript = transcribe_audio(
            &config(temp.path()),
            &transcriber,
            &UploadedFile {
                file_name: "Talk.MP3".to_string(),
                bytes: b"ID3".to_vec(),
            },
        )
        .await
        .unwrap();

        assert_eq!(transcript, "hello class");
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn youtube_failures_are_reported_as_bad_requests() {
        let temp = tempfile::tempdir().unwrap();
        let transcriber = MockTranscriber::new();
        let input = ContentInput {
            youtube_url: Some("https://youtu.be/abc".to_string()),
            ..Default::default()
        };

        let err = process_content(&config(temp.path()), Some(&transcriber), input)
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            invalid("YouTube download failed: yt-dlp could not be started")
        );
    }

    #[test]
    fn source_name_prefers_the_file_name() {
        let input = ContentInput {
            file: file("notes.pdf", b"%PDF"),
            ..Default::default()
        };
        assert_eq!(input.source_name(), Some("notes.pdf".to_string()));

        let input = ContentInput {
            youtube_url: Some(" https://youtu.be/abc ".to_string()),
            ..Default::default()
        };
        assert_eq!(input.source_name(), Some("https://youtu.be/abc".to_string()));
    }
}

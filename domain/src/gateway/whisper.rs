//! Whisper speech-to-text over the OpenAI-compatible `/audio/transcriptions` endpoint.

use super::{http_client, secret_header, status_error, transport_error};
use crate::error::Error;
use async_trait::async_trait;
use log::*;
use reqwest::multipart::{Form, Part};
use study_ai::traits::transcription::Provider;
use study_ai::types::transcription::AudioInput;

const PROVIDER: &str = "whisper";

pub struct Client {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl Client {
    pub fn new(api_key: &str, base_url: &str, model: &str) -> Result<Self, Error> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::AUTHORIZATION,
            secret_header(&format!("Bearer {api_key}"))?,
        );

        Ok(Self {
            client: http_client(headers)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl Provider for Client {
    async fn transcribe(&self, audio: AudioInput) -> Result<String, study_ai::Error> {
        let bytes = tokio::fs::read(&audio.path).await.map_err(|e| {
            warn!("Failed to read audio file {}: {e}", audio.path.display());
            study_ai::Error::Other(Box::new(e))
        })?;
        debug!(
            "Transcribing {} ({} bytes) with {}",
            audio.file_name,
            bytes.len(),
            self.model
        );

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(audio.file_name.clone()))
            .text("model", self.model.clone())
            .text("response_format", "text");

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(status_error(PROVIDER, response).await);
        }

        let transcript = response
            .text()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        info!("Transcribed {} into {} chars", audio.file_name, transcript.len());

        Ok(transcript.trim().to_string())
    }

    fn provider_id(&self) -> &'static str {
        PROVIDER
    }
}

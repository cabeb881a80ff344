//! Client for OpenAI-compatible chat-completions APIs (Groq, OpenRouter).

use super::{http_client, secret_header, status_error, transport_error};
use crate::error::Error;
use async_trait::async_trait;
use log::*;
use serde::Deserialize;
use study_ai::traits::chat::Provider;
use study_ai::types::chat::{Completion, CompletionRequest};

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug)]
pub struct Client {
    provider_id: &'static str,
    client: reqwest::Client,
    base_url: String,
}

impl Client {
    pub fn new(provider_id: &'static str, api_key: &str, base_url: &str) -> Result<Self, Error> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::AUTHORIZATION,
            secret_header(&format!("Bearer {api_key}"))?,
        );

        Ok(Self {
            provider_id,
            client: http_client(headers)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Provider for Client {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, study_ai::Error> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(
            "Requesting {} completion from {} ({} messages)",
            request.model,
            self.provider_id,
            request.messages.len()
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(self.provider_id, e))?;

        if !response.status().is_success() {
            return Err(status_error(self.provider_id, response).await);
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse {} response: {:?}", self.provider_id, e);
            study_ai::Error::Deserialization(e.to_string())
        })?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        Ok(Completion {
            content: content.trim().to_string(),
        })
    }

    fn provider_id(&self) -> &'static str {
        self.provider_id
    }
}

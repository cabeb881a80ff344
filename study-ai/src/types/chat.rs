//! Types for chat completion requests.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in an OpenAI-style conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A single completion call. Unset sampling fields fall back to provider defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// The assistant's reply text.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_in_openai_shape() {
        let request = CompletionRequest::new(
            "llama-3.1-8b-instant",
            vec![Message::system("be brief"), Message::user("hi")],
        )
        .temperature(0.5)
        .max_tokens(400);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "llama-3.1-8b-instant",
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "hi"}
                ],
                "temperature": 0.5,
                "max_tokens": 400
            })
        );
    }

    #[test]
    fn unset_sampling_fields_are_omitted() {
        let request = CompletionRequest::new("deepseek/deepseek-r1", vec![Message::user("hi")]);
        let value = serde_json::to_value(&request).unwrap();

        assert!(value.get("temperature").is_none());
        assert!(value.get("max_tokens").is_none());
    }
}

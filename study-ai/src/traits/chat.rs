//! Chat completion provider trait.

use crate::types::chat::{Completion, CompletionRequest};
use crate::Error;
use async_trait::async_trait;

/// Abstraction over an LLM chat-completions endpoint.
///
/// One request in, one assistant message out. Streaming is not needed by any caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, Error>;

    /// Lowercase identifier, e.g. "groq" or "openrouter". Used in logs.
    fn provider_id(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::chat::Message;

    #[tokio::test]
    async fn mocked_provider_can_stand_in_for_a_real_one() {
        let mut provider = MockProvider::new();
        provider
            .expect_complete()
            .withf(|request| request.model == "tiny" && request.messages.len() == 1)
            .returning(|_| {
                Ok(Completion {
                    content: "pong".to_string(),
                })
            });

        let request = CompletionRequest::new("tiny", vec![Message::user("ping")]);
        let completion = provider.complete(request).await.unwrap();

        assert_eq!(completion.content, "pong");
    }
}

//! Test doubles shared by the generator modules.

use async_trait::async_trait;
use mockall::mock;
use study_ai::traits::{chat, transcription};
use study_ai::types::chat::{Completion, CompletionRequest};
use study_ai::types::transcription::AudioInput;

mock! {
    pub ChatProvider {}

    #[async_trait]
    impl chat::Provider for ChatProvider {
        async fn complete(&self, request: CompletionRequest) -> Result<Completion, study_ai::Error>;
        fn provider_id(&self) -> &'static str;
    }
}

mock! {
    pub Transcriber {}

    #[async_trait]
    impl transcription::Provider for Transcriber {
        async fn transcribe(&self, audio: AudioInput) -> Result<String, study_ai::Error>;
        fn provider_id(&self) -> &'static str;
    }
}

/// A provider that answers every request with `content`.
pub(crate) fn replying(content: &str) -> MockChatProvider {
    let content = content.to_string();
    let mut provider = MockChatProvider::new();
    provider.expect_complete().returning(move |_| {
        Ok(Completion {
            content: content.clone(),
        })
    });
    provider.expect_provider_id().return_const("mock");
    provider
}

/// A provider whose every request fails.
pub(crate) fn failing() -> MockChatProvider {
    let mut provider = MockChatProvider::new();
    provider
        .expect_complete()
        .returning(|_| Err(study_ai::Error::Provider("model overloaded".to_string())));
    provider.expect_provider_id().return_const("mock");
    provider
}

//! Speech-to-text provider trait.

use crate::types::transcription::AudioInput;
use crate::Error;
use async_trait::async_trait;

/// Abstraction for speech-to-text services (Whisper-style, file upload in, text out).
#[async_trait]
pub trait Provider: Send + Sync {
    /// Transcribe a local audio file and return its plain text.
    async fn transcribe(&self, audio: AudioInput) -> Result<String, Error>;

    fn provider_id(&self) -> &'static str;
}

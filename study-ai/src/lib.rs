//! Provider abstractions for the AI services study aids are generated with.
//!
//! This crate provides trait-based abstractions for:
//! - Chat completion against large language models
//! - Speech-to-text transcription of audio files
//! - Stock image search for presentation slides
//!
//! Groq and OpenRouter both speak the OpenAI chat-completions dialect, so a single
//! client implementation can back several providers; the traits keep callers
//! independent of which one is configured.

pub mod error;
pub mod traits;
pub mod types;

pub use error::Error;

//! Business logic of the platform: turning uploads into text and text into study aids.
//!
//! Models are re-exported from `entity_api` so that consumers of the `domain` crate do not
//! need to depend on the `entity_api` or `entity` crates directly.
pub use entity_api::{access_token, contents, generated_outputs, quiz_attempts, transcriptions, users, Id};
pub use entity::{feature::Feature, input_type::InputType, media_kind::MediaKind};

pub mod chat;
pub mod content;
pub mod error;
pub mod flashcards;
pub mod generated_output;
pub mod jwt;
pub mod llm_json;
pub mod presentation;
pub mod quiz;
pub mod quiz_attempt;
pub mod quiz_evaluator;
pub mod rag;
pub mod summary;
pub mod text_processing;
pub mod transcription;
pub mod user;

pub mod gateway;

#[cfg(test)]
pub(crate) mod test_utils;

pub mod chat;
pub mod image_search;
pub mod transcription;

pub mod chat;
pub mod image;
pub mod transcription;

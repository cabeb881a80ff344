//! Study aids generated from a stored content record, and what is done with them afterwards.

pub(crate) mod chat_controller;
pub(crate) mod flashcards_controller;
pub(crate) mod output_controller;
pub(crate) mod presentation_controller;
pub(crate) mod quiz_controller;
pub(crate) mod summary_controller;

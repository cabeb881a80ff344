pub use super::contents::Entity as Contents;
pub use super::generated_outputs::Entity as GeneratedOutputs;
pub use super::quiz_attempts::Entity as QuizAttempts;
pub use super::transcriptions::Entity as Transcriptions;
pub use super::users::Entity as Users;

use uuid::Uuid;

pub mod prelude;

pub mod access_token;
pub mod contents;
pub mod feature;
pub mod generated_outputs;
pub mod input_type;
pub mod media_kind;
pub mod quiz_attempts;
pub mod transcriptions;
pub mod users;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;

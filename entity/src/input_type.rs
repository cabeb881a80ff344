use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Where the normalized text of a content record came from.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, EnumIter, Deserialize, Serialize, DeriveActiveEnum, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "input_type")]
pub enum InputType {
    /// Audio track of an uploaded video, transcribed
    #[sea_orm(string_value = "video")]
    Video,
    #[sea_orm(string_value = "pdf")]
    Pdf,
    /// .docx or .doc upload
    #[sea_orm(string_value = "word")]
    Word,
    /// Audio of a YouTube video, transcribed
    #[sea_orm(string_value = "youtube")]
    Youtube,
    /// Pasted text
    #[sea_orm(string_value = "text")]
    Text,
}

impl std::fmt::Display for InputType {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputType::Video => write!(fmt, "video"),
            InputType::Pdf => write!(fmt, "pdf"),
            InputType::Word => write!(fmt, "word"),
            InputType::Youtube => write!(fmt, "youtube"),
            InputType::Text => write!(fmt, "text"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn display_matches_serialized_form() {
        for input_type in InputType::iter() {
            let json = serde_json::to_string(&input_type).unwrap();
            assert_eq!(json, format!("\"{input_type}\""));
        }
    }
}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The study aid a generated output holds.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, EnumIter, Deserialize, Serialize, DeriveActiveEnum, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "feature")]
pub enum Feature {
    #[sea_orm(string_value = "summary")]
    Summary,
    #[sea_orm(string_value = "flashcards")]
    Flashcards,
    #[sea_orm(string_value = "quiz")]
    Quiz,
    #[sea_orm(string_value = "presentation")]
    Presentation,
    /// A running chat conversation about one content record
    #[sea_orm(string_value = "chatbot")]
    Chatbot,
}

impl std::fmt::Display for Feature {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Feature::Summary => write!(fmt, "summary"),
            Feature::Flashcards => write!(fmt, "flashcards"),
            Feature::Quiz => write!(fmt, "quiz"),
            Feature::Presentation => write!(fmt, "presentation"),
            Feature::Chatbot => write!(fmt, "chatbot"),
        }
    }
}

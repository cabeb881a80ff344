//! SeaORM Entity for the quiz_attempts table.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::quiz_attempts::Model)]
#[sea_orm(schema_name = "edugen", table_name = "quiz_attempts")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    #[schema(value_type = String, format = Uuid)]
    pub user_id: Id,

    /// Id of the generated quiz output that was attempted
    #[schema(value_type = String, format = Uuid)]
    pub quiz_id: Id,

    #[schema(value_type = String, format = Uuid)]
    pub content_id: Id,

    /// Answers as submitted, `[{question_id, selected_option}]`
    #[sea_orm(column_type = "JsonBinary")]
    #[schema(value_type = Object)]
    pub responses: Json,

    /// Number of correct answers
    pub score: i32,

    pub percentage: f64,

    /// `practice` or `exam`
    pub mode: String,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub attempted_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

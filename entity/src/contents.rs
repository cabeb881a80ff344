//! SeaORM Entity for the contents table.
//! One row per upload, holding the plain text every study aid is generated from.

use crate::input_type::InputType;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::contents::Model)]
#[sea_orm(schema_name = "edugen", table_name = "contents")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    #[schema(value_type = String, format = Uuid)]
    pub user_id: Id,

    pub input_type: InputType,

    /// Whitespace-collapsed text extracted from the upload
    #[sea_orm(column_type = "Text")]
    pub normalized_text: String,

    /// User-assigned display title
    pub title: Option<String>,

    /// Uploaded filename or YouTube URL
    pub source_name: Option<String>,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,

    #[sea_orm(has_many = "super::generated_outputs::Entity")]
    GeneratedOutputs,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::generated_outputs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GeneratedOutputs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! SeaORM Entity for the generated_outputs table.
//! Options and output payloads differ per feature, so both are stored as JSON.

use crate::feature::Feature;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::generated_outputs::Model)]
#[sea_orm(schema_name = "edugen", table_name = "generated_outputs")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    #[schema(value_type = String, format = Uuid)]
    pub user_id: Id,

    #[schema(value_type = String, format = Uuid)]
    pub content_id: Id,

    pub feature: Feature,

    /// Request options the output was generated with
    #[sea_orm(column_type = "JsonBinary")]
    #[schema(value_type = Object)]
    pub options: Json,

    #[sea_orm(column_type = "JsonBinary")]
    #[schema(value_type = Object)]
    pub output: Json,

    /// Latest self-reported quiz score, only ever set on quiz outputs
    #[sea_orm(column_type = "JsonBinary", nullable)]
    #[schema(value_type = Option<Object>)]
    pub score: Option<Json>,

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
        belongs_to = "super::contents::Entity",
        from = "Column::ContentId",
        to = "super::contents::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Contents,
}

impl Related<super::contents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

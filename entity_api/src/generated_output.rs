//! CRUD operations for the generated_outputs table.

use super::error::{EntityApiErrorKind, Error};
use entity::feature::Feature;
use entity::generated_outputs::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*, ActiveValue::Set, ConnectionTrait, IntoActiveModel, QueryOrder,
};

pub async fn create(
    db: &impl ConnectionTrait,
    user_id: Id,
    content_id: Id,
    feature: Feature,
    options: Json,
    output: Json,
) -> Result<Model, Error> {
    debug!("Storing {feature} output for content {content_id}");

    let now = chrono::Utc::now();
    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        user_id: Set(user_id),
        content_id: Set(content_id),
        feature: Set(feature),
        options: Set(options),
        output: Set(output),
        score: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    Ok(active_model.insert(db).await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

/// Outputs a user generated for one content record, newest first.
pub async fn find_by_content(
    db: &impl ConnectionTrait,
    content_id: Id,
    user_id: Id,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::ContentId.eq(content_id))
        .filter(Column::UserId.eq(user_id))
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?)
}

/// The most recent output of `feature` for a content record, if any.
pub async fn find_latest_by_feature(
    db: &impl ConnectionTrait,
    content_id: Id,
    user_id: Id,
    feature: Feature,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::ContentId.eq(content_id))
        .filter(Column::UserId.eq(user_id))
        .filter(Column::Feature.eq(feature))
        .order_by_desc(Column::CreatedAt)
        .one(db)
        .await?)
}

pub async fn update_output(db: &impl ConnectionTrait, id: Id, output: Json) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    let mut active_model = existing.into_active_model();
    active_model.output = Set(output);
    active_model.updated_at = Set(chrono::Utc::now().into());

    Ok(active_model.update(db).await?)
}

pub async fn update_score(db: &impl ConnectionTrait, id: Id, score: Json) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;
    debug!("Recording score on output {id}");

    let mut active_model = existing.into_active_model();
    active_model.score = Set(Some(score));
    active_model.updated_at = Set(chrono::Utc::now().into());

    Ok(active_model.update(db).await?)
}

pub async fn delete_by_id(db: &impl ConnectionTrait, id: Id) -> Result<(), Error> {
    let result = Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        });
    }
    Ok(())
}

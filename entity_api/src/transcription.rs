//! CRUD operations for transcriptions table.

use super::error::{EntityApiErrorKind, Error};
use entity::media_kind::MediaKind;
use entity::transcriptions::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, ActiveValue::Set, ConnectionTrait, QueryOrder};

/// Creates a new transcription record
pub async fn create(
    db: &impl ConnectionTrait,
    user_id: Id,
    filename: String,
    file_type: MediaKind,
    transcript: String,
) -> Result<Model, Error> {
    debug!("Creating {file_type} transcription of {filename} for user {user_id}");

    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        user_id: Set(user_id),
        filename: Set(filename),
        file_type: Set(file_type),
        transcript: Set(transcript),
        created_at: Set(chrono::Utc::now().into()),
    };

    Ok(active_model.insert(db).await?)
}

/// Finds a transcription by ID, but only when it belongs to `user_id`
pub async fn find_by_id_and_user(
    db: &impl ConnectionTrait,
    id: Id,
    user_id: Id,
) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .filter(Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        })
}

/// A user's transcriptions, newest first
pub async fn find_by_user(db: &impl ConnectionTrait, user_id: Id) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::UserId.eq(user_id))
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?)
}

/// Deletes a transcription by ID and owner
pub async fn delete_by_id_and_user(
    db: &impl ConnectionTrait,
    id: Id,
    user_id: Id,
) -> Result<(), Error> {
    let result = Entity::delete_many()
        .filter(Column::Id.eq(id))
        .filter(Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        debug!("Transcription {id} not found for user {user_id}");
        return Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        });
    }
    Ok(())
}

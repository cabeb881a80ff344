//! CRUD operations for the contents table.

use super::error::{EntityApiErrorKind, Error};
use entity::contents::{ActiveModel, Column, Entity, Model};
use entity::input_type::InputType;
use entity::{generated_outputs, quiz_attempts, Id};
use log::*;
use sea_orm::{
    entity::prelude::*, ActiveValue::Set, ConnectionTrait, IntoActiveModel, QueryOrder,
    TransactionTrait,
};

/// Persists a newly normalized upload.
pub async fn create(
    db: &impl ConnectionTrait,
    user_id: Id,
    input_type: InputType,
    normalized_text: String,
    source_name: Option<String>,
) -> Result<Model, Error> {
    debug!(
        "Creating {input_type} content for user {user_id} ({} chars)",
        normalized_text.len()
    );

    let now = chrono::Utc::now();
    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        user_id: Set(user_id),
        input_type: Set(input_type),
        normalized_text: Set(normalized_text),
        title: Set(None),
        source_name: Set(source_name),
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

/// All of a user's contents, newest first.
pub async fn find_by_user(db: &impl ConnectionTrait, user_id: Id) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::UserId.eq(user_id))
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn rename(db: &impl ConnectionTrait, id: Id, title: String) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;
    debug!("Renaming content {id} to {title:?}");

    let mut active_model = existing.into_active_model();
    active_model.title = Set(Some(title));
    active_model.updated_at = Set(chrono::Utc::now().into());

    Ok(active_model.update(db).await?)
}

/// Deletes a content record along with every output and quiz attempt that references it.
pub async fn delete_by_id(db: &impl TransactionTrait, id: Id) -> Result<(), Error> {
    let txn = db.begin().await?;

    generated_outputs::Entity::delete_many()
        .filter(generated_outputs::Column::ContentId.eq(id))
        .exec(&txn)
        .await?;
    quiz_attempts::Entity::delete_many()
        .filter(quiz_attempts::Column::ContentId.eq(id))
        .exec(&txn)
        .await?;
    let result = Entity::delete_by_id(id).exec(&txn).await?;

    if result.rows_affected == 0 {
        txn.rollback().await?;
        return Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        });
    }

    txn.commit().await?;
    info!("Deleted content {id} and its dependents");
    Ok(())
}

//! Persistence for graded quiz attempts.

use super::error::Error;
use entity::quiz_attempts::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, ActiveValue::Set, ConnectionTrait, QueryOrder};

pub async fn create(db: &impl ConnectionTrait, attempt: Model) -> Result<Model, Error> {
    debug!(
        "Recording quiz attempt on quiz {} by user {}: {}%",
        attempt.quiz_id, attempt.user_id, attempt.percentage
    );

    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        user_id: Set(attempt.user_id),
        quiz_id: Set(attempt.quiz_id),
        content_id: Set(attempt.content_id),
        responses: Set(attempt.responses),
        score: Set(attempt.score),
        percentage: Set(attempt.percentage),
        mode: Set(attempt.mode),
        attempted_at: Set(chrono::Utc::now().into()),
    };

    Ok(active_model.insert(db).await?)
}

/// A user's attempts, newest first, optionally narrowed to one content record.
pub async fn find_by_user(
    db: &impl ConnectionTrait,
    user_id: Id,
    content_id: Option<Id>,
) -> Result<Vec<Model>, Error> {
    let mut query = Entity::find().filter(Column::UserId.eq(user_id));
    if let Some(content_id) = content_id {
        query = query.filter(Column::ContentId.eq(content_id));
    }

    Ok(query.order_by_desc(Column::AttemptedAt).all(db).await?)
}

use super::error::{EntityApiErrorKind, Error};
use chrono::Utc;

use entity::users::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};

/// Inserts a new user. The email is lowercased and the password hashed before storage.
pub async fn create(
    db: &impl ConnectionTrait,
    name: &str,
    email: &str,
    password: &str,
) -> Result<Model, Error> {
    let email = email.trim().to_lowercase();
    debug!("New user to be inserted with email: {email}");

    let now = Utc::now();
    let user_active_model = ActiveModel {
        id: Set(Id::new_v4()),
        name: Set(name.trim().to_owned()),
        email: Set(email),
        password: Set(generate_hash(password)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    Ok(user_active_model.insert(db).await?)
}

/// Looks a user up by email, ignoring case.
pub async fn find_by_email(db: &impl ConnectionTrait, email: &str) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::Email.eq(email.trim().to_lowercase()))
        .one(db)
        .await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

pub fn verify_password(password_to_verify: &str, password_hash: &str) -> Result<(), Error> {
    match password_auth::verify_password(password_to_verify, password_hash) {
        Ok(_) => Ok(()),
        Err(_) => Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordUnauthenticated,
        }),
    }
}

pub fn generate_hash(password: &str) -> String {
    password_auth::generate_hash(password)
}

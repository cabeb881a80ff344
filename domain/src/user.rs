use crate::error::{DomainErrorKind, EntityErrorKind, Error, InternalErrorKind};
use crate::jwt;
use crate::users;
use entity::access_token::AccessToken;
use log::*;
use sea_orm::DatabaseConnection;
use service::config::Config;

pub use entity_api::user::find_by_id;

/// Registers a new account. Emails are unique regardless of case.
pub async fn signup(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    password: &str,
) -> Result<users::Model, Error> {
    if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err(Error::invalid("Name, email and password are required"));
    }

    if entity_api::user::find_by_email(db, email).await?.is_some() {
        debug!("Signup rejected, email already registered");
        return Err(Error::invalid("Email already registered"));
    }

    match entity_api::user::create(db, name, email, password).await {
        Ok(user) => {
            info!("Registered user {}", user.id);
            Ok(user)
        }
        Err(err) => {
            let err: Error = err.into();
            // Lost a race with a concurrent signup for the same address
            if err.error_kind
                == DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Duplicate))
            {
                Err(Error::invalid("Email already registered"))
            } else {
                Err(err)
            }
        }
    }
}

/// Checks credentials and issues a bearer token.
pub async fn login(
    db: &DatabaseConnection,
    config: &Config,
    email: &str,
    password: &str,
) -> Result<AccessToken, Error> {
    let user = entity_api::user::find_by_email(db, email)
        .await?
        .ok_or_else(|| Error::unauthenticated("Invalid credentials"))?;

    entity_api::user::verify_password(password, &user.password).map_err(|_| {
        debug!("Wrong password for user {}", user.id);
        Error::unauthenticated("Invalid credentials")
    })?;

    jwt::issue_access_token(config, &user)
}

/// Resolves a bearer token to the user it was issued for.
pub async fn authenticate_token(
    db: &DatabaseConnection,
    config: &Config,
    token: &str,
) -> Result<users::Model, Error> {
    let claims = jwt::validate_access_token(config, token)?;

    match entity_api::user::find_by_id(db, claims.user_id).await {
        Ok(user) => Ok(user),
        Err(err) => {
            let err: Error = err.into();
            if err.is_not_found() {
                warn!("Valid token for missing user {}", claims.user_id);
                Err(Error::unauthenticated("Invalid authentication credentials"))
            } else {
                Err(err)
            }
        }
    }
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::error::RequestErrorKind;
    use chrono::Utc;
    use entity::Id;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn config() -> Config {
        Config::from_args(["edugen", "--jwt-secret", "unit-test-secret"])
    }

    fn user_model() -> users::Model {
        let now = Utc::now();
        users::Model {
            id: Id::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: entity_api::user::generate_hash("correct horse"),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn signup_rejects_a_registered_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model()]])
            .into_connection();

        let err = signup(&db, "Ada", "ADA@example.com", "pw").await.unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Request(RequestErrorKind::Invalid(
                "Email already registered".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn signup_inserts_a_new_user() {
        let user = user_model();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<users::Model>::new()])
            .append_query_results([vec![user.clone()]])
            .into_connection();

        let created = signup(&db, "Ada", "ada@example.com", "correct horse")
            .await
            .unwrap();

        assert_eq!(created.id, user.id);
    }

    #[tokio::test]
    async fn signup_requires_every_field() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        assert!(signup(&db, " ", "ada@example.com", "pw").await.is_err());
    }

    #[tokio::test]
    async fn login_issues_a_token_for_valid_credentials() {
        let user = user_model();
        let config = config();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user.clone()]])
            .into_connection();

        let token = login(&db, &config, "ada@example.com", "correct horse")
            .await
            .unwrap();
        let claims = jwt::validate_access_token(&config, &token.access_token).unwrap();

        assert_eq!(claims.user_id, user.id);
    }

    #[tokio::test]
    async fn login_rejects_a_wrong_password() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model()]])
            .into_connection();

        let err = login(&db, &config(), "ada@example.com", "wrong")
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Request(RequestErrorKind::Unauthenticated(
                "Invalid credentials".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn login_rejects_an_unknown_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<users::Model>::new()])
            .into_connection();

        assert!(login(&db, &config(), "nobody@example.com", "pw").await.is_err());
    }

    #[tokio::test]
    async fn authenticate_token_loads_the_user() {
        let user = user_model();
        let config = config();
        let token = jwt::issue_access_token(&config, &user).unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user.clone()]])
            .into_connection();

        let found = authenticate_token(&db, &config, &token.access_token)
            .await
            .unwrap();

        assert_eq!(found.email, user.email);
    }

    #[tokio::test]
    async fn authenticate_token_rejects_tokens_for_deleted_users() {
        let config = config();
        let token = jwt::issue_access_token(&config, &user_model()).unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<users::Model>::new()])
            .into_connection();

        let err = authenticate_token(&db, &config, &token.access_token)
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Request(RequestErrorKind::Unauthenticated(
                "Invalid authentication credentials".to_string()
            ))
        );
    }
}

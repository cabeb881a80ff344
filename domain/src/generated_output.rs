use crate::content::find_owned as find_owned_content;
use crate::error::Error;
use crate::generated_outputs;
use chrono::{DateTime, FixedOffset};
use entity::feature::Feature;
use entity::quiz_attempts;
use entity::Id;
use log::*;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// An output as listed under its content record, without the generated payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputSummary {
    pub output_id: Id,
    pub feature: Feature,
    pub options: Value,
    pub created_at: DateTime<FixedOffset>,
    pub score: Option<Value>,
}

impl From<generated_outputs::Model> for OutputSummary {
    fn from(output: generated_outputs::Model) -> Self {
        Self {
            output_id: output.id,
            feature: output.feature,
            options: output.options,
            created_at: output.created_at,
            score: output.score,
        }
    }
}

/// A self-reported quiz result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub score: i32,
    pub total: i32,
    pub percentage: f64,
    #[serde(default)]
    pub user_answers: Option<Value>,
}

/// Loads an output on behalf of `user_id`: 404 when missing, 403 when someone else owns it.
pub async fn find_owned(
    db: &DatabaseConnection,
    output_id: Id,
    user_id: Id,
) -> Result<generated_outputs::Model, Error> {
    let output = entity_api::generated_output::find_by_id(db, output_id)
        .await
        .map_err(|e| {
            let err = Error::from(e);
            if err.is_not_found() {
                Error::not_found("Output not found")
            } else {
                err
            }
        })?;

    if output.user_id != user_id {
        warn!("User {user_id} tried to access output {output_id} of another user");
        return Err(Error::forbidden("Access denied"));
    }
    Ok(output)
}

/// Outputs generated for one of the user's content records, newest first.
pub async fn list_for_content(
    db: &DatabaseConnection,
    content_id: Id,
    user_id: Id,
) -> Result<Vec<OutputSummary>, Error> {
    find_owned_content(db, content_id, user_id).await?;
    let outputs = entity_api::generated_output::find_by_content(db, content_id, user_id).await?;
    Ok(outputs.into_iter().map(OutputSummary::from).collect())
}

pub async fn delete(db: &DatabaseConnection, output_id: Id, user_id: Id) -> Result<(), Error> {
    find_owned(db, output_id, user_id).await?;
    entity_api::generated_output::delete_by_id(db, output_id).await?;
    info!("Deleted output {output_id}");
    Ok(())
}

/// Stores a score on a quiz output and records it as an attempt.
pub async fn record_score(
    db: &DatabaseConnection,
    output_id: Id,
    user_id: Id,
    submission: ScoreSubmission,
) -> Result<generated_outputs::Model, Error> {
    let output = find_owned(db, output_id, user_id).await?;
    if output.feature != Feature::Quiz {
        return Err(Error::invalid("Scores can only be recorded on quiz outputs"));
    }
    let mode = output
        .options
        .get("mode")
        .and_then(Value::as_str)
        .unwrap_or("practice")
        .to_string();

    let txn = db.begin().await.map_err(entity_api::error::Error::from)?;
    let updated =
        entity_api::generated_output::update_score(&txn, output_id, serde_json::to_value(&submission)?)
            .await?;
    entity_api::quiz_attempt::create(
        &txn,
        quiz_attempts::Model {
            id: Id::new_v4(),
            user_id,
            quiz_id: output_id,
            content_id: output.content_id,
            responses: submission.user_answers.unwrap_or_else(|| json!([])),
            score: submission.score,
            percentage: submission.percentage,
            mode,
            attempted_at: chrono::Utc::now().into(),
        },
    )
    .await?;
    txn.commit().await.map_err(entity_api::error::Error::from)?;

    debug!(
        "Recorded score {}/{} on quiz {output_id}",
        submission.score, submission.total
    );
    Ok(updated)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
pub(crate) mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, RequestErrorKind};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    pub(crate) fn output_model(user_id: Id, feature: Feature, output: Value) -> generated_outputs::Model {
        let now = chrono::Utc::now();
        generated_outputs::Model {
            id: Id::new_v4(),
            user_id,
            content_id: Id::new_v4(),
            feature,
            options: json!({"mode": "exam"}),
            output,
            score: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn find_owned_reports_missing_outputs() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<generated_outputs::Model>::new()])
            .into_connection();

        let err = find_owned(&db, Id::new_v4(), Id::new_v4()).await.unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Request(RequestErrorKind::NotFound("Output not found".to_string()))
        );
    }

    #[tokio::test]
    async fn delete_refuses_other_users_outputs() {
        let output = output_model(Id::new_v4(), Feature::Summary, json!({}));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![output.clone()]])
            .into_connection();

        let err = delete(&db, output.id, Id::new_v4()).await.unwrap_err();

        assert_eq!(err.client_message(), "Access denied");
    }

    #[tokio::test]
    async fn delete_removes_owned_outputs() {
        let user_id = Id::new_v4();
        let output = output_model(user_id, Feature::Summary, json!({}));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![output.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        assert!(delete(&db, output.id, user_id).await.is_ok());
    }

    #[tokio::test]
    async fn scores_are_only_recorded_on_quizzes() {
        let user_id = Id::new_v4();
        let output = output_model(user_id, Feature::Flashcards, json!({}));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![output.clone()]])
            .into_connection();
        let submission = ScoreSubmission {
            score: 3,
            total: 4,
            percentage: 75.0,
            user_answers: None,
        };

        let err = record_score(&db, output.id, user_id, submission)
            .await
            .unwrap_err();

        assert_eq!(err.client_message(), "Scores can only be recorded on quiz outputs");
    }

    #[tokio::test]
    async fn record_score_stores_the_score_and_an_attempt() {
        let user_id = Id::new_v4();
        let output = output_model(user_id, Feature::Quiz, json!({"quiz": {"questions": []}}));
        let scored = generated_outputs::Model {
            score: Some(json!({"score": 3, "total": 4, "percentage": 75.0, "user_answers": null})),
            ..output.clone()
        };
        let attempt = quiz_attempts::Model {
            id: Id::new_v4(),
            user_id,
            quiz_id: output.id,
            content_id: output.content_id,
            responses: json!([]),
            score: 3,
            percentage: 75.0,
            mode: "exam".to_string(),
            attempted_at: chrono::Utc::now().into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![output.clone()]])
            .append_query_results([vec![output.clone()]])
            .append_query_results([vec![scored.clone()]])
            .append_query_results([vec![attempt]])
            .into_connection();

        let updated = record_score(
            &db,
            output.id,
            user_id,
            ScoreSubmission {
                score: 3,
                total: 4,
                percentage: 75.0,
                user_answers: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.score, scored.score);
    }
}

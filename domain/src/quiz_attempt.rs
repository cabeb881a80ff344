//! Grading quiz attempts and keeping a history of them.

use crate::error::Error;
use crate::generated_output::find_owned;
use crate::quiz_attempts;
use crate::quiz_evaluator::{evaluate_quiz, QuizEvaluation, QuizResponse};
use entity::feature::Feature;
use entity::Id;
use log::*;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EvaluationRequest {
    pub quiz_id: Id,
    #[serde(default = "practice")]
    pub mode: String,
    #[serde(default)]
    pub responses: Vec<QuizResponse>,
}

fn practice() -> String {
    "practice".to_string()
}

/// Grades an attempt at one of the user's quizzes and records it.
pub async fn evaluate(
    db: &DatabaseConnection,
    user_id: Id,
    request: EvaluationRequest,
) -> Result<QuizEvaluation, Error> {
    let output = find_owned(db, request.quiz_id, user_id).await?;
    if output.feature != Feature::Quiz {
        return Err(Error::invalid("Output is not a quiz"));
    }

    let quiz = output.output.get("quiz").unwrap_or(&Value::Null);
    let evaluation = evaluate_quiz(quiz, &request.responses, &request.mode, user_id, output.id);

    entity_api::quiz_attempt::create(
        db,
        quiz_attempts::Model {
            id: Id::new_v4(),
            user_id,
            quiz_id: output.id,
            content_id: output.content_id,
            responses: serde_json::to_value(&request.responses)?,
            score: i32::try_from(evaluation.correct_answers).unwrap_or(i32::MAX),
            percentage: evaluation.percentage,
            mode: request.mode,
            attempted_at: chrono::Utc::now().into(),
        },
    )
    .await?;

    info!(
        "User {user_id} scored {}/{} on quiz {}",
        evaluation.correct_answers, evaluation.total_questions, output.id
    );
    Ok(evaluation)
}

/// A user's attempts, newest first, optionally for one content record only.
pub async fn list(
    db: &DatabaseConnection,
    user_id: Id,
    content_id: Option<Id>,
) -> Result<Vec<quiz_attempts::Model>, Error> {
    Ok(entity_api::quiz_attempt::find_by_user(db, user_id, content_id).await?)
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::generated_output::tests::output_model;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    #[tokio::test]
    async fn evaluate_grades_and_records_the_attempt() {
        let user_id = Id::new_v4();
        let output = output_model(
            user_id,
            Feature::Quiz,
            json!({"quiz": {"questions": [
                {"id": 1, "question": "2+2?", "options": ["3", "4"], "correct_answer": "4",
                 "explanation": "Basic arithmetic."},
                {"id": 2, "question": "3+3?", "options": ["6", "7"], "correct_answer": "6"}
            ]}}),
        );
        let attempt = quiz_attempts::Model {
            id: Id::new_v4(),
            user_id,
            quiz_id: output.id,
            content_id: output.content_id,
            responses: json!([]),
            score: 1,
            percentage: 50.0,
            mode: "practice".to_string(),
            attempted_at: chrono::Utc::now().into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![output.clone()]])
            .append_query_results([vec![attempt]])
            .into_connection();
        let request: EvaluationRequest = serde_json::from_value(json!({
            "quiz_id": output.id,
            "responses": [{"question_id": "1", "selected_option": "4"}]
        }))
        .unwrap();

        let evaluation = evaluate(&db, user_id, request).await.unwrap();

        assert_eq!(evaluation.correct_answers, 1);
        assert_eq!(evaluation.percentage, 50.0);
        assert_eq!(evaluation.results[0].explanation, "Basic arithmetic.");
        assert_eq!(evaluation.results[1].selected_option, "Not answered");
    }

    #[tokio::test]
    async fn only_quizzes_can_be_evaluated() {
        let user_id = Id::new_v4();
        let output = output_model(user_id, Feature::Summary, json!({"summary": "text"}));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![output.clone()]])
            .into_connection();
        let request = EvaluationRequest {
            quiz_id: output.id,
            mode: practice(),
            responses: vec![],
        };

        let err = evaluate(&db, user_id, request).await.unwrap_err();

        assert_eq!(err.client_message(), "Output is not a quiz");
    }
}

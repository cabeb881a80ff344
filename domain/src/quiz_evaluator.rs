//! Grades a quiz attempt against a stored quiz.
//!
//! Stored quizzes come from an LLM, so nothing about their shape is trusted: ids may
//! be numbers or strings or absent, and answers may not be strings at all. Questions
//! that cannot be matched or checked are graded as unanswered or incorrect.

use entity::Id;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const NOT_ANSWERED: &str = "Not answered";

/// One submitted answer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct QuizResponse {
    #[serde(default)]
    pub question_id: Value,
    #[serde(default)]
    pub selected_option: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionResult {
    pub question_id: Value,
    pub is_correct: bool,
    pub selected_option: String,
    pub correct_answer: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizEvaluation {
    pub quiz_id: Id,
    pub user_id: Id,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub score: usize,
    pub percentage: f64,
    pub results: Vec<QuestionResult>,
    pub completion_message: String,
}

/// Ids compare as trimmed strings so `1` and `"1"` match.
fn normalize_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_text(value: Option<&Value>) -> Option<&str> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
        _ => None,
    }
}

/// The question list of a stored quiz: `{"questions": [...]}` or a bare array.
fn questions_of(quiz: &Value) -> &[Value] {
    match quiz {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("questions") {
            Some(Value::Array(items)) => items,
            _ => &[],
        },
        _ => &[],
    }
}

pub fn completion_message(percentage: f64) -> &'static str {
    if percentage >= 90.0 {
        "Excellent work! You have mastered this topic."
    } else if percentage >= 75.0 {
        "Great job! You have a strong understanding of the topic."
    } else if percentage >= 60.0 {
        "Good effort! Review a few concepts to strengthen your understanding."
    } else if percentage >= 40.0 {
        "Keep practicing — progress matters more than perfection."
    } else {
        "Don't give up! Review the material and try again to improve."
    }
}

/// Grades `responses` against `quiz`. Explanations are only revealed in `practice` mode.
pub fn evaluate_quiz(
    quiz: &Value,
    responses: &[QuizResponse],
    mode: &str,
    user_id: Id,
    quiz_id: Id,
) -> QuizEvaluation {
    let questions = questions_of(quiz);

    let mut answers = std::collections::HashMap::new();
    for response in responses {
        if let (Some(id), Some(selected)) = (
            normalize_id(&response.question_id),
            as_text(Some(&response.selected_option)),
        ) {
            answers.insert(id, selected);
        }
    }

    let practice = mode == "practice";
    let mut correct_count = 0;
    let results: Vec<QuestionResult> = questions
        .iter()
        .map(|question| {
            let question_id = question.get("id").cloned().unwrap_or(Value::Null);
            let selected = normalize_id(&question_id).and_then(|id| answers.get(&id).copied());
            let correct_answer = as_text(question.get("correct_answer"));

            let is_correct = matches!((selected, correct_answer), (Some(s), Some(c)) if s == c);
            if is_correct {
                correct_count += 1;
            }

            let explanation = if practice {
                as_text(question.get("explanation")).unwrap_or_default()
            } else {
                ""
            };

            QuestionResult {
                question_id,
                is_correct,
                selected_option: selected.unwrap_or(NOT_ANSWERED).to_string(),
                correct_answer: correct_answer.unwrap_or_default().to_string(),
                explanation: explanation.to_string(),
            }
        })
        .collect();

    let total_questions = questions.len();
    let percentage = if total_questions > 0 {
        let raw = correct_count as f64 / total_questions as f64 * 100.0;
        (raw * 100.0).round() / 100.0
    } else {
        0.0
    };

    QuizEvaluation {
        quiz_id,
        user_id,
        total_questions,
        correct_answers: correct_count,
        score: correct_count,
        percentage,
        results,
        completion_message: completion_message(percentage).to_string(),
    }
}

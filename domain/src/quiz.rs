//! Multiple-choice quiz generation.

use crate::content::find_owned;
use crate::error::Error;
use crate::{llm_json, text_processing};
use entity::feature::Feature;
use entity::Id;
use log::*;
use sea_orm::DatabaseConnection;
use std::collections::HashSet;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use service::config::Config;
use study_ai::traits::chat;
use study_ai::types::chat::{CompletionRequest, Message};

const DEFAULT_QUESTIONS: u32 = 10;
const MAX_QUESTIONS: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: u32,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

/// A question as models tend to return it: ids are optional and may be strings.
#[derive(Deserialize)]
struct RawQuestion {
    #[serde(default)]
    id: Option<Value>,
    question: String,
    options: Vec<String>,
    correct_answer: String,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOptions {
    pub number_of_questions: u32,
    pub difficulty: String,
    pub mode: String,
}

impl QuizOptions {
    pub fn new(
        number_of_questions: Option<u32>,
        difficulty: Option<String>,
        mode: Option<String>,
    ) -> Self {
        Self {
            number_of_questions: number_of_questions
                .unwrap_or(DEFAULT_QUESTIONS)
                .clamp(1, MAX_QUESTIONS),
            difficulty: non_blank(difficulty).unwrap_or_else(|| "medium".to_string()),
            mode: non_blank(mode).unwrap_or_else(|| "practice".to_string()),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedQuiz {
    pub content_id: Id,
    pub quiz: Value,
    pub output_id: Id,
}

fn prompt(text: &str, options: &QuizOptions) -> String {
    format!(
        "Generate a quiz with {} questions from the following content. Difficulty: {}. \
         Each question must have exactly 4 options with one correct answer. \
         Return as JSON array with 'question', 'options', 'correct_answer' and 'explanation' fields. \
         'correct_answer' must be copied exactly from 'options'.\n\nContent: {text}",
        options.number_of_questions, options.difficulty
    )
}

fn explicit_id(id: Option<Value>) -> Option<u32> {
    id.and_then(|id| match id {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
    .and_then(|id| u32::try_from(id).ok())
    .filter(|id| *id > 0)
}

/// Parses the model's questions and gives every one a unique id.
///
/// Explicit ids are kept unless an earlier question already claimed them. Questions
/// without a usable id take their 1-based position, or the lowest free id when that
/// position is taken.
fn into_questions(items: Vec<Value>) -> Vec<QuizQuestion> {
    let raws: Vec<(Option<u32>, RawQuestion)> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<RawQuestion>(item).ok())
        .filter(|raw| !raw.options.is_empty())
        .map(|mut raw| (explicit_id(raw.id.take()), raw))
        .collect();

    let mut taken = HashSet::new();
    let claimed: Vec<Option<u32>> = raws
        .iter()
        .map(|(id, _)| id.filter(|id| taken.insert(*id)))
        .collect();

    let mut next_free = 1;
    raws.into_iter()
        .zip(claimed)
        .enumerate()
        .map(|(idx, ((_, raw), claimed))| {
            let id = claimed.unwrap_or_else(|| {
                let position = idx as u32 + 1;
                if taken.insert(position) {
                    return position;
                }
                while taken.contains(&next_free) {
                    next_free += 1;
                }
                taken.insert(next_free);
                next_free
            });
            QuizQuestion {
                id,
                question: raw.question,
                options: raw.options,
                correct_answer: raw.correct_answer,
                explanation: raw.explanation.unwrap_or_default(),
            }
        })
        .collect()
}

/// Asks the model for a quiz and returns the `quiz` JSON to store, `{questions: […]}`.
///
/// An unusable reply is stored as `{raw_response, questions}` with heuristic questions
/// so the quiz can still be taken.
pub async fn generate_quiz(
    provider: &dyn chat::Provider,
    model: &str,
    text: &str,
    options: &QuizOptions,
) -> Result<Value, Error> {
    let request = CompletionRequest::new(model, vec![Message::user(prompt(text, options))]);
    let reply = provider.complete(request).await?.content;

    let questions = into_questions(llm_json::parse_array(&reply).unwrap_or_default());
    if questions.is_empty() {
        warn!(
            "{} returned no parseable quiz questions, falling back to heuristics",
            provider.provider_id()
        );
        let fallback =
            text_processing::heuristic_quiz(text, &text_processing::extract_key_points(text));
        return Ok(json!({ "raw_response": reply, "questions": fallback }));
    }

    debug!("Parsed {} quiz questions", questions.len());
    Ok(json!({ "questions": questions }))
}

pub async fn create(
    db: &DatabaseConnection,
    config: &Config,
    provider: &dyn chat::Provider,
    user_id: Id,
    content_id: Id,
    options: QuizOptions,
) -> Result<GeneratedQuiz, Error> {
    let content = find_owned(db, content_id, user_id).await?;

    let quiz = generate_quiz(
        provider,
        config.reasoning_model(),
        &content.normalized_text,
        &options,
    )
    .await?;

    let output = entity_api::generated_output::create(
        db,
        user_id,
        content_id,
        Feature::Quiz,
        serde_json::to_value(&options)?,
        json!({ "quiz": quiz }),
    )
    .await?;
    info!("Generated quiz {} for content {content_id}", output.id);

    Ok(GeneratedQuiz {
        content_id,
        quiz,
        output_id: output.id,
    })
}

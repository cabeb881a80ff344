//! Flashcard generation with the reasoning model.

use crate::content::find_owned;
use crate::error::Error;
use crate::{llm_json, text_processing};
use entity::feature::Feature;
use entity::Id;
use log::*;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use service::config::Config;
use study_ai::traits::chat;
use study_ai::types::chat::{CompletionRequest, Message};

pub const DEFAULT_CARDS: u32 = 10;
const MIN_CARDS: u32 = 5;
const MAX_CARDS: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardOptions {
    pub flashcard_type: String,
    pub number_of_cards: u32,
}

impl FlashcardOptions {
    pub fn new(flashcard_type: Option<String>, number_of_cards: Option<u32>) -> Self {
        Self {
            flashcard_type: flashcard_type
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "standard".to_string()),
            number_of_cards: number_of_cards
                .unwrap_or(DEFAULT_CARDS)
                .clamp(MIN_CARDS, MAX_CARDS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedFlashcards {
    pub content_id: Id,
    /// Either the card array, or `{raw_response, fallback}` when the model's answer was unusable.
    pub flashcards: Value,
    pub output_id: Id,
}

fn prompt(text: &str, number_of_cards: u32) -> String {
    format!(
        "Generate {number_of_cards} flashcards from the following content. \
         Each flashcard should have one concept only. No duplicates. \
         Return as JSON array with 'question' and 'answer' fields.\n\nContent: {text}"
    )
}

/// Asks the model for flashcards and returns the JSON to store.
///
/// Cards that don't have both a question and an answer are dropped. When nothing usable
/// comes back, the raw reply is kept next to heuristic cards built from the text itself.
pub async fn generate_flashcards(
    provider: &dyn chat::Provider,
    model: &str,
    text: &str,
    number_of_cards: u32,
) -> Result<Value, Error> {
    let request = CompletionRequest::new(model, vec![Message::user(prompt(text, number_of_cards))]);
    let reply = provider.complete(request).await?.content;

    let cards: Vec<Flashcard> = llm_json::parse_array(&reply)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|card| serde_json::from_value(card).ok())
        .collect();

    if cards.is_empty() {
        warn!(
            "{} returned no parseable flashcards, falling back to heuristics",
            provider.provider_id()
        );
        let fallback =
            text_processing::heuristic_flashcards(text, &text_processing::extract_key_points(text));
        return Ok(json!({ "raw_response": reply, "fallback": fallback }));
    }

    Ok(serde_json::to_value(cards)?)
}

pub async fn create(
    db: &DatabaseConnection,
    config: &Config,
    provider: &dyn chat::Provider,
    user_id: Id,
    content_id: Id,
    options: FlashcardOptions,
) -> Result<GeneratedFlashcards, Error> {
    let content = find_owned(db, content_id, user_id).await?;

    let flashcards = generate_flashcards(
        provider,
        config.reasoning_model(),
        &content.normalized_text,
        options.number_of_cards,
    )
    .await?;

    let output = entity_api::generated_output::create(
        db,
        user_id,
        content_id,
        Feature::Flashcards,
        serde_json::to_value(&options)?,
        json!({ "flashcards": flashcards }),
    )
    .await?;
    info!("Generated flashcards {} for content {content_id}", output.id);

    Ok(GeneratedFlashcards {
        content_id,
        flashcards,
        output_id: output.id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{failing, replying};

    const TEXT: &str = "Mitochondria are the powerhouse of the cell and produce ATP. \
        Ribosomes assemble proteins from amino acids in the cytoplasm. \
        The nucleus stores the genetic material of eukaryotic cells.";

    #[test]
    fn card_count_is_clamped() {
        assert_eq!(FlashcardOptions::new(None, None).number_of_cards, 10);
        assert_eq!(FlashcardOptions::new(None, Some(2)).number_of_cards, 5);
        assert_eq!(FlashcardOptions::new(None, Some(99)).number_of_cards, 20);
        assert_eq!(FlashcardOptions::new(None, None).flashcard_type, "standard");
    }

    #[tokio::test]
    async fn parses_cards_out_of_fenced_reasoning_output() {
        let provider = replying(
            "<think>the user wants cards</think>\n```json\n[\
             {\"question\": \"What produces ATP?\", \"answer\": \"Mitochondria\"},\
             {\"question\": \"missing answer\"}]\n```",
        );

        let cards = generate_flashcards(&provider, "deepseek/deepseek-r1", TEXT, 10)
            .await
            .unwrap();

        assert_eq!(
            cards,
            json!([{"question": "What produces ATP?", "answer": "Mitochondria"}])
        );
    }

    #[tokio::test]
    async fn unusable_replies_keep_the_raw_text_and_a_fallback() {
        let provider = replying("I cannot do that.");

        let cards = generate_flashcards(&provider, "m", TEXT, 10).await.unwrap();

        assert_eq!(cards["raw_response"], "I cannot do that.");
        let fallback = cards["fallback"].as_array().unwrap();
        assert!(!fallback.is_empty());
        assert!(fallback.len() <= 10);
    }

    #[tokio::test]
    async fn provider_failures_are_propagated() {
        assert!(generate_flashcards(&failing(), "m", TEXT, 10).await.is_err());
    }
}

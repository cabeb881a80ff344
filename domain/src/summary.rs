//! Summaries in several styles, produced with the fast model.

use crate::content::find_owned;
use crate::error::Error;
use crate::text_processing::{chunk_text, truncate_chars};
use entity::feature::Feature;
use entity::Id;
use log::*;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::json;
use service::config::Config;
use study_ai::traits::chat;
use study_ai::types::chat::{CompletionRequest, Message};

const CHUNK_CHARS: usize = 3000;
const MAX_CHUNKS: usize = 3;

pub const DEFAULT_SUMMARY_TYPE: &str = "detailed";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedSummary {
    pub content_id: Id,
    pub summary: String,
    pub summary_type: String,
    pub output_id: Id,
}

pub fn instruction_for(summary_type: &str) -> &'static str {
    match summary_type {
        "short" => "Summarize in 3-5 sentences. Be concise.",
        "detailed" => "Provide detailed summary with all key points. Use paragraphs.",
        "exam" => "Summarize focusing on exam-relevant concepts, definitions, and formulas.",
        "revision" => "Create quick revision summary with bullet points of key facts.",
        _ => "Summarize key points clearly.",
    }
}

async fn summarize(
    provider: &dyn chat::Provider,
    model: &str,
    instruction: &str,
    text: &str,
    max_tokens: u32,
) -> Result<String, Error> {
    let request = CompletionRequest::new(
        model,
        vec![Message::user(format!("{instruction}\n\nContent:\n{text}"))],
    )
    .temperature(0.3)
    .max_tokens(max_tokens);

    Ok(provider.complete(request).await?.content)
}

/// Summarizes `text` in the style named by `summary_type`.
///
/// Long texts are summarized chunk by chunk (first three chunks only) and the partial
/// summaries are joined with blank lines. Failed chunks are skipped; if all of them fail
/// the first 3000 characters are summarized directly.
pub async fn generate_summary(
    provider: &dyn chat::Provider,
    model: &str,
    text: &str,
    summary_type: &str,
) -> Result<String, Error> {
    let instruction = instruction_for(summary_type);
    let mut direct_text = text;

    if text.chars().count() > CHUNK_CHARS {
        let mut partials = Vec::new();
        for (idx, chunk) in chunk_text(text, CHUNK_CHARS)
            .iter()
            .take(MAX_CHUNKS)
            .enumerate()
        {
            match summarize(provider, model, instruction, chunk, 300).await {
                Ok(partial) => partials.push(partial),
                Err(e) => warn!("Skipping summary of chunk {idx}: {e}"),
            }
        }

        if !partials.is_empty() {
            return Ok(partials.join("\n\n"));
        }
        direct_text = truncate_chars(text, CHUNK_CHARS);
    }

    summarize(provider, model, instruction, direct_text, 400).await
}

pub async fn create(
    db: &DatabaseConnection,
    config: &Config,
    provider: &dyn chat::Provider,
    user_id: Id,
    content_id: Id,
    summary_type: Option<String>,
) -> Result<GeneratedSummary, Error> {
    let summary_type = summary_type
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_SUMMARY_TYPE.to_string());
    let content = find_owned(db, content_id, user_id).await?;

    let summary = generate_summary(
        provider,
        config.fast_model(),
        &content.normalized_text,
        &summary_type,
    )
    .await?;

    let output = entity_api::generated_output::create(
        db,
        user_id,
        content_id,
        Feature::Summary,
        json!({ "summary_type": summary_type }),
        json!({ "summary": summary }),
    )
    .await?;
    info!("Generated {summary_type} summary {} for content {content_id}", output.id);

    Ok(GeneratedSummary {
        content_id,
        summary,
        summary_type,
        output_id: output.id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{failing, replying, MockChatProvider};
    use study_ai::types::chat::Completion;

    fn long_text() -> String {
        "Plate tectonics moves continents slowly across the mantle. ".repeat(200)
    }

    #[test]
    fn unknown_types_get_the_generic_instruction() {
        assert_eq!(instruction_for("short"), "Summarize in 3-5 sentences. Be concise.");
        assert_eq!(instruction_for("poem"), "Summarize key points clearly.");
    }

    #[tokio::test]
    async fn short_text_is_summarized_in_one_request() {
        let mut provider = MockChatProvider::new();
        provider
            .expect_complete()
            .withf(|request| {
                request.max_tokens == Some(400)
                    && request.messages[0]
                        .content
                        .starts_with("Summarize in 3-5 sentences. Be concise.\n\nContent:\n")
            })
            .times(1)
            .returning(|_| {
                Ok(Completion {
                    content: "Short.".to_string(),
                })
            });

        let summary = generate_summary(&provider, "m", "Rocks erode.", "short")
            .await
            .unwrap();

        assert_eq!(summary, "Short.");
    }

    #[tokio::test]
    async fn long_text_summarizes_at_most_three_chunks() {
        let mut provider = MockChatProvider::new();
        provider
            .expect_complete()
            .withf(|request| request.max_tokens == Some(300))
            .times(3)
            .returning(|_| {
                Ok(Completion {
                    content: "part".to_string(),
                })
            });

        let summary = generate_summary(&provider, "m", &long_text(), "detailed")
            .await
            .unwrap();

        assert_eq!(summary, "part\n\npart\n\npart");
    }

    #[tokio::test]
    async fn failed_chunks_are_skipped() {
        let mut provider = MockChatProvider::new();
        let mut calls = 0;
        provider.expect_complete().times(3).returning(move |_| {
            calls += 1;
            if calls == 2 {
                Err(study_ai::Error::Provider("overloaded".to_string()))
            } else {
                Ok(Completion {
                    content: format!("part {calls}"),
                })
            }
        });

        let summary = generate_summary(&provider, "m", &long_text(), "exam")
            .await
            .unwrap();

        assert_eq!(summary, "part 1\n\npart 3");
    }

    #[tokio::test]
    async fn direct_failures_are_returned() {
        let provider = failing();

        assert!(generate_summary(&provider, "m", "Rocks erode.", "short")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn provider_reply_is_returned_verbatim() {
        let provider = replying("Rocks erode over time.");

        assert_eq!(
            generate_summary(&provider, "m", "Rocks erode.", "revision")
                .await
                .unwrap(),
            "Rocks erode over time."
        );
    }
}

//! Question answering over a content record.
//!
//! Each content record has a single `chatbot` output whose `conversation` array grows
//! with every exchange. When the caller sends no history, the stored conversation is
//! used instead so follow-up questions keep their context.

use crate::content::find_owned;
use crate::error::Error;
use crate::{generated_outputs, rag};
use entity::feature::Feature;
use entity::Id;
use log::*;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use service::config::Config;
use study_ai::traits::chat;
use study_ai::types::chat::{CompletionRequest, Message, Role};

const HISTORY_MESSAGES: usize = 4;
pub const EMPTY_ANSWER: &str = "Sorry, I couldn't generate a response. Please try again.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatAnswer {
    pub content_id: Id,
    pub question: String,
    pub answer: String,
    pub output_id: Id,
}

/// One stored turn of a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Turn {
    sender: String,
    text: String,
}

impl Turn {
    fn into_message(self) -> Message {
        match self.sender.as_str() {
            "user" => Message::user(self.text),
            _ => Message::assistant(self.text),
        }
    }
}

fn stored_conversation(output: &generated_outputs::Model) -> Vec<Turn> {
    output
        .output
        .get("conversation")
        .cloned()
        .and_then(|turns| serde_json::from_value(turns).ok())
        .unwrap_or_default()
}

/// Builds the prompt: grounding context, the last few history messages, then the question.
pub fn build_messages(context: &str, history: &[Message], question: &str) -> Vec<Message> {
    let mut messages = vec![Message::system(format!(
        "Answer based on this content:\n\n{context}\n\nBe concise and clear."
    ))];
    let recent = history
        .iter()
        .filter(|m| m.role != Role::System)
        .cloned()
        .collect::<Vec<_>>();
    let skip = recent.len().saturating_sub(HISTORY_MESSAGES);
    messages.extend(recent.into_iter().skip(skip));
    messages.push(Message::user(question));
    messages
}

/// Answers `question` from the parts of `text` most relevant to it.
pub async fn answer_question(
    provider: &dyn chat::Provider,
    model: &str,
    text: &str,
    question: &str,
    history: &[Message],
) -> Result<String, Error> {
    let context = rag::select_context(text, question);
    debug!(
        "Answering with {} chars of context out of {}",
        context.len(),
        text.len()
    );

    let request = CompletionRequest::new(model, build_messages(&context, history, question))
        .temperature(0.7)
        .max_tokens(400);
    let answer = provider.complete(request).await?.content;

    if answer.trim().is_empty() {
        warn!("{} returned an empty chat answer", provider.provider_id());
        return Ok(EMPTY_ANSWER.to_string());
    }
    Ok(answer.trim().to_string())
}

/// Answers a question about a content record and appends the exchange to its conversation.
pub async fn ask(
    db: &DatabaseConnection,
    config: &Config,
    provider: &dyn chat::Provider,
    user_id: Id,
    content_id: Id,
    question: &str,
    history: Option<Vec<Message>>,
) -> Result<ChatAnswer, Error> {
    let question = question.trim();
    if question.is_empty() {
        return Err(Error::invalid("Question is required"));
    }
    let content = find_owned(db, content_id, user_id).await?;

    let existing = entity_api::generated_output::find_latest_by_feature(
        db,
        content_id,
        user_id,
        Feature::Chatbot,
    )
    .await?;
    let mut conversation = existing
        .as_ref()
        .map(stored_conversation)
        .unwrap_or_default();

    let history = history.unwrap_or_else(|| {
        conversation
            .iter()
            .cloned()
            .map(Turn::into_message)
            .collect()
    });

    let answer = answer_question(
        provider,
        config.fast_model(),
        &content.normalized_text,
        question,
        &history,
    )
    .await?;

    conversation.push(Turn {
        sender: "user".to_string(),
        text: question.to_string(),
    });
    conversation.push(Turn {
        sender: "bot".to_string(),
        text: answer.clone(),
    });
    let output_json = json!({ "conversation": conversation });

    let output = match existing {
        Some(existing) => {
            entity_api::generated_output::update_output(db, existing.id, output_json).await?
        }
        None => {
            entity_api::generated_output::create(
                db,
                user_id,
                content_id,
                Feature::Chatbot,
                Value::Object(Default::default()),
                output_json,
            )
            .await?
        }
    };

    Ok(ChatAnswer {
        content_id,
        question: question.to_string(),
        answer,
        output_id: output.id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{replying, MockChatProvider};
    use study_ai::types::chat::Completion;

    #[test]
    fn only_the_last_four_history_messages_are_sent() {
        let history: Vec<Message> = (0..6)
            .map(|i| {
                if i % 2 == 0 {
                    Message::user(format!("q{i}"))
                } else {
                    Message::assistant(format!("a{i}"))
                }
            })
            .collect();

        let messages = build_messages("ctx", &history, "latest?");

        assert_eq!(messages.len(), 6);
        assert_eq!(
            messages[0].content,
            "Answer based on this content:\n\nctx\n\nBe concise and clear."
        );
        assert_eq!(messages[1].content, "q2");
        assert_eq!(messages[5], Message::user("latest?"));
    }

    #[tokio::test]
    async fn relevant_context_is_sent_with_sampling_settings() {
        let text = "Volcanoes erupt molten rock called lava. \
                    Glaciers carve valleys over thousands of years.";
        let mut provider = MockChatProvider::new();
        provider
            .expect_complete()
            .withf(|request| {
                request.temperature == Some(0.7)
                    && request.max_tokens == Some(400)
                    && request.messages[0].content.contains("lava")
            })
            .returning(|_| {
                Ok(Completion {
                    content: " Lava is molten rock. ".to_string(),
                })
            });

        let answer = answer_question(&provider, "m", text, "What is lava?", &[])
            .await
            .unwrap();

        assert_eq!(answer, "Lava is molten rock.");
    }

    #[tokio::test]
    async fn empty_answers_are_replaced() {
        let provider = replying("   ");

        let answer = answer_question(&provider, "m", "", "Anything?", &[])
            .await
            .unwrap();

        assert_eq!(answer, EMPTY_ANSWER);
    }

    #[test]
    fn stored_turns_map_to_chat_roles() {
        let turns = vec![
            Turn {
                sender: "user".to_string(),
                text: "hi".to_string(),
            },
            Turn {
                sender: "bot".to_string(),
                text: "hello".to_string(),
            },
        ];

        let messages: Vec<Message> = turns.into_iter().map(Turn::into_message).collect();

        assert_eq!(messages, vec![Message::user("hi"), Message::assistant("hello")]);
    }
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod db_tests {
    use super::*;
    use crate::content::tests::content_model;
    use crate::test_utils::replying;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn chatbot_output(user_id: Id, content_id: Id, output: Value) -> generated_outputs::Model {
        let now = chrono::Utc::now();
        generated_outputs::Model {
            id: Id::new_v4(),
            user_id,
            content_id,
            feature: Feature::Chatbot,
            options: json!({}),
            output,
            score: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn blank_questions_are_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let provider = replying("unused");

        let result = ask(
            &db,
            &Config::from_args(["edugen"]),
            &provider,
            Id::new_v4(),
            Id::new_v4(),
            "  ",
            None,
        )
        .await;

        assert_eq!(result.unwrap_err().client_message(), "Question is required");
    }

    #[tokio::test]
    async fn follow_up_questions_extend_the_stored_conversation() {
        let user_id = Id::new_v4();
        let content = content_model(user_id, "Lava is molten rock from volcanoes.");
        let existing = chatbot_output(
            user_id,
            content.id,
            json!({"conversation": [
                {"sender": "user", "text": "What is lava?"},
                {"sender": "bot", "text": "Molten rock."}
            ]}),
        );
        let updated = chatbot_output(user_id, content.id, json!({"conversation": []}));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![content.clone()]])
            .append_query_results([vec![existing.clone()]])
            .append_query_results([vec![existing.clone()]])
            .append_query_results([vec![updated.clone()]])
            .into_connection();
        let provider = replying("From volcanoes.");

        let answer = ask(
            &db,
            &Config::from_args(["edugen"]),
            &provider,
            user_id,
            content.id,
            "Where does it come from?",
            None,
        )
        .await
        .unwrap();

        assert_eq!(answer.answer, "From volcanoes.");
        assert_eq!(answer.output_id, updated.id);

        let log = db.into_transaction_log();
        let update = log
            .iter()
            .flat_map(|txn| txn.statements())
            .find(|statement| statement.sql.starts_with("UPDATE"))
            .unwrap();
        let conversation = update
            .values
            .as_ref()
            .unwrap()
            .0
            .iter()
            .find_map(|value| match value {
                sea_orm::Value::Json(Some(json)) => json.get("conversation").cloned(),
                _ => None,
            })
            .unwrap();

        assert_eq!(
            conversation,
            json!([
                {"sender": "user", "text": "What is lava?"},
                {"sender": "bot", "text": "Molten rock."},
                {"sender": "user", "text": "Where does it come from?"},
                {"sender": "bot", "text": "From volcanoes."}
            ])
        );
    }
}

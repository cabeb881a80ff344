//! Form parameters of the study-aid generators.

use crate::extractors::form_data::FormData;
use crate::Error;
use domain::error::Error as DomainError;
use domain::flashcards::FlashcardOptions;
use domain::presentation::PresentationOptions;
use domain::quiz::QuizOptions;
use domain::Id;
use study_ai::types::chat::Message;

/// A count field. Negative values clamp to zero; the generators clamp further.
fn count(form: &FormData, name: &str) -> Result<Option<u32>, Error> {
    Ok(form
        .number::<i64>(name)?
        .map(|n| u32::try_from(n.max(0)).unwrap_or(u32::MAX)))
}

#[derive(Debug)]
pub(crate) struct SummaryParams {
    pub(crate) content_id: Id,
    pub(crate) summary_type: Option<String>,
}

impl TryFrom<FormData> for SummaryParams {
    type Error = Error;

    fn try_from(form: FormData) -> Result<Self, Self::Error> {
        Ok(Self {
            content_id: form.required_id("content_id")?,
            summary_type: form.text("summary_type"),
        })
    }
}

#[derive(Debug)]
pub(crate) struct FlashcardParams {
    pub(crate) content_id: Id,
    pub(crate) options: FlashcardOptions,
}

impl TryFrom<FormData> for FlashcardParams {
    type Error = Error;

    fn try_from(form: FormData) -> Result<Self, Self::Error> {
        Ok(Self {
            content_id: form.required_id("content_id")?,
            options: FlashcardOptions::new(
                form.text("flashcard_type"),
                count(&form, "number_of_cards")?,
            ),
        })
    }
}

#[derive(Debug)]
pub(crate) struct QuizParams {
    pub(crate) content_id: Id,
    pub(crate) options: QuizOptions,
}

impl TryFrom<FormData> for QuizParams {
    type Error = Error;

    fn try_from(form: FormData) -> Result<Self, Self::Error> {
        Ok(Self {
            content_id: form.required_id("content_id")?,
            options: QuizOptions::new(
                count(&form, "number_of_questions")?,
                form.text("difficulty"),
                form.text("mode"),
            ),
        })
    }
}

#[derive(Debug)]
pub(crate) struct PresentationParams {
    pub(crate) content_id: Id,
    pub(crate) options: PresentationOptions,
}

impl TryFrom<FormData> for PresentationParams {
    type Error = Error;

    fn try_from(form: FormData) -> Result<Self, Self::Error> {
        // `max_slides` is the field name older clients send.
        let slide_count = match count(&form, "slide_count")? {
            Some(n) => Some(n),
            None => count(&form, "max_slides")?,
        };
        let theme = form.text("theme");

        Ok(Self {
            content_id: form.required_id("content_id")?,
            options: PresentationOptions::new(
                slide_count,
                theme.as_deref(),
                form.flag("include_images")?,
            ),
        })
    }
}

#[derive(Debug)]
pub(crate) struct ChatParams {
    pub(crate) content_id: Id,
    pub(crate) question: String,
    pub(crate) chat_history: Option<Vec<Message>>,
}

impl TryFrom<FormData> for ChatParams {
    type Error = Error;

    fn try_from(form: FormData) -> Result<Self, Self::Error> {
        let question = form
            .raw("question")
            .or_else(|| form.raw("user_question"))
            .unwrap_or_default();

        let chat_history = form
            .text("chat_history")
            .map(|history| {
                serde_json::from_str::<Vec<Message>>(&history).map_err(|_| {
                    DomainError::invalid("chat_history must be a JSON array of messages")
                })
            })
            .transpose()?
            // An empty history means "use the stored conversation".
            .filter(|history| !history.is_empty());

        Ok(Self {
            content_id: form.required_id("content_id")?,
            question,
            chat_history,
        })
    }
}

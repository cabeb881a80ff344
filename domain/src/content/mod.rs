//! Uploaded study material: normalization, persistence and the ownership guard
//! every content-scoped operation goes through.

use crate::contents;
use crate::error::Error;
use crate::text_processing;
use chrono::{DateTime, FixedOffset};
use entity::input_type::InputType;
use entity::Id;
use log::*;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use service::config::Config;
use study_ai::traits::transcription;

pub mod extract;
pub mod normalize;

pub use normalize::{
    process_content, ContentInput, ProgressEvent, ProgressSink, Stage, UploadedFile,
};

const MAX_TITLE_CHARS: usize = 200;

/// One row of a user's upload history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryItem {
    pub content_id: Id,
    pub input_type: InputType,
    pub created_at: DateTime<FixedOffset>,
    pub preview: String,
    pub title: Option<String>,
}

impl From<&contents::Model> for HistoryItem {
    fn from(content: &contents::Model) -> Self {
        Self {
            content_id: content.id,
            input_type: content.input_type,
            created_at: content.created_at,
            preview: text_processing::preview(&content.normalized_text),
            title: content.title.clone(),
        }
    }
}

/// The full normalized text of a content record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentSource {
    pub content_id: Id,
    pub input_type: InputType,
    pub title: Option<String>,
    pub source_name: Option<String>,
    pub normalized_text: String,
    pub created_at: DateTime<FixedOffset>,
}

impl From<contents::Model> for ContentSource {
    fn from(content: contents::Model) -> Self {
        Self {
            content_id: content.id,
            input_type: content.input_type,
            title: content.title,
            source_name: content.source_name,
            normalized_text: content.normalized_text,
            created_at: content.created_at,
        }
    }
}

/// Loads a content record on behalf of `user_id`.
///
/// Missing records are reported as "Content not found" and records owned by
/// someone else as "Access denied".
pub async fn find_owned(
    db: &DatabaseConnection,
    content_id: Id,
    user_id: Id,
) -> Result<contents::Model, Error> {
    let content = match entity_api::content::find_by_id(db, content_id).await {
        Ok(content) => content,
        Err(err) => {
            let err: Error = err.into();
            return Err(if err.is_not_found() {
                Error::not_found("Content not found")
            } else {
                err
            });
        }
    };

    if content.user_id != user_id {
        warn!("User {user_id} tried to access content {content_id} of another user");
        return Err(Error::forbidden("Access denied"));
    }
    Ok(content)
}

/// Normalizes an upload and stores it for `user_id`, reporting progress along the way.
/// A failure is reported to `progress` as an `error` stage before it is returned.
pub async fn upload(
    db: &DatabaseConnection,
    config: &Config,
    transcriber: Option<&dyn transcription::Provider>,
    user_id: Id,
    input: ContentInput,
    progress: &dyn ProgressSink,
) -> Result<contents::Model, Error> {
    progress.report(ProgressEvent::new(Stage::Received, "Upload received", 10));

    let result = async {
        let source_name = input.source_name();

        progress.report(ProgressEvent::new(
            Stage::Processing,
            "Extracting text from your content",
            30,
        ));
        let (input_type, normalized_text) = process_content(config, transcriber, input).await?;

        progress.report(ProgressEvent::new(Stage::Saving, "Saving content", 80));
        let content =
            entity_api::content::create(db, user_id, input_type, normalized_text, source_name)
                .await?;
        info!("Stored {input_type} content {} for user {user_id}", content.id);
        Ok::<_, Error>(content)
    }
    .await;

    match &result {
        Ok(content) => progress.report(ProgressEvent {
            content_id: Some(content.id),
            input_type: Some(content.input_type),
            ..ProgressEvent::new(Stage::Complete, "Content processed successfully", 100)
        }),
        Err(err) => {
            warn!("Upload for user {user_id} failed: {err}");
            progress.report(ProgressEvent::new(Stage::Error, err.client_message(), 100))
        }
    }

    result
}

/// A user's uploads, newest first.
pub async fn history(db: &DatabaseConnection, user_id: Id) -> Result<Vec<HistoryItem>, Error> {
    let contents = entity_api::content::find_by_user(db, user_id).await?;
    Ok(contents.iter().map(HistoryItem::from).collect())
}

pub async fn source(
    db: &DatabaseConnection,
    content_id: Id,
    user_id: Id,
) -> Result<ContentSource, Error> {
    Ok(find_owned(db, content_id, user_id).await?.into())
}

/// Sets a display title. Titles are trimmed and must be 1 to 200 characters long.
pub async fn rename(
    db: &DatabaseConnection,
    content_id: Id,
    user_id: Id,
    title: &str,
) -> Result<HistoryItem, Error> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::invalid("Title cannot be empty"));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(Error::invalid(format!(
            "Title cannot be longer than {MAX_TITLE_CHARS} characters"
        )));
    }

    find_owned(db, content_id, user_id).await?;
    let renamed = entity_api::content::rename(db, content_id, title.to_string()).await?;
    Ok(HistoryItem::from(&renamed))
}

/// Deletes a content record together with its outputs and quiz attempts.
pub async fn delete(db: &DatabaseConnection, content_id: Id, user_id: Id) -> Result<(), Error> {
    find_owned(db, content_id, user_id).await?;
    Ok(entity_api::content::delete_by_id(db, content_id).await?)
}

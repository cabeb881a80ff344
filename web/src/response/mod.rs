//! Response bodies whose shape is fixed by the clients of the API.

use domain::content::HistoryItem;
use domain::generated_output::OutputSummary;
use domain::Id;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct MessageResponse {
    pub(crate) message: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CurrentUser {
    pub(crate) user_id: Id,
    pub(crate) email: String,
    pub(crate) name: String,
}

impl From<domain::users::Model> for CurrentUser {
    fn from(user: domain::users::Model) -> Self {
        Self {
            user_id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct Uploaded {
    pub(crate) content_id: Id,
    pub(crate) normalized_text: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct History {
    pub(crate) history: Vec<HistoryItem>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ContentOutputs {
    pub(crate) content_id: Id,
    pub(crate) outputs: Vec<OutputSummary>,
}

#[derive(Debug, Serialize)]
pub(crate) struct VideoTranscript {
    pub(crate) transcript: String,
    pub(crate) transcription_id: Id,
}

use crate::extractors::form_data::FormData;
use domain::content::ContentInput;
use domain::Id;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

impl From<FormData> for ContentInput {
    fn from(mut form: FormData) -> Self {
        ContentInput {
            file: form.file.take(),
            youtube_url: form.raw("youtube_url"),
            text: form.raw("text"),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RenameParams {
    pub title: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttemptsParams {
    /// Only list attempts for this content record.
    #[param(value_type = Option<String>, format = Uuid)]
    pub content_id: Option<Id>,
}

use crate::extractors::{authenticated_user::AuthenticatedUser, form_data::FormData, path::Path};
use crate::params::generation::PresentationParams;
use crate::{AppState, Error};
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use domain::gateway;
use domain::presentation as PresentationApi;
use domain::Id;
use log::*;

const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// POST generate a slide deck from a content record
#[utoipa::path(
    post,
    path = "/content/presentation",
    request_body(content_type = "multipart/form-data", description = "`content_id`, optional `slide_count` (3 to 20, default 10), `theme` (modern | minimal | business) and `include_images`"),
    responses(
        (status = 200, description = "`{content_id, output_id, slide_structure, download_url}`"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Content not found"),
        (status = 502, description = "The language model failed")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    form: FormData,
) -> Result<impl IntoResponse, Error> {
    let params = PresentationParams::try_from(form)?;
    debug!("POST presentation: {params:?}");

    let provider = gateway::groq_chat(&app_state.config)?;
    let image_sources = gateway::image_sources(&app_state.config);
    let presentation = PresentationApi::create(
        app_state.db_conn_ref(),
        &app_state.config,
        &provider,
        &image_sources,
        user.id,
        params.content_id,
        params.options,
    )
    .await?;

    Ok(Json(presentation))
}

/// GET the `.pptx` file of a generated presentation
#[utoipa::path(
    get,
    path = "/content/presentation/{output_id}/download",
    params(
        ("output_id" = String, Path, format = Uuid, description = "Presentation output id")
    ),
    responses(
        (status = 200, description = "The presentation file as an attachment"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Presentation not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn download(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(output_id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET presentation download {output_id}");

    let file = PresentationApi::download(
        app_state.db_conn_ref(),
        &app_state.config,
        output_id,
        user.id,
    )
    .await?;

    let disposition = format!("attachment; filename=\"{}\"", file.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, PPTX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    ))
}

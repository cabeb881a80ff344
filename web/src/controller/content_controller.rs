use crate::controller::ApiResponse;
use crate::extractors::{authenticated_user::AuthenticatedUser, form_data::FormData, path::Path};
use crate::params::content::RenameParams;
use crate::response::{ContentOutputs, History, Uploaded};
use crate::{AppState, Error};
use async_stream::stream;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::Json;
use domain::content::{self as ContentApi, ContentInput, ProgressEvent};
use domain::gateway::{self, whisper};
use domain::generated_output as GeneratedOutputApi;
use domain::Id;
use futures::Stream;
use log::*;
use service::config::Config;
use std::convert::Infallible;
use study_ai::traits::transcription;
use tokio::sync::mpsc;

/// Speech-to-text is only needed for audio inputs, so a missing key is not an error here.
pub(crate) fn optional_transcriber(config: &Config) -> Result<Option<whisper::Client>, Error> {
    match config.groq_api_key() {
        Some(_) => Ok(Some(gateway::groq_whisper(config)?)),
        None => Ok(None),
    }
}

/// POST normalize an uploaded file, YouTube URL or pasted text into a content record
#[utoipa::path(
    post,
    path = "/content/upload",
    request_body(content_type = "multipart/form-data", description = "Exactly one of `file`, `youtube_url` or `text`"),
    responses(
        (status = 200, description = "Content stored, returns `{content_id, normalized_text}`"),
        (status = 400, description = "No input, several inputs or an unreadable input"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    form: FormData,
) -> Result<impl IntoResponse, Error> {
    debug!("POST upload for user {}", user.id);

    let transcriber = optional_transcriber(&app_state.config)?;
    let content = ContentApi::upload(
        app_state.db_conn_ref(),
        &app_state.config,
        transcriber
            .as_ref()
            .map(|t| t as &dyn transcription::Provider),
        user.id,
        ContentInput::from(form),
        &(),
    )
    .await?;

    Ok(Json(Uploaded {
        content_id: content.id,
        normalized_text: content.normalized_text,
    }))
}

/// POST the same as `/content/upload`, answered with Server-Sent Events.
///
/// Each event carries `{stage, message, percentage}`; the final `complete` event adds
/// `content_id` and `input_type`, while a failure ends the stream with an `error` event.
#[utoipa::path(
    post,
    path = "/content/upload-stream",
    request_body(content_type = "multipart/form-data", description = "Exactly one of `file`, `youtube_url` or `text`"),
    responses(
        (status = 200, description = "text/event-stream of progress updates"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_stream(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    form: FormData,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, Error> {
    debug!("POST upload-stream for user {}", user.id);

    let transcriber = optional_transcriber(&app_state.config)?;
    let input = ContentInput::from(form);
    let (tx, mut rx) = mpsc::unbounded_channel::<ProgressEvent>();
    let user_id = user.id;

    // Runs to completion even if the client disconnects.
    tokio::spawn(async move {
        let transcriber = transcriber
            .as_ref()
            .map(|t| t as &dyn transcription::Provider);
        if let Err(err) = ContentApi::upload(
            app_state.db_conn_ref(),
            &app_state.config,
            transcriber,
            user_id,
            input,
            &tx,
        )
        .await
        {
            debug!("Streamed upload for user {user_id} ended with an error: {err}");
        }
    });

    let stream = stream! {
        while let Some(progress) = rx.recv().await {
            match Event::default().json_data(&progress) {
                Ok(event) => yield Ok::<_, Infallible>(event),
                Err(err) => warn!("Could not encode upload progress: {err}"),
            }
        }
        trace!("Upload progress stream for user {user_id} closed");
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// GET the user's uploads, newest first
#[utoipa::path(
    get,
    path = "/content/history",
    responses(
        (status = 200, description = "`{history: [{content_id, input_type, created_at, preview, title}]}`"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn history(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET content history for user {}", user.id);

    let history = ContentApi::history(app_state.db_conn_ref(), user.id).await?;

    Ok(Json(History { history }))
}

/// GET the outputs generated from one content record, newest first
#[utoipa::path(
    get,
    path = "/content/{id}/outputs",
    params(
        ("id" = String, Path, format = Uuid, description = "Content id")
    ),
    responses(
        (status = 200, description = "`{content_id, outputs: [{output_id, feature, options, created_at, score}]}`"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Content not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn outputs(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET outputs of content {id}");

    let outputs = GeneratedOutputApi::list_for_content(app_state.db_conn_ref(), id, user.id).await?;

    Ok(Json(ContentOutputs {
        content_id: id,
        outputs,
    }))
}

/// GET the normalized text of a content record
#[utoipa::path(
    get,
    path = "/content/{id}/source",
    params(
        ("id" = String, Path, format = Uuid, description = "Content id")
    ),
    responses(
        (status = 200, description = "`{content_id, input_type, title, source_name, normalized_text, created_at}`"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Content not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn source(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET source of content {id}");

    let source = ContentApi::source(app_state.db_conn_ref(), id, user.id).await?;

    Ok(Json(source))
}

/// PATCH the display title of a content record
#[utoipa::path(
    patch,
    path = "/content/{id}/rename",
    params(
        ("id" = String, Path, format = Uuid, description = "Content id")
    ),
    request_body = RenameParams,
    responses(
        (status = 200, description = "The renamed history item"),
        (status = 400, description = "Empty or overlong title"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Content not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn rename(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<RenameParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PATCH rename content {id} to {:?}", params.title);

    let item = ContentApi::rename(app_state.db_conn_ref(), id, user.id, &params.title).await?;

    Ok(Json(item))
}

/// DELETE a content record with its outputs and quiz attempts
#[utoipa::path(
    delete,
    path = "/content/{id}",
    params(
        ("id" = String, Path, format = Uuid, description = "Content id")
    ),
    responses(
        (status = 200, description = "Content deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Content not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE content {id}");

    ContentApi::delete(app_state.db_conn_ref(), id, user.id).await?;

    Ok(Json(ApiResponse::<()>::no_content(
        StatusCode::NO_CONTENT.into(),
    )))
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use crate::router::define_routes;
    use crate::AppState;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use chrono::Utc;
    use domain::{contents, users, Id, InputType};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::{json, Value};
    use service::config::Config;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn user() -> users::Model {
        users::Model {
            id: Id::new_v4(),
            name: "Test Learner".to_string(),
            email: "learner@domain.com".to_string(),
            password: password_auth::generate_hash("password2"),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn content(user_id: Id, text: &str) -> contents::Model {
        contents::Model {
            id: Id::new_v4(),
            user_id,
            input_type: InputType::Text,
            normalized_text: text.to_string(),
            title: None,
            source_name: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    async fn send(db: MockDatabase, user: &users::Model, request: Request<Body>) -> (StatusCode, Value) {
        let config = Config::from_args(["edugen", "--jwt-secret", "controller-test-secret"]);
        let token = domain::jwt::issue_access_token(&config, user).unwrap();
        let db = Arc::new(db.into_connection());
        let app = define_routes(AppState::new(config, &db));

        let (mut parts, body) = request.into_parts();
        parts.headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {}", token.access_token).parse().unwrap(),
        );
        let response = app
            .oneshot(Request::from_parts(parts, body))
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn text_uploads_are_cleaned_and_stored() {
        let user = user();
        let stored = content(user.id, "Photosynthesis turns light into sugar.");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user.clone()]])
            .append_query_results([[stored.clone()]]);
        let request = Request::builder()
            .method("POST")
            .uri("/content/upload")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(
                "text=Photosynthesis++turns%0Alight+into+sugar.",
            ))
            .unwrap();

        let (status, body) = send(db, &user, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content_id"], json!(stored.id));
        assert_eq!(
            body["normalized_text"],
            "Photosynthesis turns light into sugar."
        );
    }

    #[tokio::test]
    async fn uploads_without_input_are_rejected() {
        let user = user();
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[user.clone()]]);
        let request = Request::builder()
            .method("POST")
            .uri("/content/upload")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("text=++&youtube_url="))
            .unwrap();

        let (status, body) = send(db, &user, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"detail": "No input provided"}));
    }

    #[tokio::test]
    async fn history_lists_previews() {
        let user = user();
        let stored = content(user.id, &"a".repeat(250));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user.clone()]])
            .append_query_results([[stored.clone()]]);
        let request = Request::builder()
            .uri("/content/history")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(db, &user, request).await;

        assert_eq!(status, StatusCode::OK);
        let item = &body["history"][0];
        assert_eq!(item["content_id"], json!(stored.id));
        assert_eq!(item["input_type"], "text");
        assert_eq!(item["preview"].as_str().unwrap().len(), 203);
    }

    #[tokio::test]
    async fn other_users_content_is_forbidden() {
        let user = user();
        let stored = content(Id::new_v4(), "not yours");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user.clone()]])
            .append_query_results([[stored.clone()]]);
        let request = Request::builder()
            .uri(format!("/content/{}/source", stored.id))
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(db, &user, request).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({"detail": "Access denied"}));
    }
}

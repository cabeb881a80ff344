use crate::{
    controller::{
        audio_controller, auth_controller,
        content::{
            chat_controller, flashcards_controller, output_controller, presentation_controller,
            quiz_controller, summary_controller,
        },
        content_controller, health_check_controller, transcription_controller, video_controller,
    },
    middleware::auth::require_auth,
    params, AppState,
};
use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
    Router,
};

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "EduGen Platform API"
        ),
        paths(
            auth_controller::signup,
            auth_controller::login,
            auth_controller::me,
            content_controller::upload,
            content_controller::upload_stream,
            content_controller::history,
            content_controller::outputs,
            content_controller::source,
            content_controller::rename,
            content_controller::delete,
            summary_controller::create,
            flashcards_controller::create,
            quiz_controller::create,
            quiz_controller::evaluate,
            quiz_controller::attempts,
            presentation_controller::create,
            presentation_controller::download,
            chat_controller::create,
            output_controller::read,
            output_controller::delete,
            output_controller::score,
            audio_controller::transcribe,
            audio_controller::transcribe_and_summarize,
            video_controller::transcribe,
            transcription_controller::index,
            transcription_controller::read,
            transcription_controller::delete,
            health_check_controller::health_check,
        ),
        components(
            schemas(
                domain::access_token::AccessToken,
                domain::contents::Model,
                domain::generated_outputs::Model,
                domain::quiz_attempts::Model,
                domain::transcriptions::Model,
                domain::users::Model,
                params::auth::LoginParams,
                params::auth::SignupParams,
                params::content::RenameParams,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "edugen_platform", description = "AI study aids generated from your own material")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Defines the bearer token authentication requirement for gaining access to our
// API endpoints for OpenAPI.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Access token returned from a successful POST /auth/login",
                        ))
                        .build(),
                ),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(auth_routes(app_state.clone()))
        .merge(content_routes(app_state.clone()))
        .merge(generation_routes(app_state.clone()))
        .merge(output_routes(app_state.clone()))
        .merge(quiz_routes(app_state.clone()))
        .merge(transcription_routes(app_state))
        .merge(health_routes())
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn auth_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/auth/signup", post(auth_controller::signup))
        .route("/auth/login", post(auth_controller::login))
        .merge(
            // GET /auth/me
            Router::new()
                .route("/auth/me", get(auth_controller::me))
                .route_layer(from_fn_with_state(app_state.clone(), require_auth)),
        )
        .with_state(app_state)
}

fn content_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/content/upload", post(content_controller::upload))
        .route(
            "/content/upload-stream",
            post(content_controller::upload_stream),
        )
        .route("/content/history", get(content_controller::history))
        .route("/content/:id/outputs", get(content_controller::outputs))
        .route("/content/:id/source", get(content_controller::source))
        .route("/content/:id/rename", patch(content_controller::rename))
        .route("/content/:id", delete(content_controller::delete))
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn generation_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/content/summary", post(summary_controller::create))
        .route("/content/flashcards", post(flashcards_controller::create))
        .route("/content/quiz", post(quiz_controller::create))
        .route(
            "/content/presentation",
            post(presentation_controller::create),
        )
        .route(
            "/content/presentation/:output_id/download",
            get(presentation_controller::download),
        )
        .route("/content/chat", post(chat_controller::create))
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn output_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/content/output/:id", get(output_controller::read))
        .route("/content/output/:id", delete(output_controller::delete))
        .route("/content/output/:id/score", post(output_controller::score))
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn quiz_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/content/quiz/evaluate", post(quiz_controller::evaluate))
        .route("/content/quiz/attempts", get(quiz_controller::attempts))
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn transcription_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/audio/transcribe", post(audio_controller::transcribe))
        .route(
            "/audio/transcribe-and-summarize",
            post(audio_controller::transcribe_and_summarize),
        )
        .route("/video/transcribe", post(video_controller::transcribe))
        .route("/transcriptions", get(transcription_controller::index))
        .route("/transcriptions/:id", get(transcription_controller::read))
        .route(
            "/transcriptions/:id",
            delete(transcription_controller::delete),
        )
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_declares_bearer_auth() {
        let doc = ApiDoc::openapi();

        let schemes = doc.components.unwrap().security_schemes;
        assert!(schemes.contains_key("bearer_auth"));
        assert!(doc.paths.paths.contains_key("/content/upload"));
    }
}

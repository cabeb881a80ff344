use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use log::*;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use self::error::{Error, Result};
pub use service::AppState;

mod controller;
mod error;
mod extractors;
mod middleware;
mod params;
mod response;
pub mod router;

/// Binds the configured interface and port and serves the API until the process exits.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let interface = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let host = format!("{interface}:{}", app_state.config.port);

    let cors_layer = cors_layer(&app_state.config.allowed_origins);
    let body_limit = DefaultBodyLimit::max(app_state.config.upload_limit_bytes);

    let app = router::define_routes(app_state)
        .layer(body_limit)
        .layer(cors_layer);

    info!("Server starting... listening for connections on http://{host}");
    let listener = TcpListener::bind(&host).await?;
    axum::serve(listener, app).await
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring malformed CORS origin: {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
}

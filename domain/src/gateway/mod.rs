//! Clients for the external services study aids are built with.
//!
//! Each client implements one of the `study_ai` provider traits so the generators
//! can be exercised against mocks. The constructors here read keys and base URLs
//! from `Config`; a missing key only becomes an error when a feature needs it.

use crate::error::Error;
use log::*;
use service::config::Config;
use std::time::Duration;
use study_ai::traits::image_search;
use study_ai::types::image::Image;

pub mod media;
pub mod openai_compat;
pub mod pexels;
pub mod unsplash;
pub mod whisper;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

/// Chat client for Groq, which serves the fast and large models.
pub fn groq_chat(config: &Config) -> Result<openai_compat::Client, Error> {
    let api_key = config.groq_api_key().ok_or_else(|| {
        warn!("GROQ_API_KEY is not configured");
        Error::config("GROQ_API_KEY")
    })?;
    openai_compat::Client::new("groq", &api_key, config.groq_base_url())
}

/// Chat client for OpenRouter, which serves the reasoning model.
pub fn openrouter_chat(config: &Config) -> Result<openai_compat::Client, Error> {
    let api_key = config.openrouter_api_key().ok_or_else(|| {
        warn!("OPENROUTER_API_KEY is not configured");
        Error::config("OPENROUTER_API_KEY")
    })?;
    openai_compat::Client::new("openrouter", &api_key, config.openrouter_base_url())
}

/// Whisper speech-to-text client on Groq.
pub fn groq_whisper(config: &Config) -> Result<whisper::Client, Error> {
    let api_key = config.groq_api_key().ok_or_else(|| {
        warn!("GROQ_API_KEY is not configured");
        Error::config("GROQ_API_KEY")
    })?;
    whisper::Client::new(
        &api_key,
        config.groq_base_url(),
        config.transcription_model(),
    )
}

/// Image sources in the order they should be tried. Sources without a key are left out.
pub fn image_sources(config: &Config) -> Vec<Box<dyn image_search::Provider>> {
    let mut sources: Vec<Box<dyn image_search::Provider>> = Vec::new();

    if let Some(key) = config.unsplash_access_key() {
        match unsplash::Client::new(&key, config.unsplash_base_url()) {
            Ok(client) => sources.push(Box::new(client)),
            Err(err) => warn!("Skipping Unsplash image source: {err}"),
        }
    }
    if let Some(key) = config.pexels_api_key() {
        match pexels::Client::new(&key, config.pexels_base_url()) {
            Ok(client) => sources.push(Box::new(client)),
            Err(err) => warn!("Skipping Pexels image source: {err}"),
        }
    }

    sources
}

fn http_client(headers: reqwest::header::HeaderMap) -> Result<reqwest::Client, Error> {
    Ok(reqwest::Client::builder()
        .use_rustls_tls()
        .timeout(REQUEST_TIMEOUT)
        .default_headers(headers)
        .build()?)
}

fn secret_header(value: &str) -> Result<reqwest::header::HeaderValue, Error> {
    let mut header_value = reqwest::header::HeaderValue::from_str(value).map_err(|e| {
        warn!("Failed to create auth header: {:?}", e);
        Error::internal("Invalid API key format")
    })?;
    header_value.set_sensitive(true);
    Ok(header_value)
}

/// Maps a transport failure onto the provider-agnostic error type.
fn transport_error(provider: &str, err: reqwest::Error) -> study_ai::Error {
    warn!("{provider} request failed: {err:?}");
    if err.is_timeout() {
        study_ai::Error::Timeout(err.to_string())
    } else if err.is_decode() {
        study_ai::Error::Deserialization(err.to_string())
    } else {
        study_ai::Error::Network(err.to_string())
    }
}

/// Maps a non-success response onto the provider-agnostic error type.
async fn status_error(provider: &str, response: reqwest::Response) -> study_ai::Error {
    let status = response.status();
    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    let error_text = response.text().await.unwrap_or_default();
    error!("{provider} API returned {status}: {error_text}");

    match status.as_u16() {
        401 | 403 => study_ai::Error::Authentication(error_text),
        429 => study_ai::Error::RateLimited {
            retry_after_seconds: retry_after.unwrap_or(60),
        },
        _ => study_ai::Error::Provider(format!("{status}: {error_text}")),
    }
}

/// Fetches the bytes of a found image.
async fn download_image(
    provider: &str,
    client: &reqwest::Client,
    url: &str,
) -> Result<Image, study_ai::Error> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| transport_error(provider, e))?;
    if !response.status().is_success() {
        return Err(status_error(provider, response).await);
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("image/jpeg")
        .to_string();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| transport_error(provider, e))?;

    Ok(Image {
        bytes: bytes.to_vec(),
        content_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, InternalErrorKind};

    #[test]
    fn missing_keys_are_config_errors() {
        let config = Config::from_args(["edugen"]);

        if config.groq_api_key().is_none() {
            let err = groq_chat(&config).unwrap_err();
            assert_eq!(
                err.error_kind,
                DomainErrorKind::Internal(InternalErrorKind::Config("GROQ_API_KEY".to_string()))
            );
        }
        if config.openrouter_api_key().is_none() {
            assert!(openrouter_chat(&config).is_err());
        }
    }

    #[test]
    fn image_sources_follow_configured_keys() {
        let config = Config::from_args(["edugen"])
            .set_unsplash("u-key", "http://localhost:1")
            .set_pexels("p-key", "http://localhost:2");

        let sources = image_sources(&config);
        let ids: Vec<&str> = sources.iter().map(|s| s.provider_id()).collect();

        assert_eq!(ids, vec!["unsplash", "pexels"]);
    }
}

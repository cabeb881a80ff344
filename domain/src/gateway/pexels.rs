//! Pexels photo search, used when Unsplash has nothing.

use super::{download_image, http_client, secret_header, status_error, transport_error};
use crate::error::Error;
use async_trait::async_trait;
use serde::Deserialize;
use study_ai::traits::image_search::Provider;
use study_ai::types::image::Image;

const PROVIDER: &str = "pexels";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    src: PhotoSources,
}

#[derive(Debug, Deserialize)]
struct PhotoSources {
    large: Option<String>,
}

pub struct Client {
    client: reqwest::Client,
    base_url: String,
}

impl Client {
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, Error> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::AUTHORIZATION, secret_header(api_key)?);

        Ok(Self {
            client: http_client(headers)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Provider for Client {
    async fn find_image(&self, keyword: &str) -> Result<Option<Image>, study_ai::Error> {
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("query", keyword),
                ("per_page", "1"),
                ("orientation", "landscape"),
            ])
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(status_error(PROVIDER, response).await);
        }

        let results: SearchResponse = response
            .json()
            .await
            .map_err(|e| study_ai::Error::Deserialization(e.to_string()))?;

        let Some(url) = results.photos.into_iter().find_map(|photo| photo.src.large) else {
            return Ok(None);
        };
        Ok(Some(download_image(PROVIDER, &self.client, &url).await?))
    }

    fn provider_id(&self) -> &'static str {
        PROVIDER
    }
}

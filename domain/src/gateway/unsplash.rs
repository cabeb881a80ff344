//! Unsplash random-photo search, the first choice for slide images.

use super::{download_image, http_client, status_error, transport_error};
use crate::error::Error;
use async_trait::async_trait;
use log::*;
use serde::Deserialize;
use study_ai::traits::image_search::Provider;
use study_ai::types::image::Image;

const PROVIDER: &str = "unsplash";

#[derive(Debug, Deserialize)]
struct RandomPhoto {
    urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    regular: Option<String>,
}

pub struct Client {
    client: reqwest::Client,
    access_key: String,
    base_url: String,
}

impl Client {
    pub fn new(access_key: &str, base_url: &str) -> Result<Self, Error> {
        Ok(Self {
            client: http_client(reqwest::header::HeaderMap::new())?,
            access_key: access_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Provider for Client {
    async fn find_image(&self, keyword: &str) -> Result<Option<Image>, study_ai::Error> {
        let response = self
            .client
            .get(format!("{}/photos/random", self.base_url))
            .query(&[
                ("query", keyword),
                ("orientation", "landscape"),
                ("client_id", self.access_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!("No Unsplash photo for '{keyword}'");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(status_error(PROVIDER, response).await);
        }

        let photo: RandomPhoto = response
            .json()
            .await
            .map_err(|e| study_ai::Error::Deserialization(e.to_string()))?;

        match photo.urls.regular {
            Some(url) => Ok(Some(download_image(PROVIDER, &self.client, &url).await?)),
            None => Ok(None),
        }
    }

    fn provider_id(&self) -> &'static str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn finds_and_downloads_a_landscape_photo() {
        let mut server = Server::new_async().await;
        let image_url = format!("{}/img/forest.jpg", server.url());
        let search = server
            .mock("GET", "/photos/random")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "forest".into()),
                Matcher::UrlEncoded("orientation".into(), "landscape".into()),
                Matcher::UrlEncoded("client_id".into(), "u-key".into()),
            ]))
            .with_status(200)
            .with_body(json!({"urls": {"regular": image_url}}).to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/img/forest.jpg")
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body([137u8, 80, 78, 71])
            .create_async()
            .await;

        let client = Client::new("u-key", &server.url()).unwrap();
        let image = client.find_image("forest").await.unwrap().unwrap();

        search.assert_async().await;
        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.bytes, vec![137u8, 80, 78, 71]);
    }

    #[tokio::test]
    async fn not_found_means_no_image() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/photos/random")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let client = Client::new("u-key", &server.url()).unwrap();
        assert!(client.find_image("zzzz").await.unwrap().is_none());
    }
}

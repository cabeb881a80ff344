//! Stock image search provider trait.

use crate::types::image::Image;
use crate::Error;
use async_trait::async_trait;

/// Finds a single landscape photo matching a keyword.
#[async_trait]
pub trait Provider: Send + Sync {
    /// `Ok(None)` means the search succeeded but found nothing usable.
    async fn find_image(&self, keyword: &str) -> Result<Option<Image>, Error>;

    fn provider_id(&self) -> &'static str;
}

//! Mock provider implementations for local development.

use super::{GeneratedImage, ImageFetcher, ImageGenerator, ProviderError};
use crate::models::Orientation;
use async_trait::async_trait;
use uuid::Uuid;

/// A 1x1 transparent PNG.
pub const PLACEHOLDER_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f, 0x15, 0xc4,
    0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae,
    0x42, 0x60, 0x82,
];

/// Mock image generator; hands out `mock://` references.
pub struct MockImageGenerator;

impl MockImageGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MockImageGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    async fn generate(
        &self,
        prompt: &str,
        orientation: Orientation,
    ) -> Result<GeneratedImage, ProviderError> {
        tracing::debug!(%orientation, prompt_len = prompt.len(), "Mock image generation");

        Ok(GeneratedImage {
            url: format!("mock://images/{}.png", Uuid::new_v4()),
            revised_prompt: None,
        })
    }
}

/// Mock fetcher that resolves any reference to [`PLACEHOLDER_PNG`].
pub struct MockImageFetcher;

impl MockImageFetcher {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MockImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageFetcher for MockImageFetcher {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>, ProviderError> {
        Ok(PLACEHOLDER_PNG.to_vec())
    }
}

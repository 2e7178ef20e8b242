//! Image provider abstractions and implementations.
//!
//! The orchestrator talks to the outside world through two traits: an
//! [`ImageGenerator`] that turns a prompt into a remote image reference and an
//! [`ImageFetcher`] that downloads the bytes behind that reference. Both have
//! an HTTP implementation and a mock used when the provider is disabled.

pub mod fetcher;
pub mod mock;
pub mod openai;

use crate::models::Orientation;
use async_trait::async_trait;
use thiserror::Error;

pub use fetcher::HttpImageFetcher;
pub use mock::{MockImageFetcher, MockImageGenerator};
pub use openai::{OpenAiConfig, OpenAiImageGenerator};

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered: {0}")]
    ContentFiltered(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Empty response: {0}")]
    EmptyResponse(String),
}

/// A freshly generated image that still lives on the provider's side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// Temporary URL of the generated image.
    pub url: String,

    /// Prompt as rewritten by the provider, if it changed it.
    pub revised_prompt: Option<String>,
}

/// Trait for prompt-to-image providers (e.g., DALL-E).
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        orientation: Orientation,
    ) -> Result<GeneratedImage, ProviderError>;
}

/// Downloads the raw bytes of a generated image.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ProviderError>;
}

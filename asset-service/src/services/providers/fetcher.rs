use super::{ImageFetcher, ProviderError};
use async_trait::async_trait;
use reqwest::Client;

/// Downloads generated images over plain HTTP(S).
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(format!("Failed to download image: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(ProviderError::ApiError(format!(
                "Image download returned status {}",
                status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::NetworkError(format!("Failed to read image body: {}", e)))?;

        tracing::debug!(size = bytes.len(), "Downloaded generated image");

        Ok(bytes.to_vec())
    }
}

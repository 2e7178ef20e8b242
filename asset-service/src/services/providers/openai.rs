//! OpenAI image provider implementation.
//!
//! Calls the Images API (`/images/generations`) and returns the temporary URL
//! of the single generated image together with the revised prompt.

use super::{GeneratedImage, ImageGenerator, ProviderError};
use crate::models::Orientation;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// OpenAI provider configuration.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
}

/// OpenAI image generator.
pub struct OpenAiImageGenerator {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiImageGenerator {
    pub fn new(config: OpenAiConfig, client: Client) -> Self {
        Self { config, client }
    }

    fn api_url(&self) -> String {
        format!(
            "{}/images/generations",
            self.config.api_base.trim_end_matches('/')
        )
    }

    fn build_request<'a>(&'a self, prompt: &'a str, orientation: Orientation) -> ImageRequest<'a> {
        ImageRequest {
            model: &self.config.model,
            prompt,
            n: 1,
            size: orientation.size(),
            response_format: "url",
        }
    }
}

#[async_trait]
impl ImageGenerator for OpenAiImageGenerator {
    async fn generate(
        &self,
        prompt: &str,
        orientation: Orientation,
    ) -> Result<GeneratedImage, ProviderError> {
        let request = self.build_request(prompt, orientation);

        tracing::debug!(
            model = %self.config.model,
            size = %request.size,
            prompt_len = prompt.len(),
            "Sending request to OpenAI Images API"
        );

        let response = self
            .client
            .post(self.api_url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_error(status, &error_text));
        }

        let api_response: ImageResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        api_response.into_generated_image()
    }
}

fn classify_error(status: StatusCode, body: &str) -> ProviderError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return ProviderError::RateLimited;
    }

    let detail = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);

    match detail {
        Some(detail) if detail.code.as_deref() == Some("content_policy_violation") => {
            ProviderError::ContentFiltered(detail.message)
        }
        Some(detail) if status == StatusCode::BAD_REQUEST => {
            ProviderError::InvalidRequest(detail.message)
        }
        _ => ProviderError::ApiError(format!("OpenAI API error {}: {}", status, body)),
    }
}

// ============================================================================
// OpenAI API types
// ============================================================================

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: String,
    response_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

impl ImageResponse {
    fn into_generated_image(self) -> Result<GeneratedImage, ProviderError> {
        let image = self
            .data
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::EmptyResponse("no image in response".to_string()))?;

        let url = image
            .url
            .ok_or_else(|| ProviderError::EmptyResponse("image has no url".to_string()))?;

        Ok(GeneratedImage {
            url,
            revised_prompt: image.revised_prompt,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
    revised_prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
    code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> OpenAiImageGenerator {
        OpenAiImageGenerator::new(
            OpenAiConfig {
                api_key: "sk-test".to_string(),
                model: "dall-e-3".to_string(),
                api_base: "https://api.openai.com/v1/".to_string(),
            },
            Client::new(),
        )
    }

    #[test]
    fn api_url_joins_base_without_double_slash() {
        assert_eq!(
            generator().api_url(),
            "https://api.openai.com/v1/images/generations"
        );
    }

    #[test]
    fn request_uses_orientation_size() {
        let generator = generator();
        let request = generator.build_request("a fox", Orientation::Horizontal);
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["size"], "1792x1024");
        assert_eq!(body["n"], 1);
        assert_eq!(body["model"], "dall-e-3");
    }

    #[test]
    fn response_yields_url_and_revised_prompt() {
        let response: ImageResponse = serde_json::from_str(
            r#"{"created":1,"data":[{"url":"https://img/x.png","revised_prompt":"a red fox"}]}"#,
        )
        .unwrap();
        let image = response.into_generated_image().unwrap();
        assert_eq!(image.url, "https://img/x.png");
        assert_eq!(image.revised_prompt.as_deref(), Some("a red fox"));
    }

    #[test]
    fn empty_response_is_an_error() {
        let response: ImageResponse = serde_json::from_str(r#"{"data":[]}"#).unwrap();
        assert!(matches!(
            response.into_generated_image(),
            Err(ProviderError::EmptyResponse(_))
        ));
    }

    #[test]
    fn content_policy_errors_are_classified() {
        let body = r#"{"error":{"message":"rejected","code":"content_policy_violation"}}"#;
        assert!(matches!(
            classify_error(StatusCode::BAD_REQUEST, body),
            ProviderError::ContentFiltered(msg) if msg == "rejected"
        ));
        assert!(matches!(
            classify_error(StatusCode::TOO_MANY_REQUESTS, ""),
            ProviderError::RateLimited
        ));
        assert!(matches!(
            classify_error(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            ProviderError::ApiError(_)
        ));
    }
}

use crate::services::providers::ProviderError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use service_core::error::AppError;
use std::time::Duration;
use thiserror::Error;

/// Failure of an asset operation, as reported to HTTP callers.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Rejected before any side effect. Rendered with an empty body.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Image generation failed: {0}")]
    Generation(#[source] ProviderError),

    #[error("Image download failed: {0}")]
    Fetch(#[source] ProviderError),

    #[error("Image upload failed: {0}")]
    Upload(#[source] AppError),

    #[error("Metadata store error: {0}")]
    Persistence(#[source] AppError),

    #[error("Image delete failed: {0}")]
    Delete(#[source] AppError),

    #[error("{step} timed out after {after:?}")]
    Timeout { step: &'static str, after: Duration },
}

impl AssetError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AssetError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AssetError::Generation(_)
            | AssetError::Fetch(_)
            | AssetError::Upload(_)
            | AssetError::Delete(_) => StatusCode::BAD_GATEWAY,
            AssetError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AssetError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            AssetError::InvalidInput(_) => "Invalid input",
            AssetError::Generation(_) => "Image generation failed",
            AssetError::Fetch(_) => "Image download failed",
            AssetError::Upload(_) => "Image upload failed",
            AssetError::Persistence(_) => "Metadata store error",
            AssetError::Delete(_) => "Image delete failed",
            AssetError::Timeout { .. } => "Upstream timeout",
        }
    }
}

impl IntoResponse for AssetError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
            details: String,
        }

        let status = self.status_code();
        if let AssetError::InvalidInput(_) = self {
            return status.into_response();
        }

        (
            status,
            Json(ErrorResponse {
                error: self.label().to_string(),
                details: self.to_string(),
            }),
        )
            .into_response()
    }
}

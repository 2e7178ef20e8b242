use crate::models::{Asset, Orientation};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One item of a `POST /assets` batch.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetRequest {
    // Counted in characters.
    #[validate(length(min = 3))]
    pub prompt: String,
    pub orientation: Orientation,
    #[serde(default)]
    pub is_transparent: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<serde_json::Value>,
}

impl CreateAssetRequest {
    /// Builds the record persisted for this request once the image is stored.
    pub fn into_asset(
        self,
        code: String,
        url: String,
        revised_prompt: Option<String>,
    ) -> Asset {
        Asset {
            code,
            width: self.orientation.width(),
            height: self.orientation.height(),
            prompt: self.prompt,
            orientation: self.orientation,
            is_transparent: self.is_transparent,
            description: self.description,
            tags: self.tags,
            revised_prompt,
            url: Some(url),
            scene: self.scene,
        }
    }
}

/// Body of `DELETE /assets`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeleteAssetRequest {
    #[validate(length(min = 1))]
    pub code: String,
}

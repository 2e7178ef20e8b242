use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// File extension of every stored image. Blob names are `<code>.png`.
pub const IMAGE_EXTENSION: &str = "png";

/// Output framing requested from the image generator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Square,
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn width(self) -> u32 {
        match self {
            Orientation::Horizontal => 1792,
            Orientation::Square | Orientation::Vertical => 1024,
        }
    }

    pub fn height(self) -> u32 {
        match self {
            Orientation::Vertical => 1792,
            Orientation::Square | Orientation::Horizontal => 1024,
        }
    }

    /// Size string understood by the image API, e.g. `1792x1024`.
    pub fn size(self) -> String {
        format!("{}x{}", self.width(), self.height())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Square => "square",
            Orientation::Horizontal => "horizontal",
            Orientation::Vertical => "vertical",
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated image plus the metadata persisted alongside it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub code: String,
    pub prompt: String,
    pub orientation: Orientation,
    pub is_transparent: bool,
    pub description: String,
    pub tags: Vec<String>,
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Result of an earlier image analysis; opaque to this service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<serde_json::Value>,
}

impl Asset {
    /// Blob name under which the image for `code` is stored.
    pub fn blob_name(code: &str) -> String {
        format!("{}.{}", code, IMAGE_EXTENSION)
    }

    pub fn new_code() -> String {
        Uuid::new_v4().to_string()
    }

    /// Codes are ASCII letters, digits, `-` and `_` only, so a code always
    /// names a single object inside the store and never a path.
    pub fn is_valid_code(code: &str) -> bool {
        !code.is_empty()
            && code
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    }
}

/// Outcome of removing a metadata row, as reported by the store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

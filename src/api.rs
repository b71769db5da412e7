//! The image service the planner talks to.

use std::future::Future;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

use crate::constants::IMAGE_QUALITY;
use crate::error::RefsheetError;

/// Output sizes the Images API accepts for our assets.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum ImageSize {
    /// Square
    #[serde(rename = "1024x1024")]
    Square,
    /// Tall, for full-body poses
    #[serde(rename = "1024x1536")]
    Portrait,
    /// Wide, for multi-view sheets
    #[serde(rename = "1536x1024")]
    Landscape,
}

impl ImageSize {
    /// Wire value, e.g. `1024x1536`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "1024x1024",
            Self::Portrait => "1024x1536",
            Self::Landscape => "1536x1024",
        }
    }
}

/// One generation or edit call. Built fresh per call.
#[derive(Clone, Debug, Serialize)]
pub struct ImageRequest {
    /// Full prompt text
    pub prompt: String,
    /// Requested output size
    pub size: ImageSize,
    /// Requested quality level
    pub quality: &'static str,
}

impl ImageRequest {
    /// A request at the default quality.
    pub fn new(prompt: String, size: ImageSize) -> Self {
        Self {
            prompt,
            size,
            quality: IMAGE_QUALITY,
        }
    }
}

/// A hosted image generator. Both calls return the raw JSON response body;
/// see [`crate::decode::decode_image`] for pulling the image out of it.
pub trait ImageApi {
    /// Text-to-image.
    fn generate(&self, request: &ImageRequest)
    -> impl Future<Output = Result<Value, RefsheetError>>;

    /// Image edit, using `images` as reference inputs.
    fn edit(
        &self,
        request: &ImageRequest,
        images: &[PathBuf],
    ) -> impl Future<Output = Result<Value, RefsheetError>>;
}

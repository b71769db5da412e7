//! Shared constants for talking to the Images API
//!

use std::time::Duration;

/// Environment variable holding the API credential.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Default API root, endpoint paths are joined onto it.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1/";

/// Text-to-image endpoint, relative to the API root.
pub const GENERATIONS_PATH: &str = "images/generations";

/// Image edit endpoint, relative to the API root.
pub const EDITS_PATH: &str = "images/edits";

/// Default image model.
pub const DEFAULT_MODEL: &str = "gpt-image-1";

/// Default output root.
pub const DEFAULT_OUT_DIR: &str = "assets/illustrations-openai";

/// Quality requested for every asset.
pub const IMAGE_QUALITY: &str = "high";

/// Multipart field name for edit input images.
pub const EDIT_IMAGE_FIELD: &str = "image[]";

/// How many times a request is tried before giving up.
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Backoff grows by this much per failed attempt...
pub const BACKOFF_STEP: Duration = Duration::from_secs(3);

/// ...up to this ceiling.
pub const BACKOFF_CAP: Duration = Duration::from_secs(10);

/// Per-attempt request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Added to every standard deviation in colour transfer.
pub const COLOR_STD_EPSILON: f64 = 1e-6;

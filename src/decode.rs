//! Pulls image bytes out of Images API responses.

use base64::Engine;
use base64::engine::general_purpose;
use serde_json::Value;

use crate::error::RefsheetError;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_SOI: &[u8] = &[0xFF, 0xD8, 0xFF];

/// Decodes the first `data[].b64_json` entry of a generation/edit response.
pub fn decode_image(response: &Value) -> Result<Vec<u8>, RefsheetError> {
    let first = response
        .get("data")
        .and_then(Value::as_array)
        .and_then(|data| data.first())
        .ok_or_else(|| {
            RefsheetError::MalformedResponse(format!(
                "unexpected response: {}",
                truncated(response)
            ))
        })?;

    let b64 = first
        .get("b64_json")
        .and_then(Value::as_str)
        .filter(|b64| !b64.is_empty())
        .ok_or_else(|| {
            RefsheetError::MalformedResponse(format!(
                "missing image data in response: {}",
                truncated(response)
            ))
        })?;

    general_purpose::STANDARD
        .decode(b64)
        .map_err(|err| RefsheetError::MalformedResponse(format!("bad base64 image: {err}")))
}

/// File extension (without the dot) sniffed from the image's magic bytes.
pub fn guess_extension(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(PNG_SIGNATURE) {
        "png"
    } else if bytes.starts_with(JPEG_SOI) {
        "jpg"
    } else {
        "bin"
    }
}

/// Error messages quote the response; keep them readable.
fn truncated(response: &Value) -> String {
    const LIMIT: usize = 512;
    let text = response.to_string();
    match text.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text,
    }
}

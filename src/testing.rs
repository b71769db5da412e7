//! Shared fixtures for unit tests.

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Mutex;

use base64::Engine;
use base64::engine::general_purpose;
use image::{ImageFormat, Rgb, RgbImage};
use serde_json::{Value, json};

use crate::api::{ImageApi, ImageRequest, ImageSize};
use crate::error::RefsheetError;
use crate::roster::Character;

pub(crate) fn character(slug: &str, name: &str) -> Character {
    Character {
        slug: slug.to_string(),
        name: name.to_string(),
        description: format!("description of {slug}"),
        palette: "main #000000".to_string(),
    }
}

/// A small image whose pixels spread out from `base`, so every channel has
/// some variance.
pub(crate) fn gradient(width: u32, height: u32, base: [u8; 3]) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let step = ((x * 7 + y * 13) % 32) as u8;
        Rgb(base.map(|c| c.saturating_add(step)))
    })
}

pub(crate) fn png_bytes(base: [u8; 3]) -> Vec<u8> {
    let mut out = Vec::new();
    gradient(4, 4, base)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .expect("encode png");
    out
}

pub(crate) fn b64_response(bytes: &[u8]) -> Value {
    json!({"data": [{"b64_json": general_purpose::STANDARD.encode(bytes)}]})
}

/// One call seen by [`ScriptedApi`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    Generate {
        prompt: String,
        size: ImageSize,
    },
    Edit {
        prompt: String,
        size: ImageSize,
        images: Vec<PathBuf>,
    },
}

impl Call {
    pub(crate) fn prompt(&self) -> &str {
        match self {
            Self::Generate { prompt, .. } | Self::Edit { prompt, .. } => prompt,
        }
    }
}

/// Records every call and answers with small PNGs. Prompts containing
/// `fail_on` get a transport error instead; `edit_payload` replaces the
/// bytes every edit returns.
#[derive(Default)]
pub(crate) struct ScriptedApi {
    calls: Mutex<Vec<Call>>,
    fail_on: Option<String>,
    edit_payload: Option<Vec<u8>>,
}

impl ScriptedApi {
    pub(crate) fn failing_on(text: &str) -> Self {
        Self {
            fail_on: Some(text.to_string()),
            ..Self::default()
        }
    }

    pub(crate) fn editing_with(payload: Vec<u8>) -> Self {
        Self {
            edit_payload: Some(payload),
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn answer(&self, call: Call, payload: Vec<u8>) -> Result<Value, RefsheetError> {
        let fail = self
            .fail_on
            .as_deref()
            .is_some_and(|text| call.prompt().contains(text));
        self.calls.lock().expect("calls lock").push(call);
        if fail {
            return Err(RefsheetError::Transport {
                attempts: 3,
                detail: "HTTP 500: scripted failure".to_string(),
            });
        }
        Ok(b64_response(&payload))
    }
}

impl ImageApi for ScriptedApi {
    async fn generate(&self, request: &ImageRequest) -> Result<Value, RefsheetError> {
        self.answer(
            Call::Generate {
                prompt: request.prompt.clone(),
                size: request.size,
            },
            png_bytes([180, 60, 40]),
        )
    }

    async fn edit(
        &self,
        request: &ImageRequest,
        images: &[PathBuf],
    ) -> Result<Value, RefsheetError> {
        self.answer(
            Call::Edit {
                prompt: request.prompt.clone(),
                size: request.size,
                images: images.to_vec(),
            },
            self.edit_payload
                .clone()
                .unwrap_or_else(|| png_bytes([30, 140, 200])),
        )
    }
}

//! Authenticated calls to the Images API, with retries.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::api::{ImageApi, ImageRequest};
use crate::constants::{
    BACKOFF_CAP, BACKOFF_STEP, DEFAULT_ATTEMPTS, EDIT_IMAGE_FIELD, EDITS_PATH, GENERATIONS_PATH,
};
use crate::error::RefsheetError;

/// Linear backoff with a ceiling.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub attempts: u32,
    /// Wait after attempt `n` is `step * n`...
    pub step: Duration,
    /// ...but never more than this
    pub cap: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            step: BACKOFF_STEP,
            cap: BACKOFF_CAP,
        }
    }
}

impl RetryPolicy {
    /// The default backoff with a different attempt count.
    pub fn with_attempts(attempts: u32) -> Self {
        Self {
            attempts,
            ..Self::default()
        }
    }

    /// How long to wait after the given (1-based) failed attempt.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.step.saturating_mul(attempt).min(self.cap)
    }
}

/// Runs `op` until it succeeds or the policy runs out of attempts.
///
/// `op` gets the 1-based attempt number and reports failures as a detail
/// string. Waits happen between attempts, never after the last one. The
/// final error carries the last detail seen.
pub async fn with_retries<T, F, Fut>(
    policy: &RetryPolicy,
    what: &str,
    mut op: F,
) -> Result<T, RefsheetError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, String>>,
{
    let attempts = policy.attempts.max(1);
    let mut last_detail = String::new();
    for attempt in 1..=attempts {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(detail) => {
                warn!("{what}: attempt {attempt}/{attempts} failed: {detail}");
                last_detail = detail;
            }
        }
        if attempt < attempts {
            let delay = policy.delay_after(attempt);
            debug!("{what}: retrying in {}s", delay.as_secs_f32());
            tokio::time::sleep(delay).await;
        }
    }
    Err(RefsheetError::Transport {
        attempts,
        detail: last_detail,
    })
}

/// Request body for POST /images/generations
#[derive(Serialize, Debug)]
struct GenerationBody<'a> {
    model: &'a str,
    #[serde(flatten)]
    request: &'a ImageRequest,
}

/// An input image, read once and re-attached on every attempt.
struct FileUpload {
    file_name: String,
    mime: &'static str,
    bytes: Vec<u8>,
}

/// [`ImageApi`] over HTTPS, bearer-authenticated.
pub struct HttpTransport {
    client: reqwest::Client,
    api_key: String,
    api_base: Url,
    model: String,
    retry: RetryPolicy,
}

impl HttpTransport {
    /// `timeout` applies to each attempt separately.
    pub fn new(
        api_key: &str,
        api_base: Url,
        model: &str,
        retry: RetryPolicy,
        timeout: Duration,
    ) -> Result<Self, RefsheetError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| RefsheetError::Config(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            api_base,
            model: model.to_string(),
            retry,
        })
    }

    async fn post_json<B: Serialize>(&self, url: &Url, body: &B) -> Result<Value, RefsheetError> {
        with_retries(&self.retry, url.path(), move |_| async move {
            let response = self
                .client
                .post(url.clone())
                .bearer_auth(&self.api_key)
                .json(body)
                .send()
                .await
                .map_err(|err| err.to_string())?;
            read_json(response).await
        })
        .await
    }

    async fn post_multipart(
        &self,
        url: &Url,
        fields: &[(&'static str, String)],
        files: &[FileUpload],
    ) -> Result<Value, RefsheetError> {
        with_retries(&self.retry, url.path(), move |_| async move {
            let form = build_form(fields, files)?;
            let response = self
                .client
                .post(url.clone())
                .bearer_auth(&self.api_key)
                .multipart(form)
                .send()
                .await
                .map_err(|err| err.to_string())?;
            read_json(response).await
        })
        .await
    }
}

impl ImageApi for HttpTransport {
    async fn generate(&self, request: &ImageRequest) -> Result<Value, RefsheetError> {
        let url = self.api_base.join(GENERATIONS_PATH)?;
        let body = GenerationBody {
            model: &self.model,
            request,
        };
        self.post_json(&url, &body).await
    }

    async fn edit(
        &self,
        request: &ImageRequest,
        images: &[PathBuf],
    ) -> Result<Value, RefsheetError> {
        let url = self.api_base.join(EDITS_PATH)?;
        let mut files = Vec::with_capacity(images.len());
        for path in images {
            files.push(read_upload(path).await?);
        }
        let fields = [
            ("model", self.model.clone()),
            ("prompt", request.prompt.clone()),
            ("size", request.size.as_str().to_string()),
            ("quality", request.quality.to_string()),
        ];
        self.post_multipart(&url, &fields, &files).await
    }
}

async fn read_upload(path: &Path) -> Result<FileUpload, RefsheetError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|err| RefsheetError::io(path, err))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("image.bin")
        .to_string();
    Ok(FileUpload {
        file_name,
        mime: mime_for_path(path),
        bytes,
    })
}

/// Multipart forms can't be cloned, so each attempt builds a fresh one.
fn build_form(fields: &[(&'static str, String)], files: &[FileUpload]) -> Result<Form, String> {
    let mut form = Form::new();
    for (name, value) in fields {
        form = form.text(*name, value.clone());
    }
    for file in files {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(file.mime)
            .map_err(|err| format!("invalid mime '{}': {err}", file.mime))?;
        form = form.part(EDIT_IMAGE_FIELD, part);
    }
    Ok(form)
}

async fn read_json(response: reqwest::Response) -> Result<Value, String> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|err| format!("failed reading response body: {err}"))?;
    if !status.is_success() {
        return Err(format!(
            "HTTP {}: {}",
            status.as_u16(),
            String::from_utf8_lossy(&bytes)
        ));
    }
    serde_json::from_slice(&bytes).map_err(|err| format!("invalid JSON response: {err}"))
}

/// Best-effort MIME type from the file extension.
fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

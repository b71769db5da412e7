use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use base64::Engine;
use base64::engine::general_purpose;
use clap::Parser;
use image::{ImageFormat, Rgb, RgbImage};
use refsheet::api::{ImageApi, ImageRequest};
use refsheet::batch::{self, EXIT_PARTIAL_FAILURE, EXIT_SUCCESS};
use refsheet::cli::CliOptions;
use refsheet::config::Settings;
use refsheet::error::RefsheetError;
use refsheet::roster;
use serde_json::{Value, json};

/// Answers every call with the same small PNG and counts calls.
#[derive(Default)]
struct CountingApi {
    calls: AtomicUsize,
}

impl CountingApi {
    fn respond(&self) -> Result<Value, RefsheetError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let image = RgbImage::from_fn(4, 4, |x, y| Rgb([(x * 40) as u8, (y * 40) as u8, 90]));
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        Ok(json!({"data": [{"b64_json": general_purpose::STANDARD.encode(png)}]}))
    }
}

impl ImageApi for CountingApi {
    async fn generate(&self, _request: &ImageRequest) -> Result<Value, RefsheetError> {
        self.respond()
    }

    async fn edit(
        &self,
        _request: &ImageRequest,
        _images: &[PathBuf],
    ) -> Result<Value, RefsheetError> {
        self.respond()
    }
}

fn options(out_dir: &std::path::Path, extra: &[&str]) -> CliOptions {
    let out = out_dir.to_string_lossy().to_string();
    let mut argv = vec![
        "refsheet".to_string(),
        "--out-dir".to_string(),
        out,
        "--openai-api-key".to_string(),
        "sk-test".to_string(),
    ];
    argv.extend(extra.iter().map(|arg| arg.to_string()));
    CliOptions::try_parse_from(argv).unwrap()
}

#[test]
fn missing_credential_aborts_before_touching_disk() {
    roster::init().unwrap();
    let root = tempfile::tempdir().unwrap();
    let out_dir = root.path().join("illustrations");

    let mut cli = options(&out_dir, &[]);
    cli.openai_api_key = None;

    let err = Settings::from_cli(&cli, roster::characters().unwrap())
        .err()
        .expect("missing key must fail");
    assert!(matches!(err, RefsheetError::Config(_)));
    assert!(err.to_string().contains("OPENAI_API_KEY"));
    assert!(!out_dir.exists());
}

#[tokio::test]
async fn selected_characters_run_once_then_skip() {
    roster::init().unwrap();
    let root = tempfile::tempdir().unwrap();
    let out_dir = root.path().join("illustrations");

    let cli = options(&out_dir, &["--chars", "suiu-noa,sakaki-shida", "--include-bust"]);
    let settings = Settings::from_cli(&cli, roster::characters().unwrap()).unwrap();

    let api = CountingApi::default();
    let summary = batch::run(&api, &settings).await.unwrap();
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.exit_status(), EXIT_SUCCESS);
    assert_eq!(api.calls.load(Ordering::SeqCst), 6);
    for slug in ["suiu-noa", "sakaki-shida"] {
        for name in ["standing.png", "turnaround.png", "stream-bust.png"] {
            assert!(out_dir.join(slug).join(name).exists(), "{slug}/{name}");
        }
    }
    assert!(!out_dir.join("morino-mint").exists());

    let again = CountingApi::default();
    let summary = batch::run(&again, &settings).await.unwrap();
    assert!(summary.is_success());
    assert_eq!(again.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unwritable_output_is_a_per_character_failure() {
    roster::init().unwrap();
    let root = tempfile::tempdir().unwrap();
    let out_dir = root.path().join("illustrations");
    std::fs::create_dir_all(&out_dir).unwrap();
    // A plain file where the character directory should go.
    std::fs::write(out_dir.join("morino-mint"), b"in the way").unwrap();

    let cli = options(&out_dir, &["--chars", "morino-mint,wakaba-ruru"]);
    let settings = Settings::from_cli(&cli, roster::characters().unwrap()).unwrap();

    let summary = batch::run(&CountingApi::default(), &settings).await.unwrap();
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failures.len(), 1);
    assert!(summary.failures[0].starts_with("morino-mint: "));
    assert_eq!(summary.exit_status(), EXIT_PARTIAL_FAILURE);
    assert!(out_dir.join("wakaba-ruru/standing.png").exists());
}

//! Config handling

use std::path::PathBuf;
use std::time::Duration;

use tracing::log::LevelFilter;
use url::Url;

use crate::cli::CliOptions;
use crate::constants::API_KEY_ENV;
use crate::error::RefsheetError;
use crate::planner::PlanOptions;
use crate::roster::{self, Character};
use crate::transport::{HttpTransport, RetryPolicy};

/// Sets up logging based on the debug flag
pub fn setup_logging(debug: bool) -> Result<(), Box<std::io::Error>> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut logger = simple_logger::SimpleLogger::new().with_level(level);
    if !debug {
        logger = logger
            .with_module_level("tracing", LevelFilter::Warn)
            .with_module_level("reqwest", LevelFilter::Info)
            .with_module_level("rustls", LevelFilter::Info)
            .with_module_level("hyper_util", LevelFilter::Info)
            .with_module_level("h2", LevelFilter::Info);
    }
    logger.init().map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        Box::new(std::io::Error::other(err))
    })
}

/// Validated settings for one run. Building them touches neither the
/// filesystem nor the network.
pub struct Settings {
    /// Bearer credential, trimmed
    pub api_key: String,
    /// API root, always ending in `/`
    pub api_base: Url,
    /// Image model
    pub model: String,
    /// Output root
    pub out_dir: PathBuf,
    /// Characters to process, in roster order
    pub characters: Vec<Character>,
    /// Per-character plan switches
    pub options: PlanOptions,
    /// Retry policy for every request
    pub retry: RetryPolicy,
    /// Per-attempt request timeout
    pub timeout: Duration,
}

impl Settings {
    /// Checks the CLI options against `roster`. The credential is checked
    /// first, so a missing key is reported before anything else.
    pub fn from_cli(cli: &CliOptions, roster: &[Character]) -> Result<Self, RefsheetError> {
        let api_key = cli
            .openai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| RefsheetError::Config(format!("{API_KEY_ENV} is not set")))?
            .to_string();

        let characters = roster::select(roster, &cli.chars)?;
        let api_base = parse_api_base(&cli.api_base)?;

        Ok(Self {
            api_key,
            api_base,
            model: cli.model.clone(),
            out_dir: cli.out_dir.clone(),
            characters,
            options: PlanOptions {
                style: cli.style_preset,
                force: cli.force,
                color_match: !cli.no_color_match,
                include_bust: cli.include_bust,
            },
            retry: RetryPolicy::with_attempts(cli.retries),
            timeout: Duration::from_secs(cli.timeout_secs),
        })
    }

    /// The HTTP client these settings describe.
    pub fn transport(&self) -> Result<HttpTransport, RefsheetError> {
        HttpTransport::new(
            &self.api_key,
            self.api_base.clone(),
            &self.model,
            self.retry,
            self.timeout,
        )
    }
}

/// `Url::join` drops the last path segment unless the base ends in `/`.
fn parse_api_base(raw: &str) -> Result<Url, RefsheetError> {
    let raw = raw.trim();
    if raw.ends_with('/') {
        Ok(Url::parse(raw)?)
    } else {
        Ok(Url::parse(&format!("{raw}/"))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_API_BASE, DEFAULT_MODEL};
    use crate::prompts::StylePreset;
    use crate::testing::character;
    use clap::Parser;

    fn roster() -> Vec<Character> {
        vec![character("mint", "Mint"), character("ruru", "Ruru")]
    }

    fn cli(args: &[&str]) -> CliOptions {
        let mut argv = vec!["refsheet", "--openai-api-key", " sk-test \n"];
        argv.extend_from_slice(args);
        CliOptions::try_parse_from(argv).expect("parse cli")
    }

    #[test]
    fn defaults_resolve_to_full_roster() {
        let settings = Settings::from_cli(&cli(&[]), &roster()).expect("settings");
        assert_eq!(settings.api_key, "sk-test");
        assert_eq!(settings.api_base.as_str(), DEFAULT_API_BASE);
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.characters.len(), 2);
        assert_eq!(
            settings.options,
            PlanOptions {
                style: StylePreset::AnimeCel,
                force: false,
                color_match: true,
                include_bust: false,
            }
        );
        assert_eq!(settings.retry, RetryPolicy::default());
        assert_eq!(settings.timeout, Duration::from_secs(180));
    }

    #[test]
    fn flags_map_onto_plan_options() {
        let settings = Settings::from_cli(
            &cli(&[
                "--chars",
                "ruru",
                "--style-preset",
                "anime-painterly",
                "--force",
                "--no-color-match",
                "--include-bust",
                "--retries",
                "5",
                "--api-base",
                "http://localhost:8080/v1",
            ]),
            &roster(),
        )
        .expect("settings");
        assert_eq!(settings.characters, vec![character("ruru", "Ruru")]);
        assert_eq!(
            settings.options,
            PlanOptions {
                style: StylePreset::AnimePainterly,
                force: true,
                color_match: false,
                include_bust: true,
            }
        );
        assert_eq!(settings.retry.attempts, 5);
        assert_eq!(
            settings
                .api_base
                .join("images/edits")
                .expect("join")
                .as_str(),
            "http://localhost:8080/v1/images/edits"
        );
    }

    #[test]
    fn blank_key_is_a_config_error() {
        let mut options = cli(&[]);
        options.openai_api_key = Some("   ".to_string());
        let err = Settings::from_cli(&options, &roster())
            .err()
            .expect("blank key rejected");
        assert_eq!(err.to_string(), "OPENAI_API_KEY is not set");
    }

    #[test]
    fn unknown_selection_and_bad_base_are_config_errors() {
        let err = Settings::from_cli(&cli(&["--chars", "nobody"]), &roster())
            .err()
            .expect("empty selection");
        assert!(matches!(err, RefsheetError::Config(_)));

        let err = Settings::from_cli(&cli(&["--api-base", "not a url"]), &roster())
            .err()
            .expect("bad url");
        assert!(err.to_string().starts_with("invalid API base URL"));
    }

    #[test]
    fn unknown_style_is_rejected_by_the_parser() {
        let parsed = CliOptions::try_parse_from(["refsheet", "--style-preset", "watercolor"]);
        assert!(parsed.is_err());
    }
}

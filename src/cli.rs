//! CLI parser
use clap::Parser;
use std::path::PathBuf;

use crate::constants::{
    API_KEY_ENV, DEFAULT_API_BASE, DEFAULT_ATTEMPTS, DEFAULT_MODEL, DEFAULT_OUT_DIR,
    DEFAULT_TIMEOUT_SECS,
};
use crate::prompts::StylePreset;

#[derive(Parser, Debug)]
#[command(name = "refsheet")]
#[command(
    about = "Generate character reference sheets (standing, turnaround, stream bust) via the OpenAI Images API"
)]
/// CLI Options
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "REFSHEET_DEBUG")]
    /// Enable debug logging. Env: REFSHEET_DEBUG
    pub debug: bool,

    #[clap(long, default_value = DEFAULT_OUT_DIR, env = "REFSHEET_OUT_DIR")]
    /// Output root; each character gets a subdirectory named after its slug.
    /// Env: REFSHEET_OUT_DIR
    pub out_dir: PathBuf,

    #[clap(long, default_value = "all")]
    /// Comma-separated slugs to generate, or `all`
    pub chars: String,

    #[clap(long, value_enum, default_value_t = StylePreset::AnimeCel)]
    /// Rendering style preset
    pub style_preset: StylePreset,

    #[clap(long)]
    /// Regenerate files even if they already exist
    pub force: bool,

    #[clap(long)]
    /// Disable automatic colour matching to the standing image
    pub no_color_match: bool,

    #[clap(long)]
    /// Also generate stream-bust images
    pub include_bust: bool,

    #[clap(long, env = API_KEY_ENV, hide_env_values = true)]
    /// OpenAI API key. Env: OPENAI_API_KEY
    pub openai_api_key: Option<String>,

    #[clap(long, default_value = DEFAULT_MODEL)]
    /// Image model
    pub model: String,

    #[clap(long, default_value = DEFAULT_API_BASE, env = "OPENAI_BASE_URL")]
    /// API root the endpoint paths are joined onto. Env: OPENAI_BASE_URL
    pub api_base: String,

    #[clap(long, default_value_t = DEFAULT_ATTEMPTS)]
    /// Attempts per request before giving up
    pub retries: u32,

    #[clap(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    /// Per-attempt request timeout, in seconds
    pub timeout_secs: u64,
}

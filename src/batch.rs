//! Runs the planner over a list of characters.

use std::fmt::Write as _;
use std::path::Path;

use tracing::{error, info};

use crate::api::ImageApi;
use crate::config::Settings;
use crate::error::RefsheetError;
use crate::planner::{CharacterOutcome, PlanOptions, generate_character};
use crate::roster::Character;

/// Exit status when every character succeeded.
pub const EXIT_SUCCESS: u8 = 0;
/// Exit status when at least one character failed.
pub const EXIT_PARTIAL_FAILURE: u8 = 1;

/// Result of a batch: how many characters were attempted, what was written
/// and which failed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RunSummary {
    /// Characters attempted, successful or not
    pub processed: usize,
    /// Characters that were already complete
    pub skipped: usize,
    /// Files written across all characters
    pub generated: usize,
    /// Existing files kept across all characters
    pub reused: usize,
    /// `"{slug}: {error}"` per failed character, in processing order
    pub failures: Vec<String>,
}

impl RunSummary {
    /// True when no character failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Process exit status for this run.
    pub fn exit_status(&self) -> u8 {
        if self.is_success() {
            EXIT_SUCCESS
        } else {
            EXIT_PARTIAL_FAILURE
        }
    }

    /// Human-readable summary block printed at the end of a run.
    pub fn report(&self) -> String {
        let mut out = String::from("\n=== summary ===\n");
        if self.is_success() {
            out.push_str("all characters generated successfully\n");
        } else {
            for failure in &self.failures {
                let _ = writeln!(out, "- {failure}");
            }
        }
        out
    }
}

/// Processes `characters` in order. A failing character is logged and
/// recorded; the rest of the batch still runs.
pub async fn run_batch<A: ImageApi>(
    api: &A,
    out_dir: &Path,
    characters: &[Character],
    options: &PlanOptions,
) -> RunSummary {
    let mut summary = RunSummary::default();
    for character in characters {
        info!("[generate] {} ...", character.slug);
        summary.processed += 1;
        match generate_character(api, out_dir, character, options).await {
            Ok(CharacterOutcome::Skipped) => {
                summary.skipped += 1;
                info!("[ok] {} (already complete)", character.slug);
            }
            Ok(CharacterOutcome::Processed { generated, reused }) => {
                summary.generated += generated.len();
                summary.reused += reused.len();
                info!(
                    "[ok] {} ({} generated, {} reused)",
                    character.slug,
                    generated.len(),
                    reused.len()
                );
            }
            Err(err) => {
                error!("[fail] {}: {}", character.slug, err);
                summary.failures.push(format!("{}: {}", character.slug, err));
            }
        }
    }
    summary
}

/// Creates the output root and runs the batch described by `settings`.
pub async fn run<A: ImageApi>(api: &A, settings: &Settings) -> Result<RunSummary, RefsheetError> {
    tokio::fs::create_dir_all(&settings.out_dir)
        .await
        .map_err(|err| RefsheetError::io(&settings.out_dir, err))?;
    Ok(run_batch(api, &settings.out_dir, &settings.characters, &settings.options).await)
}

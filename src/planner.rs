//! Per-character asset planning: reuse what exists, generate what doesn't.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::api::{ImageApi, ImageRequest};
use crate::assets::{AssetKind, ExistingAssets, asset_path, write_asset};
use crate::color::color_match_bytes;
use crate::decode::decode_image;
use crate::error::RefsheetError;
use crate::prompts::{self, StylePreset};
use crate::roster::Character;

/// Per-run switches that shape every character's plan.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PlanOptions {
    /// Prompt style prefix
    pub style: StylePreset,
    /// Regenerate even when files exist
    pub force: bool,
    /// Colour-match dependent assets to their reference
    pub color_match: bool,
    /// Also produce the stream bust
    pub include_bust: bool,
}

/// What happened to one character.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CharacterOutcome {
    /// Everything was already on disk; no calls were made
    Skipped,
    /// At least one asset was looked at individually
    Processed {
        /// Files written by this run
        generated: Vec<PathBuf>,
        /// Existing files kept as they were
        reused: Vec<PathBuf>,
    },
}

/// Brings one character's assets up to date under `out_dir/<slug>/`.
///
/// Assets are resolved in dependency order. A dependent asset (turnaround,
/// bust) is an edit of its dependency's file and, with colour matching on,
/// is corrected against that same file, whether it was reused or generated.
pub async fn generate_character<A: ImageApi>(
    api: &A,
    out_dir: &Path,
    character: &Character,
    options: &PlanOptions,
) -> Result<CharacterOutcome, RefsheetError> {
    let char_dir = out_dir.join(&character.slug);
    tokio::fs::create_dir_all(&char_dir)
        .await
        .map_err(|err| RefsheetError::io(&char_dir, err))?;

    let existing = ExistingAssets::scan(&char_dir).await?;
    if !options.force && existing.is_complete(options.include_bust) {
        info!("[skip] {} already complete", character.slug);
        return Ok(CharacterOutcome::Skipped);
    }

    let mut resolved: HashMap<AssetKind, PathBuf> = HashMap::new();
    let mut generated = Vec::new();
    let mut reused = Vec::new();

    for kind in AssetKind::planned(options.include_bust) {
        let dependency = match kind.depends_on() {
            Some(dep) => Some(resolved.get(&dep).cloned().ok_or(
                RefsheetError::MissingDependency {
                    asset: kind.base_name(),
                    needs: dep.base_name(),
                },
            )?),
            None => None,
        };

        let current = existing.get(kind).filter(|_| !options.force);
        let path = match current {
            Some(path) => {
                info!("  [reuse] {}", path.display());
                reused.push(path.clone());
                path.clone()
            }
            None => {
                let path = produce(
                    api,
                    &char_dir,
                    character,
                    options,
                    kind,
                    dependency.as_deref(),
                )
                .await?;
                generated.push(path.clone());
                path
            }
        };
        resolved.insert(kind, path);
    }

    Ok(CharacterOutcome::Processed { generated, reused })
}

async fn produce<A: ImageApi>(
    api: &A,
    char_dir: &Path,
    character: &Character,
    options: &PlanOptions,
    kind: AssetKind,
    dependency: Option<&Path>,
) -> Result<PathBuf, RefsheetError> {
    info!("  [gen] {kind}");
    let request = ImageRequest::new(prompt_for(kind, options.style, character), kind.size());
    let response = match dependency {
        None => api.generate(&request).await?,
        Some(reference) => api.edit(&request, &[reference.to_path_buf()]).await?,
    };
    let mut bytes = decode_image(&response)?;

    // Corrected before the write, so a failed match leaves nothing behind.
    if options.color_match
        && let Some(reference) = dependency
    {
        let reference = reference.to_path_buf();
        let destination = asset_path(char_dir, kind, &bytes);
        let label = destination.clone();
        bytes = tokio::task::spawn_blocking(move || {
            color_match_bytes(&reference, &bytes, &destination)
        })
        .await
        .map_err(|err| RefsheetError::io(label, std::io::Error::other(err)))??;
    }

    let path = write_asset(char_dir, kind, &bytes).await?;
    info!("  [ok] {}", path.display());
    Ok(path)
}

fn prompt_for(kind: AssetKind, style: StylePreset, character: &Character) -> String {
    match kind {
        AssetKind::Standing => prompts::standing(style, character),
        AssetKind::Turnaround => prompts::turnaround(style, character),
        AssetKind::StreamBust => prompts::stream_bust(style, character),
    }
}

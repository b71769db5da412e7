//! Asset kinds and their files on disk.
//!
//! A character directory holds at most one file per asset kind, named
//! `<base>.<ext>` where the extension comes from the image bytes. Having the
//! file is the only record that the asset is done.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::api::ImageSize;
use crate::decode::guess_extension;
use crate::error::RefsheetError;

/// The reference images produced for each character.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AssetKind {
    /// Full-body, front-facing reference
    Standing,
    /// Front/side/back views on one sheet
    Turnaround,
    /// Upper-body portrait for stream thumbnails
    StreamBust,
}

impl AssetKind {
    /// Every kind, ordered so each one comes after the asset it depends on.
    pub const ALL: [AssetKind; 3] = [Self::Standing, Self::Turnaround, Self::StreamBust];

    /// File name without the extension.
    pub fn base_name(self) -> &'static str {
        match self {
            Self::Standing => "standing",
            Self::Turnaround => "turnaround",
            Self::StreamBust => "stream-bust",
        }
    }

    /// The asset whose file is the edit input and colour reference for this one.
    pub fn depends_on(self) -> Option<AssetKind> {
        match self {
            Self::Standing => None,
            Self::Turnaround | Self::StreamBust => Some(Self::Standing),
        }
    }

    /// Output size requested from the API.
    pub fn size(self) -> ImageSize {
        match self {
            Self::Standing => ImageSize::Portrait,
            Self::Turnaround => ImageSize::Landscape,
            Self::StreamBust => ImageSize::Square,
        }
    }

    /// Kinds a run produces, in dependency order.
    pub fn planned(include_bust: bool) -> Vec<AssetKind> {
        Self::ALL
            .into_iter()
            .filter(|kind| include_bust || *kind != Self::StreamBust)
            .collect()
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.base_name())
    }
}

/// What's already on disk for one character.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExistingAssets {
    standing: Option<PathBuf>,
    turnaround: Option<PathBuf>,
    stream_bust: Option<PathBuf>,
}

impl ExistingAssets {
    /// Looks up every asset kind in `dir`. A missing directory means nothing exists.
    pub async fn scan(dir: &Path) -> Result<Self, RefsheetError> {
        Ok(Self {
            standing: find_existing(dir, AssetKind::Standing).await?,
            turnaround: find_existing(dir, AssetKind::Turnaround).await?,
            stream_bust: find_existing(dir, AssetKind::StreamBust).await?,
        })
    }

    /// The authoritative file for `kind`, if any.
    pub fn get(&self, kind: AssetKind) -> Option<&PathBuf> {
        match kind {
            AssetKind::Standing => self.standing.as_ref(),
            AssetKind::Turnaround => self.turnaround.as_ref(),
            AssetKind::StreamBust => self.stream_bust.as_ref(),
        }
    }

    /// Standing and turnaround exist, plus the bust when it's wanted.
    pub fn is_complete(&self, include_bust: bool) -> bool {
        AssetKind::planned(include_bust)
            .into_iter()
            .all(|kind| self.get(kind).is_some())
    }
}

/// Returns the first `<base>.*` file in `dir`, by file name.
pub async fn find_existing(dir: &Path, kind: AssetKind) -> Result<Option<PathBuf>, RefsheetError> {
    Ok(matching_files(dir, kind).await?.into_iter().next())
}

/// Where `bytes` for `kind` land in `dir`: `<base>.<sniffed ext>`.
pub fn asset_path(dir: &Path, kind: AssetKind, bytes: &[u8]) -> PathBuf {
    dir.join(format!("{}.{}", kind.base_name(), guess_extension(bytes)))
}

/// Writes `bytes` to [`asset_path`] and removes any `<base>.*` siblings
/// left over with a different extension.
pub async fn write_asset(
    dir: &Path,
    kind: AssetKind,
    bytes: &[u8],
) -> Result<PathBuf, RefsheetError> {
    let path = asset_path(dir, kind, bytes);
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|err| RefsheetError::io(&path, err))?;

    for stale in matching_files(dir, kind).await? {
        if stale == path {
            continue;
        }
        debug!("removing stale {}", stale.display());
        if let Err(err) = tokio::fs::remove_file(&stale).await
            && err.kind() != ErrorKind::NotFound
        {
            return Err(RefsheetError::io(&stale, err));
        }
    }
    Ok(path)
}

async fn matching_files(dir: &Path, kind: AssetKind) -> Result<Vec<PathBuf>, RefsheetError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(RefsheetError::io(dir, err)),
    };

    let prefix = format!("{}.", kind.base_name());
    let mut found = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|err| RefsheetError::io(dir, err))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|err| RefsheetError::io(entry.path(), err))?;
        if !file_type.is_file() {
            continue;
        }
        let matches = entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with(&prefix))
            .unwrap_or(false);
        if matches {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}

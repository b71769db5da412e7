//! Character roster loaded from a bundled JSON file.

use std::collections::HashSet;
use std::sync::OnceLock;

use serde::Deserialize;

use crate::error::RefsheetError;

/// A character we draw reference sheets for.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct Character {
    /// Unique, filesystem-safe identifier; also the output directory name.
    pub slug: String,
    /// Display name used in prompts.
    pub name: String,
    /// Free-text visual description.
    pub description: String,
    /// Fixed palette, fed to the colour lock clause.
    pub palette: String,
}

/// Errors returned when loading the roster.
#[derive(Debug)]
pub enum RosterError {
    /// The JSON payload could not be parsed.
    Parse(serde_json::Error),
    /// Two entries share a slug.
    DuplicateSlug(String),
    /// A slug would not make a safe directory name.
    InvalidSlug(String),
    /// The roster has not been initialized.
    NotInitialized,
}

impl std::fmt::Display for RosterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "Failed to parse character JSON: {err}"),
            Self::DuplicateSlug(slug) => write!(f, "Duplicate character slug: {slug}"),
            Self::InvalidSlug(slug) => write!(f, "Invalid character slug: {slug:?}"),
            Self::NotInitialized => write!(f, "Character roster has not been initialized"),
        }
    }
}

impl std::error::Error for RosterError {}

impl From<RosterError> for RefsheetError {
    fn from(err: RosterError) -> Self {
        RefsheetError::Config(err.to_string())
    }
}

static CHARACTERS: OnceLock<Vec<Character>> = OnceLock::new();

/// Parse the bundled roster; called during startup.
pub fn init() -> Result<(), RosterError> {
    let raw = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/characters.json"));
    let parsed = parse(raw)?;
    let _ = CHARACTERS.set(parsed);
    Ok(())
}

/// Returns the full roster, in table order.
pub fn characters() -> Result<&'static [Character], RosterError> {
    CHARACTERS
        .get()
        .map(Vec::as_slice)
        .ok_or(RosterError::NotInitialized)
}

fn parse(raw: &str) -> Result<Vec<Character>, RosterError> {
    let parsed: Vec<Character> = serde_json::from_str(raw).map_err(RosterError::Parse)?;
    let mut seen = HashSet::new();
    for character in &parsed {
        if !is_safe_slug(&character.slug) {
            return Err(RosterError::InvalidSlug(character.slug.clone()));
        }
        if !seen.insert(character.slug.as_str()) {
            return Err(RosterError::DuplicateSlug(character.slug.clone()));
        }
    }
    Ok(parsed)
}

fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Picks characters out of `roster` for a `--chars` value.
///
/// `all` keeps the whole roster. Otherwise the value is a comma-separated list
/// of slugs; the result keeps roster order and ignores unknown slugs. An empty
/// result is a configuration error.
pub fn select(roster: &[Character], chars: &str) -> Result<Vec<Character>, RefsheetError> {
    if chars.trim() == "all" {
        return Ok(roster.to_vec());
    }
    let wanted: HashSet<&str> = chars
        .split(',')
        .map(str::trim)
        .filter(|slug| !slug.is_empty())
        .collect();
    let selected: Vec<Character> = roster
        .iter()
        .filter(|character| wanted.contains(character.slug.as_str()))
        .cloned()
        .collect();
    if selected.is_empty() {
        return Err(RefsheetError::Config(format!(
            "no matching characters for --chars={chars}"
        )));
    }
    Ok(selected)
}

//! Error handling

use std::path::PathBuf;

/// Errors raised while generating reference sheets.
#[derive(Debug)]
pub enum RefsheetError {
    /// A request kept failing until the retry budget ran out
    Transport {
        /// How many attempts were made
        attempts: u32,
        /// The last status/body or exception message observed
        detail: String,
    },
    /// The API answered, but not with an image we can use
    MalformedResponse(String),
    /// An asset was planned before the asset it is derived from
    MissingDependency {
        /// The asset being produced
        asset: &'static str,
        /// The asset it needs first
        needs: &'static str,
    },
    /// Bad run configuration, fatal for the whole run
    Config(String),
    /// Filesystem failure
    Io {
        /// The path being read or written
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
    /// Image decode/encode failure
    Image {
        /// The image being processed
        path: PathBuf,
        /// Underlying error
        source: image::ImageError,
    },
}

impl RefsheetError {
    /// Wraps an IO error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wraps an image error with the path it happened on.
    pub fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::Image {
            path: path.into(),
            source,
        }
    }
}

impl std::fmt::Display for RefsheetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport { attempts, detail } => {
                write!(f, "request failed after {attempts} attempts: {detail}")
            }
            Self::MalformedResponse(message) => write!(f, "{message}"),
            Self::MissingDependency { asset, needs } => {
                write!(f, "{asset} needs {needs} to be resolved first")
            }
            Self::Config(message) => write!(f, "{message}"),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Image { path, source } => write!(f, "{}: {source}", path.display()),
        }
    }
}

impl std::error::Error for RefsheetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Image { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<url::ParseError> for RefsheetError {
    fn from(err: url::ParseError) -> Self {
        RefsheetError::Config(format!("invalid API base URL: {err}"))
    }
}

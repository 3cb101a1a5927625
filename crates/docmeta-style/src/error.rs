//! Style scope configuration errors.

use std::path::PathBuf;

/// Error raised while loading a style config or scanning content.
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    /// Config file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Document is not a well-formed style config.
    #[error("Invalid style config: {0}")]
    Parse(String),
    /// File extension does not map to a supported format.
    #[error("Unsupported style config format: {} (expected .json, .toml, .yaml or .yml)", .0.display())]
    UnsupportedFormat(PathBuf),
    /// Content pattern is not a valid glob.
    #[error("Invalid content pattern `{pattern}`: {message}")]
    InvalidGlob { pattern: String, message: String },
    /// Plugin reference is unusable.
    #[error("Invalid plugin `{plugin}`: {reason}")]
    InvalidPlugin { plugin: String, reason: &'static str },
    /// Directory walk failed during a content scan.
    #[error("Failed to scan {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },
}

impl StyleError {
    pub(crate) fn invalid_glob(pattern: &str, message: impl Into<String>) -> Self {
        Self::InvalidGlob {
            pattern: pattern.to_owned(),
            message: message.into(),
        }
    }
}

//! Navigation manifest errors.

use std::path::PathBuf;

/// Error raised while loading or validating a navigation manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// Manifest file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Document is not a well-formed manifest.
    #[error("Invalid navigation manifest: {0}")]
    Parse(String),
    /// Manifest could not be written back out.
    #[error("Failed to serialize navigation manifest: {0}")]
    Serialize(#[from] serde_json::Error),
    /// File extension does not map to a supported format.
    #[error("Unsupported manifest format: {} (expected .json, .yaml or .yml)", .0.display())]
    UnsupportedFormat(PathBuf),
    /// Key appears more than once.
    #[error("Duplicate navigation key `{0}`")]
    DuplicateKey(String),
    /// Key is not a valid page identifier.
    #[error("Invalid navigation key `{key}`: {reason}")]
    InvalidKey { key: String, reason: &'static str },
    /// Entry has no usable title.
    #[error("Navigation entry `{0}` requires a non-empty title")]
    MissingTitle(String),
    /// Separator carries a field that only pages accept.
    #[error("Separator `{key}` cannot have a `{field}` field")]
    SeparatorField { key: String, field: &'static str },
    /// External link target is neither absolute URL nor site path.
    #[error("Navigation entry `{key}` has invalid href `{href}`: expected http://, https:// or a path starting with /")]
    InvalidHref { key: String, href: String },
}

impl ManifestError {
    /// Navigation key the error refers to, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::DuplicateKey(key) | Self::MissingTitle(key) => Some(key),
            Self::InvalidKey { key, .. }
            | Self::SeparatorField { key, .. }
            | Self::InvalidHref { key, .. } => Some(key),
            Self::Io { .. }
            | Self::Parse(_)
            | Self::Serialize(_)
            | Self::UnsupportedFormat(_) => None,
        }
    }
}

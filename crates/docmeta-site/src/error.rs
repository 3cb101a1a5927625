//! Project loading errors.

use std::path::PathBuf;

use docmeta_nav::ManifestError;
use docmeta_style::StyleError;

/// Error raised while loading a docs project.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    /// Content directory could not be listed for locale discovery.
    #[error("Failed to read content directory {}: {source}", path.display())]
    ContentDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Default locale has no navigation manifest.
    #[error("Missing navigation manifest for default locale `{locale}`: {}", path.display())]
    MissingDefaultManifest { locale: String, path: PathBuf },
    /// A locale's navigation manifest is invalid.
    #[error("Invalid navigation manifest for locale `{locale}`: {source}")]
    Manifest {
        locale: String,
        #[source]
        source: ManifestError,
    },
    /// Style scope config is missing or invalid.
    #[error("Invalid style config {}: {source}", path.display())]
    Style {
        path: PathBuf,
        #[source]
        source: StyleError,
    },
}

//! Docs project loading.
//!
//! Combines the project configuration, one navigation manifest per locale
//! and the style scope config into a single validated [`DocsProject`].
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use docmeta_config::Config;
//! use docmeta_site::DocsProject;
//!
//! let config = Config::load(None, None)?;
//! let project = DocsProject::load(&config)?;
//!
//! let titles: Vec<_> = project
//!     .default_manifest()
//!     .visible_pages()
//!     .map(|(_, page)| page.title.as_str())
//!     .collect();
//! assert!(!titles.is_empty());
//! # Ok(())
//! # }
//! ```

mod error;
mod project;

pub use error::ProjectError;
pub use project::DocsProject;

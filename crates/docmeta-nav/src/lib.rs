//! Navigation manifest for documentation sites.
//!
//! A manifest is an ordered mapping from page key to either a separator or a
//! page descriptor. The order of keys in the source document is the order the
//! sidebar renders, and is preserved by every view this crate provides.
//!
//! Manifests are parsed from JSON or YAML and validated on load: duplicate
//! keys, missing titles and separators carrying page options are rejected
//! with an error naming the offending key.
//!
//! # Example
//!
//! ```
//! use docmeta_nav::NavigationManifest;
//!
//! let manifest = NavigationManifest::from_json_str(r#"{
//!     "index": { "title": "Introduction", "theme": { "toc": true, "layout": "default" } },
//!     "installation": { "title": "Installation", "theme": { "toc": true, "layout": "default" } }
//! }"#).unwrap();
//!
//! let keys: Vec<_> = manifest.keys().collect();
//! assert_eq!(keys, ["index", "installation"]);
//! ```

mod entry;
mod error;
mod manifest;
mod raw;

pub use entry::{Display, Layout, NavigationEntry, Page, PageTheme, Separator};
pub use error::ManifestError;
pub use manifest::{ManifestFormat, ManifestWarning, NavSection, NavigationManifest};

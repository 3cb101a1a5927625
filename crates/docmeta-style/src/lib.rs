//! Style scope configuration for documentation sites.
//!
//! Declares which source files a utility-class style compiler scans for
//! class names, how dark mode is activated, which plugins apply and which
//! theme tokens are extended.
//!
//! Content patterns are validated when the configuration is loaded, so a
//! malformed glob never reaches the scan.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//!
//! use docmeta_style::{DarkMode, StyleScopeConfig};
//!
//! let config = StyleScopeConfig::from_json_str(r#"{
//!     "content": ["./src/**/*.{js,jsx,ts,tsx,md,mdx}"],
//!     "theme": { "extend": {} },
//!     "plugins": [],
//!     "darkMode": "class"
//! }"#).unwrap();
//!
//! let matcher = config.content_matcher(Path::new("/site")).unwrap();
//! assert!(matcher.is_match(Path::new("src/pages/index.tsx")));
//! assert!(!matcher.is_match(Path::new("src/styles.css")));
//! assert_eq!(config.dark_mode, DarkMode::class());
//! ```

mod config;
mod dark_mode;
mod error;
mod matcher;
mod pattern;

pub use config::{ContentSpec, PluginRef, StyleScopeConfig, ThemeConfig};
pub use dark_mode::{DARK_MEDIA_QUERY, DEFAULT_DARK_CLASS, DarkMode, DarkVariant};
pub use error::StyleError;
pub use matcher::ContentMatcher;
pub use pattern::ContentPattern;

//! Project configuration for docmeta.
//!
//! Parses `docmeta.toml` with serde and provides auto-discovery of the file
//! in parent directories. Relative paths resolve against the directory that
//! holds the config file.
//!
//! Settings from an embedding tool can be applied during load via
//! [`ConfigOverrides`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `content.dir`
//! - `content.meta_filename`
//! - `content.default_locale`
//! - `content.locales`
//! - `style.config`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    /// Override content directory.
    pub content_dir: Option<PathBuf>,
    /// Override style config path.
    pub style_config: Option<PathBuf>,
    /// Override default locale.
    pub default_locale: Option<String>,
}

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "docmeta.toml";

const DEFAULT_CONTENT_DIR: &str = "src/content";
const DEFAULT_META_FILENAME: &str = "_meta.json";
const DEFAULT_LOCALE: &str = "en";
const DEFAULT_STYLE_CONFIG: &str = "style.config.json";

/// Project configuration.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Content configuration (paths are relative strings from TOML).
    content: ContentConfigRaw,
    /// Style configuration (paths are relative strings from TOML).
    style: StyleConfigRaw,

    /// Resolved content configuration (set after loading).
    #[serde(skip)]
    pub content_resolved: ContentConfig,
    /// Resolved style configuration (set after loading).
    #[serde(skip)]
    pub style_resolved: StyleConfig,
    /// Project root: the directory holding the config file.
    #[serde(skip)]
    pub root_dir: PathBuf,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw content configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct ContentConfigRaw {
    dir: Option<String>,
    meta_filename: Option<String>,
    default_locale: Option<String>,
    locales: Option<Vec<String>>,
}

/// Resolved content configuration with absolute paths.
#[derive(Debug, Default)]
pub struct ContentConfig {
    /// Directory holding one subdirectory per locale.
    pub dir: PathBuf,
    /// Navigation manifest filename inside each locale directory.
    pub meta_filename: String,
    /// Locale whose manifest must exist.
    pub default_locale: String,
    /// Explicit locales; discovered from `dir` when `None`.
    pub locales: Option<Vec<String>>,
}

impl ContentConfig {
    /// Directory of a locale's content.
    #[must_use]
    pub fn locale_dir(&self, locale: &str) -> PathBuf {
        self.dir.join(locale)
    }

    /// Path of a locale's navigation manifest.
    #[must_use]
    pub fn manifest_path(&self, locale: &str) -> PathBuf {
        self.locale_dir(locale).join(&self.meta_filename)
    }
}

/// Raw style configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct StyleConfigRaw {
    config: Option<String>,
}

/// Resolved style configuration with absolute paths.
#[derive(Debug, Default)]
pub struct StyleConfig {
    /// Style scope config file.
    pub config_path: PathBuf,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`content.dir`").
        field: String,
        /// Error message (e.g., "${`CONTENT_DIR`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a locale name usable as a directory name, e.g. `en` or `pt-BR`.
fn require_locale(value: &str, field: &str) -> Result<(), ConfigError> {
    require_non_empty(value, field)?;
    let valid = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        && value.starts_with(|c: char| c.is_ascii_alphanumeric());
    if !valid {
        return Err(ConfigError::Validation(format!(
            "{field} has invalid locale `{value}`: expected letters, digits, '-' or '_'"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional overrides.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `docmeta.toml` in current directory and parents.
    ///
    /// Overrides are applied after loading and path resolution, and the result
    /// is validated again.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// a value is invalid.
    pub fn load(
        config_path: Option<&Path>,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_from(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(overrides) = overrides {
            config.apply_overrides(overrides);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply overrides to the configuration.
    fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(dir) = &overrides.content_dir {
            self.content_resolved.dir.clone_from(dir);
        }
        if let Some(path) = &overrides.style_config {
            self.style_resolved.config_path.clone_from(path);
        }
        if let Some(locale) = &overrides.default_locale {
            self.content_resolved.default_locale.clone_from(locale);
        }
    }

    /// Search for the config file in `start` and its parents.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            content: ContentConfigRaw::default(),
            style: StyleConfigRaw::default(),
            content_resolved: ContentConfig {
                dir: base.join(DEFAULT_CONTENT_DIR),
                meta_filename: DEFAULT_META_FILENAME.to_owned(),
                default_locale: DEFAULT_LOCALE.to_owned(),
                locales: None,
            },
            style_resolved: StyleConfig {
                config_path: base.join(DEFAULT_STYLE_CONFIG),
            },
            root_dir: base.to_path_buf(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let content = &self.content_resolved;

        require_non_empty(&content.meta_filename, "content.meta_filename")?;
        if content.meta_filename.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "content.meta_filename must be a file name, not a path".to_owned(),
            ));
        }

        require_locale(&content.default_locale, "content.default_locale")?;

        if let Some(locales) = &content.locales {
            if locales.is_empty() {
                return Err(ConfigError::Validation(
                    "content.locales cannot be empty; omit it to discover locales".to_owned(),
                ));
            }
            for (i, locale) in locales.iter().enumerate() {
                require_locale(locale, "content.locales")?;
                if locales[..i].contains(locale) {
                    return Err(ConfigError::Validation(format!(
                        "content.locales lists `{locale}` more than once"
                    )));
                }
            }
            if !locales.contains(&content.default_locale) {
                return Err(ConfigError::Validation(format!(
                    "content.default_locale `{}` is not listed in content.locales",
                    content.default_locale
                )));
            }
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let expand_opt = |value: &mut Option<String>, field: &str| -> Result<(), ConfigError> {
            if let Some(v) = value {
                *v = expand::expand_env(v, field)?;
            }
            Ok(())
        };

        expand_opt(&mut self.content.dir, "content.dir")?;
        expand_opt(&mut self.content.meta_filename, "content.meta_filename")?;
        expand_opt(&mut self.content.default_locale, "content.default_locale")?;
        if let Some(locales) = &mut self.content.locales {
            for locale in locales {
                *locale = expand::expand_env(locale, "content.locales")?;
            }
        }
        expand_opt(&mut self.style.config, "style.config")?;

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.content_resolved = ContentConfig {
            dir: resolve(self.content.dir.as_deref(), DEFAULT_CONTENT_DIR),
            meta_filename: self
                .content
                .meta_filename
                .clone()
                .unwrap_or_else(|| DEFAULT_META_FILENAME.to_owned()),
            default_locale: self
                .content
                .default_locale
                .clone()
                .unwrap_or_else(|| DEFAULT_LOCALE.to_owned()),
            locales: self.content.locales.clone(),
        };
        self.style_resolved = StyleConfig {
            config_path: resolve(self.style.config.as_deref(), DEFAULT_STYLE_CONFIG),
        };
        self.root_dir = config_dir.to_path_buf();
    }
}

//! Style scope configuration document.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dark_mode::DarkMode;
use crate::error::StyleError;
use crate::matcher::ContentMatcher;
use crate::pattern::ContentPattern;

/// Which files a style compiler scans, how dark mode toggles and which
/// plugins apply.
///
/// Constructed only through parsing, which compiles every content pattern,
/// so an instance never holds an invalid glob.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleScopeConfig {
    pub content: ContentSpec,
    pub theme: ThemeConfig,
    pub plugins: Vec<PluginRef>,
    pub dark_mode: DarkMode,
    #[serde(skip)]
    patterns: Vec<ContentPattern>,
    /// Directory of the loaded file, for `relative` content.
    #[serde(skip)]
    source_dir: Option<PathBuf>,
}

/// Raw document shape.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
struct RawStyleConfig {
    content: ContentSpec,
    theme: ThemeConfig,
    plugins: Vec<PluginRef>,
    dark_mode: DarkMode,
}

impl StyleScopeConfig {
    /// Parse a config from JSON.
    pub fn from_json_str(content: &str) -> Result<Self, StyleError> {
        let raw: RawStyleConfig =
            serde_json::from_str(content).map_err(|e| StyleError::Parse(e.to_string()))?;
        Self::from_raw(raw)
    }

    /// Parse a config from TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, StyleError> {
        let raw: RawStyleConfig =
            toml::from_str(content).map_err(|e| StyleError::Parse(e.to_string()))?;
        Self::from_raw(raw)
    }

    /// Parse a config from YAML. Empty content yields the defaults.
    pub fn from_yaml_str(content: &str) -> Result<Self, StyleError> {
        let raw: RawStyleConfig = if content.trim().is_empty() {
            RawStyleConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| StyleError::Parse(e.to_string()))?
        };
        Self::from_raw(raw)
    }

    /// Load a config file, choosing the format from its extension.
    pub fn load(path: &Path) -> Result<Self, StyleError> {
        let parse: fn(&str) -> Result<Self, StyleError> =
            match path.extension().and_then(|e| e.to_str()) {
                Some("json") => Self::from_json_str,
                Some("toml") => Self::from_toml_str,
                Some("yaml" | "yml") => Self::from_yaml_str,
                _ => return Err(StyleError::UnsupportedFormat(path.to_path_buf())),
            };

        let content = std::fs::read_to_string(path).map_err(|source| StyleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = parse(&content).map_err(|e| match e {
            StyleError::Parse(message) => {
                StyleError::Parse(format!("{}: {message}", path.display()))
            }
            other => other,
        })?;
        config.source_dir = path.parent().map(Path::to_path_buf);

        if config.content.files.is_empty() {
            tracing::warn!(
                path = %path.display(),
                "Style config lists no content patterns; no files will be scanned"
            );
        }
        tracing::debug!(
            path = %path.display(),
            patterns = config.patterns.len(),
            plugins = config.plugins.len(),
            dark_mode = %config.dark_mode,
            "Loaded style config"
        );
        Ok(config)
    }

    fn from_raw(raw: RawStyleConfig) -> Result<Self, StyleError> {
        let patterns = raw
            .content
            .files
            .iter()
            .map(|p| ContentPattern::parse(p))
            .collect::<Result<Vec<_>, _>>()?;
        validate_plugins(&raw.plugins)?;

        Ok(Self {
            content: raw.content,
            theme: raw.theme,
            plugins: raw.plugins,
            dark_mode: raw.dark_mode,
            patterns,
            source_dir: None,
        })
    }

    /// Compiled content patterns in declaration order.
    #[must_use]
    pub fn patterns(&self) -> &[ContentPattern] {
        &self.patterns
    }

    /// Build a matcher anchored at the project root.
    ///
    /// With `relative` content and a config loaded from a file, patterns are
    /// anchored at the config file's directory instead.
    pub fn content_matcher(&self, project_root: &Path) -> Result<ContentMatcher, StyleError> {
        let base = match (&self.source_dir, self.content.relative) {
            (Some(dir), true) => dir.as_path(),
            _ => project_root,
        };
        ContentMatcher::new(base, &self.patterns)
    }
}

/// Content globs, written either as a list or as `{ files, relative }`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawContent")]
pub struct ContentSpec {
    /// Patterns in declaration order.
    pub files: Vec<String>,
    /// Resolve patterns against the config file instead of the project root.
    pub relative: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawContent {
    Files(Vec<String>),
    Object {
        files: Vec<String>,
        #[serde(default)]
        relative: bool,
    },
}

impl From<RawContent> for ContentSpec {
    fn from(raw: RawContent) -> Self {
        match raw {
            RawContent::Files(files) => Self {
                files,
                relative: false,
            },
            RawContent::Object { files, relative } => Self { files, relative },
        }
    }
}

impl Serialize for ContentSpec {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Object<'a> {
            files: &'a [String],
            relative: bool,
        }

        if self.relative {
            Object {
                files: &self.files,
                relative: true,
            }
            .serialize(serializer)
        } else {
            self.files.serialize(serializer)
        }
    }
}

/// Theme customization tokens.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Tokens merged into the default theme.
    pub extend: serde_json::Map<String, serde_json::Value>,
    /// Tokens replacing default theme sections outright.
    #[serde(flatten)]
    pub overrides: serde_json::Map<String, serde_json::Value>,
}

impl ThemeConfig {
    /// Whether the default theme is used unchanged.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.extend.is_empty() && self.overrides.is_empty()
    }
}

/// Reference to a style plugin, optionally with options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginRef {
    /// Module specifier, e.g. `@tailwindcss/typography`.
    Name(String),
    /// Module specifier with plugin options.
    WithOptions {
        name: String,
        #[serde(default)]
        options: serde_json::Value,
    },
}

impl PluginRef {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::WithOptions { name, .. } => name,
        }
    }
}

/// Reject blank and repeated plugin references.
fn validate_plugins(plugins: &[PluginRef]) -> Result<(), StyleError> {
    for (i, plugin) in plugins.iter().enumerate() {
        let name = plugin.name();
        if name.trim().is_empty() {
            return Err(StyleError::InvalidPlugin {
                plugin: name.to_owned(),
                reason: "plugin name cannot be empty",
            });
        }
        if plugins[..i].iter().any(|p| p.name() == name) {
            return Err(StyleError::InvalidPlugin {
                plugin: name.to_owned(),
                reason: "plugin is listed more than once",
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dark_mode::DarkVariant;

    const SITE_CONFIG: &str = r#"{
        "content": ["./src/**/*.{js,jsx,ts,tsx,md,mdx}"],
        "theme": { "extend": {} },
        "plugins": [],
        "darkMode": "class"
    }"#;

    #[test]
    fn test_parse_site_config() {
        let config = StyleScopeConfig::from_json_str(SITE_CONFIG).unwrap();
        assert_eq!(
            config.content.files,
            vec!["./src/**/*.{js,jsx,ts,tsx,md,mdx}".to_owned()]
        );
        assert!(!config.content.relative);
        assert!(config.theme.is_default());
        assert!(config.plugins.is_empty());
        assert_eq!(config.dark_mode, DarkMode::class());
        assert_eq!(config.patterns().len(), 1);
    }

    #[test]
    fn test_class_dark_mode_ignores_system_preference() {
        let config = StyleScopeConfig::from_json_str(SITE_CONFIG).unwrap();
        assert!(config.dark_mode.is_active(["dark"], false));
        assert!(!config.dark_mode.is_active([], true));
        assert_eq!(
            config.dark_mode.variant(),
            DarkVariant::Selector(":is(.dark *)".to_owned())
        );
    }

    #[test]
    fn test_defaults() {
        let config = StyleScopeConfig::from_json_str("{}").unwrap();
        assert!(config.content.files.is_empty());
        assert_eq!(config.dark_mode, DarkMode::Media);
        assert!(config.theme.is_default());
    }

    #[test]
    fn test_invalid_glob_fails_at_load() {
        let json = r#"{ "content": ["./src/**/*.{js,ts"] }"#;
        let err = StyleScopeConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, StyleError::InvalidGlob { ref pattern, .. } if pattern == "./src/**/*.{js,ts"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = StyleScopeConfig::from_json_str(r#"{ "contents": [] }"#).unwrap_err();
        assert!(err.to_string().contains("contents"));
    }

    #[test]
    fn test_relative_content_object() {
        let json = r#"{ "content": { "files": ["./pages/**/*.mdx"], "relative": true } }"#;
        let config = StyleScopeConfig::from_json_str(json).unwrap();
        assert!(config.content.relative);
        assert_eq!(config.content.files, vec!["./pages/**/*.mdx".to_owned()]);
    }

    #[test]
    fn test_theme_extend_and_overrides() {
        let json = r##"{
            "theme": {
                "extend": { "colors": { "brand": "#0055ff" } },
                "fontFamily": { "sans": ["Inter"] }
            }
        }"##;
        let config = StyleScopeConfig::from_json_str(json).unwrap();
        assert_eq!(
            config.theme.extend["colors"]["brand"],
            serde_json::json!("#0055ff")
        );
        assert!(config.theme.overrides.contains_key("fontFamily"));
        assert!(!config.theme.is_default());
    }

    #[test]
    fn test_plugins() {
        let json = r#"{
            "plugins": [
                "@tailwindcss/typography",
                { "name": "@tailwindcss/forms", "options": { "strategy": "class" } }
            ]
        }"#;
        let config = StyleScopeConfig::from_json_str(json).unwrap();
        let names: Vec<_> = config.plugins.iter().map(PluginRef::name).collect();
        assert_eq!(names, vec!["@tailwindcss/typography", "@tailwindcss/forms"]);
    }

    #[test]
    fn test_duplicate_plugin_rejected() {
        let json = r#"{ "plugins": ["@tailwindcss/forms", "@tailwindcss/forms"] }"#;
        let err = StyleScopeConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, StyleError::InvalidPlugin { .. }));
        assert!(err.to_string().contains("@tailwindcss/forms"));
    }

    #[test]
    fn test_empty_plugin_rejected() {
        let err = StyleScopeConfig::from_json_str(r#"{ "plugins": [""] }"#).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_toml_config() {
        let toml = r#"
content = ["./src/**/*.{md,mdx}"]
plugins = ["@tailwindcss/typography"]
darkMode = ["class", ".night"]

[theme.extend.spacing]
gutter = "2rem"
"#;
        let config = StyleScopeConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.dark_mode.class_name(), Some("night"));
        assert_eq!(config.plugins.len(), 1);
        assert_eq!(
            config.theme.extend["spacing"]["gutter"],
            serde_json::json!("2rem")
        );
    }

    #[test]
    fn test_yaml_config() {
        let yaml = "content:\n  - ./src/**/*.mdx\ndarkMode: media\n";
        let config = StyleScopeConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.dark_mode, DarkMode::Media);
        assert_eq!(config.patterns().len(), 1);
    }

    #[test]
    fn test_indented_yaml_config() {
        let yaml = "  content:\n    - ./src/**/*.mdx\n  darkMode: class\n";
        let config = StyleScopeConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.dark_mode, DarkMode::class());
        assert_eq!(config.patterns().len(), 1);
    }

    #[test]
    fn test_serialize_round_trip_shape() {
        let config = StyleScopeConfig::from_json_str(SITE_CONFIG).unwrap();
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "content": ["./src/**/*.{js,jsx,ts,tsx,md,mdx}"],
                "theme": { "extend": {} },
                "plugins": [],
                "darkMode": "class"
            })
        );
    }

    #[test]
    fn test_load_and_match() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("style.config.json");
        std::fs::write(&path, SITE_CONFIG).unwrap();

        let config = StyleScopeConfig::load(&path).unwrap();
        let matcher = config.content_matcher(dir.path()).unwrap();
        assert!(matcher.is_match(Path::new("src/content/en/index.mdx")));
        assert!(!matcher.is_match(Path::new("public/logo.svg")));
    }

    #[test]
    fn test_relative_content_anchors_at_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join("config");
        std::fs::create_dir(&config_dir).unwrap();
        let path = config_dir.join("style.config.json");
        std::fs::write(
            &path,
            r#"{ "content": { "files": ["./pages/*.mdx"], "relative": true } }"#,
        )
        .unwrap();

        let config = StyleScopeConfig::load(&path).unwrap();
        let matcher = config.content_matcher(dir.path()).unwrap();
        assert!(matcher.is_match(&config_dir.join("pages/intro.mdx")));
        assert!(!matcher.is_match(&dir.path().join("pages/intro.mdx")));
    }

    #[test]
    fn test_load_unsupported_extension() {
        let err = StyleScopeConfig::load(Path::new("tailwind.config.ts")).unwrap_err();
        assert!(matches!(err, StyleError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_load_parse_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("style.config.json");
        std::fs::write(&path, "{ broken").unwrap();
        let err = StyleScopeConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("style.config.json"));
    }
}

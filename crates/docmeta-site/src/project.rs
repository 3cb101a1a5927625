//! Docs project loading.
//!
//! A project is one navigation manifest per locale plus the style scope
//! config. Everything is loaded and validated up front; the resulting
//! [`DocsProject`] is immutable.

use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use docmeta_config::{Config, ContentConfig};
use docmeta_nav::NavigationManifest;
use docmeta_style::{ContentMatcher, StyleScopeConfig};

use crate::error::ProjectError;

/// Convert Duration to milliseconds as f64.
fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Loaded and validated docs project.
#[derive(Debug)]
pub struct DocsProject {
    locales: Vec<String>,
    manifests: HashMap<String, NavigationManifest>,
    default_locale: String,
    style: StyleScopeConfig,
    matcher: ContentMatcher,
}

impl DocsProject {
    /// Load every locale's manifest and the style config named by `config`.
    ///
    /// Fails on the first invalid document. A locale other than the default
    /// that has no manifest file is skipped with a warning.
    pub fn load(config: &Config) -> Result<Self, ProjectError> {
        let start = Instant::now();
        let content = &config.content_resolved;

        let candidates = match &content.locales {
            Some(locales) => locales.clone(),
            None => discover_locales(content)?,
        };

        let mut locales = Vec::with_capacity(candidates.len());
        let mut manifests = HashMap::with_capacity(candidates.len());
        for locale in candidates {
            let path = content.manifest_path(&locale);
            if !path.is_file() {
                if locale == content.default_locale {
                    return Err(ProjectError::MissingDefaultManifest { locale, path });
                }
                tracing::warn!(
                    locale = %locale,
                    path = %path.display(),
                    "Locale has no navigation manifest, skipping"
                );
                continue;
            }

            let manifest =
                NavigationManifest::load(&path).map_err(|source| ProjectError::Manifest {
                    locale: locale.clone(),
                    source,
                })?;
            for warning in manifest.lint() {
                tracing::warn!(locale = %locale, path = %path.display(), "{warning}");
            }
            manifests.insert(locale.clone(), manifest);
            locales.push(locale);
        }

        if !manifests.contains_key(&content.default_locale) {
            return Err(ProjectError::MissingDefaultManifest {
                locale: content.default_locale.clone(),
                path: content.manifest_path(&content.default_locale),
            });
        }

        let style_path = &config.style_resolved.config_path;
        let style_error = |source| ProjectError::Style {
            path: style_path.clone(),
            source,
        };
        let style = StyleScopeConfig::load(style_path).map_err(style_error)?;
        let matcher = style
            .content_matcher(&config.root_dir)
            .map_err(style_error)?;

        let entry_count: usize = manifests.values().map(NavigationManifest::len).sum();
        tracing::info!(
            locales = locales.len(),
            entries = entry_count,
            patterns = style.patterns().len(),
            dark_mode = %style.dark_mode,
            elapsed_ms = elapsed_ms(start),
            "Docs project loaded"
        );

        Ok(Self {
            locales,
            manifests,
            default_locale: content.default_locale.clone(),
            style,
            matcher,
        })
    }

    /// Loaded locales, in configured order or sorted when discovered.
    #[must_use]
    pub fn locales(&self) -> &[String] {
        &self.locales
    }

    /// Locale every other locale falls back to.
    #[must_use]
    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// Navigation manifest of a locale.
    #[must_use]
    pub fn manifest(&self, locale: &str) -> Option<&NavigationManifest> {
        self.manifests.get(locale)
    }

    /// Navigation manifest of the default locale.
    #[must_use]
    pub fn default_manifest(&self) -> &NavigationManifest {
        // Presence is checked in `load`.
        &self.manifests[&self.default_locale]
    }

    /// Style scope config.
    #[must_use]
    pub fn style(&self) -> &StyleScopeConfig {
        &self.style
    }

    /// Content matcher anchored at the project root.
    #[must_use]
    pub fn content_matcher(&self) -> &ContentMatcher {
        &self.matcher
    }
}

/// Sorted names of non-hidden content subdirectories holding a manifest.
fn discover_locales(content: &ContentConfig) -> Result<Vec<String>, ProjectError> {
    let read_err = |source| ProjectError::ContentDir {
        path: content.dir.clone(),
        source,
    };

    let mut locales = Vec::new();
    for entry in std::fs::read_dir(&content.dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        if !entry.file_type().map_err(read_err)?.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            tracing::debug!(path = %entry.path().display(), "Skipping non UTF-8 directory");
            continue;
        };
        if name.starts_with('.') || !has_manifest(&entry.path(), &content.meta_filename) {
            continue;
        }
        locales.push(name);
    }
    locales.sort();

    tracing::debug!(
        dir = %content.dir.display(),
        locales = ?locales,
        "Discovered locales"
    );
    Ok(locales)
}

fn has_manifest(locale_dir: &Path, meta_filename: &str) -> bool {
    locale_dir.join(meta_filename).is_file()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use docmeta_config::CONFIG_FILENAME;
    use docmeta_style::DarkMode;

    use super::*;

    const EN_MANIFEST: &str = r#"{
        "index": { "title": "Introduction", "theme": { "toc": true, "layout": "default" } },
        "installation": { "title": "Installation", "theme": { "toc": true, "layout": "default" } },
        "guides": { "type": "separator", "title": "Guides" },
        "batching": { "title": "Batching", "theme": { "toc": true, "layout": "default" } }
    }"#;

    const DE_MANIFEST: &str = r#"{
        "index": { "title": "Einführung", "theme": { "toc": true, "layout": "default" } }
    }"#;

    const STYLE_CONFIG: &str = r#"{
        "content": ["./src/**/*.{js,jsx,ts,tsx,md,mdx}"],
        "theme": { "extend": {} },
        "plugins": [],
        "darkMode": "class"
    }"#;

    /// Project fixture with `en` and `de` locales.
    struct Fixture {
        dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let fixture = Self {
                dir: tempfile::tempdir().unwrap(),
            };
            fixture.write(CONFIG_FILENAME, "");
            fixture.write("style.config.json", STYLE_CONFIG);
            fixture.write("src/content/en/_meta.json", EN_MANIFEST);
            fixture.write("src/content/en/index.mdx", "# Introduction");
            fixture.write("src/content/de/_meta.json", DE_MANIFEST);
            fixture.write("src/content/de/index.mdx", "# Einführung");
            fixture
        }

        fn root(&self) -> &Path {
            self.dir.path()
        }

        fn write(&self, rel: &str, content: &str) {
            let path = self.root().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }

        fn config(&self) -> Config {
            Config::load(Some(&self.root().join(CONFIG_FILENAME)), None).unwrap()
        }

        fn load(&self) -> Result<DocsProject, ProjectError> {
            DocsProject::load(&self.config())
        }
    }

    #[test]
    fn test_load_discovers_locales() {
        let fixture = Fixture::new();
        fixture.write("src/content/.drafts/_meta.json", "{}");
        fixture.write("src/content/assets/logo.svg", "<svg/>");

        let project = fixture.load().unwrap();
        assert_eq!(project.locales(), ["de", "en"]);
        assert_eq!(project.default_locale(), "en");
        assert!(project.manifest("fr").is_none());
    }

    #[test]
    fn test_default_manifest_order() {
        let project = Fixture::new().load().unwrap();
        let keys: Vec<_> = project.default_manifest().keys().collect();
        assert_eq!(keys, ["index", "installation", "guides", "batching"]);
        assert_eq!(
            project.manifest("de").unwrap().get("index").unwrap().title(),
            "Einführung"
        );
    }

    #[test]
    fn test_style_loaded() {
        let project = Fixture::new().load().unwrap();
        assert_eq!(project.style().dark_mode, DarkMode::class());
        assert!(project.style().dark_mode.is_active(["dark"], false));
        assert!(!project.style().dark_mode.is_active([], true));
    }

    #[test]
    fn test_content_matcher_scans_project() {
        let fixture = Fixture::new();
        fixture.write("src/styles/global.css", "");
        let project = fixture.load().unwrap();

        let files = project.content_matcher().scan().unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["index.mdx", "index.mdx"]);
        assert!(files[0].ends_with("de/index.mdx"));
    }

    #[test]
    fn test_missing_default_manifest() {
        let fixture = Fixture::new();
        fs::remove_file(fixture.root().join("src/content/en/_meta.json")).unwrap();

        let err = fixture.load().unwrap_err();
        assert!(
            matches!(err, ProjectError::MissingDefaultManifest { ref locale, .. } if locale == "en")
        );
    }

    #[test]
    fn test_explicit_locales_skip_missing() {
        let fixture = Fixture::new();
        fixture.write(
            CONFIG_FILENAME,
            "[content]\nlocales = [\"en\", \"fr\", \"de\"]\n",
        );

        let project = fixture.load().unwrap();
        assert_eq!(project.locales(), ["en", "de"]);
    }

    #[test]
    fn test_invalid_manifest_names_locale() {
        let fixture = Fixture::new();
        fixture.write(
            "src/content/de/_meta.json",
            r#"{ "index": { "theme": { "toc": true } } }"#,
        );

        let err = fixture.load().unwrap_err();
        assert!(matches!(err, ProjectError::Manifest { ref locale, .. } if locale == "de"));
        let message = err.to_string();
        assert!(message.contains("`de`"), "{message}");
    }

    #[test]
    fn test_invalid_style_glob() {
        let fixture = Fixture::new();
        fixture.write("style.config.json", r#"{ "content": ["./src/**/*.{md"] }"#);

        let err = fixture.load().unwrap_err();
        assert!(matches!(err, ProjectError::Style { .. }));
    }

    #[test]
    fn test_missing_style_config() {
        let fixture = Fixture::new();
        fs::remove_file(fixture.root().join("style.config.json")).unwrap();

        let err = fixture.load().unwrap_err();
        assert!(err.to_string().contains("style.config.json"));
    }

    #[test]
    fn test_missing_content_dir() {
        let fixture = Fixture::new();
        fixture.write(CONFIG_FILENAME, "[content]\ndir = \"missing\"\n");

        let err = fixture.load().unwrap_err();
        assert!(matches!(err, ProjectError::ContentDir { .. }));
    }

    #[test]
    fn test_custom_meta_filename() {
        let fixture = Fixture::new();
        fixture.write(CONFIG_FILENAME, "[content]\nmeta_filename = \"_meta.yaml\"\n");
        fixture.write(
            "src/content/en/_meta.yaml",
            "index: Introduction\ninstallation: Installation\n",
        );

        let project = fixture.load().unwrap();
        assert_eq!(project.locales(), ["en"]);
        assert_eq!(project.default_manifest().len(), 2);
    }
}

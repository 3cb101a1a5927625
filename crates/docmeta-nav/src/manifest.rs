//! Ordered navigation manifest.
//!
//! The manifest maps page keys to [`NavigationEntry`] values. Iteration
//! always follows the order of the source document, which is the order the
//! sidebar renders.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::entry::{NavigationEntry, Page, Separator};
use crate::error::ManifestError;
use crate::raw::RawManifest;

/// Validated, immutable navigation manifest.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavigationManifest {
    entries: Vec<(String, NavigationEntry)>,
    /// Key to position in `entries`.
    index: HashMap<String, usize>,
}

impl NavigationManifest {
    /// Parse a manifest from JSON.
    pub fn from_json_str(content: &str) -> Result<Self, ManifestError> {
        let raw: RawManifest =
            serde_json::from_str(content).map_err(|e| ManifestError::Parse(e.to_string()))?;
        Self::from_raw(raw)
    }

    /// Parse a manifest from YAML.
    ///
    /// Empty content yields an empty manifest.
    pub fn from_yaml_str(content: &str) -> Result<Self, ManifestError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: RawManifest =
            serde_yaml::from_str(content).map_err(|e| ManifestError::Parse(e.to_string()))?;
        Self::from_raw(raw)
    }

    /// Load a manifest file, choosing the format from its extension.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let format = ManifestFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest = match format {
            ManifestFormat::Json => Self::from_json_str(&content),
            ManifestFormat::Yaml => Self::from_yaml_str(&content),
        }
        .map_err(|e| match e {
            ManifestError::Parse(message) => {
                ManifestError::Parse(format!("{}: {message}", path.display()))
            }
            other => other,
        })?;

        tracing::debug!(
            path = %path.display(),
            entries = manifest.len(),
            "Loaded navigation manifest"
        );
        Ok(manifest)
    }

    /// Build a manifest from already-typed entries.
    ///
    /// Applies the same key and uniqueness checks as parsing.
    pub fn try_from_entries<I, K>(entries: I) -> Result<Self, ManifestError>
    where
        I: IntoIterator<Item = (K, NavigationEntry)>,
        K: Into<String>,
    {
        let mut manifest = Self::default();
        for (key, entry) in entries {
            let key = key.into();
            validate_key(&key)?;
            manifest.push(key, entry)?;
        }
        Ok(manifest)
    }

    fn from_raw(raw: RawManifest) -> Result<Self, ManifestError> {
        if let Some(key) = raw.duplicates.into_iter().next() {
            return Err(ManifestError::DuplicateKey(key));
        }

        let mut manifest = Self {
            entries: Vec::with_capacity(raw.entries.len()),
            index: HashMap::with_capacity(raw.entries.len()),
        };
        for (key, value) in raw.entries {
            validate_key(&key)?;
            let entry = NavigationEntry::from_raw(&key, value)?;
            manifest.push(key, entry)?;
        }
        Ok(manifest)
    }

    fn push(&mut self, key: String, entry: NavigationEntry) -> Result<(), ManifestError> {
        if self.index.contains_key(&key) {
            return Err(ManifestError::DuplicateKey(key));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, entry));
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Look up an entry by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&NavigationEntry> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// Entries in display order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NavigationEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    /// Keys in display order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Page entries in display order.
    pub fn pages(&self) -> impl Iterator<Item = (&str, &Page)> {
        self.iter()
            .filter_map(|(k, e)| e.as_page().map(|page| (k, page)))
    }

    /// Pages listed in the sidebar, skipping hidden ones.
    pub fn visible_pages(&self) -> impl Iterator<Item = (&str, &Page)> {
        self.pages().filter(|(_, page)| page.is_visible())
    }

    /// Separator entries in display order.
    pub fn separators(&self) -> impl Iterator<Item = (&str, &Separator)> {
        self.iter().filter_map(|(k, e)| match e {
            NavigationEntry::Separator(separator) => Some((k, separator)),
            NavigationEntry::Page(_) => None,
        })
    }

    /// Group pages into sections headed by separators.
    ///
    /// Pages before the first separator form an untitled leading section,
    /// which is omitted when empty.
    #[must_use]
    pub fn sections(&self) -> Vec<NavSection<'_>> {
        let mut sections = vec![NavSection::default()];
        for (key, entry) in self.iter() {
            match entry {
                NavigationEntry::Separator(separator) => sections.push(NavSection {
                    key: Some(key),
                    title: Some(separator.title.as_str()),
                    pages: Vec::new(),
                }),
                NavigationEntry::Page(page) => {
                    if let Some(section) = sections.last_mut() {
                        section.pages.push((key, page));
                    }
                }
            }
        }
        if sections[0].pages.is_empty() {
            sections.remove(0);
        }
        sections
    }

    /// Report structural problems that do not prevent loading.
    #[must_use]
    pub fn lint(&self) -> Vec<ManifestWarning> {
        let mut warnings = Vec::new();
        let mut entries = self.entries.iter().peekable();
        while let Some((key, entry)) = entries.next() {
            if !entry.is_separator() {
                continue;
            }
            let section_empty = entries.peek().is_none_or(|(_, next)| next.is_separator());
            if section_empty {
                warnings.push(ManifestWarning::EmptySection { key: key.clone() });
            }
        }
        warnings
    }

    /// Serialize to pretty JSON, preserving display order.
    pub fn to_json_string(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Serialize for NavigationManifest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, entry) in &self.entries {
            map.serialize_entry(key, entry)?;
        }
        map.end()
    }
}

impl<'a> IntoIterator for &'a NavigationManifest {
    type Item = (&'a str, &'a NavigationEntry);
    type IntoIter = Box<dyn Iterator<Item = Self::Item> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Run of pages following a separator.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct NavSection<'a> {
    /// Separator key; `None` for the leading untitled section.
    pub key: Option<&'a str>,
    /// Separator title; `None` for the leading untitled section.
    pub title: Option<&'a str>,
    /// Pages in display order.
    pub pages: Vec<(&'a str, &'a Page)>,
}

/// Non-fatal manifest problem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ManifestWarning {
    /// Separator followed by another separator or by nothing.
    EmptySection { key: String },
}

impl fmt::Display for ManifestWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySection { key } => {
                write!(f, "separator `{key}` does not head any pages")
            }
        }
    }
}

/// Source format of a manifest file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ManifestFormat {
    Json,
    Yaml,
}

impl ManifestFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => Err(ManifestError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Check that a key is a usable page identifier.
fn validate_key(key: &str) -> Result<(), ManifestError> {
    let reason = if key.is_empty() {
        Some("key cannot be empty")
    } else if key.starts_with('.') {
        Some("key cannot start with '.'")
    } else if key.contains(['/', '\\']) {
        Some("key cannot contain path separators")
    } else if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        Some("key may only contain ASCII letters, digits, '-', '_' and '.'")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ManifestError::InvalidKey {
            key: key.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}

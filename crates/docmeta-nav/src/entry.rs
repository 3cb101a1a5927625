//! Navigation entry types.
//!
//! A manifest value is either a [`Separator`] that partitions the sidebar
//! into sections, or a [`Page`] with its display options.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ManifestError;
use crate::raw::{RawEntry, RawKind, RawValue};

/// Single value of the navigation manifest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavigationEntry {
    /// Non-navigable grouping marker.
    Separator(Separator),
    /// Navigable page.
    Page(Page),
}

impl NavigationEntry {
    /// Display title of the entry.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Separator(separator) => &separator.title,
            Self::Page(page) => &page.title,
        }
    }

    #[must_use]
    pub fn is_separator(&self) -> bool {
        matches!(self, Self::Separator(_))
    }

    /// Page descriptor, if this entry is a page.
    #[must_use]
    pub fn as_page(&self) -> Option<&Page> {
        match self {
            Self::Page(page) => Some(page),
            Self::Separator(_) => None,
        }
    }

    /// Build a validated entry from its parsed form.
    pub(crate) fn from_raw(key: &str, value: RawValue) -> Result<Self, ManifestError> {
        let entry = match value {
            RawValue::Title(title) => Self::Page(Page::new(require_title(key, Some(title))?)),
            RawValue::Entry(raw) => match raw.kind.unwrap_or_default() {
                RawKind::Separator => Self::Separator(Separator::from_raw(key, raw)?),
                RawKind::Page => Self::Page(Page::from_raw(key, raw)?),
            },
        };
        Ok(entry)
    }
}

impl Serialize for NavigationEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Separator(separator) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "separator")?;
                map.serialize_entry("title", &separator.title)?;
                map.end()
            }
            Self::Page(page) => {
                let len = 2
                    + usize::from(page.display != Display::Normal)
                    + usize::from(page.href.is_some());
                let mut map = serializer.serialize_map(Some(len))?;
                map.serialize_entry("title", &page.title)?;
                map.serialize_entry("theme", &page.theme)?;
                if page.display != Display::Normal {
                    map.serialize_entry("display", &page.display)?;
                }
                if let Some(href) = &page.href {
                    map.serialize_entry("href", href)?;
                }
                map.end()
            }
        }
    }
}

/// Visual partition between sections of the navigation list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Separator {
    /// Section heading shown in the sidebar.
    pub title: String,
}

impl Separator {
    fn from_raw(key: &str, raw: RawEntry) -> Result<Self, ManifestError> {
        // Separators carry nothing but a title.
        let stray = [
            ("theme", raw.theme.is_some()),
            ("display", raw.display.is_some()),
            ("href", raw.href.is_some()),
        ];
        if let Some((field, _)) = stray.into_iter().find(|(_, present)| *present) {
            return Err(ManifestError::SeparatorField {
                key: key.to_owned(),
                field,
            });
        }
        Ok(Self {
            title: require_title(key, raw.title)?,
        })
    }
}

/// Navigable page with its display options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    /// Link text shown in the sidebar.
    pub title: String,
    /// Per-page theme switches.
    pub theme: PageTheme,
    /// Sidebar visibility.
    pub display: Display,
    /// External link target, replacing the page route.
    pub href: Option<String>,
}

impl Page {
    /// Create a page with default theme options.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            theme: PageTheme::default(),
            display: Display::Normal,
            href: None,
        }
    }

    /// Whether the page is listed in the sidebar.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.display != Display::Hidden
    }

    fn from_raw(key: &str, raw: RawEntry) -> Result<Self, ManifestError> {
        let title = require_title(key, raw.title)?;
        let href = raw.href.flatten();
        if let Some(href) = &href {
            validate_href(key, href)?;
        }
        Ok(Self {
            title,
            theme: raw.theme.flatten().unwrap_or_default(),
            display: raw.display.flatten().unwrap_or_default(),
            href,
        })
    }
}

/// Theme switches applied to a single page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageTheme {
    /// Show the table of contents.
    pub toc: bool,
    /// Page layout variant.
    pub layout: Layout,
    /// Show breadcrumb navigation above the content.
    pub breadcrumb: bool,
    /// Show previous/next links below the content.
    pub pagination: bool,
    /// Show the sidebar.
    pub sidebar: bool,
}

impl Default for PageTheme {
    fn default() -> Self {
        Self {
            toc: true,
            layout: Layout::Default,
            breadcrumb: true,
            pagination: true,
            sidebar: true,
        }
    }
}

/// Page layout variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Content column with sidebar and table of contents.
    #[default]
    Default,
    /// Content spans the full width.
    Full,
    /// No layout chrome around the content.
    Raw,
}

/// Sidebar visibility of a page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Display {
    #[default]
    Normal,
    /// Routable but not listed.
    Hidden,
    /// Folder-style display from nested manifests. A flat manifest has no
    /// children to expand, so the page is listed like `Normal`; the value is
    /// kept so it serializes back unchanged.
    Children,
}

/// Require a non-blank title.
fn require_title(key: &str, title: Option<String>) -> Result<String, ManifestError> {
    match title {
        Some(title) if !title.trim().is_empty() => Ok(title),
        _ => Err(ManifestError::MissingTitle(key.to_owned())),
    }
}

/// Require an `http(s)://` URL or a site-absolute path.
fn validate_href(key: &str, href: &str) -> Result<(), ManifestError> {
    let valid = href.starts_with("http://")
        || href.starts_with("https://")
        || (href.starts_with('/') && !href.starts_with("//"));
    if valid {
        Ok(())
    } else {
        Err(ManifestError::InvalidHref {
            key: key.to_owned(),
            href: href.to_owned(),
        })
    }
}

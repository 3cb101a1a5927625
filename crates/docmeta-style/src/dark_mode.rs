//! Dark-mode activation strategy.
//!
//! Accepted forms:
//!
//! - `"media"`: follow the system color-scheme preference
//! - `"class"`: dark styles apply under an element carrying the `dark` class
//! - `["class", ".night"]`: same, with a custom class

use std::fmt;

use serde::de::{self, Deserializer, Error as _, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};

/// Class name used by class-based dark mode unless overridden.
pub const DEFAULT_DARK_CLASS: &str = "dark";

/// Media query matched by system-preference dark mode.
pub const DARK_MEDIA_QUERY: &str = "(prefers-color-scheme: dark)";

/// How dark styles are activated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DarkMode {
    /// System color-scheme preference.
    #[default]
    Media,
    /// Presence of a class on the element or an ancestor.
    Class { class_name: String },
}

/// CSS condition guarding dark styles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DarkVariant {
    /// Selector prefix, e.g. `:is(.dark *)`.
    Selector(String),
    /// Media query condition.
    MediaQuery(&'static str),
}

impl DarkMode {
    /// Class-based dark mode with the default class.
    #[must_use]
    pub fn class() -> Self {
        Self::Class {
            class_name: DEFAULT_DARK_CLASS.to_owned(),
        }
    }

    /// Class that toggles dark styles, if class-based.
    #[must_use]
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Self::Class { class_name } => Some(class_name),
            Self::Media => None,
        }
    }

    /// CSS condition a style compiler emits around dark styles.
    #[must_use]
    pub fn variant(&self) -> DarkVariant {
        match self {
            Self::Media => DarkVariant::MediaQuery(DARK_MEDIA_QUERY),
            Self::Class { class_name } => DarkVariant::Selector(format!(":is(.{class_name} *)")),
        }
    }

    /// Whether dark styles apply for an element.
    ///
    /// `classes` are the classes on the element and its ancestors;
    /// `prefers_dark` is the system color-scheme preference. Class mode
    /// ignores the preference and media mode ignores the classes.
    pub fn is_active<'a, I>(&self, classes: I, prefers_dark: bool) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        match self {
            Self::Media => prefers_dark,
            Self::Class { class_name } => classes.into_iter().any(|c| c == class_name.as_str()),
        }
    }
}

impl fmt::Display for DarkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Media => f.write_str("media"),
            Self::Class { class_name } if class_name == DEFAULT_DARK_CLASS => f.write_str("class"),
            Self::Class { class_name } => write!(f, "class (.{class_name})"),
        }
    }
}

/// Parse a `.name` selector (or bare `name`) into a class name.
fn parse_class_selector(selector: &str) -> Option<String> {
    let name = selector.strip_prefix('.').unwrap_or(selector);
    let mut chars = name.chars();
    let first = chars.next()?;
    let valid_start = first.is_ascii_alphabetic() || first == '_' || first == '-';
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    (valid_start && valid_rest).then(|| name.to_owned())
}

impl Serialize for DarkMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Media => serializer.serialize_str("media"),
            Self::Class { class_name } if class_name == DEFAULT_DARK_CLASS => {
                serializer.serialize_str("class")
            }
            Self::Class { class_name } => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element("class")?;
                seq.serialize_element(&format!(".{class_name}"))?;
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for DarkMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DarkModeVisitor)
    }
}

struct DarkModeVisitor;

impl<'de> Visitor<'de> for DarkModeVisitor {
    type Value = DarkMode;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(r#""media", "class" or ["class", ".<name>"]"#)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        match v {
            "media" => Ok(DarkMode::Media),
            "class" => Ok(DarkMode::class()),
            other => Err(E::unknown_variant(other, &["media", "class"])),
        }
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let strategy: String = seq
            .next_element()?
            .ok_or_else(|| A::Error::invalid_length(0, &self))?;
        if strategy != "class" {
            return Err(de::Error::custom(format_args!(
                "only the \"class\" strategy takes a selector, got \"{strategy}\""
            )));
        }
        let selector: String = seq
            .next_element()?
            .ok_or_else(|| A::Error::invalid_length(1, &self))?;
        if seq.next_element::<de::IgnoredAny>()?.is_some() {
            return Err(de::Error::invalid_length(3, &self));
        }
        let class_name = parse_class_selector(&selector).ok_or_else(|| {
            A::Error::custom(format_args!(
                "dark mode selector \"{selector}\" must be a single class like \".dark\""
            ))
        })?;
        Ok(DarkMode::Class { class_name })
    }
}

//! Format-agnostic parsed form of a manifest, before validation.
//!
//! Deserialization keeps every key in document order and records repeated
//! keys instead of silently overwriting them, so validation can report the
//! offending key by name.

use std::collections::HashSet;
use std::fmt;

use serde::de::value::MapAccessDeserializer;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::entry::{Display, PageTheme};

/// Ordered key/value pairs as written in the source document.
#[derive(Debug, Default)]
pub(crate) struct RawManifest {
    pub entries: Vec<(String, RawValue)>,
    /// Keys seen more than once, in order of their second occurrence.
    pub duplicates: Vec<String>,
}

impl<'de> Deserialize<'de> for RawManifest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RawManifestVisitor)
    }
}

struct RawManifestVisitor;

impl<'de> Visitor<'de> for RawManifestVisitor {
    type Value = RawManifest;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a mapping of page keys to navigation entries")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(RawManifest::default())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut manifest = RawManifest::default();
        let mut seen = HashSet::new();

        while let Some(key) = map.next_key::<String>()? {
            let value = map
                .next_value::<RawValue>()
                .map_err(|e| de::Error::custom(format_args!("entry `{key}`: {e}")))?;
            if seen.insert(key.clone()) {
                manifest.entries.push((key, value));
            } else {
                manifest.duplicates.push(key);
            }
        }

        Ok(manifest)
    }
}

/// Manifest value: either a bare title or a full entry object.
#[derive(Debug)]
pub(crate) enum RawValue {
    Title(String),
    Entry(RawEntry),
}

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawValueVisitor)
    }
}

struct RawValueVisitor;

impl<'de> Visitor<'de> for RawValueVisitor {
    type Value = RawValue;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a title string or an entry object")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(RawValue::Title(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(RawValue::Title(v))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        RawEntry::deserialize(MapAccessDeserializer::new(map)).map(RawValue::Entry)
    }
}

/// Entry object with every field optional; requirements are checked later.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawEntry {
    #[serde(default, rename = "type")]
    pub kind: Option<RawKind>,
    #[serde(default)]
    pub title: Option<String>,
    /// Outer `Some` when the field is written at all, even as `null`.
    #[serde(default, deserialize_with = "present")]
    pub theme: Option<Option<PageTheme>>,
    #[serde(default, deserialize_with = "present")]
    pub display: Option<Option<Display>>,
    #[serde(default, deserialize_with = "present")]
    pub href: Option<Option<String>>,
}

/// Keep a written field distinguishable from an absent one.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Value of the `type` field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum RawKind {
    #[default]
    #[serde(alias = "doc")]
    Page,
    Separator,
}

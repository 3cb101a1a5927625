//! Content pattern parsing.
//!
//! Patterns use `glob` syntax (`*`, `**`, `?`, `[...]`) extended with brace
//! alternation (`*.{ts,tsx}`) and a leading `!` for exclusion. Braces are
//! expanded up front so every alternative compiles to a plain
//! [`glob::Pattern`].

use std::path::{Component, Path, PathBuf};

use crate::error::StyleError;

/// Upper bound on brace expansion output for a single pattern.
const MAX_ALTERNATIVES: usize = 1024;

/// Characters that make a path component a wildcard.
const GLOB_META: [char; 4] = ['*', '?', '[', ']'];

/// Parsed and validated content pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentPattern {
    source: String,
    negated: bool,
    alternatives: Vec<Alternative>,
}

/// One brace-expanded alternative, split at the first wildcard component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Alternative {
    /// Leading components without wildcards (may contain `..`).
    pub prefix: PathBuf,
    /// Remaining glob, `/`-separated; empty for a literal path.
    pub glob: String,
}

impl ContentPattern {
    /// Parse and validate a pattern.
    pub fn parse(source: &str) -> Result<Self, StyleError> {
        let (negated, body) = match source.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, source),
        };
        let body = body.strip_prefix("./").unwrap_or(body);
        if body.trim().is_empty() {
            return Err(StyleError::invalid_glob(source, "pattern is empty"));
        }

        let alternatives = expand_braces(body)
            .map_err(|message| StyleError::invalid_glob(source, message))?
            .iter()
            .map(|alt| split_alternative(alt).map_err(|m| StyleError::invalid_glob(source, m)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            source: source.to_owned(),
            negated,
            alternatives,
        })
    }

    /// Pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the pattern excludes matches (leading `!`).
    #[must_use]
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub(crate) fn alternatives(&self) -> &[Alternative] {
        &self.alternatives
    }
}

/// Split an alternative into its literal prefix and glob remainder.
fn split_alternative(alt: &str) -> Result<Alternative, String> {
    let mut prefix = PathBuf::new();
    let mut rest = Vec::new();

    for (i, part) in alt.split('/').enumerate() {
        let wildcard = !rest.is_empty() || part.contains(GLOB_META);
        if !wildcard {
            match part {
                "" if i == 0 => prefix.push("/"),
                "" => {}
                _ => prefix.push(part),
            }
            continue;
        }
        if part == ".." {
            return Err("'..' must come before any wildcard".to_owned());
        }
        rest.push(part);
    }

    let glob = rest.join("/");
    if !glob.is_empty() {
        glob::Pattern::new(&glob).map_err(|e| e.msg.to_owned())?;
    }
    Ok(Alternative { prefix, glob })
}

/// Expand `{a,b}` groups, including nested ones, into plain patterns.
pub(crate) fn expand_braces(pattern: &str) -> Result<Vec<String>, String> {
    let mut out = Vec::new();
    expand_into(pattern, &mut out)?;
    Ok(out)
}

fn expand_into(pattern: &str, out: &mut Vec<String>) -> Result<(), String> {
    let Some((open, close)) = find_group(pattern)? else {
        if out.len() >= MAX_ALTERNATIVES {
            return Err(format!(
                "brace expansion exceeds {MAX_ALTERNATIVES} alternatives"
            ));
        }
        out.push(pattern.to_owned());
        return Ok(());
    };

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];
    for alt in split_top_level(&pattern[open + 1..close]) {
        expand_into(&format!("{prefix}{alt}{suffix}"), out)?;
    }
    Ok(())
}

/// Byte offsets of the first top-level `{` and its matching `}`.
///
/// Braces inside `[...]` classes are literal.
fn find_group(pattern: &str) -> Result<Option<(usize, usize)>, String> {
    let mut depth = 0usize;
    let mut open = None;
    let mut scanner = ClassScanner::default();

    for (i, c) in pattern.char_indices() {
        if scanner.step(c) {
            continue;
        }
        match c {
            '{' => {
                if depth == 0 {
                    open = Some(i);
                }
                depth += 1;
            }
            '}' => {
                if depth == 0 {
                    return Err("unmatched '}'".to_owned());
                }
                depth -= 1;
                if depth == 0 {
                    return Ok(open.map(|o| (o, i)));
                }
            }
            _ => {}
        }
    }

    if depth > 0 {
        return Err("unclosed '{'".to_owned());
    }
    Ok(None)
}

/// Split a brace body at commas that are not nested in braces or classes.
fn split_top_level(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut scanner = ClassScanner::default();

    for (i, c) in body.char_indices() {
        if scanner.step(c) {
            continue;
        }
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts
}

/// Tracks whether the scan position is inside a `[...]` class.
#[derive(Default)]
struct ClassScanner {
    in_class: bool,
    negated: bool,
    members: usize,
}

impl ClassScanner {
    /// Feed one character; returns true if it belongs to a class.
    fn step(&mut self, c: char) -> bool {
        if !self.in_class {
            if c == '[' {
                *self = Self {
                    in_class: true,
                    ..Self::default()
                };
                return true;
            }
            return false;
        }
        if c == '!' && self.members == 0 && !self.negated {
            self.negated = true;
            return true;
        }
        // `]` as the first member is literal.
        if c == ']' && self.members > 0 {
            self.in_class = false;
            return true;
        }
        self.members += 1;
        true
    }
}

/// Resolve `.` and `..` components without touching the filesystem.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

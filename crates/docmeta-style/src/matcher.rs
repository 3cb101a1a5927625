//! Compiled content matcher and deterministic content scan.
//!
//! Each pattern alternative is anchored at a base directory: its literal
//! prefix is resolved against the base and escaped, and the glob remainder is
//! appended. Scanning walks only those resolved prefixes, never the whole
//! base directory.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use ignore::WalkBuilder;

use crate::error::StyleError;
use crate::pattern::{ContentPattern, normalize};

/// `*` stays within one path component; `**` crosses components. Neither
/// matches a leading `.`, so hidden entries need a pattern that spells it.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Matches file paths against a set of content patterns.
#[derive(Clone, Debug)]
pub struct ContentMatcher {
    base: PathBuf,
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
    /// Literal `!` paths; everything below them is excluded too.
    exclude_dirs: Vec<PathBuf>,
    /// Directories (or files) to walk during a scan, without overlaps.
    roots: Vec<PathBuf>,
}

impl ContentMatcher {
    /// Anchor `patterns` at `base`.
    pub fn new(base: &Path, patterns: &[ContentPattern]) -> Result<Self, StyleError> {
        let base = normalize(base);
        let mut include = Vec::new();
        let mut exclude = Vec::new();
        let mut exclude_dirs = Vec::new();
        let mut roots = BTreeSet::new();

        for pattern in patterns {
            for alt in pattern.alternatives() {
                let root = normalize(&base.join(&alt.prefix));
                let anchored = anchor(&root, &alt.glob);
                let compiled = Pattern::new(&anchored)
                    .map_err(|e| StyleError::invalid_glob(pattern.as_str(), e.msg))?;
                if pattern.is_negated() {
                    if alt.glob.is_empty() {
                        exclude_dirs.push(root);
                        continue;
                    }
                    exclude.push(compiled);
                } else {
                    include.push(compiled);
                    roots.insert(root);
                }
            }
        }

        Ok(Self {
            base,
            include,
            exclude,
            exclude_dirs,
            roots: prune_nested(roots),
        })
    }

    /// Directory patterns are anchored at.
    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Check a path against the patterns.
    ///
    /// Relative paths are resolved against the base directory. A path matches
    /// when at least one positive pattern accepts it and no `!` pattern does.
    /// A `!` pattern without wildcards excludes that path and everything
    /// below it. Wildcards never match a leading `.`, which keeps this in
    /// agreement with [`scan`](Self::scan).
    #[must_use]
    pub fn is_match(&self, path: &Path) -> bool {
        self.matches_normalized(&normalize(&self.base.join(path)))
    }

    fn matches_normalized(&self, path: &Path) -> bool {
        self.include
            .iter()
            .any(|p| p.matches_path_with(path, MATCH_OPTIONS))
            && !self
                .exclude
                .iter()
                .any(|p| p.matches_path_with(path, MATCH_OPTIONS))
            && !self.exclude_dirs.iter().any(|dir| path.starts_with(dir))
    }

    /// Collect every matching file below the pattern roots.
    ///
    /// Hidden entries are returned only when a pattern names them with a
    /// literal `.`. Excluded directories are not descended into. The result
    /// is sorted and free of duplicates, so a fixed filesystem snapshot always
    /// yields the same list. Missing roots contribute nothing.
    pub fn scan(&self) -> Result<Vec<PathBuf>, StyleError> {
        let mut files = BTreeSet::new();

        for root in &self.roots {
            let walk_root = if root.as_os_str().is_empty() {
                Path::new(".")
            } else {
                root.as_path()
            };
            if !walk_root.exists() {
                tracing::debug!(root = %walk_root.display(), "Content root does not exist");
                continue;
            }

            let exclude_dirs = self.exclude_dirs.clone();
            let walker = WalkBuilder::new(walk_root)
                .standard_filters(false)
                .sort_by_file_name(|a, b| a.cmp(b))
                .filter_entry(move |entry| {
                    let path = normalize(entry.path());
                    !exclude_dirs.iter().any(|dir| path.starts_with(dir))
                })
                .build();
            for entry in walker {
                let entry = entry.map_err(|source| StyleError::Walk {
                    path: walk_root.to_path_buf(),
                    source,
                })?;
                if !entry.file_type().is_some_and(|t| t.is_file()) {
                    continue;
                }
                let path = normalize(entry.path());
                if self.matches_normalized(&path) {
                    files.insert(path);
                }
            }
        }

        tracing::debug!(
            base = %self.base.display(),
            roots = self.roots.len(),
            files = files.len(),
            "Content scan completed"
        );
        Ok(files.into_iter().collect())
    }
}

/// Join an escaped literal root with a glob remainder.
fn anchor(root: &Path, glob: &str) -> String {
    let root = Pattern::escape(&root.to_string_lossy());
    match (root.is_empty(), glob.is_empty()) {
        (true, _) => glob.to_owned(),
        (false, true) => root,
        (false, false) if root.ends_with('/') => format!("{root}{glob}"),
        (false, false) => format!("{root}/{glob}"),
    }
}

/// Drop roots that live inside another root.
fn prune_nested(roots: BTreeSet<PathBuf>) -> Vec<PathBuf> {
    let mut pruned: Vec<PathBuf> = Vec::new();
    // Sorted order puts ancestors before their descendants.
    for root in roots {
        let covered = pruned
            .iter()
            .any(|kept| kept.as_os_str().is_empty() || root.starts_with(kept));
        if !covered {
            pruned.push(root);
        }
    }
    pruned
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    fn matcher(base: &Path, sources: &[&str]) -> ContentMatcher {
        let patterns: Vec<_> = sources
            .iter()
            .map(|s| ContentPattern::parse(s).unwrap())
            .collect();
        ContentMatcher::new(base, &patterns).unwrap()
    }

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_is_match_brace_extensions() {
        let m = matcher(Path::new("/site"), &["./src/**/*.{js,jsx,ts,tsx,md,mdx}"]);
        assert!(m.is_match(Path::new("src/index.tsx")));
        assert!(m.is_match(Path::new("src/content/en/batching.mdx")));
        assert!(m.is_match(Path::new("/site/src/a/b/c.js")));
        assert!(!m.is_match(Path::new("src/styles.css")));
        assert!(!m.is_match(Path::new("lib/index.ts")));
        assert!(!m.is_match(Path::new("/other/src/index.ts")));
    }

    #[test]
    fn test_single_star_stays_in_component() {
        let m = matcher(Path::new("/site"), &["src/*.ts"]);
        assert!(m.is_match(Path::new("src/main.ts")));
        assert!(!m.is_match(Path::new("src/nested/main.ts")));
    }

    #[test]
    fn test_negated_pattern_excludes() {
        let m = matcher(Path::new("/site"), &["src/**/*.ts", "!src/**/*.test.ts"]);
        assert!(m.is_match(Path::new("src/util.ts")));
        assert!(!m.is_match(Path::new("src/util.test.ts")));
    }

    #[test]
    fn test_no_positive_patterns_matches_nothing() {
        let m = matcher(Path::new("/site"), &["!src/**"]);
        assert!(!m.is_match(Path::new("src/a.ts")));
    }

    #[test]
    fn test_parent_prefix_resolved() {
        let m = matcher(Path::new("/site/docs"), &["../shared/**/*.tsx"]);
        assert!(m.is_match(Path::new("/site/shared/ui/button.tsx")));
        assert!(!m.is_match(Path::new("/site/docs/shared/ui/button.tsx")));
    }

    #[test]
    fn test_base_with_glob_characters_is_literal() {
        let m = matcher(Path::new("/work/[draft]"), &["src/*.md"]);
        assert!(m.is_match(Path::new("src/a.md")));
        assert!(!m.is_match(Path::new("/work/d/src/a.md")));
    }

    #[test]
    fn test_roots_pruned() {
        let m = matcher(
            Path::new("/site"),
            &["src/**/*.ts", "src/content/**/*.mdx", "pages/*.md"],
        );
        assert_eq!(
            m.roots,
            vec![PathBuf::from("/site/pages"), PathBuf::from("/site/src")]
        );
    }

    #[test]
    fn test_scan_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "src/pages/index.tsx");
        touch(root, "src/content/en/index.mdx");
        touch(root, "src/content/en/_meta.json");
        touch(root, "src/styles/global.css");
        touch(root, "src/.cache/stale.tsx");
        touch(root, "node_modules/pkg/index.js");

        let m = matcher(root, &["./src/**/*.{js,jsx,ts,tsx,md,mdx}"]);
        let files = m.scan().unwrap();

        let base = normalize(root);
        let rel: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(&base).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            rel,
            vec!["src/content/en/index.mdx", "src/pages/index.tsx"]
        );
    }

    #[test]
    fn test_scan_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.md", "a.md", "c/d.md", "c/a.md"] {
            touch(dir.path(), &format!("docs/{name}"));
        }
        let m = matcher(dir.path(), &["docs/**/*.md", "docs/*.md"]);
        let first = m.scan().unwrap();
        let second = m.scan().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
        let mut sorted = first.clone();
        sorted.sort();
        assert_eq!(first, sorted);
    }

    #[test]
    fn test_scan_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let m = matcher(dir.path(), &["src/**/*.tsx"]);
        assert!(m.scan().unwrap().is_empty());
    }

    #[test]
    fn test_scan_literal_file_pattern() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "index.html");
        touch(dir.path(), "other.html");
        let m = matcher(dir.path(), &["index.html"]);
        let files = m.scan().unwrap();
        assert_eq!(files, vec![normalize(&dir.path().join("index.html"))]);
    }

    #[test]
    fn test_wildcards_skip_hidden_entries() {
        let m = matcher(Path::new("/site"), &["src/**/*.js", "src/.eslintrc.js"]);
        assert!(m.is_match(Path::new("src/.eslintrc.js")));
        assert!(!m.is_match(Path::new("src/.cache/bundle.js")));
        assert!(!m.is_match(Path::new("src/.prettierrc.js")));
        assert!(m.is_match(Path::new("src/app/main.js")));
    }

    #[test]
    fn test_scan_agrees_with_is_match_on_hidden_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "src/.eslintrc.js");
        touch(dir.path(), "src/.prettierrc.js");
        touch(dir.path(), "src/.cache/bundle.js");
        touch(dir.path(), "src/main.js");

        let m = matcher(dir.path(), &["src/**/*.js", "src/.eslintrc.js"]);
        let files = m.scan().unwrap();
        let base = normalize(dir.path());
        let rel: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(&base).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(rel, vec!["src/.eslintrc.js", "src/main.js"]);
        for file in &files {
            assert!(m.is_match(file));
        }
    }

    #[test]
    fn test_negated_directory_excludes_subtree() {
        let m = matcher(Path::new("/site"), &["src/**/*.mdx", "!src/drafts"]);
        assert!(m.is_match(Path::new("src/guide.mdx")));
        assert!(!m.is_match(Path::new("src/drafts/wip.mdx")));
        assert!(!m.is_match(Path::new("src/drafts/old/notes.mdx")));
        assert!(m.is_match(Path::new("src/drafts-archive/done.mdx")));
    }

    #[test]
    fn test_scan_skips_negated_directory() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "src/guide.mdx");
        touch(dir.path(), "src/drafts/wip.mdx");
        touch(dir.path(), "src/drafts/old/notes.mdx");

        let m = matcher(dir.path(), &["src/**/*.mdx", "!./src/drafts/"]);
        let files = m.scan().unwrap();
        assert_eq!(files, vec![normalize(&dir.path().join("src/guide.mdx"))]);
    }

    #[test]
    fn test_anchor() {
        assert_eq!(anchor(Path::new("/site/src"), "**/*.ts"), "/site/src/**/*.ts");
        assert_eq!(anchor(Path::new("/"), "*.ts"), "/*.ts");
        assert_eq!(anchor(Path::new(""), "*.ts"), "*.ts");
        assert_eq!(anchor(Path::new("/a/[b]"), ""), "/a/[[]b[]]");
    }
}

//! Supporting helpers: message prefixes, repo-relative path handling, and the
//! ordered ignore list used during file discovery.

use glob::{MatchOptions, Pattern};
use owo_colors::OwoColorize;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

pub fn error_prefix() -> String {
    if colors_enabled() {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}

pub fn note_prefix() -> String {
    if colors_enabled() {
        "note:".cyan().bold().to_string()
    } else {
        "note:".to_string()
    }
}

pub fn info_prefix() -> String {
    if colors_enabled() {
        "info:".blue().bold().to_string()
    } else {
        "info:".to_string()
    }
}

/// Normalize a relative path or pattern to `/`-separated form without a
/// leading `./` or trailing slash.
pub fn normalize_path(raw: &str) -> String {
    let replaced = raw.trim().replace('\\', "/");
    segments(&replaced).join("/")
}

/// Split a `/`-separated path into its non-empty segments, dropping `.`.
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect()
}

/// True when `path` lies strictly below the directory `prefix`.
pub fn is_under(path: &str, prefix: &str) -> bool {
    let p = segments(path);
    let d = segments(prefix);
    p.len() > d.len() && p.iter().zip(d.iter()).all(|(a, b)| a == b)
}

/// Parent directory of a repo-relative file path (`""` for top-level files).
pub fn parent_dir(path: &str) -> String {
    let segs = segments(path);
    match segs.split_last() {
        Some((_, dirs)) => dirs.join("/"),
        None => String::new(),
    }
}

/// Render `path` relative to `root` in `/`-separated form.
///
/// Relative inputs are taken as relative to the current directory.
pub fn to_repo_relative(root: &Path, path: &Path) -> String {
    let absolute: PathBuf = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => root.join(path),
        }
    };
    let rel = pathdiff::diff_paths(&absolute, root).unwrap_or(absolute);
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().to_string()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect();
    parts.join("/")
}

#[derive(Debug, Clone)]
struct IgnoreEntry {
    pattern: Pattern,
    negated: bool,
}

/// Ordered glob list with `!` negation. The last matching entry decides.
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    entries: Vec<IgnoreEntry>,
}

const MATCH_OPTS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

impl IgnoreSet {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = Vec::new();
        for raw in patterns {
            let raw = raw.as_ref().trim();
            let (negated, body) = match raw.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, raw),
            };
            let body = normalize_path(body);
            if body.is_empty() {
                continue;
            }
            match Pattern::new(&body) {
                Ok(pattern) => entries.push(IgnoreEntry { pattern, negated }),
                Err(e) => warn!(pattern = raw, error = %e, "skipping invalid ignore pattern"),
            }
        }
        IgnoreSet { entries }
    }

    /// Decide whether a repo-relative path is ignored.
    ///
    /// A pattern matches the path itself or any of its ancestor directories.
    pub fn is_ignored(&self, path: &str) -> bool {
        let path = normalize_path(path);
        let segs = segments(&path);
        let mut ignored = false;
        for entry in &self.entries {
            let hit = (1..=segs.len()).any(|n| {
                entry
                    .pattern
                    .matches_with(&segs[..n].join("/"), MATCH_OPTS)
            });
            if hit {
                ignored = !entry.negated;
            }
        }
        ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_dots_and_slashes() {
        assert_eq!(normalize_path("./src/components/"), "src/components");
        assert_eq!(normalize_path("src\\styles"), "src/styles");
        assert_eq!(normalize_path("  "), "");
    }

    #[test]
    fn test_is_under_requires_strict_descendant() {
        assert!(is_under("src/components/Card.scss", "src/components"));
        assert!(!is_under("src/components", "src/components"));
        assert!(!is_under("src/componentsX/a.scss", "src/components"));
    }

    #[test]
    fn test_ignore_last_match_wins_with_negation() {
        let set = IgnoreSet::new([
            "src/**/*.vue",
            "node_modules/**/*",
            "src/styles/partials/**/*.scss",
            "!src/styles/partials/keyframes.scss",
        ]);
        assert!(set.is_ignored("src/components/App.vue"));
        assert!(set.is_ignored("src/styles/partials/_mixins.scss"));
        assert!(!set.is_ignored("src/styles/partials/keyframes.scss"));
        assert!(!set.is_ignored("src/styles/global.scss"));
        assert!(set.is_ignored("node_modules/pkg/a.css"));
    }

    #[test]
    fn test_later_exclusion_overrides_earlier_negation() {
        let set = IgnoreSet::new(["!dist/keep.css", "dist"]);
        assert!(set.is_ignored("dist/keep.css"));
    }

    #[test]
    fn test_directory_pattern_covers_descendants() {
        let set = IgnoreSet::new(["dist"]);
        assert!(set.is_ignored("dist/a/b.css"));
        assert!(!set.is_ignored("src/dist.css"));
    }

    #[test]
    fn test_relative_path_from_root() {
        let root = Path::new("/repo");
        assert_eq!(
            to_repo_relative(root, Path::new("/repo/src/a.scss")),
            "src/a.scss"
        );
    }
}

//! Alias root resolution.
//!
//! Every `(root, pattern)` pair is flattened into one list sorted
//! most-specific-first (segment count), breaking ties by declaration order
//! with the later root first. Resolution is then a first-match scan.
//! A `*` segment matches any single directory name.

use crate::models::descriptor::ConventionConfig;
use crate::utils::{normalize_path, segments};
use glob::Pattern;
use serde::Serialize;
use std::cmp::Reverse;

#[derive(Debug, Clone)]
struct PatternEntry {
    root: String,
    order: usize,
    pattern: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Glob(Pattern),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        if raw.contains(['*', '?', '[']) {
            if let Ok(p) = Pattern::new(raw) {
                return Segment::Glob(p);
            }
        }
        Segment::Literal(raw.to_string())
    }

    fn matches(&self, seg: &str) -> bool {
        match self {
            Segment::Literal(s) => s == seg,
            Segment::Glob(p) => p.matches(seg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Outcome of resolving a file path to its alias root.
pub struct AliasMatch {
    pub root: String,
    /// The matched pattern, i.e. the root's base directory for this file.
    pub pattern: String,
    /// Number of path segments in the matched pattern.
    pub specificity: usize,
    /// Directory segments between the base directory and the file.
    pub dirs: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AliasResolver {
    entries: Vec<PatternEntry>,
}

impl AliasResolver {
    pub fn new(config: &ConventionConfig) -> Self {
        let mut entries: Vec<PatternEntry> = Vec::new();
        for (order, root) in config.alias_roots.iter().enumerate() {
            for pattern in &root.patterns {
                let pattern = normalize_path(pattern);
                let segs: Vec<Segment> = segments(&pattern).into_iter().map(Segment::parse).collect();
                if segs.is_empty() {
                    continue;
                }
                entries.push(PatternEntry {
                    root: root.name.clone(),
                    order,
                    pattern,
                    segments: segs,
                });
            }
        }
        entries.sort_by_key(|e| (Reverse(e.segments.len()), Reverse(e.order)));
        AliasResolver { entries }
    }

    /// Resolve a repo-relative file path to the most specific alias root.
    pub fn resolve(&self, path: &str) -> Option<AliasMatch> {
        let normalized = normalize_path(path);
        let segs = segments(&normalized);
        let entry = self.entries.iter().find(|e| {
            segs.len() > e.segments.len()
                && e.segments.iter().zip(segs.iter()).all(|(p, s)| p.matches(s))
        })?;
        let n = entry.segments.len();
        Some(AliasMatch {
            root: entry.root.clone(),
            pattern: entry.pattern.clone(),
            specificity: n,
            dirs: segs[n..segs.len() - 1].iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Base directory of a match with wildcard segments filled in from the path.
    pub fn base_dir(path: &str, m: &AliasMatch) -> String {
        let normalized = normalize_path(path);
        segments(&normalized)[..m.specificity].join("/")
    }
}

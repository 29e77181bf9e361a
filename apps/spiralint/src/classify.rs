//! Tier classification.
//!
//! Within its alias root, a file is `root` tier when it sits directly in the
//! root's base directory and that directory holds entry files. Anything
//! nested deeper is `child` tier. Depth is counted from the anchor: the
//! shallowest directory on the file's ancestor chain (starting at the base
//! directory) that contains an entry file. When the base directory holds only
//! sub-directories the anchor is deeper, and every file beneath is `child`.

use crate::models::descriptor::{CaseStyle, FileCase};
use crate::resolve::{AliasMatch, AliasResolver};
use crate::utils::{normalize_path, parent_dir};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Root,
    Child,
    Unclassified,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Root => "root",
            Tier::Child => "child",
            Tier::Unclassified => "unclassified",
        }
    }
}

/// Directories (repo-relative) that contain at least one style entry file.
#[derive(Debug, Clone, Default)]
pub struct EntryIndex {
    dirs: HashSet<String>,
}

impl EntryIndex {
    pub fn from_files<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let dirs = files
            .into_iter()
            .map(|f| parent_dir(&normalize_path(f.as_ref())))
            .collect();
        EntryIndex { dirs }
    }

    pub fn contains_entry(&self, dir: &str) -> bool {
        self.dirs.contains(&normalize_path(dir))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A file annotated with its alias root, tier and expected case.
pub struct ClassifiedFile {
    pub path: String,
    pub alias: Option<AliasMatch>,
    pub tier: Tier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_case: Option<CaseStyle>,
    /// Component name the file belongs to (stem for root tier, the first
    /// directory under the base for child tier).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
}

impl ClassifiedFile {
    /// File name up to the first `.`, without the SCSS partial underscore.
    pub fn base_name(&self) -> String {
        base_name(&self.path)
    }
}

pub fn base_name(path: &str) -> String {
    let name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let stem = name.split('.').next().unwrap_or_default();
    stem.strip_prefix('_').unwrap_or(stem).to_string()
}

/// Determine tier and anchor-relative depth for a resolved file.
pub fn classify(path: &str, alias: Option<&AliasMatch>, entries: &EntryIndex) -> (Tier, Option<usize>) {
    let Some(m) = alias else {
        return (Tier::Unclassified, None);
    };
    let base = AliasResolver::base_dir(path, m);
    let mut anchor = m.dirs.len();
    for k in 0..=m.dirs.len() {
        let dir = if k == 0 {
            base.clone()
        } else {
            format!("{}/{}", base, m.dirs[..k].join("/"))
        };
        if entries.contains_entry(&dir) {
            anchor = k;
            break;
        }
    }
    let depth = m.dirs.len() - anchor;
    if anchor == 0 && depth == 0 {
        (Tier::Root, Some(0))
    } else {
        (Tier::Child, Some(depth))
    }
}

/// Resolve and classify one repo-relative file.
pub fn classify_file(
    path: &str,
    resolver: &AliasResolver,
    entries: &EntryIndex,
    file_case: &FileCase,
) -> ClassifiedFile {
    let path = normalize_path(path);
    let alias = resolver.resolve(&path);
    let (tier, depth) = classify(&path, alias.as_ref(), entries);
    let expected_case = match tier {
        Tier::Root => Some(file_case.root),
        Tier::Child => Some(file_case.child),
        Tier::Unclassified => None,
    };
    let component = match (&tier, alias.as_ref()) {
        (Tier::Root, _) => Some(base_name(&path)),
        (Tier::Child, Some(m)) => m.dirs.first().cloned().or_else(|| Some(base_name(&path))),
        _ => None,
    };
    ClassifiedFile {
        path,
        alias,
        tier,
        depth,
        expected_case,
        component,
    }
}

//! Lint runner: discovers style sources, resolves and classifies each file,
//! evaluates the base ruleset and compiled rules, and merges the results.
//!
//! Files are independent units processed on a rayon pool. The compiled
//! `RuleSet` is shared read-only; each unit returns its own `FileBatch` and
//! the reporter merges them. A `CancelToken` is checked between units.

use crate::base;
use crate::checks::{run_checks, FileContext};
use crate::classify::{classify_file, EntryIndex};
use crate::config::Effective;
use crate::models::descriptor::ConventionConfig;
use crate::models::rule::RuleSet;
use crate::models::{Diagnostic, Report};
use crate::report::{summarize, FileBatch};
use crate::resolve::AliasResolver;
use crate::scan::Stylesheet;
use crate::utils::{normalize_path, to_repo_relative, IgnoreSet};
use glob::{glob, Pattern};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
/// Cooperative cancellation flag checked between file units.
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-run state shared read-only by all workers.
pub struct Engine<'a> {
    root: PathBuf,
    convention: &'a ConventionConfig,
    rules: &'a RuleSet,
    resolver: AliasResolver,
    entries: EntryIndex,
}

impl<'a> Engine<'a> {
    pub fn new(
        root: &Path,
        convention: &'a ConventionConfig,
        rules: &'a RuleSet,
        entries: EntryIndex,
    ) -> Self {
        Engine {
            root: root.to_path_buf(),
            convention,
            rules,
            resolver: AliasResolver::new(convention),
            entries,
        }
    }

    /// Lint one repo-relative file into its own batch.
    pub fn lint_file(&self, file: &str) -> FileBatch {
        let file = normalize_path(file);
        let source = match fs::read_to_string(self.root.join(&file)) {
            Ok(s) => s,
            Err(e) => {
                warn!(file = %file, error = %e, "unable to read file");
                return FileBatch {
                    diagnostics: vec![Diagnostic::io_error(&file, &e)],
                    file,
                };
            }
        };
        let classified = classify_file(
            &file,
            &self.resolver,
            &self.entries,
            &self.convention.file_case,
        );
        let sheet = Stylesheet::parse_for_path(&file, &source);
        let mut diagnostics = run_checks(
            self.rules,
            &FileContext {
                classified: &classified,
                sheet: &sheet,
            },
        );
        diagnostics.extend(base::check(&sheet, &file));
        FileBatch { file, diagnostics }
    }

    /// Lint all files in parallel. Units not started before cancellation are
    /// skipped and the report is flagged as cancelled.
    pub fn run(&self, files: &[String], cancel: &CancelToken) -> Report {
        let per_file: Vec<Option<FileBatch>> = files
            .par_iter()
            .map(|f| {
                if cancel.is_cancelled() {
                    None
                } else {
                    Some(self.lint_file(f))
                }
            })
            .collect();
        let cancelled = per_file.iter().any(Option::is_none);
        if cancelled {
            info!("lint run cancelled; reporting completed files only");
        }
        let batches: Vec<FileBatch> = per_file.into_iter().flatten().collect();
        let mut report = summarize(batches, self.rules);
        report.summary.cancelled = cancelled;
        report
    }
}

/// Lint repo-relative `files` under `root`. Tier classification uses the
/// given files as the entry index.
pub fn lint(root: &Path, files: &[String], convention: &ConventionConfig, rules: &RuleSet) -> Report {
    lint_with_cancel(root, files, convention, rules, &CancelToken::new())
}

pub fn lint_with_cancel(
    root: &Path,
    files: &[String],
    convention: &ConventionConfig,
    rules: &RuleSet,
    cancel: &CancelToken,
) -> Report {
    let entries = EntryIndex::from_files(files.iter());
    Engine::new(root, convention, rules, entries).run(files, cancel)
}

/// Files found under the base directory.
pub struct Discovery {
    /// Every style file with a matching extension, ignored or not.
    pub all: Vec<String>,
    /// Files left after applying the ignore list.
    pub targets: Vec<String>,
}

/// Walk `root/base_dir` for files with the given extensions.
pub fn discover_files(
    root: &Path,
    base_dir: &str,
    extensions: &[String],
    ignore: &IgnoreSet,
) -> Discovery {
    let base = root.join(normalize_path(base_dir));
    let base = Pattern::escape(&base.to_string_lossy());
    let mut all: BTreeSet<String> = BTreeSet::new();
    for ext in extensions {
        let ext = ext.trim_start_matches('.');
        let pattern = Path::new(&base).join("**").join(format!("*.{}", ext));
        let pattern = pattern.to_string_lossy().to_string();
        let paths = match glob(&pattern) {
            Ok(paths) => paths,
            Err(e) => {
                warn!(pattern = %pattern, error = %e, "invalid discovery pattern");
                continue;
            }
        };
        for entry in paths.flatten() {
            if entry.is_file() {
                all.insert(to_repo_relative(root, &entry));
            }
        }
    }
    let all: Vec<String> = all.into_iter().collect();
    let targets: Vec<String> = all
        .iter()
        .filter(|f| !ignore.is_ignored(f))
        .cloned()
        .collect();
    debug!(
        found = all.len(),
        targets = targets.len(),
        "discovered style sources"
    );
    Discovery { all, targets }
}

/// Run lint for the CLI: discover (or take explicit) files and lint them
/// with the effective settings.
pub fn run_lint(
    eff: &Effective,
    convention: &ConventionConfig,
    rules: &RuleSet,
    explicit: &[String],
    cancel: &CancelToken,
) -> Report {
    let ignore = IgnoreSet::new(&eff.ignore_files);
    let discovery = discover_files(&eff.repo_root, &eff.base_dir, &eff.extensions, &ignore);
    let files: Vec<String> = if explicit.is_empty() {
        discovery.targets
    } else {
        let set: BTreeSet<String> = explicit
            .iter()
            .map(|f| to_repo_relative(&eff.repo_root, Path::new(f)))
            .filter(|f| !ignore.is_ignored(f))
            .collect();
        set.into_iter().collect()
    };
    let entries = EntryIndex::from_files(discovery.all.iter().chain(files.iter()));
    let engine = Engine::new(&eff.repo_root, convention, rules, entries);
    match build_pool(eff.jobs) {
        Some(pool) => pool.install(|| engine.run(&files, cancel)),
        None => engine.run(&files, cancel),
    }
}

fn build_pool(jobs: Option<usize>) -> Option<rayon::ThreadPool> {
    let n = jobs?;
    match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
        Ok(pool) => Some(pool),
        Err(e) => {
            warn!(jobs = n, error = %e, "falling back to the global thread pool");
            None
        }
    }
}

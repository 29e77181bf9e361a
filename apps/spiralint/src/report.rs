//! Reporter: deterministic merge of per-file diagnostic batches.
//!
//! Workers hand over one `FileBatch` each; nothing is shared while files are
//! processed. Merging drops base-ruleset diagnostics masked by a
//! higher-precedence compiled rule, then stable-sorts by file path and rule
//! kind so emission order breaks remaining ties.

use crate::models::rule::RuleSet;
use crate::models::{Diagnostic, Report, RuleKind, Severity, Summary};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Diagnostics produced by one completed file unit.
pub struct FileBatch {
    pub file: String,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn summarize(batches: Vec<FileBatch>, rules: &RuleSet) -> Report {
    let files = batches.len();
    let mut diagnostics: Vec<Diagnostic> = batches
        .into_iter()
        .flat_map(|b| b.diagnostics)
        .filter(|d| d.kind != RuleKind::Base || !rules.masks_rule_id(&d.rule))
        .collect();
    diagnostics.sort_by(|a, b| a.file.cmp(&b.file).then(a.kind.cmp(&b.kind)));

    let errors = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warnings = diagnostics.len() - errors;
    Report {
        passed: errors == 0,
        diagnostics,
        summary: Summary {
            errors,
            warnings,
            files,
            cancelled: false,
        },
    }
}

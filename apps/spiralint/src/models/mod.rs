//! Shared data models: diagnostics and reports, the convention descriptor,
//! and compiled rules.

pub mod descriptor;
pub mod rule;

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Diagnostic severity. Only `Error` fails a run.
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warning" | "warn" => Some(Severity::Warning),
            "error" => Some(Severity::Error),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
/// Family of the rule that produced a diagnostic. Declaration order is the
/// report's secondary sort key.
pub enum RuleKind {
    Casing,
    Prefix,
    Ordering,
    Base,
    IoError,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Casing => "casing",
            RuleKind::Prefix => "prefix",
            RuleKind::Ordering => "ordering",
            RuleKind::Base => "base",
            RuleKind::IoError => "io-error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
/// 1-based line/column hint inside a file.
pub struct Location {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A single convention violation or processing error tied to one file.
pub struct Diagnostic {
    pub file: String,
    pub kind: RuleKind,
    pub rule: String,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Diagnostic {
    /// Diagnostic for a file that could not be read or decoded.
    pub fn io_error(file: &str, err: &std::io::Error) -> Self {
        Diagnostic {
            file: file.to_string(),
            kind: RuleKind::IoError,
            rule: "io-error".into(),
            severity: Severity::Error,
            message: format!("Unable to read file: {}", err),
            location: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Aggregated counts used by printers.
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub files: usize,
    pub cancelled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Sorted diagnostics plus the aggregate pass/fail signal.
pub struct Report {
    pub passed: bool,
    pub diagnostics: Vec<Diagnostic>,
    pub summary: Summary,
}

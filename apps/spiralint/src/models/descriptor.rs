//! Convention descriptor schema and validation.
//!
//! The descriptor mirrors the convention configuration consumed by the
//! linting plugin:
//!
//! ```yaml
//! aliasRoots:
//!   components: [src/components]
//!   common: [src/components/common]
//! fileCase: { root: pascal, child: kebab }
//! stylelint:
//!   base:
//!     paths: { components: [src/components] }
//!     external: { prefixes: [u-] }
//! generator:
//!   layoutMixins: ["@include breakpoint-up(md)"]
//! rules:
//!   at-rule-no-unknown: null
//! severity:
//!   ordering: warning
//! ```
//!
//! `aliasRoots` keeps declaration order; later roots win resolution ties.
//! JSON, TOML and YAML are accepted, chosen by file extension.

use crate::models::rule::BaseRule;
use crate::models::Severity;
use crate::utils::normalize_path;
use regex::Regex;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

/// Descriptor file names looked up at the repository root, in order.
pub const DESCRIPTOR_FILES: &[&str] = &[
    "spiracss.json",
    "spiracss.toml",
    "spiracss.yaml",
    "spiracss.yml",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("aliasRoots.{root}: expected at least one non-empty path pattern")]
    MissingRoot { root: String },

    #[error("{field}: unrecognized case style '{value}' (expected pascal, kebab, camel or snake)")]
    InvalidCaseStyle { field: String, value: String },

    #[error("{field}: prefix must be a non-empty string without whitespace (got '{value}')")]
    EmptyPrefix { field: String, value: String },

    #[error("generator.layoutMixins[{index}]: mixin entry must be a non-empty string")]
    EmptyMixin { index: usize },

    #[error("rules.{rule}: unknown base rule")]
    UnknownRule { rule: String },

    #[error("{field}: unrecognized severity '{value}' (expected error or warning)")]
    InvalidSeverity { field: String, value: String },

    #[error("no convention descriptor found in {root} (looked for {looked})")]
    MissingDescriptor { root: String, looked: String },

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStyle {
    Pascal,
    Kebab,
    Camel,
    Snake,
}

static PASCAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-zA-Z0-9]*$").expect("static pattern"));
static KEBAB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9]*(?:-[a-z0-9]+)*$").expect("static pattern"));
static CAMEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-zA-Z0-9]*$").expect("static pattern"));
static SNAKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9]*(?:_[a-z0-9]+)*$").expect("static pattern"));

impl CaseStyle {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pascal" => Some(CaseStyle::Pascal),
            "kebab" => Some(CaseStyle::Kebab),
            "camel" => Some(CaseStyle::Camel),
            "snake" => Some(CaseStyle::Snake),
            _ => None,
        }
    }

    /// Regex source a conforming base name must match.
    pub fn pattern(&self) -> &'static str {
        self.matcher().as_str()
    }

    pub fn matches(&self, name: &str) -> bool {
        self.matcher().is_match(name)
    }

    /// Human label, e.g. `PascalCase`.
    pub fn label(&self) -> &'static str {
        match self {
            CaseStyle::Pascal => "PascalCase",
            CaseStyle::Kebab => "kebab-case",
            CaseStyle::Camel => "camelCase",
            CaseStyle::Snake => "snake_case",
        }
    }

    fn matcher(&self) -> &'static Regex {
        match self {
            CaseStyle::Pascal => &*PASCAL,
            CaseStyle::Kebab => &*KEBAB,
            CaseStyle::Camel => &*CAMEL,
            CaseStyle::Snake => &*SNAKE,
        }
    }
}

impl fmt::Display for CaseStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileCase {
    pub root: CaseStyle,
    pub child: CaseStyle,
}

impl Default for FileCase {
    fn default() -> Self {
        FileCase {
            root: CaseStyle::Pascal,
            child: CaseStyle::Kebab,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A logical root bound to one or more normalized path prefixes.
pub struct AliasRoot {
    pub name: String,
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// Severities of generated rules.
pub struct GeneratedSeverity {
    pub casing: Severity,
    pub prefix: Severity,
    pub ordering: Severity,
}

impl Default for GeneratedSeverity {
    fn default() -> Self {
        GeneratedSeverity {
            casing: Severity::Error,
            prefix: Severity::Error,
            ordering: Severity::Error,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Validated convention descriptor. Read-only once loaded.
pub struct ConventionConfig {
    pub alias_roots: Vec<AliasRoot>,
    pub file_case: FileCase,
    pub component_paths: BTreeSet<String>,
    pub external_prefixes: BTreeSet<String>,
    pub layout_mixins: Vec<String>,
    /// Explicit base-rule toggles; `false` suppresses the rule.
    pub base_rules: BTreeMap<BaseRule, bool>,
    pub severity: GeneratedSeverity,
}

impl ConventionConfig {
    /// Whether a base rule is active after defaults and explicit toggles.
    pub fn base_rule_enabled(&self, rule: BaseRule) -> bool {
        self.base_rules
            .get(&rule)
            .copied()
            .unwrap_or(!rule.suppressed_by_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorFormat {
    Json,
    Toml,
    Yaml,
}

impl DescriptorFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(DescriptorFormat::Json),
            "toml" => Some(DescriptorFormat::Toml),
            "yaml" | "yml" => Some(DescriptorFormat::Yaml),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

#[derive(Default)]
/// Alias roots in declaration order. A repeated name moves to its last position.
struct RawAliasRoots(Vec<(String, Vec<String>)>);

impl<'de> Deserialize<'de> for RawAliasRoots {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RootsVisitor;

        impl<'de> Visitor<'de> for RootsVisitor {
            type Value = RawAliasRoots;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of root names to path patterns")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut roots: Vec<(String, Vec<String>)> = Vec::new();
                while let Some((name, patterns)) = map.next_entry::<String, OneOrMany>()? {
                    roots.retain(|(n, _)| n != &name);
                    roots.push((name, patterns.into_vec()));
                }
                Ok(RawAliasRoots(roots))
            }
        }

        deserializer.deserialize_map(RootsVisitor)
    }
}

#[derive(Deserialize, Default)]
struct RawFileCase {
    root: Option<String>,
    child: Option<String>,
}

#[derive(Deserialize, Default)]
struct RawPaths {
    #[serde(default)]
    components: Vec<String>,
}

#[derive(Deserialize, Default)]
struct RawExternal {
    #[serde(default)]
    prefixes: Vec<String>,
}

#[derive(Deserialize, Default)]
struct RawBase {
    #[serde(default)]
    paths: RawPaths,
    #[serde(default)]
    external: RawExternal,
}

#[derive(Deserialize, Default)]
struct RawStylelint {
    #[serde(default)]
    base: RawBase,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawGenerator {
    #[serde(default)]
    layout_mixins: Vec<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawDescriptor {
    #[serde(default)]
    alias_roots: RawAliasRoots,
    #[serde(default)]
    file_case: RawFileCase,
    #[serde(default)]
    stylelint: RawStylelint,
    #[serde(default)]
    generator: RawGenerator,
    #[serde(default)]
    rules: BTreeMap<String, Option<bool>>,
    #[serde(default)]
    severity: BTreeMap<String, String>,
}

/// Parse and validate a descriptor from its raw text.
pub fn load(raw: &str, format: DescriptorFormat) -> Result<ConventionConfig, ConfigError> {
    parse_and_validate(raw, format, "<descriptor>")
}

/// Read, parse and validate a descriptor file. Format follows the extension
/// (JSON when unknown).
pub fn load_file(path: &Path) -> Result<ConventionConfig, ConfigError> {
    let shown = path.to_string_lossy().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: shown.clone(),
        source,
    })?;
    let format = DescriptorFormat::from_path(path).unwrap_or(DescriptorFormat::Json);
    let config = parse_and_validate(&raw, format, &shown)?;
    debug!(
        path = %shown,
        roots = config.alias_roots.len(),
        prefixes = config.external_prefixes.len(),
        "loaded convention descriptor"
    );
    Ok(config)
}

/// Locate the descriptor at `root` using `DESCRIPTOR_FILES`.
pub fn discover(root: &Path) -> Result<PathBuf, ConfigError> {
    DESCRIPTOR_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.is_file())
        .ok_or_else(|| ConfigError::MissingDescriptor {
            root: root.to_string_lossy().to_string(),
            looked: DESCRIPTOR_FILES.join(", "),
        })
}

fn parse_and_validate(
    raw: &str,
    format: DescriptorFormat,
    origin: &str,
) -> Result<ConventionConfig, ConfigError> {
    let parsed: Result<RawDescriptor, String> = match format {
        DescriptorFormat::Json => serde_json::from_str(raw).map_err(|e| e.to_string()),
        DescriptorFormat::Toml => toml::from_str(raw).map_err(|e| e.to_string()),
        DescriptorFormat::Yaml => serde_yaml::from_str(raw).map_err(|e| e.to_string()),
    };
    let raw = parsed.map_err(|message| ConfigError::Parse {
        path: origin.to_string(),
        message,
    })?;
    validate(raw)
}

fn validate(raw: RawDescriptor) -> Result<ConventionConfig, ConfigError> {
    let mut alias_roots = Vec::with_capacity(raw.alias_roots.0.len());
    for (name, patterns) in raw.alias_roots.0 {
        let patterns: Vec<String> = patterns
            .iter()
            .map(|p| normalize_path(p))
            .filter(|p| !p.is_empty())
            .collect();
        if patterns.is_empty() {
            return Err(ConfigError::MissingRoot { root: name });
        }
        alias_roots.push(AliasRoot { name, patterns });
    }

    let file_case = FileCase {
        root: parse_case("fileCase.root", raw.file_case.root, FileCase::default().root)?,
        child: parse_case("fileCase.child", raw.file_case.child, FileCase::default().child)?,
    };

    let component_paths: BTreeSet<String> = raw
        .stylelint
        .base
        .paths
        .components
        .iter()
        .map(|p| normalize_path(p))
        .filter(|p| !p.is_empty())
        .collect();

    let mut external_prefixes = BTreeSet::new();
    for (i, prefix) in raw.stylelint.base.external.prefixes.into_iter().enumerate() {
        if prefix.is_empty() || prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::EmptyPrefix {
                field: format!("stylelint.base.external.prefixes[{}]", i),
                value: prefix,
            });
        }
        external_prefixes.insert(prefix);
    }

    let mut layout_mixins = Vec::new();
    for (index, mixin) in raw.generator.layout_mixins.into_iter().enumerate() {
        let mixin = mixin.trim().to_string();
        if mixin.is_empty() {
            return Err(ConfigError::EmptyMixin { index });
        }
        layout_mixins.push(mixin);
    }

    let mut base_rules = BTreeMap::new();
    for (id, toggle) in raw.rules {
        let rule = BaseRule::from_id(&id).ok_or(ConfigError::UnknownRule { rule: id })?;
        base_rules.insert(rule, toggle.unwrap_or(false));
    }

    let mut severity = GeneratedSeverity::default();
    for (key, value) in raw.severity {
        let field = format!("severity.{}", key);
        let level = Severity::parse(&value).ok_or_else(|| ConfigError::InvalidSeverity {
            field: field.clone(),
            value: value.clone(),
        })?;
        match key.as_str() {
            "casing" => severity.casing = level,
            "prefix" => severity.prefix = level,
            "ordering" => severity.ordering = level,
            _ => return Err(ConfigError::InvalidSeverity { field, value }),
        }
    }

    Ok(ConventionConfig {
        alias_roots,
        file_case,
        component_paths,
        external_prefixes,
        layout_mixins,
        base_rules,
        severity,
    })
}

fn parse_case(
    field: &str,
    value: Option<String>,
    default: CaseStyle,
) -> Result<CaseStyle, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => CaseStyle::parse(&v).ok_or(ConfigError::InvalidCaseStyle {
            field: field.to_string(),
            value: v,
        }),
    }
}

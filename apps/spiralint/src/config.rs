//! Settings discovery and effective settings resolution.
//!
//! Spiralint reads `spiralint.toml|yaml|yml` from the repository root (or
//! closest ancestor) and merges it with CLI flags to produce an `Effective`
//! configuration.
//! Defaults:
//! - `convention`: first of `spiracss.json|toml|yaml|yml` at the repo root
//! - `baseDir`: `.`
//! - `output`: `human`
//! - `extensions`: `scss`, `css`, `vue`
//! - `ignoreFiles`: empty
//! - `jobs`: rayon's global pool
//!
//! Overrides precedence: CLI > settings file > defaults.

use crate::models::descriptor::{discover, ConfigError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings file names looked up in each directory, in order.
pub const SETTINGS_FILES: &[&str] = &["spiralint.toml", "spiralint.yaml", "spiralint.yml"];

const DEFAULT_EXTENSIONS: &[&str] = &["scss", "css", "vue"];

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
/// Root settings loaded from `spiralint.toml|yaml`.
pub struct Settings {
    pub convention: Option<String>,
    pub base_dir: Option<String>,
    pub output: Option<String>,
    pub extensions: Option<Vec<String>>,
    #[serde(default)]
    pub ignore_files: Vec<String>,
    pub jobs: Option<usize>,
}

#[derive(Debug, Clone)]
/// Fully-resolved settings used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub convention: PathBuf,
    pub base_dir: String,
    pub output: String,
    pub extensions: Vec<String>,
    pub ignore_files: Vec<String>,
    pub jobs: Option<usize>,
    /// Whether a settings file was found.
    pub settings_found: bool,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `spiralint.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if SETTINGS_FILES.iter().any(|f| cur.join(f).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `Settings` from the first settings file present under `root`.
pub fn load_settings(root: &Path) -> Result<Option<Settings>, ConfigError> {
    for name in SETTINGS_FILES {
        let path = root.join(name);
        if !path.exists() {
            continue;
        }
        let shown = path.to_string_lossy().to_string();
        let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: shown.clone(),
            source,
        })?;
        let parsed = if name.ends_with(".toml") {
            toml::from_str::<Settings>(&raw).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str::<Settings>(&raw).map_err(|e| e.to_string())
        };
        let settings = parsed.map_err(|message| ConfigError::Parse {
            path: shown.clone(),
            message,
        })?;
        debug!(path = %shown, "loaded settings");
        return Ok(Some(settings));
    }
    Ok(None)
}

/// Resolve `Effective` by merging CLI flags, discovered settings, and defaults.
pub fn resolve_effective(
    cli_repo_root: Option<&str>,
    cli_convention: Option<&str>,
    cli_base_dir: Option<&str>,
    cli_output: Option<&str>,
    cli_jobs: Option<usize>,
) -> Result<Effective, ConfigError> {
    let start = PathBuf::from(cli_repo_root.unwrap_or("."));
    let start = fs::canonicalize(&start).unwrap_or(start);
    let repo_root = detect_repo_root(&start);
    let loaded = load_settings(&repo_root)?;
    let settings_found = loaded.is_some();
    let cfg = loaded.unwrap_or_default();

    let convention = match cli_convention.map(str::to_string).or(cfg.convention) {
        Some(p) => repo_root.join(p),
        None => discover(&repo_root)?,
    };

    let base_dir = cli_base_dir
        .map(str::to_string)
        .or(cfg.base_dir)
        .unwrap_or_else(|| ".".to_string());

    let output = cli_output
        .map(str::to_string)
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());

    let extensions = cfg
        .extensions
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect());

    let jobs = cli_jobs.or(cfg.jobs).filter(|n| *n > 0);

    debug!(
        repo_root = %repo_root.display(),
        convention = %convention.display(),
        base_dir = %base_dir,
        "resolved effective settings"
    );
    Ok(Effective {
        repo_root,
        convention,
        base_dir,
        output,
        extensions,
        ignore_files: cfg.ignore_files,
        jobs,
        settings_found,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("spiralint.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
convention = "config/spiracss.json"
baseDir = "src"
output = "json"
ignoreFiles = ["src/**/*.vue", "!src/keep.vue"]
jobs = 2
    "#
        )
        .unwrap();

        // Resolve using explicit repo_root to avoid global CWD races
        let eff = resolve_effective(root.to_str(), None, None, None, None).unwrap();
        assert_eq!(eff.convention, eff.repo_root.join("config/spiracss.json"));
        assert_eq!(eff.base_dir, "src");
        assert_eq!(eff.output, "json");
        assert_eq!(eff.ignore_files, vec!["src/**/*.vue", "!src/keep.vue"]);
        assert_eq!(eff.jobs, Some(2));
        assert!(eff.settings_found);
    }

    #[test]
    fn test_load_yaml_and_defaults() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("spiracss.yaml"), "aliasRoots: {}\n").unwrap();
        let mut f = fs::File::create(root.join("spiralint.yaml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
output: human
extensions: [scss]
            "#
        )
        .unwrap();

        let eff = resolve_effective(root.to_str(), None, None, None, None).unwrap();
        assert_eq!(eff.convention, eff.repo_root.join("spiracss.yaml"));
        assert_eq!(eff.base_dir, ".");
        assert_eq!(eff.extensions, vec!["scss"]);
        assert!(eff.ignore_files.is_empty());
        assert_eq!(eff.jobs, None);
    }

    #[test]
    fn test_cli_overrides_settings() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("spiralint.toml"),
            "convention = \"a.json\"\nbaseDir = \"src\"\noutput = \"json\"\njobs = 4\n",
        )
        .unwrap();

        let eff = resolve_effective(
            root.to_str(),
            Some("b.toml"),
            Some("app"),
            Some("human"),
            Some(1),
        )
        .unwrap();
        assert_eq!(eff.convention, eff.repo_root.join("b.toml"));
        assert_eq!(eff.base_dir, "app");
        assert_eq!(eff.output, "human");
        assert_eq!(eff.jobs, Some(1));
    }

    #[test]
    fn test_no_settings_uses_defaults() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("spiracss.json"), "{}").unwrap();

        let eff = resolve_effective(root.to_str(), None, None, None, None).unwrap();
        assert!(!eff.settings_found);
        assert_eq!(eff.output, "human");
        assert_eq!(eff.extensions, vec!["scss", "css", "vue"]);
        assert_eq!(eff.convention, eff.repo_root.join("spiracss.json"));
    }

    #[test]
    fn test_missing_descriptor_is_fatal() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join(".git")).unwrap();
        let err = resolve_effective(root.to_str(), None, None, None, None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingDescriptor { .. }));
    }

    #[test]
    fn test_malformed_settings_reports_parse_error() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("spiralint.toml"), "jobs = \"many\"\n").unwrap();
        let err = resolve_effective(root.to_str(), None, None, None, None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_detect_repo_root_walks_up() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("spiralint.yml"), "output: json\n").unwrap();
        let nested = root.join("src/components");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(detect_repo_root(&nested), root.to_path_buf());
    }
}

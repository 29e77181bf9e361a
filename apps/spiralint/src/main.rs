//! Spiralint CLI binary entry point.
//! Delegates to the library for lint/compile/resolve and prints results.

use clap::Parser;
use spiralint::classify::{classify_file, ClassifiedFile, EntryIndex};
use spiralint::cli::{Cli, Commands};
use spiralint::compile::compile;
use spiralint::config::{self, Effective};
use spiralint::lint::{self, CancelToken};
use spiralint::models::descriptor::{self, ConfigError, ConventionConfig};
use spiralint::output;
use spiralint::resolve::AliasResolver;
use spiralint::utils::{error_prefix, info_prefix, note_prefix, to_repo_relative};
use std::path::Path;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Lint {
            repo_root,
            convention,
            base_dir,
            output,
            jobs,
            files,
        } => {
            let eff = or_exit(config::resolve_effective(
                repo_root.as_deref(),
                convention.as_deref(),
                base_dir.as_deref(),
                output.as_deref(),
                jobs,
            ));
            let conv = load_convention(&eff);
            let rules = compile(&conv);
            if eff.output != "json" {
                eprintln!(
                    "{} Using convention {} ({} rules)",
                    info_prefix(),
                    display_rel(&eff, &eff.convention),
                    rules.len()
                );
            }
            let report = lint::run_lint(&eff, &conv, &rules, &files, &CancelToken::new());
            info!(
                files = report.summary.files,
                errors = report.summary.errors,
                warnings = report.summary.warnings,
                "lint finished"
            );
            output::print_report(&report, &eff.output);
            if !report.passed {
                std::process::exit(1);
            }
        }
        Commands::Compile {
            repo_root,
            convention,
        } => {
            let eff = or_exit(config::resolve_effective(
                repo_root.as_deref(),
                convention.as_deref(),
                None,
                Some("json"),
                None,
            ));
            let conv = load_convention(&eff);
            output::print_rules(&compile(&conv));
        }
        Commands::Resolve {
            repo_root,
            convention,
            output,
            files,
        } => {
            let eff = or_exit(config::resolve_effective(
                repo_root.as_deref(),
                convention.as_deref(),
                None,
                output.as_deref(),
                None,
            ));
            let conv = load_convention(&eff);
            let resolved = resolve_files(&eff, &conv, &files);
            output::print_resolve(&resolved, &eff.output);
        }
    }
}

fn or_exit<T>(res: Result<T, ConfigError>) -> T {
    match res {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{} {}", error_prefix(), e);
            std::process::exit(2);
        }
    }
}

fn load_convention(eff: &Effective) -> ConventionConfig {
    if !eff.settings_found && eff.output != "json" {
        eprintln!(
            "{} No spiralint.toml found; using defaults.",
            note_prefix()
        );
    }
    or_exit(descriptor::load_file(&eff.convention))
}

fn display_rel(eff: &Effective, path: &Path) -> String {
    to_repo_relative(&eff.repo_root, path)
}

fn resolve_files(eff: &Effective, conv: &ConventionConfig, files: &[String]) -> Vec<ClassifiedFile> {
    let ignore = spiralint::utils::IgnoreSet::new(&eff.ignore_files);
    let discovery = lint::discover_files(&eff.repo_root, &eff.base_dir, &eff.extensions, &ignore);
    let targets: Vec<String> = files
        .iter()
        .map(|f| to_repo_relative(&eff.repo_root, Path::new(f)))
        .collect();
    let entries = EntryIndex::from_files(discovery.all.iter().chain(targets.iter()));
    let resolver = AliasResolver::new(conv);
    targets
        .iter()
        .map(|f| classify_file(f, &resolver, &entries, &conv.file_case))
        .collect()
}

//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "spiralint",
    version,
    about = "Convention compiler and style linter",
    long_about = "Spiralint compiles a SpiraCSS-style convention descriptor into lint rules and checks stylesheets against them.\n\nConfiguration precedence: CLI > spiralint.toml > defaults.",
    after_help = "Examples:\n  spiralint lint\n  spiralint lint --output json src/components/Card.scss\n  spiralint compile --convention spiracss.json\n  spiralint resolve src/components/pages/HomePage.scss",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands for linting, compiling, and resolving.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current spiralint version.")]
    Version,
    /// Lint style sources
    #[command(
        about = "Run lint checks",
        long_about = "Discover style sources under the base directory (or lint the given files), evaluate the base ruleset and the compiled convention rules, and report diagnostics. Error-severity diagnostics make the command exit with 1.",
        after_help = "Examples:\n  spiralint lint\n  spiralint lint --base-dir src --jobs 4\n  spiralint lint --output json src/components/Card.scss"
    )]
    Lint {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Path to the convention descriptor (default: spiracss.json|toml|yaml|yml)")]
        convention: Option<String>,
        #[arg(long, help = "Style source root relative to the repo root (default: .)")]
        base_dir: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, help = "Worker threads (default: one per core)")]
        jobs: Option<usize>,
        #[arg(help = "Files to lint instead of discovering them (ignoreFiles still applies)")]
        files: Vec<String>,
    },
    /// Print the compiled rule set
    #[command(
        about = "Compile the convention",
        long_about = "Validate the convention descriptor and print the compiled rule set as JSON. Output is deterministic for identical input.",
        after_help = "Examples:\n  spiralint compile\n  spiralint compile --convention config/spiracss.yaml"
    )]
    Compile {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Path to the convention descriptor (default: spiracss.json|toml|yaml|yml)")]
        convention: Option<String>,
    },
    /// Show alias root and tier for files
    #[command(
        about = "Resolve files",
        long_about = "Print the alias root, tier, anchor depth and expected file-name case for each file.",
        after_help = "Examples:\n  spiralint resolve src/components/pages/HomePage.scss\n  spiralint resolve --output json src/components/parts/card/card-body.scss"
    )]
    Resolve {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Path to the convention descriptor (default: spiracss.json|toml|yaml|yml)")]
        convention: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(required = true, help = "Files to resolve")]
        files: Vec<String>,
    },
}

//! Spiralint core library.
//!
//! This crate compiles a SpiraCSS-style convention descriptor into an ordered
//! rule set and lints stylesheets against it, producing a deterministic
//! report.
//!
//! High-level modules:
//! - `models`: Descriptor schema, compiled rule types, and report structs.
//! - `resolve`: Alias root resolution (most specific pattern wins).
//! - `classify`: Root/child tier classification and expected file-name case.
//! - `compile`: Descriptor to `RuleSet` compilation.
//! - `scan`: Lightweight stylesheet scanner (SCSS, CSS, Vue `<style>`).
//! - `base`: The base ruleset the compiled rules are layered over.
//! - `checks`: Evaluation of compiled rules against one file.
//! - `lint`: File discovery and the parallel lint run.
//! - `report`: Deterministic merge of per-file results.
//! - `config`: Settings discovery and effective configuration resolution.
//! - `cli`: CLI argument parsing (binary uses this).
//! - `output`: Human/JSON printers.
//! - `utils`: Path, ignore-list, and prefix helpers.
pub mod base;
pub mod checks;
pub mod classify;
pub mod cli;
pub mod compile;
pub mod config;
pub mod lint;
pub mod models;
pub mod output;
pub mod report;
pub mod resolve;
pub mod scan;
pub mod utils;

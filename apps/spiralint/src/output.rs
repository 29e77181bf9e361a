//! Output rendering for lint, compile, and resolve commands.
//!
//! Supports `human` (default) and `json` outputs. The JSON form is the
//! serialized report with a top-level summary.

use crate::classify::ClassifiedFile;
use crate::models::rule::RuleSet;
use crate::models::{Diagnostic, Report, Severity};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

fn pretty(value: &JsonVal) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

/// Print a lint report in the requested format.
pub fn print_report(report: &Report, output: &str) {
    match output {
        "json" => println!("{}", pretty(&compose_report_json(report))),
        _ => {
            let color = use_colors(output);
            for d in &report.diagnostics {
                println!("{}", human_line(d, color));
            }
            let mut summary = format!(
                "— Summary — errors={} warnings={} files={}",
                report.summary.errors, report.summary.warnings, report.summary.files
            );
            if report.summary.cancelled {
                summary.push_str(" (cancelled)");
            }
            if color {
                println!("{}", summary.bold());
            } else {
                println!("{}", summary);
            }
        }
    }
}

fn human_line(d: &Diagnostic, color: bool) -> String {
    let (badge, icon) = match d.severity {
        Severity::Error => ("⟦error⟧", "✖"),
        Severity::Warning => ("⟦warn⟧", "▲"),
    };
    let (badge, icon) = if color {
        match d.severity {
            Severity::Error => (badge.red().bold().to_string(), icon.red().to_string()),
            Severity::Warning => (badge.yellow().bold().to_string(), icon.yellow().to_string()),
        }
    } else {
        (badge.to_string(), icon.to_string())
    };
    let place = match d.location {
        Some(loc) => format!("{}:{}:{}", d.file, loc.line, loc.column),
        None => d.file.clone(),
    };
    let place = if color { place.bold().to_string() } else { place };
    format!("{} {} {} ❲{}❳ — {}", icon, badge, place, d.rule, d.message)
}

/// Compose the report JSON object (pure) for testing/snapshot purposes.
pub fn compose_report_json(report: &Report) -> JsonVal {
    serde_json::to_value(report).unwrap_or(JsonVal::Null)
}

/// Print the compiled rule set as pretty JSON.
pub fn print_rules(rules: &RuleSet) {
    println!("{}", pretty(&compose_rules_json(rules)));
}

pub fn compose_rules_json(rules: &RuleSet) -> JsonVal {
    serde_json::to_value(rules).unwrap_or(JsonVal::Null)
}

/// Print alias root and tier for each resolved file.
pub fn print_resolve(files: &[ClassifiedFile], output: &str) {
    match output {
        "json" => println!("{}", pretty(&compose_resolve_json(files))),
        _ => {
            let color = use_colors(output);
            for f in files {
                let path = if color {
                    f.path.clone().bold().to_string()
                } else {
                    f.path.clone()
                };
                match &f.alias {
                    Some(m) => println!(
                        "{} root={} base={} tier={} depth={} case={}",
                        path,
                        m.root,
                        m.pattern,
                        f.tier.as_str(),
                        f.depth.unwrap_or(0),
                        f.expected_case.map(|c| c.label()).unwrap_or("-")
                    ),
                    None => {
                        let tier = if color {
                            f.tier.as_str().bright_black().to_string()
                        } else {
                            f.tier.as_str().to_string()
                        };
                        println!("{} tier={}", path, tier)
                    }
                }
            }
        }
    }
}

pub fn compose_resolve_json(files: &[ClassifiedFile]) -> JsonVal {
    let items: Vec<JsonVal> = files
        .iter()
        .map(|f| {
            json!({
                "file": f.path,
                "root": f.alias.as_ref().map(|m| m.root.clone()),
                "base": f.alias.as_ref().map(|m| m.pattern.clone()),
                "tier": f.tier,
                "depth": f.depth,
                "expectedCase": f.expected_case.map(|c| c.label()),
            })
        })
        .collect();
    json!({ "files": items })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify_file, EntryIndex};
    use crate::models::descriptor::{load, DescriptorFormat};
    use crate::models::{Location, RuleKind, Summary};
    use crate::resolve::AliasResolver;

    fn report() -> Report {
        Report {
            passed: false,
            diagnostics: vec![Diagnostic {
                file: "src/components/Card.scss".into(),
                kind: RuleKind::Prefix,
                rule: "prefix/external".into(),
                severity: Severity::Error,
                message: "msg".into(),
                location: Some(Location { line: 3, column: 1 }),
            }],
            summary: Summary {
                errors: 1,
                warnings: 0,
                files: 1,
                cancelled: false,
            },
        }
    }

    #[test]
    fn test_compose_report_json_shape() {
        let out = compose_report_json(&report());
        assert_eq!(out["passed"], false);
        assert_eq!(out["summary"]["errors"], 1);
        assert_eq!(out["diagnostics"][0]["kind"], "prefix");
        assert_eq!(out["diagnostics"][0]["severity"], "error");
        assert_eq!(out["diagnostics"][0]["location"]["line"], 3);
    }

    #[test]
    fn test_human_line_without_color() {
        let r = report();
        let line = human_line(&r.diagnostics[0], false);
        assert_eq!(
            line,
            "✖ ⟦error⟧ src/components/Card.scss:3:1 ❲prefix/external❳ — msg"
        );
    }

    #[test]
    fn test_compose_resolve_json() {
        let cfg = load(
            r#"{"aliasRoots": {"pages": ["src/components/pages"]}}"#,
            DescriptorFormat::Json,
        )
        .unwrap();
        let resolver = AliasResolver::new(&cfg);
        let files = ["src/components/pages/HomePage.scss", "lib/reset.css"];
        let entries = EntryIndex::from_files(files.iter());
        let classified: Vec<ClassifiedFile> = files
            .iter()
            .map(|f| classify_file(f, &resolver, &entries, &cfg.file_case))
            .collect();
        let out = compose_resolve_json(&classified);
        assert_eq!(out["files"][0]["root"], "pages");
        assert_eq!(out["files"][0]["tier"], "root");
        assert_eq!(out["files"][0]["expectedCase"], "PascalCase");
        assert!(out["files"][1]["root"].is_null());
        assert_eq!(out["files"][1]["tier"], "unclassified");
    }
}

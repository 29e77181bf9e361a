//! Evaluation of compiled rules against one classified, scanned file.
//!
//! Each compiled rule whose scope matches yields at most one diagnostic per
//! file, located at the first offending node. Later offenders are counted in
//! the message.

use crate::base::{is_custom, strip_vendor};
use crate::classify::{ClassifiedFile, Tier};
use crate::models::descriptor::CaseStyle;
use crate::models::rule::{CompiledRule, OrderingPolicy, RuleSet, RuleSpec};
use crate::models::{Diagnostic, Location, RuleKind, Severity};
use crate::scan::{blank_selector_literals, NodeKind, Stylesheet};
use crate::utils::{is_under, normalize_path};
use regex::Regex;
use std::sync::LazyLock;

static CLASS_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(&?)\.(-?[_a-zA-Z][_a-zA-Z0-9-]*)").expect("static pattern"));

/// Inputs shared by every rule for one file.
pub struct FileContext<'a> {
    pub classified: &'a ClassifiedFile,
    pub sheet: &'a Stylesheet,
}

pub fn run_checks(rules: &RuleSet, ctx: &FileContext) -> Vec<Diagnostic> {
    rules
        .iter()
        .filter_map(|rule| check_rule(rule, ctx))
        .collect()
}

fn check_rule(rule: &CompiledRule, ctx: &FileContext) -> Option<Diagnostic> {
    let severity = rule.severity?;
    match &rule.spec {
        RuleSpec::Casing { tier, style, .. } => check_casing(rule, severity, *tier, *style, ctx),
        RuleSpec::Prefix {
            component_paths,
            prefixes,
        } => check_prefix(rule, severity, component_paths, prefixes, ctx),
        RuleSpec::Suppression { .. } => None,
        RuleSpec::Ordering {
            policy: OrderingPolicy::DeclarationOrder { .. },
        } => check_declaration_order(rule, severity, ctx),
        RuleSpec::Ordering {
            policy: OrderingPolicy::LayoutMixins { mixins },
        } => check_layout_mixins(rule, severity, mixins, ctx),
    }
}

struct Finding {
    location: Option<Location>,
    message: String,
}

fn emit(rule: &CompiledRule, kind: RuleKind, severity: Severity, ctx: &FileContext, found: Vec<Finding>) -> Option<Diagnostic> {
    let extra = found.len().saturating_sub(1);
    let first = found.into_iter().next()?;
    let message = if extra > 0 {
        format!("{} (+{} more)", first.message, extra)
    } else {
        first.message
    };
    Some(Diagnostic {
        file: ctx.classified.path.clone(),
        kind,
        rule: rule.id.clone(),
        severity,
        message,
        location: first.location,
    })
}

fn check_casing(
    rule: &CompiledRule,
    severity: Severity,
    tier: Tier,
    style: CaseStyle,
    ctx: &FileContext,
) -> Option<Diagnostic> {
    if ctx.classified.tier != tier {
        return None;
    }
    let name = ctx.classified.base_name();
    if style.matches(&name) {
        return None;
    }
    emit(
        rule,
        RuleKind::Casing,
        severity,
        ctx,
        vec![Finding {
            location: None,
            message: format!(
                "File name \"{}\" must be {} ({}-tier file)",
                name,
                style.label(),
                tier.as_str()
            ),
        }],
    )
}

/// Convert `HomePage`, `homePage` or `home_page` to `home-page`.
pub fn to_kebab(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == ' ' || c == '-' {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            continue;
        }
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let boundary = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_lower);
            if boundary && !out.ends_with('-') {
                out.push('-');
            }
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}

struct Ownership {
    names: Vec<String>,
    prefixes: Vec<String>,
}

impl Ownership {
    fn is_own_name(&self, class: &str) -> bool {
        self.names.iter().any(|n| {
            class == n
                || class
                    .strip_prefix(n.as_str())
                    .is_some_and(|rest| rest.starts_with('-') || rest.starts_with('_'))
        })
    }

    fn is_external(&self, class: &str) -> bool {
        self.prefixes.iter().any(|p| class.starts_with(p.as_str()))
    }
}

fn check_prefix(
    rule: &CompiledRule,
    severity: Severity,
    component_paths: &[String],
    prefixes: &[String],
    ctx: &FileContext,
) -> Option<Diagnostic> {
    let file = ctx.classified;
    if file.tier == Tier::Unclassified {
        return None;
    }
    let path = normalize_path(&file.path);
    if !component_paths.iter().any(|p| is_under(&path, p)) {
        return None;
    }
    let mut names: Vec<String> = Vec::new();
    for n in [file.component.clone(), Some(file.base_name())].into_iter().flatten() {
        let k = to_kebab(&n);
        if !k.is_empty() && !names.contains(&k) {
            names.push(k);
        }
    }
    let own = Ownership {
        names,
        prefixes: prefixes.to_vec(),
    };
    let component = own.names.first().cloned().unwrap_or_default();

    let sheet = ctx.sheet;
    let mut owned = vec![false; sheet.nodes.len()];
    let mut found: Vec<Finding> = Vec::new();
    for (i, node) in sheet.nodes.iter().enumerate() {
        let NodeKind::Rule { selector } = &node.kind else {
            continue;
        };
        let inherited = sheet.enclosing_rule(i).is_some_and(|p| owned[p]);
        let mut rule_owned = inherited;
        let masked = blank_selector_literals(selector);
        for complex in split_selector_list(&masked) {
            let mut traced = inherited;
            for caps in CLASS_TOKEN.captures_iter(complex) {
                let amp = !caps[1].is_empty();
                let class = &caps[2];
                if own.is_external(class) {
                    continue;
                }
                if traced || amp || own.is_own_name(class) {
                    traced = true;
                    continue;
                }
                found.push(Finding {
                    location: Some(Location {
                        line: node.line,
                        column: node.column,
                    }),
                    message: format!(
                        "Class \".{}\" is not traceable to component \"{}\"; external classes must start with one of: {}",
                        class,
                        component,
                        own.prefixes.join(", ")
                    ),
                });
            }
            rule_owned |= traced;
        }
        owned[i] = rule_owned;
    }
    emit(rule, RuleKind::Prefix, severity, ctx, found)
}

fn split_selector_list(selector: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in selector.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(selector[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(selector[start..].trim());
    parts
}

const PROPERTY_GROUPS: &[&[&str]] = &[
    &["position", "inset", "top", "right", "bottom", "left", "z-index"],
    &[
        "display", "flex", "flex-direction", "flex-wrap", "flex-flow", "flex-grow", "flex-shrink",
        "flex-basis", "grid", "grid-template", "grid-template-columns", "grid-template-rows",
        "grid-template-areas", "grid-area", "grid-column", "grid-row", "gap", "row-gap",
        "column-gap", "place-items", "place-content", "align-content", "align-items", "align-self",
        "justify-content", "justify-items", "justify-self", "order", "float", "clear",
        "box-sizing", "width", "min-width", "max-width", "height", "min-height", "max-height",
        "aspect-ratio", "margin", "margin-top", "margin-right", "margin-bottom", "margin-left",
        "margin-inline", "margin-block", "padding", "padding-top", "padding-right",
        "padding-bottom", "padding-left", "padding-inline", "padding-block", "overflow",
        "overflow-x", "overflow-y",
    ],
    &[
        "font", "font-family", "font-size", "font-style", "font-weight", "font-variant",
        "line-height", "letter-spacing", "color", "text-align", "text-decoration",
        "text-indent", "text-overflow", "text-transform", "text-shadow", "white-space",
        "word-break", "word-wrap", "overflow-wrap", "vertical-align", "list-style",
    ],
    &[
        "background", "background-color", "background-image", "background-repeat",
        "background-position", "background-size", "border", "border-top", "border-right",
        "border-bottom", "border-left", "border-width", "border-style", "border-color",
        "border-radius", "outline", "box-shadow", "opacity", "filter", "visibility",
    ],
    &[
        "transition", "transform", "transform-origin", "animation", "cursor", "pointer-events",
        "user-select", "content", "will-change",
    ],
];

fn property_rank(property: &str) -> Option<usize> {
    let name = strip_vendor(property);
    PROPERTY_GROUPS
        .iter()
        .position(|group| group.contains(&name))
}

fn check_declaration_order(rule: &CompiledRule, severity: Severity, ctx: &FileContext) -> Option<Diagnostic> {
    let sheet = ctx.sheet;
    let mut found = Vec::new();
    for decls in sheet.declaration_groups().values() {
        let mut highest: Option<(usize, String)> = None;
        for &i in decls {
            let node = &sheet.nodes[i];
            let NodeKind::Declaration { property, .. } = &node.kind else {
                continue;
            };
            if is_custom(property) {
                continue;
            }
            let name = property.to_ascii_lowercase();
            let Some(rank) = property_rank(&name) else {
                continue;
            };
            match &highest {
                Some((top, prev)) if rank < *top => found.push(Finding {
                    location: Some(Location {
                        line: node.line,
                        column: node.column,
                    }),
                    message: format!("Expected \"{}\" to come before \"{}\"", name, prev),
                }),
                Some((top, _)) if rank == *top => {}
                _ => highest = Some((rank, name)),
            }
        }
    }
    emit(rule, RuleKind::Ordering, severity, ctx, found)
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn check_layout_mixins(
    rule: &CompiledRule,
    severity: Severity,
    mixins: &[String],
    ctx: &FileContext,
) -> Option<Diagnostic> {
    let wanted: Vec<String> = mixins
        .iter()
        .map(|m| {
            let m = normalize_ws(m);
            if m.starts_with('@') {
                m
            } else {
                format!("@include {}", m)
            }
        })
        .collect();
    let sheet = ctx.sheet;
    let mut found = Vec::new();
    for (i, node) in sheet.nodes.iter().enumerate() {
        let NodeKind::AtRule { name, params, .. } = &node.kind else {
            continue;
        };
        if !name.eq_ignore_ascii_case("include") {
            continue;
        }
        let text = normalize_ws(&format!("@include {}", params));
        if !wanted.contains(&text) {
            continue;
        }
        let late = sheet.nodes[i + 1..].iter().find(|n| {
            n.parent == node.parent && matches!(n.kind, NodeKind::Declaration { .. })
        });
        if let Some(decl) = late {
            found.push(Finding {
                location: Some(Location {
                    line: decl.line,
                    column: decl.column,
                }),
                message: format!(
                    "Declarations must precede the layout mixin \"{}\" (line {})",
                    text, node.line
                ),
            });
        }
    }
    emit(rule, RuleKind::Ordering, severity, ctx, found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify_file, EntryIndex};
    use crate::compile::compile;
    use crate::models::descriptor::{load, ConventionConfig, DescriptorFormat};
    use crate::resolve::AliasResolver;

    fn config() -> ConventionConfig {
        load(
            r#"{
                "aliasRoots": {
                    "components": ["src/components"],
                    "pages": ["src/components/pages"],
                    "parts": ["src/components/parts"]
                },
                "fileCase": {"root": "pascal", "child": "kebab"},
                "stylelint": {"base": {
                    "paths": {"components": ["src/components"]},
                    "external": {"prefixes": ["u-"]}
                }},
                "generator": {"layoutMixins": ["@include breakpoint-up(md)"]}
            }"#,
            DescriptorFormat::Json,
        )
        .unwrap()
    }

    fn run(files: &[&str], target: &str, src: &str) -> Vec<Diagnostic> {
        let cfg = config();
        let rules = compile(&cfg);
        let resolver = AliasResolver::new(&cfg);
        let entries = EntryIndex::from_files(files.iter());
        let classified = classify_file(target, &resolver, &entries, &cfg.file_case);
        let sheet = Stylesheet::parse(src);
        run_checks(
            &rules,
            &FileContext {
                classified: &classified,
                sheet: &sheet,
            },
        )
    }

    fn of_kind(diags: &[Diagnostic], kind: RuleKind) -> usize {
        diags.iter().filter(|d| d.kind == kind).count()
    }

    #[test]
    fn test_root_tier_casing() {
        let bad = "src/components/pages/home-page.scss";
        let d = run(&[bad], bad, "");
        assert_eq!(of_kind(&d, RuleKind::Casing), 1);
        assert!(d[0].message.contains("PascalCase"));
        let good = "src/components/pages/HomePage.scss";
        assert_eq!(of_kind(&run(&[good], good, ""), RuleKind::Casing), 0);
    }

    #[test]
    fn test_child_tier_casing() {
        let files = [
            "src/components/pages/HomePage.scss",
            "src/components/pages/home/home-page.scss",
            "src/components/pages/home/HomePage.scss",
        ];
        assert_eq!(of_kind(&run(&files, files[1], ""), RuleKind::Casing), 0);
        let d = run(&files, files[2], "");
        assert_eq!(of_kind(&d, RuleKind::Casing), 1);
        assert_eq!(d[0].rule, "casing/child");
    }

    #[test]
    fn test_unclassified_file_gets_no_casing_or_prefix() {
        let f = "vendor/Weird_Name.scss";
        let d = run(&[f], f, ".helper { color: red; }");
        assert_eq!(of_kind(&d, RuleKind::Casing), 0);
        assert_eq!(of_kind(&d, RuleKind::Prefix), 0);
    }

    #[test]
    fn test_prefix_enforced_for_untraceable_classes() {
        let f = "src/components/parts/Card.scss";
        let d = run(&[f], f, ".helper { color: red; }");
        assert_eq!(of_kind(&d, RuleKind::Prefix), 1);
        let d = run(&[f], f, ".u-helper { color: red; }");
        assert_eq!(of_kind(&d, RuleKind::Prefix), 0);
    }

    #[test]
    fn test_attribute_values_are_not_classes() {
        let f = "src/components/parts/Card.scss";
        let src = ".card { color: red; }\n[data-file=\"x.pdf\"] { color: red; }\na[href$='.pdf'] { color: red; }\n";
        let d = run(&[f], f, src);
        assert_eq!(of_kind(&d, RuleKind::Prefix), 0, "{d:?}");
        let d = run(&[f], f, ".helper[data-file=\"x.pdf\"] { color: red; }\n");
        let p: Vec<&Diagnostic> = d.iter().filter(|d| d.kind == RuleKind::Prefix).collect();
        assert_eq!(p.len(), 1);
        assert!(p[0].message.contains(".helper"));
        assert!(!p[0].message.contains("(+"));
    }

    #[test]
    fn test_own_block_elements_and_nested_classes_are_traceable() {
        let f = "src/components/parts/HeroSection.scss";
        let src = ".hero-section {\n  .title { color: red; }\n  &.is-active { color: blue; }\n  @media (min-width: 1px) { .body { color: red; } }\n}\n.hero-section-item .label { color: red; }\n";
        let d = run(&[f], f, src);
        assert_eq!(of_kind(&d, RuleKind::Prefix), 0, "{d:?}");
    }

    #[test]
    fn test_prefix_reports_first_offender_and_count() {
        let f = "src/components/parts/Card.scss";
        let d = run(&[f], f, ".card { color: red; }\n.helper { color: red; }\n.other, .u-ok { color: red; }\n");
        let p: Vec<&Diagnostic> = d.iter().filter(|d| d.kind == RuleKind::Prefix).collect();
        assert_eq!(p.len(), 1);
        assert!(p[0].message.contains(".helper"));
        assert!(p[0].message.contains("(+1 more)"));
        assert_eq!(p[0].location.map(|l| l.line), Some(2));
    }

    #[test]
    fn test_declaration_order_violation() {
        let f = "src/components/parts/Card.scss";
        let d = run(&[f], f, ".card {\n  color: red;\n  display: block;\n}\n");
        let o: Vec<&Diagnostic> = d.iter().filter(|d| d.rule == "ordering/declaration-order").collect();
        assert_eq!(o.len(), 1);
        assert_eq!(o[0].location.map(|l| l.line), Some(3));
        let d = run(&[f], f, ".card {\n  position: relative;\n  display: block;\n  color: red;\n}\n");
        assert!(d.iter().all(|d| d.rule != "ordering/declaration-order"));
    }

    #[test]
    fn test_layout_mixin_must_follow_declarations() {
        let f = "src/components/parts/Card.scss";
        let bad = ".card {\n  @include breakpoint-up(md) { gap: 1px; }\n  display: grid;\n}\n";
        let d = run(&[f], f, bad);
        assert_eq!(d.iter().filter(|d| d.rule == "ordering/layout-mixins").count(), 1);
        let good = ".card {\n  display: grid;\n  @include breakpoint-up(md) { gap: 1px; }\n}\n";
        let d = run(&[f], f, good);
        assert!(d.iter().all(|d| d.rule != "ordering/layout-mixins"));
    }

    #[test]
    fn test_kebab_conversion() {
        assert_eq!(to_kebab("HomePage"), "home-page");
        assert_eq!(to_kebab("homePage"), "home-page");
        assert_eq!(to_kebab("home_page"), "home-page");
        assert_eq!(to_kebab("HTMLBlock"), "html-block");
        assert_eq!(to_kebab("card"), "card");
    }
}

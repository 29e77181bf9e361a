//! Base ruleset the engine starts from.
//!
//! These stand in for the external shared configuration layered under the
//! generated convention rules. Every rule runs on every file and emits one
//! diagnostic per occurrence; suppressions and ordering overrides are
//! applied later, when the report is merged.

use crate::models::rule::BaseRule;
use crate::models::{Diagnostic, Location, RuleKind};
use crate::scan::{single_colon_pseudos, NodeKind, Stylesheet};
use regex::Regex;
use std::sync::LazyLock;

const KNOWN_AT_RULES: &[&str] = &[
    "charset",
    "container",
    "counter-style",
    "document",
    "font-face",
    "font-feature-values",
    "font-palette-values",
    "import",
    "keyframes",
    "layer",
    "media",
    "namespace",
    "page",
    "property",
    "scope",
    "starting-style",
    "supports",
    "view-transition",
];

const KNOWN_FUNCTIONS: &[&str] = &[
    "abs", "acos", "asin", "atan", "atan2", "attr", "blur", "brightness", "calc", "circle",
    "clamp", "color", "color-mix", "conic-gradient", "contrast", "cos", "counter", "counters",
    "cross-fade", "cubic-bezier", "drop-shadow", "element", "ellipse", "env", "exp", "fit-content",
    "format", "grayscale", "hsl", "hsla", "hue-rotate", "hwb", "hypot", "image", "image-set",
    "inset", "invert", "lab", "lch", "light-dark", "linear", "linear-gradient", "local", "log",
    "matrix", "matrix3d", "max", "min", "minmax", "mod", "oklab", "oklch", "opacity", "path",
    "perspective", "polygon", "pow", "radial-gradient", "ray", "rect", "rem", "repeat",
    "repeating-conic-gradient", "repeating-linear-gradient", "repeating-radial-gradient", "rgb",
    "rgba", "rotate", "rotate3d", "rotatex", "rotatey", "rotatez", "round", "saturate", "scale",
    "scale3d", "scalex", "scaley", "scalez", "sepia", "sign", "sin", "skew", "skewx", "skewy",
    "sqrt", "steps", "symbols", "tan", "translate", "translate3d", "translatex", "translatey",
    "translatez", "url", "var", "xywh",
];

/// Pseudo-elements that may still be written with one colon.
const LEGACY_PSEUDO_ELEMENTS: &[&str] = &["before", "after", "first-line", "first-letter"];

const KNOWN_PSEUDO_CLASSES: &[&str] = &[
    "active", "any-link", "autofill", "blank", "checked", "current", "default", "defined",
    "dir", "disabled", "empty", "enabled", "first", "first-child", "first-of-type",
    "focus", "focus-visible", "focus-within", "fullscreen", "future", "has", "host",
    "host-context", "hover", "in-range", "indeterminate", "invalid", "is", "lang",
    "last-child", "last-of-type", "left", "link", "local-link", "modal", "not",
    "nth-child", "nth-last-child", "nth-last-of-type", "nth-of-type", "only-child",
    "only-of-type", "optional", "out-of-range", "past", "paused", "picture-in-picture",
    "placeholder-shown", "playing", "popover-open", "read-only", "read-write", "required",
    "right", "root", "scope", "state", "target", "target-within", "user-invalid",
    "user-valid", "valid", "visited", "where",
];

/// CSS Modules scoping markers accepted as pseudo-classes.
const ALLOWED_PSEUDO_CLASSES: &[&str] = &["global", "local"];

static FUNCTION_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w$#{-])(-?[a-zA-Z_][\w-]*)\(").expect("static pattern")
});
static ZERO_WITH_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:^|[\s,(/])[-+]?0+(?:\.0+)?(px|em|rem|ex|ch|vw|vh|vmin|vmax|svh|lvh|dvh|svw|lvw|dvw|vi|vb|cm|mm|in|pt|pc|q)\b",
    )
    .expect("static pattern")
});

/// Run every base rule against a scanned file.
pub fn check(sheet: &Stylesheet, file: &str) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for rule in BaseRule::ALL {
        match rule {
            BaseRule::AtRuleNoUnknown => at_rule_no_unknown(sheet, file, &mut out),
            BaseRule::FunctionNoUnknown => function_no_unknown(sheet, file, &mut out),
            BaseRule::LengthZeroNoUnit => length_zero_no_unit(sheet, file, &mut out),
            BaseRule::PseudoElementColonNotation => pseudo_element_notation(sheet, file, &mut out),
            BaseRule::PseudoClassNoUnknown => pseudo_class_no_unknown(sheet, file, &mut out),
            BaseRule::CommentNoEmpty => comment_no_empty(sheet, file, &mut out),
            BaseRule::PropertiesAlphabeticalOrder => alphabetical_order(sheet, file, &mut out),
        }
    }
    out
}

fn diag(file: &str, rule: BaseRule, message: String, line: usize, column: usize) -> Diagnostic {
    Diagnostic {
        file: file.to_string(),
        kind: RuleKind::Base,
        rule: rule.id().to_string(),
        severity: rule.default_severity(),
        message: format!("{} ({})", message, rule.id()),
        location: Some(Location { line, column }),
    }
}

fn at_rule_no_unknown(sheet: &Stylesheet, file: &str, out: &mut Vec<Diagnostic>) {
    for node in &sheet.nodes {
        if let NodeKind::AtRule { name, .. } = &node.kind {
            let lower = name.to_ascii_lowercase();
            let bare = strip_vendor(&lower);
            if !KNOWN_AT_RULES.contains(&bare) {
                out.push(diag(
                    file,
                    BaseRule::AtRuleNoUnknown,
                    format!("Unexpected unknown at-rule \"@{}\"", name),
                    node.line,
                    node.column,
                ));
            }
        }
    }
}

fn function_no_unknown(sheet: &Stylesheet, file: &str, out: &mut Vec<Diagnostic>) {
    for node in &sheet.nodes {
        if let NodeKind::Declaration { value, .. } = &node.kind {
            for caps in FUNCTION_CALL.captures_iter(value) {
                let name = &caps[1];
                if name.starts_with('-') {
                    continue;
                }
                if !KNOWN_FUNCTIONS.contains(&name.to_ascii_lowercase().as_str()) {
                    out.push(diag(
                        file,
                        BaseRule::FunctionNoUnknown,
                        format!("Unexpected unknown function \"{}\"", name),
                        node.line,
                        node.column,
                    ));
                }
            }
        }
    }
}

fn length_zero_no_unit(sheet: &Stylesheet, file: &str, out: &mut Vec<Diagnostic>) {
    for node in &sheet.nodes {
        if let NodeKind::Declaration { property, value } = &node.kind {
            if property.starts_with("--") || property.starts_with("flex") {
                continue;
            }
            for m in ZERO_WITH_UNIT.find_iter(value) {
                out.push(diag(
                    file,
                    BaseRule::LengthZeroNoUnit,
                    format!("Unexpected unit in \"{}\"", m.as_str().trim_start_matches([' ', ',', '(', '/'])),
                    node.line,
                    node.column,
                ));
            }
        }
    }
}

fn pseudo_element_notation(sheet: &Stylesheet, file: &str, out: &mut Vec<Diagnostic>) {
    for node in &sheet.nodes {
        if let NodeKind::Rule { selector } = &node.kind {
            for name in single_colon_pseudos(selector) {
                let lower = name.to_ascii_lowercase();
                if LEGACY_PSEUDO_ELEMENTS.contains(&lower.as_str()) {
                    out.push(diag(
                        file,
                        BaseRule::PseudoElementColonNotation,
                        format!("Expected double colon pseudo-element notation \"::{}\"", name),
                        node.line,
                        node.column,
                    ));
                }
            }
        }
    }
}

fn pseudo_class_no_unknown(sheet: &Stylesheet, file: &str, out: &mut Vec<Diagnostic>) {
    for node in &sheet.nodes {
        if let NodeKind::Rule { selector } = &node.kind {
            for name in single_colon_pseudos(selector) {
                let lower = name.to_ascii_lowercase();
                if lower.starts_with('-')
                    || LEGACY_PSEUDO_ELEMENTS.contains(&lower.as_str())
                    || KNOWN_PSEUDO_CLASSES.contains(&lower.as_str())
                    || ALLOWED_PSEUDO_CLASSES.contains(&lower.as_str())
                {
                    continue;
                }
                out.push(diag(
                    file,
                    BaseRule::PseudoClassNoUnknown,
                    format!("Unexpected unknown pseudo-class selector \":{}\"", name),
                    node.line,
                    node.column,
                ));
            }
        }
    }
}

fn comment_no_empty(sheet: &Stylesheet, file: &str, out: &mut Vec<Diagnostic>) {
    for node in &sheet.nodes {
        if let NodeKind::Comment { text, inline: true } = &node.kind {
            if text.is_empty() {
                out.push(diag(
                    file,
                    BaseRule::CommentNoEmpty,
                    "Unexpected empty comment".to_string(),
                    node.line,
                    node.column,
                ));
            }
        }
    }
}

fn alphabetical_order(sheet: &Stylesheet, file: &str, out: &mut Vec<Diagnostic>) {
    for decls in sheet.declaration_groups().values() {
        let mut prev: Option<String> = None;
        for &i in decls {
            let node = &sheet.nodes[i];
            let NodeKind::Declaration { property, .. } = &node.kind else {
                continue;
            };
            if is_custom(property) {
                continue;
            }
            let name = strip_vendor(&property.to_ascii_lowercase()).to_string();
            if let Some(p) = prev.as_ref() {
                if name < *p {
                    out.push(diag(
                        file,
                        BaseRule::PropertiesAlphabeticalOrder,
                        format!("Expected \"{}\" to come before \"{}\"", name, p),
                        node.line,
                        node.column,
                    ));
                    break;
                }
            }
            prev = Some(name);
        }
    }
}

/// SCSS variables, custom properties and interpolated names.
pub fn is_custom(property: &str) -> bool {
    property.starts_with('$') || property.starts_with("--") || property.contains("#{")
}

/// Drop a `-webkit-`/`-moz-`/`-ms-`/`-o-` prefix.
pub fn strip_vendor(name: &str) -> &str {
    if let Some(rest) = name.strip_prefix('-') {
        if let Some((_, tail)) = rest.split_once('-') {
            return tail;
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(src: &str) -> Vec<Diagnostic> {
        check(&Stylesheet::parse(src), "a.scss")
    }

    fn ids(diags: &[Diagnostic]) -> Vec<&str> {
        diags.iter().map(|d| d.rule.as_str()).collect()
    }

    #[test]
    fn test_flags_preprocessor_at_rules_and_functions() {
        let d = run("@use 'sass:math';\n.a {\n  @include x;\n  width: math.div(10px, 2);\n  color: darken($c, 10%);\n}\n");
        let ids = ids(&d);
        assert_eq!(ids.iter().filter(|i| **i == "at-rule-no-unknown").count(), 2);
        assert_eq!(ids.iter().filter(|i| **i == "function-no-unknown").count(), 2);
    }

    #[test]
    fn test_known_css_is_clean() {
        let d = run("@media (min-width: 10px) {\n  .a {\n    color: rgb(0 0 0);\n    width: calc(100% - var(--x));\n  }\n}\n");
        assert!(d.is_empty(), "{d:?}");
    }

    #[test]
    fn test_zero_length_units() {
        let d = run(".a {\n  --gap: 0px;\n  flex: 1 1 0px;\n  margin: 0px auto;\n  padding: 10px 0;\n}\n");
        assert_eq!(ids(&d), vec!["length-zero-no-unit"]);
        assert_eq!(d[0].location, Some(Location { line: 4, column: 3 }));
    }

    #[test]
    fn test_single_colon_pseudo_elements() {
        let d = run(".a:before { content: ''; }\n.b::after { content: ''; }\n.c:hover { color: red; }\n");
        assert_eq!(ids(&d), vec!["selector-pseudo-element-colon-notation"]);
    }

    #[test]
    fn test_unknown_pseudo_class_is_flagged() {
        let d = run(".a:hovr { color: red; }\n.b:hover:focus-visible { color: red; }\n");
        assert_eq!(ids(&d), vec!["selector-pseudo-class-no-unknown"]);
        assert!(d[0].message.contains(":hovr"));
        assert_eq!(d[0].location, Some(Location { line: 1, column: 1 }));
    }

    #[test]
    fn test_css_modules_scoping_pseudo_classes_are_allowed() {
        let d = run(":global(.theme-dark) .a { color: red; }\n:local .b { color: red; }\n.c[data-x=\"a:b\"] { color: red; }\n");
        assert!(d.is_empty(), "{d:?}");
    }

    #[test]
    fn test_empty_inline_comment() {
        let d = run("//\n// fine\n.a { color: red; }\n");
        assert_eq!(ids(&d), vec!["scss/comment-no-empty"]);
    }

    #[test]
    fn test_alphabetical_order_one_per_block() {
        let d = run(".a {\n  width: 1px;\n  color: red;\n  align-items: center;\n}\n.b {\n  color: red;\n  width: 1px;\n}\n");
        assert_eq!(ids(&d), vec!["properties-alphabetical-order"]);
        assert_eq!(d[0].severity, crate::models::Severity::Warning);
    }

    #[test]
    fn test_vendor_prefix_is_stripped() {
        assert_eq!(strip_vendor("-webkit-keyframes"), "keyframes");
        assert_eq!(strip_vendor("color"), "color");
    }
}

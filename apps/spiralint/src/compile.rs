//! Rule compiler: turns a validated `ConventionConfig` into an ordered,
//! immutable `RuleSet`.
//!
//! Output order is fixed: casing (root, child), prefix, suppressions (in
//! base-rule order), ordering. Identical input yields identical output.

use crate::classify::Tier;
use crate::models::descriptor::ConventionConfig;
use crate::models::rule::{BaseRule, CompiledRule, OrderingPolicy, Precedence, RuleSet, RuleSpec};
use tracing::debug;

pub fn compile(config: &ConventionConfig) -> RuleSet {
    let mut rules = Vec::new();

    for (tier, style) in [
        (Tier::Root, config.file_case.root),
        (Tier::Child, config.file_case.child),
    ] {
        rules.push(CompiledRule {
            id: format!("casing/{}", tier.as_str()),
            precedence: Precedence::Generated,
            severity: Some(config.severity.casing),
            spec: RuleSpec::Casing {
                tier,
                style,
                pattern: style.pattern().to_string(),
            },
        });
    }

    if config.component_paths.is_empty() || config.external_prefixes.is_empty() {
        debug!("no component paths or external prefixes; prefix rule omitted");
    } else {
        rules.push(CompiledRule {
            id: "prefix/external".into(),
            precedence: Precedence::Generated,
            severity: Some(config.severity.prefix),
            spec: RuleSpec::Prefix {
                component_paths: config.component_paths.iter().cloned().collect(),
                prefixes: config.external_prefixes.iter().cloned().collect(),
            },
        });
    }

    for base in BaseRule::ALL {
        if !config.base_rule_enabled(base) {
            rules.push(CompiledRule {
                id: format!("suppress/{}", base.id()),
                precedence: Precedence::Suppression,
                severity: None,
                spec: RuleSpec::Suppression { target: base },
            });
        }
    }

    rules.push(CompiledRule {
        id: "ordering/declaration-order".into(),
        precedence: Precedence::Generated,
        severity: Some(config.severity.ordering),
        spec: RuleSpec::Ordering {
            policy: OrderingPolicy::DeclarationOrder {
                overrides: vec![BaseRule::PropertiesAlphabeticalOrder],
            },
        },
    });
    if !config.layout_mixins.is_empty() {
        rules.push(CompiledRule {
            id: "ordering/layout-mixins".into(),
            precedence: Precedence::Generated,
            severity: Some(config.severity.ordering),
            spec: RuleSpec::Ordering {
                policy: OrderingPolicy::LayoutMixins {
                    mixins: config.layout_mixins.clone(),
                },
            },
        });
    }

    debug!(rules = rules.len(), "compiled rule set");
    RuleSet { rules }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::descriptor::{load, DescriptorFormat};

    const DESCRIPTOR: &str = r#"{
        "aliasRoots": {"components": ["src/components"]},
        "fileCase": {"root": "pascal", "child": "kebab"},
        "stylelint": {"base": {
            "paths": {"components": ["src/components"]},
            "external": {"prefixes": ["u-", "js-"]}
        }},
        "generator": {"layoutMixins": ["@include breakpoint-up(md)"]}
    }"#;

    fn ids(set: &RuleSet) -> Vec<&str> {
        set.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_emits_rules_in_fixed_order() {
        let set = compile(&load(DESCRIPTOR, DescriptorFormat::Json).unwrap());
        assert_eq!(
            ids(&set),
            vec![
                "casing/root",
                "casing/child",
                "prefix/external",
                "suppress/at-rule-no-unknown",
                "suppress/function-no-unknown",
                "suppress/scss/comment-no-empty",
                "ordering/declaration-order",
                "ordering/layout-mixins",
            ]
        );
    }

    #[test]
    fn test_compile_is_deterministic() {
        let cfg = load(DESCRIPTOR, DescriptorFormat::Json).unwrap();
        let a = serde_json::to_string(&compile(&cfg)).unwrap();
        let b = serde_json::to_string(&compile(&cfg.clone())).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_prefixes_are_sorted() {
        let set = compile(&load(DESCRIPTOR, DescriptorFormat::Json).unwrap());
        let prefix = set.iter().find(|r| r.id == "prefix/external").unwrap();
        match &prefix.spec {
            RuleSpec::Prefix { prefixes, .. } => assert_eq!(prefixes, &vec!["js-", "u-"]),
            other => panic!("unexpected spec {other:?}"),
        }
    }

    #[test]
    fn test_empty_mixins_omit_layout_rule_and_toggles_shape_suppressions() {
        let cfg = load(
            r#"{"rules": {"at-rule-no-unknown": true, "length-zero-no-unit": null}}"#,
            DescriptorFormat::Json,
        )
        .unwrap();
        let set = compile(&cfg);
        let ids = ids(&set);
        assert!(!ids.contains(&"ordering/layout-mixins"));
        assert!(!ids.contains(&"prefix/external"));
        assert!(!ids.contains(&"suppress/at-rule-no-unknown"));
        assert!(ids.contains(&"suppress/length-zero-no-unit"));
        assert!(ids.contains(&"ordering/declaration-order"));
    }
}

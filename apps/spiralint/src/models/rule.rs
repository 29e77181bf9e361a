//! Compiled rule vocabulary.
//!
//! A `RuleSet` is the immutable output of `compile::compile`. Each rule
//! carries an explicit `Precedence`; higher-precedence rules may mask
//! diagnostics of the base ruleset when the report is merged:
//! suppression > generated rule > base default.

use crate::classify::Tier;
use crate::models::descriptor::CaseStyle;
use crate::models::Severity;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Rules of the external base ruleset the engine starts from.
pub enum BaseRule {
    AtRuleNoUnknown,
    FunctionNoUnknown,
    LengthZeroNoUnit,
    PseudoElementColonNotation,
    PseudoClassNoUnknown,
    CommentNoEmpty,
    PropertiesAlphabeticalOrder,
}

impl BaseRule {
    pub const ALL: [BaseRule; 7] = [
        BaseRule::AtRuleNoUnknown,
        BaseRule::FunctionNoUnknown,
        BaseRule::LengthZeroNoUnit,
        BaseRule::PseudoElementColonNotation,
        BaseRule::PseudoClassNoUnknown,
        BaseRule::CommentNoEmpty,
        BaseRule::PropertiesAlphabeticalOrder,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            BaseRule::AtRuleNoUnknown => "at-rule-no-unknown",
            BaseRule::FunctionNoUnknown => "function-no-unknown",
            BaseRule::LengthZeroNoUnit => "length-zero-no-unit",
            BaseRule::PseudoElementColonNotation => "selector-pseudo-element-colon-notation",
            BaseRule::PseudoClassNoUnknown => "selector-pseudo-class-no-unknown",
            BaseRule::CommentNoEmpty => "scss/comment-no-empty",
            BaseRule::PropertiesAlphabeticalOrder => "properties-alphabetical-order",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        BaseRule::ALL.into_iter().find(|r| r.id() == id.trim())
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            BaseRule::PropertiesAlphabeticalOrder => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Rules that misfire on preprocessor syntax and start out suppressed.
    pub fn suppressed_by_default(&self) -> bool {
        matches!(
            self,
            BaseRule::AtRuleNoUnknown | BaseRule::FunctionNoUnknown | BaseRule::CommentNoEmpty
        )
    }
}

impl Serialize for BaseRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Precedence {
    BaseDefault,
    Generated,
    Suppression,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "name", rename_all = "kebab-case")]
pub enum OrderingPolicy {
    /// Fixed property-group order; masks the listed base rules.
    DeclarationOrder { overrides: Vec<BaseRule> },
    /// Layout mixin includes must follow every declaration in their block.
    LayoutMixins { mixins: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RuleSpec {
    Casing {
        tier: Tier,
        style: CaseStyle,
        pattern: String,
    },
    Prefix {
        component_paths: Vec<String>,
        prefixes: Vec<String>,
    },
    Suppression {
        target: BaseRule,
    },
    Ordering {
        policy: OrderingPolicy,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// One generated rule instance.
pub struct CompiledRule {
    pub id: String,
    pub precedence: Precedence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(flatten)]
    pub spec: RuleSpec,
}

impl CompiledRule {
    /// True when this rule removes diagnostics of the given base rule.
    pub fn masks(&self, base: BaseRule) -> bool {
        if self.precedence <= Precedence::BaseDefault {
            return false;
        }
        match &self.spec {
            RuleSpec::Suppression { target } => *target == base,
            RuleSpec::Ordering {
                policy: OrderingPolicy::DeclarationOrder { overrides },
            } => overrides.contains(&base),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Ordered, immutable output of the rule compiler.
pub struct RuleSet {
    pub rules: Vec<CompiledRule>,
}

impl RuleSet {
    pub fn iter(&self) -> std::slice::Iter<'_, CompiledRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// True when any rule masks diagnostics carrying this base rule id.
    pub fn masks_rule_id(&self, rule_id: &str) -> bool {
        match BaseRule::from_id(rule_id) {
            Some(base) => self.rules.iter().any(|r| r.masks(base)),
            None => false,
        }
    }
}

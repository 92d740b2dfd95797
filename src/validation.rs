//! Validation Engine - Rule/Score Separation
//!
//! Rules produce structured violations.
//! Scoring maps violations to a compliance score.
//!
//! All accumulators live in a per-call [`ScanContext`], so one `Validator`
//! can be shared across threads without locking.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::node::DesignNode;
use crate::registry::{ComponentRegistry, ComponentRule, Composition, PropSpec, WILDCARD};
use crate::visual;

/// Minimum score for a report to be valid
pub const PASSING_SCORE: u32 = 90;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ViolationSeverity {
    Critical,
    Major,
    Minor,
}

impl ViolationSeverity {
    pub fn weight(&self) -> u32 {
        match self {
            Self::Critical => 50,
            Self::Major => 20,
            Self::Minor => 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationViolation {
    pub node_name: String,
    pub message: String,
    pub severity: ViolationSeverity,
    pub rule: String,
    pub suggestion: String,
}

/// Which composition policy to apply
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValidationProfile {
    /// Only `cannotContain` is enforced
    #[default]
    Lenient,
    /// Also enforces `canContain` allow-lists and enum values
    Strict,
}

/// Advisory draft rule for a component the registry does not know.
/// Never applied to the registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegistryFragmentProposal {
    pub key: String,
    pub rule: ComponentRule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_fill: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "UPPERCASE")]
pub enum ScanOutcome {
    Verified,
    Unknown { proposal: RegistryFragmentProposal },
    Violation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedComponent {
    pub id: String,
    pub name: String,
    pub lookup_name: String,
    #[serde(flatten)]
    pub outcome: ScanOutcome,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Breakdown {
    #[serde(rename = "CRITICAL")]
    pub critical: usize,
    #[serde(rename = "MAJOR")]
    pub major: usize,
    #[serde(rename = "MINOR")]
    pub minor: usize,
    #[serde(rename = "PASS")]
    pub pass: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub score: u32,
    pub violations: Vec<ValidationViolation>,
    pub components: Vec<ScannedComponent>,
    pub breakdown: Breakdown,
    pub valid: bool,
    pub profile: ValidationProfile,
}

impl ValidationReport {
    fn from_scan(ctx: ScanContext, profile: ValidationProfile) -> Self {
        let penalty: u32 = ctx.violations.iter().map(|v| v.severity.weight()).sum();
        let score = 100u32.saturating_sub(penalty);

        let count = |s: ViolationSeverity| ctx.violations.iter().filter(|v| v.severity == s).count();
        let breakdown = Breakdown {
            critical: count(ViolationSeverity::Critical),
            major: count(ViolationSeverity::Major),
            minor: count(ViolationSeverity::Minor),
            pass: ctx.components.iter().filter(|c| c.outcome == ScanOutcome::Verified).count(),
        };

        Self {
            score,
            valid: breakdown.critical == 0 && score >= PASSING_SCORE,
            violations: ctx.violations,
            components: ctx.components,
            breakdown,
            profile,
        }
    }

    pub fn has_critical(&self) -> bool {
        self.breakdown.critical > 0
    }
}

/// Normalized layer name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentName {
    pub base: String,
    pub lookup: String,
    pub namespaced: bool,
}

impl ComponentName {
    /// First `/` segment, trimmed, lowercased, whitespace runs collapsed to `-`.
    pub fn parse(raw: &str, namespace_prefix: &str) -> Self {
        let segment = raw.split('/').next().unwrap_or_default();
        let base = segment
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
            .to_lowercase();

        match base.strip_prefix(namespace_prefix) {
            Some(rest) if !namespace_prefix.is_empty() => Self {
                lookup: rest.to_string(),
                base,
                namespaced: true,
            },
            _ => Self {
                lookup: base.clone(),
                base,
                namespaced: false,
            },
        }
    }
}

/// Property key as the registry spells it: `Label#12:0` -> `label`
pub fn normalize_property_key(key: &str) -> String {
    key.split('#').next().unwrap_or_default().trim().to_lowercase()
}

/// Everything a rule may look at for one governed, registered node
pub struct NodeContext<'a> {
    pub node: &'a DesignNode,
    pub name: &'a ComponentName,
    pub rule: &'a ComponentRule,
    /// Parent's name and rule, when the parent is itself registered
    pub parent: Option<(&'a ComponentName, Option<&'a ComponentRule>)>,
}

/// Validation rule trait - produces violations
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, ctx: &NodeContext<'_>) -> Vec<ValidationViolation>;
}

// --- Concrete Rules ---

pub struct IllegalNestingRule;

impl ValidationRule for IllegalNestingRule {
    fn name(&self) -> &'static str { "illegal_nesting" }

    fn validate(&self, ctx: &NodeContext<'_>) -> Vec<ValidationViolation> {
        let Some((parent_name, Some(parent_rule))) = ctx.parent else {
            return vec![];
        };
        if !parent_rule.composition.forbids(&ctx.name.lookup) {
            return vec![];
        }
        vec![ValidationViolation {
            node_name: ctx.node.name.clone(),
            message: format!(
                "Illegal nesting: '{}' cannot be placed inside '{}'",
                ctx.name.lookup, parent_name.lookup
            ),
            severity: ViolationSeverity::Critical,
            rule: self.name().to_string(),
            suggestion: format!("Move '{}' out of '{}'", ctx.name.lookup, parent_name.lookup),
        }]
    }
}

pub struct DisallowedChildRule;

impl ValidationRule for DisallowedChildRule {
    fn name(&self) -> &'static str { "disallowed_child" }

    fn validate(&self, ctx: &NodeContext<'_>) -> Vec<ValidationViolation> {
        let Some((parent_name, Some(parent_rule))) = ctx.parent else {
            return vec![];
        };
        // cannotContain already reported it
        if parent_rule.composition.forbids(&ctx.name.lookup)
            || !parent_rule.composition.disallows(&ctx.name.lookup)
        {
            return vec![];
        }
        vec![ValidationViolation {
            node_name: ctx.node.name.clone(),
            message: format!(
                "'{}' is not in the allowed children of '{}'",
                ctx.name.lookup, parent_name.lookup
            ),
            severity: ViolationSeverity::Major,
            rule: self.name().to_string(),
            suggestion: format!(
                "Use one of: {}",
                parent_rule.composition.can_contain.join(", ")
            ),
        }]
    }
}

pub struct UnknownPropertyRule;

impl ValidationRule for UnknownPropertyRule {
    fn name(&self) -> &'static str { "unknown_property" }

    fn validate(&self, ctx: &NodeContext<'_>) -> Vec<ValidationViolation> {
        ctx.node
            .component_properties
            .keys()
            .map(|k| normalize_property_key(k))
            .filter(|k| ctx.rule.find_prop(k).is_none())
            .map(|k| ValidationViolation {
                node_name: ctx.node.name.clone(),
                message: format!("Unknown property '{}' on '{}'", k, ctx.name.lookup),
                severity: ViolationSeverity::Minor,
                rule: self.name().to_string(),
                suggestion: format!("Remove '{}' or declare it in the registry", k),
            })
            .collect()
    }
}

pub struct EnumValueRule;

impl ValidationRule for EnumValueRule {
    fn name(&self) -> &'static str { "invalid_enum_value" }

    fn validate(&self, ctx: &NodeContext<'_>) -> Vec<ValidationViolation> {
        let mut violations = vec![];
        for (key, descriptor) in &ctx.node.component_properties {
            let key = normalize_property_key(key);
            let Some((_, spec)) = ctx.rule.find_prop(&key) else { continue };
            let (Some(allowed), Some(serde_json::Value::String(value))) =
                (&spec.allowed, &descriptor.value)
            else {
                continue;
            };
            if allowed.iter().any(|a| a.eq_ignore_ascii_case(value)) {
                continue;
            }
            violations.push(ValidationViolation {
                node_name: ctx.node.name.clone(),
                message: format!("Value '{}' is not allowed for '{}'", value, key),
                severity: ViolationSeverity::Minor,
                rule: self.name().to_string(),
                suggestion: format!("Use one of: {}", allowed.join(", ")),
            });
        }
        violations
    }
}

/// Per-call accumulators
#[derive(Default)]
struct ScanContext {
    violations: Vec<ValidationViolation>,
    components: Vec<ScannedComponent>,
}

/// Validator orchestrates rules over the whole tree
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
    namespace_prefix: String,
    profile: ValidationProfile,
}

impl Validator {
    pub fn new(profile: ValidationProfile) -> Self {
        let mut rules: Vec<Box<dyn ValidationRule>> = vec![Box::new(IllegalNestingRule)];
        if profile == ValidationProfile::Strict {
            rules.push(Box::new(DisallowedChildRule));
        }
        rules.push(Box::new(UnknownPropertyRule));
        if profile == ValidationProfile::Strict {
            rules.push(Box::new(EnumValueRule));
        }
        Self {
            rules,
            namespace_prefix: "app-".to_string(),
            profile,
        }
    }

    pub fn with_namespace_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.namespace_prefix = prefix.into();
        self
    }

    pub fn profile(&self) -> ValidationProfile {
        self.profile
    }

    pub fn validate(&self, tree: &DesignNode, registry: &ComponentRegistry) -> ValidationReport {
        let mut ctx = ScanContext::default();
        self.walk(tree, None, registry, &mut ctx);

        let report = ValidationReport::from_scan(ctx, self.profile);
        tracing::info!(
            root = %tree.name,
            score = report.score,
            violations = report.violations.len(),
            valid = report.valid,
            "validation complete"
        );
        report
    }

    fn walk(
        &self,
        node: &DesignNode,
        parent: Option<&DesignNode>,
        registry: &ComponentRegistry,
        ctx: &mut ScanContext,
    ) {
        let name = ComponentName::parse(&node.name, &self.namespace_prefix);
        let governed = name.namespaced || registry.contains(&name.lookup);

        if governed {
            let outcome = match registry.get(&name.lookup) {
                None => {
                    ctx.violations.push(ValidationViolation {
                        node_name: node.name.clone(),
                        message: format!("Unregistered component '{}'", name.lookup),
                        severity: ViolationSeverity::Critical,
                        rule: "unregistered_component".to_string(),
                        suggestion: "Register the component or review the proposed fragment".to_string(),
                    });
                    ScanOutcome::Unknown { proposal: propose_fragment(node, &name) }
                }
                Some(rule) => {
                    let parent_name = parent.map(|p| ComponentName::parse(&p.name, &self.namespace_prefix));
                    let node_ctx = NodeContext {
                        node,
                        name: &name,
                        rule,
                        parent: parent_name.as_ref().map(|pn| (pn, registry.get(&pn.lookup))),
                    };

                    let found: Vec<_> = self.rules.iter().flat_map(|r| r.validate(&node_ctx)).collect();
                    let outcome = if found.is_empty() { ScanOutcome::Verified } else { ScanOutcome::Violation };
                    ctx.violations.extend(found);
                    outcome
                }
            };

            ctx.components.push(ScannedComponent {
                id: node.id.clone(),
                name: node.name.clone(),
                lookup_name: name.lookup.clone(),
                outcome,
            });
        }

        for child in &node.children {
            self.walk(child, Some(node), registry, ctx);
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationProfile::default())
    }
}

/// Draft a rule from what the node exposes
fn propose_fragment(node: &DesignNode, name: &ComponentName) -> RegistryFragmentProposal {
    let props: BTreeMap<String, PropSpec> = node
        .component_properties
        .keys()
        .map(|k| (normalize_property_key(k), PropSpec::default()))
        .collect();

    let can_contain = if node.children.is_empty() { vec![] } else { vec![WILDCARD.to_string()] };

    RegistryFragmentProposal {
        key: name.lookup.clone(),
        rule: ComponentRule {
            component_type: "draft".to_string(),
            tag: name.base.clone(),
            props,
            composition: Composition { can_contain, cannot_contain: vec![] },
        },
        observed_fill: visual::find_solid_fill(node).map(visual::rgb_to_hex),
    }
}

//! Kind-indexed view of the enabled rules.

use std::collections::HashMap;

use tracing::debug;

use super::{RuleDescriptor, RuleId, Severity};
use crate::config::LintConfig;
use crate::syntax::SyntaxKind;

/// A rule as configured for one run.
#[derive(Debug, Clone, Copy)]
pub struct ActiveRule {
    pub descriptor: &'static RuleDescriptor,
    pub severity: Severity,
    /// Position in the rule table.
    pub order: usize,
}

/// Enabled rules plus, for every node kind, the rules subscribed to it in
/// table order.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<ActiveRule>,
    by_kind: HashMap<SyntaxKind, Vec<usize>>,
}

impl RuleRegistry {
    /// Registry over the built-in rule table.
    pub fn new(config: &LintConfig) -> Self {
        Self::with_rules(crate::rules::BUILTIN_RULES, config)
    }

    pub fn with_rules(table: &'static [RuleDescriptor], config: &LintConfig) -> Self {
        let mut registry = RuleRegistry::default();
        for (order, descriptor) in table.iter().enumerate() {
            if !config.is_enabled(descriptor) {
                continue;
            }
            let index = registry.rules.len();
            registry.rules.push(ActiveRule {
                descriptor,
                severity: config.severity_for(descriptor),
                order,
            });
            for kind in descriptor.kinds {
                registry.by_kind.entry(*kind).or_default().push(index);
            }
        }
        debug!(
            enabled = registry.rules.len(),
            kinds = registry.by_kind.len(),
            "built rule registry"
        );
        registry
    }

    pub fn rules(&self) -> &[ActiveRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn is_enabled(&self, id: RuleId) -> bool {
        self.rules.iter().any(|r| r.descriptor.id == id)
    }

    /// Rules subscribed to `kind`, in table order.
    pub fn for_kind(&self, kind: SyntaxKind) -> impl Iterator<Item = &ActiveRule> {
        self.by_kind
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|i| &self.rules[*i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry() {
        let registry = RuleRegistry::new(&LintConfig::default());
        // cast-to-as is opt-in
        assert!(!registry.is_enabled(RuleId::CastToAs));
        assert!(registry.is_enabled(RuleId::AsToCast));
        assert_eq!(registry.rules().len(), RuleId::ALL.len() - 1);
        let switch_rules: Vec<RuleId> = registry
            .for_kind(SyntaxKind::SwitchStmt)
            .map(|r| r.descriptor.id)
            .collect();
        assert_eq!(switch_rules, vec![RuleId::IncompleteEnumSwitch, RuleId::MissingDefault]);
        assert_eq!(registry.for_kind(SyntaxKind::Block).count(), 0);
    }

    #[test]
    fn test_configured_registry() {
        let mut config = LintConfig::default();
        config.enable(RuleId::CastToAs);
        config.disable(RuleId::Goto);
        config.set_severity(RuleId::AsToCast, Severity::Warning);
        let registry = RuleRegistry::new(&config);
        assert!(registry.is_enabled(RuleId::CastToAs));
        assert!(!registry.is_enabled(RuleId::Goto));
        let as_to_cast = registry
            .for_kind(SyntaxKind::AsExpr)
            .next()
            .unwrap();
        assert_eq!(as_to_cast.severity, Severity::Warning);
    }
}

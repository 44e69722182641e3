/*!
# Built-in Rules

Every rule is a plain function over a `RuleContext`, registered in
`BUILTIN_RULES` together with the node kinds it subscribes to. Rules never
walk the tree themselves; anything beyond the node and its ancestor chain
comes from the semantic model.

Table order is the tie-break order for diagnostics at the same position.
*/

mod api_usage;
mod conversions;
mod control_flow;
mod declarations;
mod locals;
mod switches;

use crate::analysis::{RuleDescriptor, RuleId, Severity};
use crate::syntax::{NodeId, SyntaxKind, SyntaxTree};

pub static BUILTIN_RULES: &[RuleDescriptor] = &[
    RuleDescriptor {
        id: RuleId::AsToCast,
        description: "Prefer a cast over an `as` expression",
        severity: Severity::Suggestion,
        enabled_by_default: true,
        kinds: &[SyntaxKind::AsExpr],
        message: "Use a cast instead of `as {0}`",
        check: conversions::as_to_cast,
    },
    RuleDescriptor {
        id: RuleId::CastToAs,
        description: "Prefer an `as` expression over a cast that cannot fail differently",
        severity: Severity::Suggestion,
        enabled_by_default: false,
        kinds: &[SyntaxKind::CastExpr],
        message: "Use `as {0}` instead of a cast",
        check: conversions::cast_to_as,
    },
    RuleDescriptor {
        id: RuleId::DeadBranch,
        description: "An `if` whose condition is the literal `false` never runs",
        severity: Severity::Warning,
        enabled_by_default: true,
        kinds: &[SyntaxKind::IfStmt],
        message: "Condition is always false; the branch never runs",
        check: control_flow::dead_branch,
    },
    RuleDescriptor {
        id: RuleId::RedundantTernary,
        description: "`c ? true : false` is just `c`",
        severity: Severity::Suggestion,
        enabled_by_default: true,
        kinds: &[SyntaxKind::ConditionalExpr],
        message: "Redundant conditional; use `{0}` directly",
        check: control_flow::redundant_ternary,
    },
    RuleDescriptor {
        id: RuleId::StaleTimestamp,
        description: "Local wall-clock time is ambiguous; use `DateTime.UtcNow`",
        severity: Severity::Warning,
        enabled_by_default: true,
        kinds: &[SyntaxKind::NameExpr, SyntaxKind::MemberAccessExpr],
        message: "Use `DateTime.UtcNow` instead of `{0}`",
        check: api_usage::stale_timestamp,
    },
    RuleDescriptor {
        id: RuleId::PairedOverride,
        description: "`Equals(object)` and `GetHashCode()` must be overridden together",
        severity: Severity::Warning,
        enabled_by_default: true,
        kinds: &[SyntaxKind::ClassDecl, SyntaxKind::StructDecl],
        message: "`{0}` overrides {1} but not {2}",
        check: declarations::paired_override,
    },
    RuleDescriptor {
        id: RuleId::Goto,
        description: "Avoid `goto`",
        severity: Severity::Warning,
        enabled_by_default: true,
        kinds: &[SyntaxKind::GotoStmt],
        message: "Avoid `goto`",
        check: control_flow::goto,
    },
    RuleDescriptor {
        id: RuleId::LoopAllocation,
        description: "A new `Random` per loop iteration repeats sequences",
        severity: Severity::Warning,
        enabled_by_default: true,
        kinds: &[SyntaxKind::VariableDeclarator],
        message: "`{0}` creates a new `Random` on every loop iteration; hoist it out of the loop",
        check: api_usage::loop_allocation,
    },
    RuleDescriptor {
        id: RuleId::RedundantPrivateSetter,
        description: "A setter only used by constructors can be removed",
        severity: Severity::Suggestion,
        enabled_by_default: true,
        kinds: &[SyntaxKind::PropertyDecl],
        message: "The setter of `{0}` is only used in constructors; make the property get-only",
        check: declarations::redundant_private_setter,
    },
    RuleDescriptor {
        id: RuleId::TrivialConstructor,
        description: "An empty parameterless constructor is what the compiler generates",
        severity: Severity::Suggestion,
        enabled_by_default: true,
        kinds: &[SyntaxKind::ClassDecl],
        message: "Remove the empty constructor of `{0}`",
        check: declarations::trivial_constructor,
    },
    RuleDescriptor {
        id: RuleId::IncompleteEnumSwitch,
        description: "A switch over an enum should handle every member",
        severity: Severity::Warning,
        enabled_by_default: true,
        kinds: &[SyntaxKind::SwitchStmt],
        message: "Switch over `{0}` does not handle: {1}",
        check: switches::incomplete_enum_switch,
    },
    RuleDescriptor {
        id: RuleId::MissingDefault,
        description: "A switch statement should have a `default` section",
        severity: Severity::Suggestion,
        enabled_by_default: true,
        kinds: &[SyntaxKind::SwitchStmt],
        message: "Add a `default` section",
        check: switches::missing_default,
    },
    RuleDescriptor {
        id: RuleId::ExplicitToVar,
        description: "Use `var` when the initializer has exactly the declared type",
        severity: Severity::Suggestion,
        enabled_by_default: true,
        kinds: &[SyntaxKind::LocalDeclStmt],
        message: "Use `var` instead of `{0}`",
        check: locals::explicit_to_var,
    },
];

/// Descriptor of a built-in rule.
pub fn descriptor(id: RuleId) -> &'static RuleDescriptor {
    &BUILTIN_RULES[id.index()]
}

/// True for a `LiteralExpr` made of a single token of `kind`.
pub(crate) fn is_literal(tree: &SyntaxTree, node: NodeId, kind: SyntaxKind) -> bool {
    tree.kind(node) == SyntaxKind::LiteralExpr
        && tree
            .first_token(node)
            .is_some_and(|t| tree.token(t).kind() == kind)
}

/// Runs a single rule over `source` and returns its diagnostics.
#[cfg(test)]
pub(crate) fn run_rule(source: &str, id: RuleId) -> Vec<crate::analysis::Diagnostic> {
    use crate::analysis::{dispatch, RuleRegistry};
    use crate::config::LintConfig;
    use crate::semantic::Compilation;

    let parsed = crate::syntax::parse(source);
    assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
    let mut config = LintConfig::default();
    for other in RuleId::ALL {
        if other == id {
            config.enable(other);
        } else {
            config.disable(other);
        }
    }
    let registry = RuleRegistry::new(&config);
    let model = Compilation::new(&parsed.tree);
    dispatch(&parsed.tree, &model, &registry)
}

/// Source text under each diagnostic of a single rule.
#[cfg(test)]
pub(crate) fn flagged(source: &str, id: RuleId) -> Vec<String> {
    run_rule(source, id)
        .iter()
        .map(|d| source[d.span.start..d.span.end].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_rule_ids() {
        assert_eq!(BUILTIN_RULES.len(), RuleId::ALL.len());
        for (i, descriptor) in BUILTIN_RULES.iter().enumerate() {
            assert_eq!(descriptor.id.index(), i, "{}", descriptor.id);
            assert!(!descriptor.kinds.is_empty());
            assert!(descriptor.kinds.iter().all(|k| k.is_node()));
        }
    }
}

//! Purely syntactic control-flow rules.

use super::is_literal;
use crate::analysis::{Diagnostic, RuleContext};
use crate::syntax::SyntaxKind;

/// `if (false)`. Only the bare literal counts; nothing is folded.
pub(super) fn dead_branch(ctx: &RuleContext<'_>) -> Option<Diagnostic> {
    let condition = ctx.tree.child_nodes(ctx.node).next()?;
    is_literal(ctx.tree, condition, SyntaxKind::FalseKw).then(|| ctx.report(&[]))
}

/// `c ? true : false`, in that order.
pub(super) fn redundant_ternary(ctx: &RuleContext<'_>) -> Option<Diagnostic> {
    let tree = ctx.tree;
    let parts: Vec<_> = tree.child_nodes(ctx.node).collect();
    let [condition, when_true, when_false] = parts[..] else {
        return None;
    };
    (is_literal(tree, when_true, SyntaxKind::TrueKw) && is_literal(tree, when_false, SyntaxKind::FalseKw))
        .then(|| ctx.report(&[tree.node_text(condition).as_str()]))
}

pub(super) fn goto(ctx: &RuleContext<'_>) -> Option<Diagnostic> {
    Some(ctx.report(&[]))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::analysis::RuleId;
    use crate::rules::{flagged, run_rule};

    #[test]
    fn test_dead_branch_needs_literal_false() {
        let source = r#"
class C {
    const bool Off = false;
    void M(bool b) {
        if (false) { b = false; }
        if (Off) { b = true; }
        if (!true) { b = true; }
        if ((false)) { b = true; }
        if (false) b = true; else b = false;
    }
}
"#;
        assert_eq!(
            flagged(source, RuleId::DeadBranch),
            vec!["if (false) { b = false; }", "if (false) b = true; else b = false;"]
        );
    }

    #[test]
    fn test_redundant_ternary_order_matters() {
        let source = r#"
class C {
    bool M(int x) {
        bool a = x > 1 ? true : false;
        bool b = x > 2 ? false : true;
        bool c = x > 3 ? true : true;
        return a && b && c;
    }
}
"#;
        let diagnostics = run_rule(source, RuleId::RedundantTernary);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Redundant conditional; use `x > 1` directly");
    }

    #[test]
    fn test_every_goto_form() {
        let source = r#"
class C {
    void M(int c) {
        switch (c) { case 1: goto case 2; case 2: goto default; default: break; }
        again: goto again;
    }
}
"#;
        assert_eq!(
            flagged(source, RuleId::Goto),
            vec!["goto case 2;", "goto default;", "goto again;"]
        );
    }
}

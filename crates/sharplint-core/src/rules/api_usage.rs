//! Rules keyed on a specific library symbol.

use crate::analysis::{Diagnostic, RuleContext};
use crate::semantic::{SemanticModel, Symbol, TypeId};
use crate::syntax::SyntaxKind;

fn system_type(model: &dyn SemanticModel, name: &str) -> Option<TypeId> {
    model.symbols().lookup("System", name, 0)
}

/// Any spelling of `System.DateTime.Now`. Resolution goes through the
/// model, so a user type or local named `Now` never matches.
pub(super) fn stale_timestamp(ctx: &RuleContext<'_>) -> Option<Diagnostic> {
    let Some(Symbol::Member(member)) = ctx.model.symbol_of(ctx.node) else {
        return None;
    };
    let symbol = ctx.model.symbols().member(member);
    let date_time = system_type(ctx.model, "DateTime")?;
    (symbol.name == "Now" && symbol.owner == date_time)
        .then(|| ctx.report(&[ctx.tree.node_text(ctx.node).as_str()]))
}

/// A local initialized with `new Random(...)` inside a loop body of the
/// same member or lambda.
pub(super) fn loop_allocation(ctx: &RuleContext<'_>) -> Option<Diagnostic> {
    let tree = ctx.tree;
    let mut ancestors = ctx.ancestors();
    let declaration = ancestors.next()?;
    let statement = ancestors.next()?;
    // a `for` initializer runs once, so its own loop is skipped; enclosing
    // loops still count
    if tree.kind(declaration) != SyntaxKind::VariableDeclaration
        || !matches!(tree.kind(statement), SyntaxKind::LocalDeclStmt | SyntaxKind::ForStmt)
    {
        return None;
    }
    let value = tree
        .child_of_kind(ctx.node, SyntaxKind::EqualsValueClause)
        .and_then(|clause| tree.child_nodes(clause).next())?;
    if tree.kind(value) != SyntaxKind::ObjectCreationExpr {
        return None;
    }
    let created = ctx.model.type_of(value)?.type_id()?;
    if Some(created) != system_type(ctx.model, "Random") {
        return None;
    }
    if !ancestors.any(|a| tree.kind(a).is_loop()) {
        return None;
    }
    let name = tree.name_text(ctx.node)?;
    Some(ctx.report(&[name]))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::analysis::RuleId;
    use crate::rules::flagged;

    #[test]
    fn test_stale_timestamp_resolves_every_spelling() {
        let source = r#"
using System;
using static System.DateTime;

class C {
    void Log(DateTime at) { }
    void M() {
        var a = DateTime.Now;
        var b = System.DateTime.Now;
        var c = Now;
        Log(DateTime.Now);
        var d = DateTime.UtcNow;
        var e = DateTime.Today;
    }
}
"#;
        assert_eq!(
            flagged(source, RuleId::StaleTimestamp),
            vec!["DateTime.Now", "System.DateTime.Now", "Now", "DateTime.Now"]
        );
    }

    #[test]
    fn test_stale_timestamp_ignores_lookalikes() {
        let source = r#"
class Clock {
    public int Now { get; set; }
}
class C {
    void M(Clock clock) {
        var a = clock.Now;
        int Now = 3;
        var b = Now;
    }
}
"#;
        assert!(flagged(source, RuleId::StaleTimestamp).is_empty());
    }

    #[test]
    fn test_loop_allocation_scope() {
        let source = r#"
using System;

class C {
    void M(int[] xs) {
        var outside = new Random();
        for (var init = new Random(); init.Next() > 0; init.Next()) { }
        foreach (var x in xs) {
            var inLoop = new Random(x), other = new Random();
            var notRandom = new object();
            Action a = () => { var inLambda = new Random(); };
        }
        while (true) {
            System.Random qualified = new System.Random();
        }
    }
}
"#;
        assert_eq!(
            flagged(source, RuleId::LoopAllocation),
            vec!["inLoop = new Random(x)", "other = new Random()", "qualified = new System.Random()"]
        );
    }
}

//! Local declarations.

use crate::analysis::{Diagnostic, RuleContext};
use crate::semantic::TypeRef;
use crate::syntax::SyntaxKind;

/// `T x = e;` where `e` has exactly type `T`. Convertible is not enough:
/// `object o = "s";` keeps its declared type.
pub(super) fn explicit_to_var(ctx: &RuleContext<'_>) -> Option<Diagnostic> {
    let tree = ctx.tree;
    if tree.has_token(ctx.node, SyntaxKind::ConstKw) {
        return None;
    }
    let declaration = tree.child_of_kind(ctx.node, SyntaxKind::VariableDeclaration)?;
    let mut declarators = tree.children_of_kind(declaration, SyntaxKind::VariableDeclarator);
    let declarator = declarators.next()?;
    if declarators.next().is_some() {
        return None;
    }
    let ty = tree.child_where(declaration, SyntaxKind::is_type)?;
    if tree.node_text(ty) == "var" {
        return None;
    }
    let value = tree
        .child_of_kind(declarator, SyntaxKind::EqualsValueClause)
        .and_then(|clause| tree.child_nodes(clause).next())?;
    if !tree.kind(value).is_expression() || tree.kind(value) == SyntaxKind::InitializerExpr {
        return None;
    }

    let declared = ctx.model.type_of(ty)?;
    let actual = ctx.model.type_of(value)?;
    if declared != actual || actual == TypeRef::Null {
        return None;
    }
    Some(ctx.diagnostic(tree.span(ty), tree.kind(ty), &[tree.node_text(ty).as_str()]))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::analysis::RuleId;
    use crate::rules::flagged;

    #[test]
    fn test_explicit_to_var_requires_identical_types() {
        let source = r#"
using System.Collections.Generic;

class C {
    void M() {
        int a = 1;
        long b = 1;
        object c = "s";
        string d = "s";
        List<int> e = new List<int>();
        IList<int> f = new List<int>();
        var g = 1;
        const int h = 2;
        int i = 1, j = 2;
        int[] k = { 1, 2 };
        int l;
        string m = null;
    }
}
"#;
        assert_eq!(flagged(source, RuleId::ExplicitToVar), vec!["int", "string", "List<int>"]);
    }

    #[test]
    fn test_user_types_and_unknown_initializers() {
        let source = r#"
class Point { }
class C {
    Point Make() { return new Point(); }
    void M() {
        Point p = Make();
        Point q = Unknown();
    }
}
"#;
        assert_eq!(flagged(source, RuleId::ExplicitToVar), vec!["Point"]);
    }
}

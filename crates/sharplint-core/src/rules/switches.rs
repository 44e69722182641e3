//! Switch statement coverage.

use crate::analysis::{Diagnostic, RuleContext};
use crate::semantic::{MemberKind, Symbol, TypeId, TypeRef};
use crate::syntax::{NodeId, SyntaxKind, SyntaxTree};

fn labels(tree: &SyntaxTree, switch: NodeId, kind: SyntaxKind) -> impl Iterator<Item = NodeId> + '_ {
    tree.children_of_kind(switch, SyntaxKind::SwitchSection)
        .flat_map(move |section| tree.children_of_kind(section, kind))
}

/// Name of the member of `ty` a case label refers to.
fn label_member(ctx: &RuleContext<'_>, value: NodeId, ty: TypeId) -> Option<String> {
    let table = ctx.model.symbols();
    if let Some(Symbol::Member(member)) = ctx.model.symbol_of(value) {
        let member = table.member(member);
        return (member.kind == MemberKind::EnumMember && member.owner == ty).then(|| member.name.clone());
    }
    if ctx.tree.kind(value) != SyntaxKind::NameExpr {
        return None;
    }
    let name = ctx.tree.ident_text(value)?;
    (ctx.model.resolve_static_import(name) == Some(ty)).then(|| name.to_string())
}

/// A switch over an enum that leaves members unlabelled. `default:` does
/// not count as handling them.
pub(super) fn incomplete_enum_switch(ctx: &RuleContext<'_>) -> Option<Diagnostic> {
    let tree = ctx.tree;
    let governing = tree.child_nodes(ctx.node).next()?;
    let ty = match ctx.model.type_of(governing)? {
        TypeRef::Nullable(inner) => *inner,
        other => other,
    };
    let enum_type = ty.type_id()?;
    let members = ctx.model.enum_members(enum_type)?;

    let mut handled = Vec::new();
    for label in labels(tree, ctx.node, SyntaxKind::CaseLabel) {
        let value = tree.child_nodes(label).next()?;
        // an unresolvable label might cover anything
        handled.push(label_member(ctx, value, enum_type)?);
    }
    let missing: Vec<&str> = members
        .iter()
        .filter(|m| !handled.contains(m))
        .map(String::as_str)
        .collect();
    if missing.is_empty() {
        return None;
    }
    let name = &ctx.model.symbols().ty(enum_type).name;
    Some(ctx.report(&[name.as_str(), missing.join(", ").as_str()]))
}

pub(super) fn missing_default(ctx: &RuleContext<'_>) -> Option<Diagnostic> {
    labels(ctx.tree, ctx.node, SyntaxKind::DefaultLabel)
        .next()
        .is_none()
        .then(|| ctx.report(&[]))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::analysis::RuleId;
    use crate::rules::run_rule;

    const COLORS: &str = r#"
namespace Paint {
    enum Color { Red, Green, Blue }
}
"#;

    fn messages(body: &str, id: RuleId) -> Vec<String> {
        let source = format!("{body}{COLORS}");
        run_rule(&source, id).into_iter().map(|d| d.message).collect()
    }

    #[test]
    fn test_default_does_not_cover_enum_members() {
        let body = r#"
using Paint;
class C {
    int M(Color c) {
        switch (c) {
            case Color.Red: return 1;
            case Color.Green: return 2;
            default: return 0;
        }
    }
}
"#;
        assert_eq!(
            messages(body, RuleId::IncompleteEnumSwitch),
            vec!["Switch over `Color` does not handle: Blue"]
        );
    }

    #[test]
    fn test_static_import_labels_and_full_coverage() {
        let body = r#"
using static Paint.Color;
class C {
    int M(Paint.Color c, Paint.Color? maybe) {
        switch (c) {
            case Red:
            case Green: return 1;
            case Paint.Color.Blue: return 2;
        }
        switch (maybe) {
            case Red: return 3;
        }
        return 0;
    }
}
"#;
        assert_eq!(
            messages(body, RuleId::IncompleteEnumSwitch),
            vec!["Switch over `Color` does not handle: Green, Blue"]
        );
    }

    #[test]
    fn test_unresolvable_label_abstains() {
        let body = r#"
class C {
    void M(Paint.Color c, int n) {
        switch (c) {
            case Unknown.Thing: break;
        }
        switch (n) {
            case 1: break;
        }
    }
}
"#;
        assert!(messages(body, RuleId::IncompleteEnumSwitch).is_empty());
    }

    #[test]
    fn test_missing_default_any_governing_type() {
        let body = r#"
class C {
    void M(int n, string s) {
        switch (n) { case 1: break; }
        switch (s) { case "a": break; default: break; }
        switch (n) { }
    }
}
"#;
        assert_eq!(messages(body, RuleId::MissingDefault).len(), 2);
    }
}

//! Cast and `as` conversions.

use crate::analysis::{Diagnostic, RuleContext};
use crate::semantic::TypeRef;
use crate::syntax::SyntaxKind;

/// `expr as T`, always.
pub(super) fn as_to_cast(ctx: &RuleContext<'_>) -> Option<Diagnostic> {
    let ty = ctx.tree.child_where(ctx.node, SyntaxKind::is_type)?;
    Some(ctx.report(&[ctx.tree.node_text(ty).as_str()]))
}

/// `(T)expr` where `expr as T` is legal and converts the same way.
pub(super) fn cast_to_as(ctx: &RuleContext<'_>) -> Option<Diagnostic> {
    let tree = ctx.tree;
    let mut children = tree.child_nodes(ctx.node);
    let ty = children.next()?;
    let operand = children.next()?;
    let target = ctx.model.type_of(ty)?;
    let as_compatible = match &target {
        TypeRef::Nullable(_) | TypeRef::Array(_) => true,
        TypeRef::Named { .. } => ctx.model.symbols().is_reference_type(&target) == Some(true),
        TypeRef::Param(_) | TypeRef::Null => false,
    };
    if !as_compatible {
        return None;
    }
    let conversion = ctx.model.conversion_kind(operand, &target)?;
    conversion
        .permits_as()
        .then(|| ctx.report(&[tree.node_text(ty).as_str()]))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::analysis::RuleId;
    use crate::rules::flagged;

    #[test]
    fn test_as_to_cast_fires_on_every_as() {
        let source = r#"
class C {
    void M(object o) {
        var s = o as string;
        var n = o as int?;
        var t = (string)o;
    }
}
"#;
        assert_eq!(
            flagged(source, RuleId::AsToCast),
            vec!["o as string", "o as int?"]
        );
    }

    #[test]
    fn test_cast_to_as_requires_as_compatible_conversion() {
        let source = r#"
interface IShape { }
class Circle : IShape { }
class C {
    void M(object o, IShape shape, long l, Circle c) {
        var a = (string)o;
        var b = (int)o;
        var d = (int?)o;
        var e = (int)l;
        var f = (Circle)shape;
        var g = (IShape)c;
    }
}
"#;
        assert_eq!(
            flagged(source, RuleId::CastToAs),
            vec!["(string)o", "(int?)o", "(Circle)shape", "(IShape)c"]
        );
    }

    #[test]
    fn test_cast_to_as_abstains_on_unknown_operands() {
        let source = r#"
class C {
    void M() {
        var a = (string)Missing();
    }
}
"#;
        assert!(flagged(source, RuleId::CastToAs).is_empty());
    }
}

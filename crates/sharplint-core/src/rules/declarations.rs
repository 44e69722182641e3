//! Rules over type and member declarations.

use crate::analysis::{Diagnostic, RuleContext};
use crate::semantic::{Signature, SpecialType, Symbol};
use crate::syntax::SyntaxKind;

/// Exactly one of `override Equals(object)` and `override GetHashCode()`.
pub(super) fn paired_override(ctx: &RuleContext<'_>) -> Option<Diagnostic> {
    let Some(Symbol::Type(ty)) = ctx.model.symbol_of(ctx.node) else {
        return None;
    };
    let table = ctx.model.symbols();
    let object = table.special_ref(SpecialType::Object)?;
    let equals = Signature::new("Equals", vec![object]);
    let hash_code = Signature::new("GetHashCode", Vec::new());

    let members = &table.ty(ty).members;
    let overrides = |signature: &Signature| members.iter().any(|m| ctx.model.is_override(*m, signature));
    let (present, missing) = match (overrides(&equals), overrides(&hash_code)) {
        (true, false) => ("Equals(object)", "GetHashCode()"),
        (false, true) => ("GetHashCode()", "Equals(object)"),
        _ => return None,
    };
    let name = ctx.tree.name_token(ctx.node)?;
    let name = ctx.tree.token(name);
    Some(ctx.diagnostic(name.span(), ctx.kind(), &[name.text(), present, missing]))
}

/// An auto-property whose restricted setter is only ever written from
/// constructors of the declaring type.
pub(super) fn redundant_private_setter(ctx: &RuleContext<'_>) -> Option<Diagnostic> {
    let tree = ctx.tree;
    let Some(Symbol::Member(member)) = ctx.model.symbol_of(ctx.node) else {
        return None;
    };
    let symbol = ctx.model.symbols().member(member);
    let accessors = symbol.accessors.as_ref()?;
    let (get, set, setter) = (accessors.get?, accessors.set?, accessors.set_decl?);
    if !accessors.auto || !set.is_stricter_than(get) {
        return None;
    }

    let declaring_type = tree.parent(ctx.node)?;
    let writes = ctx.model.write_references(member);
    let only_in_constructors = writes.iter().all(|write| {
        // lambdas are boundaries too, so a write captured in one never
        // counts as a constructor write
        tree.ancestors(*write)
            .find(|a| tree.kind(*a).is_boundary())
            .is_some_and(|owner| {
                tree.kind(owner) == SyntaxKind::ConstructorDecl
                    && tree.parent(owner) == Some(declaring_type)
            })
    });
    if writes.is_empty() || !only_in_constructors {
        return None;
    }
    Some(ctx.diagnostic(tree.span(setter), SyntaxKind::Accessor, &[symbol.name.as_str()]))
}

/// A class whose only constructor is the one the compiler would generate.
pub(super) fn trivial_constructor(ctx: &RuleContext<'_>) -> Option<Diagnostic> {
    let tree = ctx.tree;
    let mut constructors = tree.children_of_kind(ctx.node, SyntaxKind::ConstructorDecl);
    let constructor = constructors.next()?;
    if constructors.next().is_some() {
        return None;
    }

    let has = |kind| tree.has_token(constructor, kind);
    let visible = has(SyntaxKind::PublicKw) || has(SyntaxKind::ProtectedKw) || has(SyntaxKind::InternalKw);
    if !visible || has(SyntaxKind::StaticKw) || has(SyntaxKind::PrivateKw) || has(SyntaxKind::ExternKw) {
        return None;
    }
    let no_parameters = tree
        .child_of_kind(constructor, SyntaxKind::ParameterList)
        .is_some_and(|list| tree.child_of_kind(list, SyntaxKind::Parameter).is_none());
    if !no_parameters
        || tree.child_of_kind(constructor, SyntaxKind::AttributeList).is_some()
        || tree.child_of_kind(constructor, SyntaxKind::ConstructorInitializer).is_some()
    {
        return None;
    }
    let body = tree.child_of_kind(constructor, SyntaxKind::Block)?;
    if tree.child_nodes(body).next().is_some() || tree.has_inner_comments(body) {
        return None;
    }
    let class_name = tree.name_text(ctx.node)?;
    Some(ctx.diagnostic(tree.span(constructor), SyntaxKind::ConstructorDecl, &[class_name]))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::analysis::RuleId;
    use crate::rules::{flagged, run_rule};

    #[test]
    fn test_paired_override_anchors_at_type_name() {
        let source = r#"
class OnlyEquals {
    public override bool Equals(object other) { return false; }
}
class Both {
    public override bool Equals(object other) { return false; }
    public override int GetHashCode() { return 0; }
}
struct OnlyHash {
    public override int GetHashCode() { return 1; }
}
class Shadow {
    public bool Equals(object other) { return false; }
}
class WrongSignature {
    public override bool Equals(Both other) { return false; }
}
"#;
        let diagnostics = run_rule(source, RuleId::PairedOverride);
        let names: Vec<&str> = diagnostics
            .iter()
            .map(|d| &source[d.span.start..d.span.end])
            .collect();
        assert_eq!(names, vec!["OnlyEquals", "OnlyHash"]);
        assert_eq!(
            diagnostics[0].message,
            "`OnlyEquals` overrides Equals(object) but not GetHashCode()"
        );
    }

    #[test]
    fn test_private_setter_written_only_in_constructor() {
        let source = r#"
class Counter {
    public int Count { get; private set; }
    public int Other { get; private set; }
    public int Never { get; private set; }
    public int Open { get; set; }
    public int Lambda { get; private set; }

    public Counter(int start) {
        Count = start;
        this.Other = start;
        Open = start;
        System.Action reset = () => { Lambda = 0; };
    }

    public void Bump() { Other++; }
}
"#;
        assert_eq!(flagged(source, RuleId::RedundantPrivateSetter), vec!["private set;"]);
    }

    #[test]
    fn test_private_setter_in_nested_type_constructor() {
        let source = r#"
class Outer {
    public int Value { get; private set; }
    class Inner {
        public Inner(Outer outer) { outer.Value = 1; }
    }
}
"#;
        assert!(flagged(source, RuleId::RedundantPrivateSetter).is_empty());
    }

    #[test]
    fn test_trivial_constructor() {
        let source = r#"
class Empty {
    public Empty() { }
}
class Commented {
    public Commented() { /* keep */ }
}
class Implicit {
    Implicit() { }
}
class Overloaded {
    public Overloaded() { }
    public Overloaded(int x) { }
}
class Chained {
    public Chained() : base() { }
}
class Static {
    static Static() { }
}
class Attributed {
    [Obsolete]
    public Attributed() { }
}
"#;
        let diagnostics = run_rule(source, RuleId::TrivialConstructor);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(&source[diagnostics[0].span.start..diagnostics[0].span.end], "public Empty() { }");
        assert_eq!(diagnostics[0].message, "Remove the empty constructor of `Empty`");
    }
}

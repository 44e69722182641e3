//! Name resolution and expression typing for [`Compilation`].
//!
//! Both queries walk outwards from the node through the enclosing scopes:
//! locals and parameters first, then members of the enclosing types (base
//! chain included), `using static` imports, types and namespaces.

use super::binder::{AliasTarget, Declared};
use super::compilation::Compilation;
use super::conversions::{classify, element_type, promote, supertypes};
use super::symbols::{MemberId, MemberKind, SpecialType, TypeId, TypeRef};
use super::{SemanticModel, Symbol};
use crate::syntax::{NodeId, SyntaxKind, SyntaxTree};

fn first_child(tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
    tree.child_nodes(node).next()
}

fn type_argument_count(tree: &SyntaxTree, node: NodeId) -> usize {
    tree.child_of_kind(node, SyntaxKind::TypeArgumentList)
        .map_or(0, |list| tree.child_nodes(list).count())
}

/// Declarator in `VariableDeclaration` named `name`.
fn declarator_named(tree: &SyntaxTree, declaration: NodeId, name: &str) -> Option<NodeId> {
    tree.children_of_kind(declaration, SyntaxKind::VariableDeclarator)
        .find(|d| tree.ident_text(*d) == Some(name))
}

fn local_in_statements(tree: &SyntaxTree, scope: NodeId, name: &str) -> Option<NodeId> {
    tree.children_of_kind(scope, SyntaxKind::LocalDeclStmt)
        .filter_map(|stmt| tree.child_of_kind(stmt, SyntaxKind::VariableDeclaration))
        .find_map(|declaration| declarator_named(tree, declaration, name))
}

fn parameter_named(tree: &SyntaxTree, owner: NodeId, name: &str) -> Option<NodeId> {
    let list = tree.child_of_kind(owner, SyntaxKind::ParameterList)?;
    tree.children_of_kind(list, SyntaxKind::Parameter)
        .find(|p| tree.ident_text(*p) == Some(name))
}

impl Compilation<'_> {
    pub(super) fn compute_symbol(&self, node: NodeId, depth: usize) -> Option<Symbol> {
        if let Some(declared) = self.declared(node) {
            return Some(match declared {
                Declared::Type(id) => Symbol::Type(id),
                Declared::Member(id) => Symbol::Member(id),
            });
        }
        let tree = self.tree;
        match tree.kind(node) {
            SyntaxKind::NameExpr => {
                let name = tree.ident_text(node)?;
                self.resolve_simple_name(node, name, depth)
            }
            SyntaxKind::MemberAccessExpr => self.resolve_member_access(node, depth),
            SyntaxKind::InvocationExpr => self.symbol_at(first_child(tree, node)?, depth),
            SyntaxKind::ParenExpr | SyntaxKind::Argument => {
                self.symbol_at(tree.child_where(node, SyntaxKind::is_expression)?, depth)
            }
            SyntaxKind::ObjectCreationExpr => {
                let id = self.type_at(node, depth)?.type_id()?;
                let argc = tree
                    .child_of_kind(node, SyntaxKind::ArgumentList)
                    .map_or(0, |list| tree.children_of_kind(list, SyntaxKind::Argument).count());
                let table = self.symbols();
                table
                    .members_named(id, &table.ty(id).name)
                    .find(|m| {
                        let member = table.member(*m);
                        member.kind == MemberKind::Constructor && member.params.len() == argc
                    })
                    .map(Symbol::Member)
            }
            SyntaxKind::VariableDeclarator | SyntaxKind::ForeachStmt => Some(Symbol::Local { decl: node }),
            SyntaxKind::CatchClause if tree.ident(node).is_some() => Some(Symbol::Local { decl: node }),
            SyntaxKind::Parameter => Some(Symbol::Parameter { decl: node }),
            kind if kind.is_type() => self.resolver().resolve(node)?.type_id().map(Symbol::Type),
            _ => None,
        }
    }

    /// Argument count when `node` is the callee of an invocation.
    fn call_arity(&self, node: NodeId) -> Option<usize> {
        let tree = self.tree;
        let parent = tree.parent(node)?;
        if tree.kind(parent) != SyntaxKind::InvocationExpr || first_child(tree, parent) != Some(node) {
            return None;
        }
        let list = tree.child_of_kind(parent, SyntaxKind::ArgumentList)?;
        Some(tree.children_of_kind(list, SyntaxKind::Argument).count())
    }

    /// Member lookup preferring the overload with a matching parameter count.
    fn find_member(&self, ty: TypeId, name: &str, argc: Option<usize>) -> Option<MemberId> {
        let table = self.symbols();
        argc.and_then(|n| table.find_member(ty, name, Some(n)))
            .or_else(|| table.find_member(ty, name, None))
    }

    /// Type created by the object creation whose initializer assigns `node`.
    fn initializer_target(&self, node: NodeId, depth: usize) -> Option<TypeId> {
        let tree = self.tree;
        let assignment = tree.parent(node)?;
        if tree.kind(assignment) != SyntaxKind::AssignmentExpr || first_child(tree, assignment) != Some(node) {
            return None;
        }
        let initializer = tree.parent(assignment)?;
        let creation = tree.parent(initializer)?;
        if tree.kind(initializer) != SyntaxKind::InitializerExpr
            || tree.kind(creation) != SyntaxKind::ObjectCreationExpr
        {
            return None;
        }
        self.type_at(creation, depth)?.type_id()
    }

    fn resolve_simple_name(&self, node: NodeId, name: &str, depth: usize) -> Option<Symbol> {
        let tree = self.tree;
        let table = self.symbols();
        let argc = self.call_arity(node);

        if let Some(created) = self.initializer_target(node, depth) {
            return self.find_member(created, name, None).map(Symbol::Member);
        }

        let mut child = node;
        for scope in tree.ancestors(node) {
            if let Some(symbol) = self.scope_lookup(scope, child, name, argc) {
                return Some(symbol);
            }
            child = scope;
        }

        for id in &self.imports().static_types {
            if let Some(member) = table.find_member(*id, name, argc) {
                return Some(Symbol::Member(member));
            }
        }
        let resolver = self.resolver();
        if let Some(id) = resolver.lookup_type(node, name, type_argument_count(tree, node)) {
            return Some(Symbol::Type(id));
        }
        match self.imports().aliases.get(name) {
            Some(AliasTarget::Type(aliased)) => return aliased.type_id().map(Symbol::Type),
            Some(AliasTarget::Namespace(ns)) => return Some(Symbol::Namespace(ns.clone())),
            None => {}
        }
        resolver.find_namespace(node, name).map(Symbol::Namespace)
    }

    /// Declarations named `name` introduced by `scope` and visible from its
    /// child `from`.
    fn scope_lookup(&self, scope: NodeId, from: NodeId, name: &str, argc: Option<usize>) -> Option<Symbol> {
        let tree = self.tree;
        let local = |decl| Some(Symbol::Local { decl });
        let parameter = |decl| Some(Symbol::Parameter { decl });
        match tree.kind(scope) {
            SyntaxKind::Block | SyntaxKind::SwitchSection => {
                local_in_statements(tree, scope, name).and_then(local)
            }
            SyntaxKind::SwitchStmt => tree
                .children_of_kind(scope, SyntaxKind::SwitchSection)
                .find_map(|section| local_in_statements(tree, section, name))
                .and_then(local),
            SyntaxKind::ForStmt => tree
                .child_of_kind(scope, SyntaxKind::VariableDeclaration)
                .and_then(|declaration| declarator_named(tree, declaration, name))
                .and_then(local),
            SyntaxKind::ForeachStmt | SyntaxKind::CatchClause => {
                // the iterated collection cannot see the loop variable
                let is_collection = tree.kind(scope) == SyntaxKind::ForeachStmt
                    && tree.child_nodes(scope).nth(1) == Some(from);
                (!is_collection && tree.ident_text(scope) == Some(name))
                    .then_some(Symbol::Local { decl: scope })
            }
            SyntaxKind::LambdaExpr => match tree.child_of_kind(scope, SyntaxKind::Parameter) {
                Some(single) => (tree.ident_text(single) == Some(name)).then_some(Symbol::Parameter { decl: single }),
                None => parameter_named(tree, scope, name).and_then(parameter),
            },
            SyntaxKind::MethodDecl | SyntaxKind::ConstructorDecl | SyntaxKind::ConversionOperatorDecl => {
                parameter_named(tree, scope, name).and_then(parameter)
            }
            SyntaxKind::Accessor => {
                let setter = matches!(tree.ident_text(scope), Some("set" | "init"));
                (setter && name == "value").then_some(Symbol::Parameter { decl: scope })
            }
            kind if kind.is_type_decl() => {
                let Some(Declared::Type(id)) = self.declared(scope) else {
                    return None;
                };
                if let Some(member) = self.find_member(id, name, argc) {
                    return Some(Symbol::Member(member));
                }
                let table = self.symbols();
                table
                    .base_chain(id)
                    .into_iter()
                    .find_map(|t| table.nested(t, name, 0))
                    .map(Symbol::Type)
            }
            _ => None,
        }
    }

    fn resolve_member_access(&self, node: NodeId, depth: usize) -> Option<Symbol> {
        let tree = self.tree;
        let table = self.symbols();
        let left = first_child(tree, node)?;
        let name = tree.ident_text(node)?;
        let argc = self.call_arity(node);
        match self.symbol_at(left, depth) {
            Some(Symbol::Namespace(ns)) => {
                if let Some(id) = table.lookup(&ns, name, type_argument_count(tree, node)) {
                    return Some(Symbol::Type(id));
                }
                let path = format!("{ns}.{name}");
                table.is_namespace(&path).then_some(Symbol::Namespace(path))
            }
            Some(Symbol::Type(id)) => {
                let nested = table
                    .base_chain(id)
                    .into_iter()
                    .find_map(|t| table.nested(t, name, type_argument_count(tree, node)));
                nested
                    .map(Symbol::Type)
                    .or_else(|| self.find_member(id, name, argc).map(Symbol::Member))
            }
            _ => {
                let receiver = match self.type_at(left, depth)? {
                    TypeRef::Nullable(inner) => *inner,
                    other => other,
                };
                let id = receiver.type_id()?;
                self.find_member(id, name, argc).map(Symbol::Member)
            }
        }
    }

    pub(super) fn compute_type(&self, node: NodeId, depth: usize) -> Option<TypeRef> {
        let tree = self.tree;
        let table = self.symbols();
        let kind = tree.kind(node);
        if kind.is_type() {
            return self.resolver().resolve(node);
        }
        let special = |s| table.special_ref(s);
        match kind {
            SyntaxKind::LiteralExpr => self.literal_type(node),
            SyntaxKind::NameExpr | SyntaxKind::MemberAccessExpr => {
                let symbol = self.symbol_at(node, depth)?;
                self.symbol_type(node, &symbol, depth)
            }
            SyntaxKind::InvocationExpr => {
                let callee = first_child(tree, node)?;
                match self.symbol_at(callee, depth)? {
                    Symbol::Member(member) if table.member(member).kind == MemberKind::Method => {
                        self.member_type(callee, member, depth)
                    }
                    _ => None,
                }
            }
            SyntaxKind::ElementAccessExpr => match self.type_at(first_child(tree, node)?, depth)? {
                TypeRef::Array(element) => Some(*element),
                t if table.special_of(&t) == Some(SpecialType::String) => special(SpecialType::Char),
                _ => None,
            },
            SyntaxKind::ObjectCreationExpr => {
                let created = tree.child_where(node, |k| k.is_type() && k != SyntaxKind::ArrayType)?;
                let mut ty = self.resolver().resolve(created)?;
                for child in tree.child_nodes(node) {
                    if matches!(tree.kind(child), SyntaxKind::ArrayType | SyntaxKind::BracketedArgumentList) {
                        ty = TypeRef::Array(Box::new(ty));
                    }
                }
                Some(ty)
            }
            SyntaxKind::CastExpr | SyntaxKind::AsExpr | SyntaxKind::DefaultExpr => {
                self.resolver().resolve(tree.child_where(node, SyntaxKind::is_type)?)
            }
            SyntaxKind::IsExpr => special(SpecialType::Bool),
            SyntaxKind::ParenExpr | SyntaxKind::Argument => {
                self.type_at(tree.child_where(node, SyntaxKind::is_expression)?, depth)
            }
            SyntaxKind::AssignmentExpr | SyntaxKind::PostfixUnaryExpr => {
                self.type_at(first_child(tree, node)?, depth)
            }
            SyntaxKind::ConditionalExpr => {
                let mut parts = tree.child_nodes(node).skip(1);
                let (a, b) = (parts.next()?, parts.next()?);
                let (ta, tb) = (self.type_at(a, depth)?, self.type_at(b, depth)?);
                if ta == tb {
                    return Some(ta);
                }
                if classify(table, &tb, &ta).is_some_and(|c| c.is_implicit()) {
                    Some(ta)
                } else if classify(table, &ta, &tb).is_some_and(|c| c.is_implicit()) {
                    Some(tb)
                } else {
                    None
                }
            }
            SyntaxKind::BinaryExpr => self.binary_type(node, depth),
            SyntaxKind::PrefixUnaryExpr => {
                let operator = tree.token(tree.first_token(node)?).kind();
                let operand = self.type_at(first_child(tree, node)?, depth)?;
                match operator {
                    SyntaxKind::Bang => special(SpecialType::Bool),
                    SyntaxKind::PlusPlus | SyntaxKind::MinusMinus => Some(operand),
                    _ => match table.special_of(&operand) {
                        Some(s) if s.is_numeric() => promote(s, s).and_then(special),
                        _ => Some(operand),
                    },
                }
            }
            SyntaxKind::ThisExpr => {
                let id = *self.resolver().enclosing_types(node).first()?;
                let params = table.ty(id).type_params.iter().map(|p| TypeRef::param(p)).collect();
                Some(TypeRef::generic(id, params))
            }
            SyntaxKind::BaseExpr => {
                let id = *self.resolver().enclosing_types(node).first()?;
                table.ty(id).base.clone()
            }
            _ => None,
        }
    }

    fn literal_type(&self, node: NodeId) -> Option<TypeRef> {
        let tree = self.tree;
        let token = tree.token(tree.first_token(node)?);
        let text = token.text().to_ascii_lowercase();
        let special = match token.kind() {
            SyntaxKind::IntLiteral if text.ends_with("ul") || text.ends_with("lu") => SpecialType::UInt64,
            SyntaxKind::IntLiteral if text.ends_with('u') => SpecialType::UInt32,
            SyntaxKind::IntLiteral if text.ends_with('l') => SpecialType::Int64,
            SyntaxKind::IntLiteral => SpecialType::Int32,
            SyntaxKind::RealLiteral if text.ends_with('f') => SpecialType::Single,
            SyntaxKind::RealLiteral if text.ends_with('m') => SpecialType::Decimal,
            SyntaxKind::RealLiteral => SpecialType::Double,
            SyntaxKind::StringLiteral => SpecialType::String,
            SyntaxKind::CharLiteral => SpecialType::Char,
            SyntaxKind::TrueKw | SyntaxKind::FalseKw => SpecialType::Bool,
            SyntaxKind::NullKw => return Some(TypeRef::Null),
            _ => return None,
        };
        self.symbols().special_ref(special)
    }

    fn binary_type(&self, node: NodeId, depth: usize) -> Option<TypeRef> {
        let tree = self.tree;
        let table = self.symbols();
        let operators: Vec<SyntaxKind> = tree.child_tokens(node).map(|t| tree.token(t).kind()).collect();
        let mut operands = tree.child_nodes(node);
        let (left, right) = (operands.next()?, operands.next()?);
        let bool_type = || table.special_ref(SpecialType::Bool);

        if operators.len() == 2 {
            // `<<` and `>>` are two adjacent tokens
            let left = self.type_at(left, depth)?;
            let s = table.special_of(&left)?;
            return promote(s, s).and_then(|p| table.special_ref(p));
        }
        let operator = *operators.first()?;
        match operator {
            SyntaxKind::EqEq
            | SyntaxKind::BangEq
            | SyntaxKind::Lt
            | SyntaxKind::LtEq
            | SyntaxKind::Gt
            | SyntaxKind::GtEq
            | SyntaxKind::AmpAmp
            | SyntaxKind::PipePipe => bool_type(),
            SyntaxKind::QuestionQuestion => {
                let lt = self.type_at(left, depth);
                let rt = self.type_at(right, depth);
                match lt? {
                    TypeRef::Nullable(inner) if rt.as_ref().map_or(true, |r| *r == *inner) => Some(*inner),
                    TypeRef::Nullable(_) => rt,
                    other => Some(other),
                }
            }
            _ => {
                let lt = self.type_at(left, depth)?;
                let rt = self.type_at(right, depth)?;
                let (ls, rs) = (table.special_of(&lt), table.special_of(&rt));
                if operator == SyntaxKind::Plus
                    && (ls == Some(SpecialType::String) || rs == Some(SpecialType::String))
                {
                    return table.special_ref(SpecialType::String);
                }
                if matches!(operator, SyntaxKind::Amp | SyntaxKind::Pipe | SyntaxKind::Caret)
                    && ls == Some(SpecialType::Bool)
                    && rs == Some(SpecialType::Bool)
                {
                    return bool_type();
                }
                promote(ls?, rs?).and_then(|p| table.special_ref(p))
            }
        }
    }

    fn symbol_type(&self, node: NodeId, symbol: &Symbol, depth: usize) -> Option<TypeRef> {
        let tree = self.tree;
        let table = self.symbols();
        match symbol {
            Symbol::Member(member) => self.member_type(node, *member, depth),
            Symbol::Local { decl } => match tree.kind(*decl) {
                SyntaxKind::VariableDeclarator => {
                    let declaration = tree.parent(*decl)?;
                    let declared = tree.child_where(declaration, SyntaxKind::is_type)?;
                    match self.resolver().resolve(declared) {
                        Some(ty) => Some(ty),
                        None if tree.node_text(declared) == "var" => {
                            let clause = tree.child_of_kind(*decl, SyntaxKind::EqualsValueClause)?;
                            self.type_at(first_child(tree, clause)?, depth)
                        }
                        None => None,
                    }
                }
                SyntaxKind::ForeachStmt => {
                    let mut children = tree.child_nodes(*decl);
                    let (declared, collection) = (children.next()?, children.next()?);
                    match self.resolver().resolve(declared) {
                        Some(ty) => Some(ty),
                        None if tree.node_text(declared) == "var" => {
                            element_type(table, &self.type_at(collection, depth)?)
                        }
                        None => None,
                    }
                }
                _ => self.resolver().resolve(tree.child_where(*decl, SyntaxKind::is_type)?),
            },
            Symbol::Parameter { decl } if tree.kind(*decl) == SyntaxKind::Accessor => {
                let property = tree.ancestors(*decl).find(|a| tree.kind(*a) == SyntaxKind::PropertyDecl)?;
                match self.declared(property)? {
                    Declared::Member(id) => table.member(id).ty.clone(),
                    Declared::Type(_) => None,
                }
            }
            Symbol::Parameter { decl } => self.resolver().resolve(tree.child_where(*decl, SyntaxKind::is_type)?),
            Symbol::Type(_) | Symbol::Namespace(_) => None,
        }
    }

    /// Declared type of `member` as seen through the receiver of `access`,
    /// with generic arguments substituted.
    fn member_type(&self, access: NodeId, member: MemberId, depth: usize) -> Option<TypeRef> {
        let tree = self.tree;
        let table = self.symbols();
        let symbol = table.member(member);
        let declared = symbol.ty.clone()?;
        if tree.kind(access) != SyntaxKind::MemberAccessExpr {
            return Some(declared);
        }
        let left = first_child(tree, access)?;
        if matches!(self.symbol_at(left, depth), Some(Symbol::Type(_) | Symbol::Namespace(_))) {
            return Some(declared);
        }
        let receiver = self.type_at(left, depth)?;
        let owner = table.ty(symbol.owner);
        let seen_as = std::iter::once(receiver.clone())
            .chain(supertypes(table, &receiver))
            .find(|t| t.type_id() == Some(symbol.owner));
        match seen_as {
            Some(TypeRef::Named { args, .. }) => Some(declared.substitute(&owner.type_params, &args)),
            _ => Some(declared),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::semantic::{ConversionKind, ExplicitConversion};
    use crate::syntax::parse;

    fn find(tree: &SyntaxTree, kind: SyntaxKind, text: &str) -> NodeId {
        tree.descendants(tree.root())
            .find(|n| tree.kind(*n) == kind && tree.node_text(*n) == text)
            .unwrap_or_else(|| panic!("no {kind:?} `{text}`"))
    }

    fn display(compilation: &Compilation<'_>, node: NodeId) -> Option<String> {
        compilation
            .type_of(node)
            .map(|t| compilation.symbols().display(&t))
    }

    #[test]
    fn test_expression_types() {
        let source = r#"
using System;
using System.Collections.Generic;
class C {
    int count;
    void M(string s, long wide) {
        var list = new List<int>();
        var n = list.Count + 1;
        var text = s + n;
        var ratio = wide * 2.0f;
        var flag = count > 3 && s != null;
        int? maybe = null;
        var value = maybe ?? 0;
        var items = new string[3];
        foreach (var item in list) { var copy = item; }
        var parsed = int.Parse(s);
    }
}
"#;
        let parsed = parse(source);
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        let tree = &parsed.tree;
        let compilation = Compilation::new(tree);
        let ty = |kind, text| display(&compilation, find(tree, kind, text));

        assert_eq!(ty(SyntaxKind::ObjectCreationExpr, "new List<int>()"), Some("List<Int32>".into()));
        assert_eq!(ty(SyntaxKind::MemberAccessExpr, "list.Count"), Some("Int32".into()));
        assert_eq!(ty(SyntaxKind::BinaryExpr, "s + n"), Some("String".into()));
        assert_eq!(ty(SyntaxKind::BinaryExpr, "wide * 2.0f"), Some("Single".into()));
        assert_eq!(ty(SyntaxKind::BinaryExpr, "count > 3 && s != null"), Some("Boolean".into()));
        assert_eq!(ty(SyntaxKind::BinaryExpr, "maybe ?? 0"), Some("Int32".into()));
        assert_eq!(ty(SyntaxKind::NameExpr, "maybe"), Some("Int32?".into()));
        assert_eq!(ty(SyntaxKind::ObjectCreationExpr, "new string[3]"), Some("String[]".into()));
        assert_eq!(ty(SyntaxKind::NameExpr, "item"), Some("Int32".into()));
        assert_eq!(ty(SyntaxKind::InvocationExpr, "int.Parse(s)"), Some("Int32".into()));
        assert_eq!(ty(SyntaxKind::LiteralExpr, "null"), Some("null".into()));
    }

    #[test]
    fn test_date_time_now_resolution() {
        let source = r#"
using System;
using static System.DateTime;
class C {
    void M() {
        var a = DateTime.Now;
        var b = System.DateTime.Now;
        var c = Now;
        Console.WriteLine(DateTime.Now);
    }
}
"#;
        let parsed = parse(source);
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        let tree = &parsed.tree;
        let compilation = Compilation::new(tree);
        let now = compilation
            .symbols()
            .find_member(compilation.core().date_time, "Now", None)
            .unwrap();
        let accesses: Vec<NodeId> = tree
            .descendants(tree.root())
            .filter(|n| {
                matches!(tree.kind(*n), SyntaxKind::MemberAccessExpr | SyntaxKind::NameExpr)
                    && tree.node_text(*n).ends_with("Now")
            })
            .collect();
        assert_eq!(accesses.len(), 4);
        for node in accesses {
            assert_eq!(compilation.symbol_of(node), Some(Symbol::Member(now)), "{}", tree.node_text(node));
        }
    }

    #[test]
    fn test_locals_shadow_members() {
        let source = "class C {\n    int Now;\n    void M(int Now) { var x = Now; }\n}";
        let parsed = parse(source);
        let tree = &parsed.tree;
        let compilation = Compilation::new(tree);
        let name = find(tree, SyntaxKind::NameExpr, "Now");
        assert!(matches!(compilation.symbol_of(name), Some(Symbol::Parameter { .. })));
    }

    #[test]
    fn test_write_references() {
        let source = r#"
class C {
    public int Count { get; private set; }
    public C() { Count = 1; this.Count++; }
    void Reset() { (Count) = 0; }
    int Read() => Count;
}
"#;
        let parsed = parse(source);
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        let tree = &parsed.tree;
        let compilation = Compilation::new(tree);
        let property = find(tree, SyntaxKind::PropertyDecl, "public int Count { get; private set; }");
        let Some(Symbol::Member(count)) = compilation.symbol_of(property) else {
            panic!("property not declared");
        };
        let writes = compilation.write_references(count);
        let texts: Vec<String> = writes.iter().map(|w| tree.node_text(*w)).collect();
        assert_eq!(texts, vec!["Count", "this.Count", "Count"]);
    }

    #[test]
    fn test_static_enum_import() {
        let source = "using static System.DayOfWeek;\nclass C { }";
        let parsed = parse(source);
        let compilation = Compilation::new(&parsed.tree);
        let day = compilation.resolve_static_import("Monday");
        assert!(day.is_some());
        assert_eq!(compilation.resolve_static_import("Someday"), None);
        assert_eq!(compilation.enum_members(day.unwrap()).map(<[String]>::len), Some(7));
    }

    #[test]
    fn test_conversion_kinds() {
        let source = "class C { void M(object o, string s) { var a = (string)o; var b = (int)o; } }";
        let parsed = parse(source);
        let tree = &parsed.tree;
        let compilation = Compilation::new(tree);
        let table = compilation.symbols();
        let string = table.special_ref(SpecialType::String).unwrap();
        let int = table.special_ref(SpecialType::Int32).unwrap();
        let o = find(tree, SyntaxKind::NameExpr, "o");
        assert_eq!(
            compilation.conversion_kind(o, &string),
            Some(ConversionKind::Explicit(ExplicitConversion::Reference))
        );
        assert_eq!(
            compilation.conversion_kind(o, &int),
            Some(ConversionKind::Explicit(ExplicitConversion::Unboxing))
        );
    }
}

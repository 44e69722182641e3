//! Declaration binding and type-syntax resolution.
//!
//! Binding runs in three passes over the tree: declare every source type,
//! resolve `using` directives, then bind bases and members. Expression facts
//! are not computed here; see [`super::lookup`].

use std::collections::HashMap;

use tracing::{debug, trace};

use super::library::{load_core_library, CoreTypes};
use super::symbols::{
    AccessorSet, Accessibility, MemberId, MemberKind, MemberSymbol, Modifiers, SymbolTable,
    TypeId, TypeKind, TypeRef, TypeSymbol,
};
use crate::syntax::{Element, NodeId, SyntaxKind, SyntaxTree};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasTarget {
    Namespace(String),
    Type(TypeRef),
}

/// `using` directives of the file.
#[derive(Debug, Clone, Default)]
pub struct Imports {
    pub namespaces: Vec<String>,
    /// Types named by `using static`.
    pub static_types: Vec<TypeId>,
    pub aliases: HashMap<String, AliasTarget>,
}

/// Declaration node to symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declared {
    Type(TypeId),
    Member(MemberId),
}

/// Result of binding one tree.
#[derive(Debug, Clone)]
pub struct Binding {
    pub table: SymbolTable,
    pub core: CoreTypes,
    pub imports: Imports,
    pub declared: HashMap<NodeId, Declared>,
}

pub fn bind(tree: &SyntaxTree) -> Binding {
    let mut table = SymbolTable::new();
    let core = load_core_library(&mut table);
    let mut binding = Binding {
        table,
        core,
        imports: Imports::default(),
        declared: HashMap::new(),
    };

    let mut types = Vec::new();
    declare_types(tree, tree.root(), "", None, &mut binding, &mut types);
    bind_usings(tree, &mut binding);
    for (node, id) in &types {
        bind_bases(tree, *node, *id, &mut binding);
    }
    for (node, id) in &types {
        bind_members(tree, *node, *id, &mut binding);
    }
    debug!(
        types = types.len(),
        imports = binding.imports.namespaces.len(),
        "bound compilation"
    );
    binding
}

/// Dotted text of a `NameType`, ignoring type arguments.
pub fn dotted_name(tree: &SyntaxTree, name: NodeId) -> String {
    tree.child_tokens(name)
        .filter(|t| tree.token(*t).kind() == SyntaxKind::Ident)
        .map(|t| tree.token(t).text().to_string())
        .collect::<Vec<_>>()
        .join(".")
}

fn declare_types(
    tree: &SyntaxTree,
    node: NodeId,
    namespace: &str,
    containing: Option<TypeId>,
    binding: &mut Binding,
    out: &mut Vec<(NodeId, TypeId)>,
) {
    for child in tree.child_nodes(node).collect::<Vec<_>>() {
        let kind = tree.kind(child);
        match kind {
            SyntaxKind::NamespaceDecl => {
                let name = tree
                    .child_of_kind(child, SyntaxKind::NameType)
                    .map(|n| dotted_name(tree, n))
                    .unwrap_or_default();
                let full = if namespace.is_empty() {
                    name
                } else {
                    format!("{namespace}.{name}")
                };
                binding.table.declare_namespace(&full);
                declare_types(tree, child, &full, None, binding, out);
            }
            _ if kind.is_type_decl() => {
                let Some(name) = tree.name_text(child) else {
                    continue;
                };
                let type_kind = match kind {
                    SyntaxKind::StructDecl => TypeKind::Struct,
                    SyntaxKind::InterfaceDecl => TypeKind::Interface,
                    SyntaxKind::EnumDecl => TypeKind::Enum,
                    _ => TypeKind::Class,
                };
                let mut symbol = TypeSymbol::new(name, namespace, type_kind);
                symbol.type_params = tree
                    .child_of_kind(child, SyntaxKind::TypeParameterList)
                    .map(|list| {
                        tree.child_tokens(list)
                            .filter(|t| tree.token(*t).kind() == SyntaxKind::Ident)
                            .map(|t| tree.token(t).text().to_string())
                            .collect()
                    })
                    .unwrap_or_default();
                symbol.containing = containing;
                symbol.decl = Some(child);
                symbol.sealed |= tree.has_token(child, SyntaxKind::SealedKw)
                    || tree.has_token(child, SyntaxKind::StaticKw);
                let id = binding.table.add_type(symbol);
                trace!(name, ?id, "declared type");
                binding.declared.insert(child, Declared::Type(id));
                out.push((child, id));
                declare_types(tree, child, namespace, Some(id), binding, out);
            }
            _ => {}
        }
    }
}

fn bind_usings(tree: &SyntaxTree, binding: &mut Binding) {
    let usings: Vec<NodeId> = tree
        .descendants(tree.root())
        .filter(|n| tree.kind(*n) == SyntaxKind::UsingDirective)
        .collect();
    for using in usings {
        let Some(target) = tree.child_of_kind(using, SyntaxKind::NameType) else {
            continue;
        };
        let path = dotted_name(tree, target);
        let resolver = TypeResolver::new(tree, binding);
        if tree.has_token(using, SyntaxKind::StaticKw) {
            if let Some(id) = resolver.resolve(target).and_then(|t| t.type_id()) {
                binding.imports.static_types.push(id);
            }
        } else if tree.has_token(using, SyntaxKind::Eq) {
            let Some(alias) = tree.ident_text(using).map(str::to_string) else {
                continue;
            };
            let aliased = if binding.table.is_namespace(&path) {
                Some(AliasTarget::Namespace(path))
            } else {
                resolver.resolve(target).map(AliasTarget::Type)
            };
            if let Some(aliased) = aliased {
                binding.imports.aliases.insert(alias, aliased);
            }
        } else {
            binding.imports.namespaces.push(path);
        }
    }
}

fn bind_bases(tree: &SyntaxTree, node: NodeId, id: TypeId, binding: &mut Binding) {
    let kind = binding.table.ty(id).kind;
    let object = TypeRef::named(binding.core.object);
    let entries: Vec<TypeRef> = match tree.child_of_kind(node, SyntaxKind::BaseList) {
        Some(list) if kind != TypeKind::Enum => {
            let resolver = TypeResolver::new(tree, binding);
            tree.child_nodes(list)
                .filter_map(|t| resolver.resolve(t))
                .collect()
        }
        _ => Vec::new(),
    };

    let table = &binding.table;
    let (base, interfaces) = match kind {
        TypeKind::Interface => (None, entries),
        TypeKind::Class => match entries.split_first() {
            Some((first, rest))
                if first
                    .type_id()
                    .is_some_and(|t| table.ty(t).kind == TypeKind::Class) =>
            {
                (Some(first.clone()), rest.to_vec())
            }
            _ => (Some(object), entries),
        },
        TypeKind::Struct | TypeKind::Enum => (Some(object), entries),
    };
    let symbol = binding.table.ty_mut(id);
    symbol.base = base;
    symbol.interfaces = interfaces;
}

fn modifiers_of(tree: &SyntaxTree, node: NodeId) -> Modifiers {
    Modifiers::new(tree.child_tokens(node).map(|t| tree.token(t).kind()))
}

fn parameter_types(tree: &SyntaxTree, node: NodeId, resolver: &TypeResolver<'_>) -> Vec<Option<TypeRef>> {
    tree.child_of_kind(node, SyntaxKind::ParameterList)
        .map(|list| {
            tree.children_of_kind(list, SyntaxKind::Parameter)
                .map(|p| tree.child_where(p, SyntaxKind::is_type).and_then(|t| resolver.resolve(t)))
                .collect()
        })
        .unwrap_or_default()
}

fn bind_members(tree: &SyntaxTree, node: NodeId, owner: TypeId, binding: &mut Binding) {
    let owner_kind = binding.table.ty(owner).kind;
    let default_access = match owner_kind {
        TypeKind::Interface | TypeKind::Enum => Accessibility::Public,
        _ => Accessibility::Private,
    };

    let mut pending: Vec<(NodeId, MemberSymbol)> = Vec::new();
    {
        let resolver = TypeResolver::new(tree, binding);
        for child in tree.child_nodes(node) {
            let modifiers = modifiers_of(tree, child);
            let base = |name: &str, kind: MemberKind| {
                let mut symbol = MemberSymbol::new(name, kind, owner);
                symbol.accessibility = Accessibility::from_modifiers(&modifiers, default_access);
                symbol.is_override = modifiers.contains(SyntaxKind::OverrideKw);
                symbol.is_static = modifiers.contains(SyntaxKind::StaticKw)
                    || modifiers.contains(SyntaxKind::ConstKw);
                symbol.modifiers = modifiers.clone();
                symbol.decl = Some(child);
                symbol
            };
            let declared_type = tree
                .child_where(child, SyntaxKind::is_type)
                .and_then(|t| resolver.resolve(t));
            match tree.kind(child) {
                SyntaxKind::FieldDecl => {
                    let Some(declaration) = tree.child_of_kind(child, SyntaxKind::VariableDeclaration) else {
                        continue;
                    };
                    let ty = tree
                        .child_where(declaration, SyntaxKind::is_type)
                        .and_then(|t| resolver.resolve(t));
                    for declarator in tree.children_of_kind(declaration, SyntaxKind::VariableDeclarator) {
                        let Some(name) = tree.ident_text(declarator) else {
                            continue;
                        };
                        let mut symbol = base(name, MemberKind::Field);
                        symbol.ty = ty.clone();
                        symbol.decl = Some(declarator);
                        pending.push((declarator, symbol));
                    }
                }
                SyntaxKind::PropertyDecl => {
                    let Some(name) = tree.name_text(child) else {
                        continue;
                    };
                    let mut symbol = base(name, MemberKind::Property);
                    symbol.ty = declared_type;
                    symbol.accessors = Some(accessor_set(tree, child, symbol.accessibility));
                    pending.push((child, symbol));
                }
                SyntaxKind::MethodDecl => {
                    let Some(name) = tree.name_text(child) else {
                        continue;
                    };
                    let mut symbol = base(name, MemberKind::Method);
                    symbol.ty = declared_type;
                    symbol.params = parameter_types(tree, child, &resolver);
                    pending.push((child, symbol));
                }
                SyntaxKind::ConstructorDecl => {
                    let Some(name) = tree.name_text(child) else {
                        continue;
                    };
                    let mut symbol = base(name, MemberKind::Constructor);
                    symbol.params = parameter_types(tree, child, &resolver);
                    pending.push((child, symbol));
                }
                SyntaxKind::ConversionOperatorDecl => {
                    let name = if tree.has_token(child, SyntaxKind::ImplicitKw) {
                        "op_Implicit"
                    } else {
                        "op_Explicit"
                    };
                    let mut symbol = base(name, MemberKind::Conversion);
                    symbol.ty = declared_type;
                    symbol.params = parameter_types(tree, child, &resolver);
                    symbol.is_static = true;
                    pending.push((child, symbol));
                }
                SyntaxKind::EnumMember => {
                    let Some(name) = tree.name_text(child) else {
                        continue;
                    };
                    let mut symbol = base(name, MemberKind::EnumMember);
                    symbol.ty = Some(TypeRef::named(owner));
                    symbol.is_static = true;
                    symbol.accessibility = Accessibility::Public;
                    pending.push((child, symbol));
                }
                _ => {}
            }
        }
    }

    for (decl, symbol) in pending {
        if symbol.kind == MemberKind::EnumMember {
            let members = &mut binding.table.ty_mut(owner).enum_members;
            if !members.contains(&symbol.name) {
                members.push(symbol.name.clone());
            }
        }
        let id = binding.table.add_member(symbol);
        binding.declared.insert(decl, Declared::Member(id));
    }
}

fn accessor_set(tree: &SyntaxTree, property: NodeId, property_access: Accessibility) -> AccessorSet {
    let Some(list) = tree.child_of_kind(property, SyntaxKind::AccessorList) else {
        // expression-bodied: a computed getter
        return AccessorSet { get: Some(property_access), set: None, auto: false, set_decl: None };
    };
    let mut set = AccessorSet { get: None, set: None, auto: true, set_decl: None };
    for accessor in tree.children_of_kind(list, SyntaxKind::Accessor) {
        let access = Accessibility::from_modifiers(&modifiers_of(tree, accessor), property_access);
        let has_body = tree.child_of_kind(accessor, SyntaxKind::Block).is_some()
            || tree.child_of_kind(accessor, SyntaxKind::ArrowClause).is_some();
        if has_body {
            set.auto = false;
        }
        match tree.ident_text(accessor) {
            Some("get") => set.get = Some(access),
            Some("set" | "init") => {
                set.set = Some(access);
                set.set_decl = Some(accessor);
            }
            _ => {}
        }
    }
    set
}

/// Resolves type syntax relative to its position in the tree.
pub struct TypeResolver<'a> {
    tree: &'a SyntaxTree,
    table: &'a SymbolTable,
    imports: &'a Imports,
    declared: &'a HashMap<NodeId, Declared>,
}

impl<'a> TypeResolver<'a> {
    pub fn new(tree: &'a SyntaxTree, binding: &'a Binding) -> Self {
        Self {
            tree,
            table: &binding.table,
            imports: &binding.imports,
            declared: &binding.declared,
        }
    }

    /// Type denoted by a type syntax node. `var` resolves to `None`.
    pub fn resolve(&self, node: NodeId) -> Option<TypeRef> {
        let tree = self.tree;
        match tree.kind(node) {
            SyntaxKind::PredefinedType => {
                let keyword = tree.first_token(node)?;
                let special = super::symbols::SpecialType::from_keyword(tree.token(keyword).kind())?;
                self.table.special_ref(special)
            }
            SyntaxKind::NullableType => {
                let inner = self.resolve(tree.child_where(node, SyntaxKind::is_type)?)?;
                match self.table.is_reference_type(&inner) {
                    Some(true) => Some(inner),
                    _ => Some(TypeRef::Nullable(Box::new(inner))),
                }
            }
            SyntaxKind::ArrayType => {
                let inner = self.resolve(tree.child_where(node, SyntaxKind::is_type)?)?;
                Some(TypeRef::Array(Box::new(inner)))
            }
            SyntaxKind::NameType => self.resolve_name(node),
            _ => None,
        }
    }

    fn segments(&self, node: NodeId) -> Vec<(String, Vec<NodeId>)> {
        let tree = self.tree;
        let mut segments: Vec<(String, Vec<NodeId>)> = Vec::new();
        for element in tree.children(node) {
            match element {
                Element::Token(t) if tree.token(*t).kind() == SyntaxKind::Ident => {
                    segments.push((tree.token(*t).text().to_string(), Vec::new()));
                }
                Element::Node(n) if tree.kind(*n) == SyntaxKind::TypeArgumentList => {
                    if let Some(last) = segments.last_mut() {
                        last.1 = tree.child_nodes(*n).collect();
                    }
                }
                _ => {}
            }
        }
        segments
    }

    fn resolve_name(&self, node: NodeId) -> Option<TypeRef> {
        let segments = self.segments(node);
        let (first, first_args) = segments.first()?;
        let args: Vec<TypeRef> = first_args
            .iter()
            .map(|a| self.resolve(*a))
            .collect::<Option<_>>()?;

        if segments.len() == 1 {
            if args.is_empty() && self.is_type_parameter(node, first) {
                return Some(TypeRef::Param(first.clone()));
            }
            if let Some(id) = self.lookup_type(node, first, args.len()) {
                return Some(TypeRef::generic(id, args));
            }
            if args.is_empty() {
                if let Some(AliasTarget::Type(aliased)) = self.imports.aliases.get(first) {
                    return Some(aliased.clone());
                }
            }
            return None;
        }

        // a qualified name: find where the namespace part ends
        let mut current: Option<TypeRef> = None;
        let mut namespace: Option<String> = None;
        for (i, (name, arg_nodes)) in segments.iter().enumerate() {
            let args: Vec<TypeRef> = arg_nodes
                .iter()
                .map(|a| self.resolve(*a))
                .collect::<Option<_>>()?;
            current = match (current.take(), namespace.clone()) {
                (Some(outer), _) => {
                    let outer = outer.type_id()?;
                    Some(TypeRef::generic(self.table.nested(outer, name, args.len())?, args))
                }
                (None, Some(ns)) => {
                    let path = format!("{ns}.{name}");
                    if let Some(id) = self.table.lookup(&ns, name, args.len()) {
                        Some(TypeRef::generic(id, args))
                    } else if self.table.is_namespace(&path) {
                        namespace = Some(path);
                        None
                    } else {
                        return None;
                    }
                }
                (None, None) if i == 0 => {
                    if let Some(AliasTarget::Namespace(ns)) = self.imports.aliases.get(name) {
                        namespace = Some(ns.clone());
                        None
                    } else if let Some(id) = self.lookup_type(node, name, args.len()) {
                        Some(TypeRef::generic(id, args))
                    } else if let Some(ns) = self.find_namespace(node, name) {
                        namespace = Some(ns);
                        None
                    } else {
                        return None;
                    }
                }
                (None, None) => return None,
            };
        }
        current
    }

    fn is_type_parameter(&self, context: NodeId, name: &str) -> bool {
        let tree = self.tree;
        tree.ancestors(context).any(|a| {
            tree.child_of_kind(a, SyntaxKind::TypeParameterList)
                .is_some_and(|list| {
                    tree.child_tokens(list)
                        .any(|t| tree.token(t).kind() == SyntaxKind::Ident && tree.token(t).text() == name)
                })
        })
    }

    /// Namespaces enclosing `context`, innermost first, ending with the
    /// global namespace.
    pub fn enclosing_namespaces(&self, context: NodeId) -> Vec<String> {
        let tree = self.tree;
        let mut parts: Vec<String> = tree
            .ancestors(context)
            .filter(|a| tree.kind(*a) == SyntaxKind::NamespaceDecl)
            .filter_map(|a| tree.child_of_kind(a, SyntaxKind::NameType))
            .map(|n| dotted_name(tree, n))
            .collect();
        parts.reverse();
        let mut out = Vec::new();
        let mut current = String::new();
        for part in parts {
            current = if current.is_empty() { part } else { format!("{current}.{part}") };
            out.push(current.clone());
        }
        // nested segments of `namespace A.B` are enclosing too
        let mut expanded: Vec<String> = Vec::new();
        for ns in out.iter().rev() {
            let mut prefix = ns.as_str();
            loop {
                if !expanded.iter().any(|e| e == prefix) {
                    expanded.push(prefix.to_string());
                }
                match prefix.rfind('.') {
                    Some(dot) => prefix = &prefix[..dot],
                    None => break,
                }
            }
        }
        expanded.push(String::new());
        expanded
    }

    /// Source types enclosing `context`, innermost first.
    pub fn enclosing_types(&self, context: NodeId) -> Vec<TypeId> {
        let tree = self.tree;
        std::iter::once(context)
            .chain(tree.ancestors(context))
            .filter(|a| tree.kind(*a).is_type_decl())
            .filter_map(|a| match self.declared.get(&a) {
                Some(Declared::Type(id)) => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Unqualified type lookup. Source and library types in enclosing
    /// namespaces win over imported ones.
    pub fn lookup_type(&self, context: NodeId, name: &str, arity: usize) -> Option<TypeId> {
        for outer in self.enclosing_types(context) {
            for t in self.table.base_chain(outer) {
                if let Some(id) = self.table.nested(t, name, arity) {
                    return Some(id);
                }
            }
        }
        for ns in self.enclosing_namespaces(context) {
            if let Some(id) = self.table.lookup(&ns, name, arity) {
                return Some(id);
            }
        }
        self.imports
            .namespaces
            .iter()
            .find_map(|ns| self.table.lookup(ns, name, arity))
    }

    /// Resolves a leading identifier to a namespace path, absolute or
    /// relative to an enclosing namespace.
    pub fn find_namespace(&self, context: NodeId, name: &str) -> Option<String> {
        if let Some(AliasTarget::Namespace(ns)) = self.imports.aliases.get(name) {
            return Some(ns.clone());
        }
        self.enclosing_namespaces(context)
            .into_iter()
            .map(|ns| if ns.is_empty() { name.to_string() } else { format!("{ns}.{name}") })
            .find(|path| self.table.is_namespace(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    fn bound(source: &str) -> (SyntaxTree, Binding) {
        let parsed = parse(source);
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        let binding = bind(&parsed.tree);
        (parsed.tree, binding)
    }

    fn source_type(binding: &Binding, name: &str) -> TypeId {
        binding
            .table
            .type_ids()
            .find(|id| binding.table.ty(*id).name == name && binding.table.ty(*id).decl.is_some())
            .unwrap()
    }

    #[test]
    fn test_declares_types_and_members() {
        let (_, binding) = bound(
            "namespace App.Models {\n  class Base { }\n  class Widget : Base, System.IDisposable {\n    public int Count { get; private set; }\n    int _a, _b;\n    public void Dispose() { }\n    public override bool Equals(object other) => false;\n  }\n  enum Color { Red, Green, Red2 }\n}",
        );
        let widget = source_type(&binding, "Widget");
        let base = source_type(&binding, "Base");
        let table = &binding.table;
        assert_eq!(table.ty(widget).namespace, "App.Models");
        assert_eq!(table.ty(widget).base, Some(TypeRef::named(base)));
        assert_eq!(table.ty(widget).interfaces.len(), 1);

        let count = table.find_member(widget, "Count", None).unwrap();
        let accessors = table.member(count).accessors.clone().unwrap();
        assert!(accessors.auto);
        assert_eq!(accessors.get, Some(Accessibility::Public));
        assert_eq!(accessors.set, Some(Accessibility::Private));

        assert!(table.find_member(widget, "_b", None).is_some());
        let equals = table.members_named(widget, "Equals").next().unwrap();
        assert!(table.member(equals).is_override);
        assert_eq!(table.member(equals).params, vec![Some(TypeRef::named(binding.core.object))]);

        let color = source_type(&binding, "Color");
        assert_eq!(table.ty(color).enum_members, vec!["Red", "Green", "Red2"]);
    }

    #[test]
    fn test_source_types_shadow_imports() {
        let (tree, binding) = bound("using System;\nclass Random { }\nclass C { Random r; DateTime d; }");
        let user_random = source_type(&binding, "Random");
        let resolver = TypeResolver::new(&tree, &binding);
        let c = tree
            .descendants(tree.root())
            .find(|n| tree.ident_text(*n) == Some("C"))
            .unwrap();
        assert_eq!(resolver.lookup_type(c, "Random", 0), Some(user_random));
        assert_eq!(resolver.lookup_type(c, "DateTime", 0), Some(binding.core.date_time));
    }

    #[test]
    fn test_date_time_needs_import() {
        let (tree, binding) = bound("class C { }");
        let resolver = TypeResolver::new(&tree, &binding);
        assert_eq!(resolver.lookup_type(tree.root(), "DateTime", 0), None);
        assert_eq!(resolver.find_namespace(tree.root(), "System"), Some("System".to_string()));
    }

    #[test]
    fn test_usings_and_aliases() {
        let (_, binding) = bound(
            "using System.Collections.Generic;\nusing static System.DayOfWeek;\nusing Gen = System.Collections.Generic;\nusing Stamp = System.DateTime;\nclass C { }",
        );
        assert_eq!(binding.imports.namespaces, vec!["System.Collections.Generic"]);
        assert_eq!(binding.imports.static_types.len(), 1);
        assert_eq!(
            binding.imports.aliases.get("Gen"),
            Some(&AliasTarget::Namespace("System.Collections.Generic".to_string()))
        );
        assert_eq!(
            binding.imports.aliases.get("Stamp"),
            Some(&AliasTarget::Type(TypeRef::named(binding.core.date_time)))
        );
    }
}

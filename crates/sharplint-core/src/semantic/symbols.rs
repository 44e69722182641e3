//! Type and member symbols plus the table that owns them.
//!
//! Symbols refer to each other by id only. A base type is a `TypeRef`
//! naming a `TypeId`, never an owning link, so the symbol graph cannot form
//! ownership cycles.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::syntax::{NodeId, SyntaxKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberId(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Enum,
}

/// Built-in types the conversion rules and rules need to recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialType {
    Object,
    String,
    Void,
    Bool,
    Char,
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    Decimal,
}

impl SpecialType {
    pub fn from_keyword(kind: SyntaxKind) -> Option<SpecialType> {
        let special = match kind {
            SyntaxKind::ObjectKw => SpecialType::Object,
            SyntaxKind::StringKw => SpecialType::String,
            SyntaxKind::VoidKw => SpecialType::Void,
            SyntaxKind::BoolKw => SpecialType::Bool,
            SyntaxKind::CharKw => SpecialType::Char,
            SyntaxKind::SbyteKw => SpecialType::SByte,
            SyntaxKind::ByteKw => SpecialType::Byte,
            SyntaxKind::ShortKw => SpecialType::Int16,
            SyntaxKind::UshortKw => SpecialType::UInt16,
            SyntaxKind::IntKw => SpecialType::Int32,
            SyntaxKind::UintKw => SpecialType::UInt32,
            SyntaxKind::LongKw => SpecialType::Int64,
            SyntaxKind::UlongKw => SpecialType::UInt64,
            SyntaxKind::FloatKw => SpecialType::Single,
            SyntaxKind::DoubleKw => SpecialType::Double,
            SyntaxKind::DecimalKw => SpecialType::Decimal,
            _ => return None,
        };
        Some(special)
    }

    pub fn is_numeric(self) -> bool {
        !matches!(
            self,
            SpecialType::Object | SpecialType::String | SpecialType::Void | SpecialType::Bool
        )
    }

    pub fn is_integral(self) -> bool {
        self.is_numeric()
            && !matches!(self, SpecialType::Single | SpecialType::Double | SpecialType::Decimal)
    }
}

/// A constructed type as it appears in declarations and expressions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Named { id: TypeId, args: Vec<TypeRef> },
    /// `T?` over a value type.
    Nullable(Box<TypeRef>),
    Array(Box<TypeRef>),
    /// A generic type parameter, by name.
    Param(String),
    /// Type of the `null` literal.
    Null,
}

impl TypeRef {
    pub fn named(id: TypeId) -> Self {
        TypeRef::Named { id, args: Vec::new() }
    }

    pub fn generic(id: TypeId, args: Vec<TypeRef>) -> Self {
        TypeRef::Named { id, args }
    }

    pub fn param(name: &str) -> Self {
        TypeRef::Param(name.to_string())
    }

    pub fn type_id(&self) -> Option<TypeId> {
        match self {
            TypeRef::Named { id, .. } => Some(*id),
            _ => None,
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, TypeRef::Nullable(_))
    }

    /// Replaces type parameters by the matching arguments.
    pub fn substitute(&self, params: &[String], args: &[TypeRef]) -> TypeRef {
        match self {
            TypeRef::Param(name) => params
                .iter()
                .position(|p| p == name)
                .and_then(|i| args.get(i).cloned())
                .unwrap_or_else(|| self.clone()),
            TypeRef::Named { id, args: inner } => TypeRef::Named {
                id: *id,
                args: inner.iter().map(|a| a.substitute(params, args)).collect(),
            },
            TypeRef::Nullable(inner) => TypeRef::Nullable(Box::new(inner.substitute(params, args))),
            TypeRef::Array(inner) => TypeRef::Array(Box::new(inner.substitute(params, args))),
            TypeRef::Null => TypeRef::Null,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Accessibility {
    Private,
    Protected,
    Internal,
    ProtectedInternal,
    Public,
}

impl Accessibility {
    /// Reads access modifiers from a declaration's tokens.
    pub fn from_modifiers(modifiers: &Modifiers, default: Accessibility) -> Accessibility {
        let has = |k| modifiers.contains(k);
        match (
            has(SyntaxKind::PublicKw),
            has(SyntaxKind::ProtectedKw),
            has(SyntaxKind::InternalKw),
            has(SyntaxKind::PrivateKw),
        ) {
            (true, ..) => Accessibility::Public,
            (_, true, true, _) => Accessibility::ProtectedInternal,
            (_, true, _, _) => Accessibility::Protected,
            (_, _, true, _) => Accessibility::Internal,
            (_, _, _, true) => Accessibility::Private,
            _ => default,
        }
    }

    /// True when `self` admits fewer callers than `other`.
    pub fn is_stricter_than(self, other: Accessibility) -> bool {
        self < other
    }
}

/// Modifier keywords present on a declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modifiers(Vec<SyntaxKind>);

impl Modifiers {
    pub fn new(kinds: impl IntoIterator<Item = SyntaxKind>) -> Self {
        Modifiers(kinds.into_iter().filter(|k| k.is_modifier()).collect())
    }

    pub fn contains(&self, kind: SyntaxKind) -> bool {
        self.0.contains(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = SyntaxKind> + '_ {
        self.0.iter().copied()
    }
}

#[derive(Debug, Clone)]
pub struct TypeSymbol {
    pub name: String,
    /// Dotted namespace, empty for the global namespace.
    pub namespace: String,
    pub kind: TypeKind,
    pub type_params: Vec<String>,
    pub base: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub members: Vec<MemberId>,
    /// Declared enum member names in order, unique.
    pub enum_members: Vec<String>,
    pub containing: Option<TypeId>,
    pub special: Option<SpecialType>,
    pub sealed: bool,
    pub decl: Option<NodeId>,
}

impl TypeSymbol {
    pub fn new(name: &str, namespace: &str, kind: TypeKind) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            kind,
            type_params: Vec::new(),
            base: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            enum_members: Vec::new(),
            containing: None,
            special: None,
            sealed: matches!(kind, TypeKind::Struct | TypeKind::Enum),
            decl: None,
        }
    }

    pub fn is_value_type(&self) -> bool {
        matches!(self.kind, TypeKind::Struct | TypeKind::Enum)
    }

    pub fn is_reference_type(&self) -> bool {
        !self.is_value_type()
    }

    pub fn arity(&self) -> usize {
        self.type_params.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Method,
    Property,
    Field,
    Constructor,
    Conversion,
    EnumMember,
}

/// Accessor set of a property, each accessor with its own accessibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorSet {
    pub get: Option<Accessibility>,
    pub set: Option<Accessibility>,
    /// Every accessor ends in `;`.
    pub auto: bool,
    pub set_decl: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct MemberSymbol {
    pub name: String,
    pub kind: MemberKind,
    pub owner: TypeId,
    pub modifiers: Modifiers,
    pub accessibility: Accessibility,
    pub is_override: bool,
    pub is_static: bool,
    /// Field/property type, method return type, conversion target.
    pub ty: Option<TypeRef>,
    pub params: Vec<Option<TypeRef>>,
    pub accessors: Option<AccessorSet>,
    pub decl: Option<NodeId>,
}

impl MemberSymbol {
    pub fn new(name: &str, kind: MemberKind, owner: TypeId) -> Self {
        Self {
            name: name.to_string(),
            kind,
            owner,
            modifiers: Modifiers::default(),
            accessibility: Accessibility::Public,
            is_override: false,
            is_static: false,
            ty: None,
            params: Vec::new(),
            accessors: None,
            decl: None,
        }
    }
}

/// Name plus parameter types, used to match overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub params: Vec<TypeRef>,
}

impl Signature {
    pub fn new(name: &str, params: Vec<TypeRef>) -> Self {
        Self { name: name.to_string(), params }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({} params)", self.name, self.params.len())
    }
}

/// Owner of every type and member symbol of one compilation.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    types: Vec<TypeSymbol>,
    members: Vec<MemberSymbol>,
    by_name: HashMap<(String, String, usize), TypeId>,
    namespaces: HashSet<String>,
    specials: HashMap<SpecialType, TypeId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_type(&mut self, symbol: TypeSymbol) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        if symbol.containing.is_none() {
            self.by_name
                .entry((symbol.namespace.clone(), symbol.name.clone(), symbol.arity()))
                .or_insert(id);
            self.declare_namespace(&symbol.namespace);
        }
        if let Some(special) = symbol.special {
            self.specials.insert(special, id);
        }
        self.types.push(symbol);
        id
    }

    pub fn add_member(&mut self, symbol: MemberSymbol) -> MemberId {
        let id = MemberId(self.members.len() as u32);
        let owner = symbol.owner;
        self.members.push(symbol);
        self.types[owner.0 as usize].members.push(id);
        id
    }

    /// Registers a namespace and all of its parents.
    pub fn declare_namespace(&mut self, namespace: &str) {
        let mut prefix = String::new();
        for part in namespace.split('.').filter(|p| !p.is_empty()) {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(part);
            self.namespaces.insert(prefix.clone());
        }
    }

    pub fn is_namespace(&self, path: &str) -> bool {
        self.namespaces.contains(path)
    }

    pub fn ty(&self, id: TypeId) -> &TypeSymbol {
        &self.types[id.0 as usize]
    }

    pub fn ty_mut(&mut self, id: TypeId) -> &mut TypeSymbol {
        &mut self.types[id.0 as usize]
    }

    pub fn member(&self, id: MemberId) -> &MemberSymbol {
        &self.members[id.0 as usize]
    }

    pub fn member_mut(&mut self, id: MemberId) -> &mut MemberSymbol {
        &mut self.members[id.0 as usize]
    }

    pub fn type_ids(&self) -> impl Iterator<Item = TypeId> {
        (0..self.types.len() as u32).map(TypeId)
    }

    pub fn lookup(&self, namespace: &str, name: &str, arity: usize) -> Option<TypeId> {
        self.by_name
            .get(&(namespace.to_string(), name.to_string(), arity))
            .copied()
    }

    pub fn nested(&self, container: TypeId, name: &str, arity: usize) -> Option<TypeId> {
        self.type_ids().find(|id| {
            let ty = self.ty(*id);
            ty.containing == Some(container) && ty.name == name && ty.arity() == arity
        })
    }

    pub fn special(&self, special: SpecialType) -> Option<TypeId> {
        self.specials.get(&special).copied()
    }

    pub fn special_ref(&self, special: SpecialType) -> Option<TypeRef> {
        self.special(special).map(TypeRef::named)
    }

    pub fn special_of(&self, ty: &TypeRef) -> Option<SpecialType> {
        ty.type_id().and_then(|id| self.ty(id).special)
    }

    /// Dotted name including namespace and containing types.
    pub fn full_name(&self, id: TypeId) -> String {
        let ty = self.ty(id);
        match ty.containing {
            Some(outer) => format!("{}.{}", self.full_name(outer), ty.name),
            None if ty.namespace.is_empty() => ty.name.clone(),
            None => format!("{}.{}", ty.namespace, ty.name),
        }
    }

    pub fn display(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Named { id, args } if args.is_empty() => self.ty(*id).name.clone(),
            TypeRef::Named { id, args } => format!(
                "{}<{}>",
                self.ty(*id).name,
                args.iter().map(|a| self.display(a)).collect::<Vec<_>>().join(", ")
            ),
            TypeRef::Nullable(inner) => format!("{}?", self.display(inner)),
            TypeRef::Array(inner) => format!("{}[]", self.display(inner)),
            TypeRef::Param(name) => name.clone(),
            TypeRef::Null => "null".to_string(),
        }
    }

    /// `Some(true)` for classes, interfaces, arrays and `null`; `None` for
    /// unconstrained type parameters.
    pub fn is_reference_type(&self, ty: &TypeRef) -> Option<bool> {
        match ty {
            TypeRef::Named { id, .. } => Some(self.ty(*id).is_reference_type()),
            TypeRef::Nullable(_) => Some(false),
            TypeRef::Array(_) | TypeRef::Null => Some(true),
            TypeRef::Param(_) => None,
        }
    }

    pub fn is_interface(&self, ty: &TypeRef) -> bool {
        ty.type_id()
            .is_some_and(|id| self.ty(id).kind == TypeKind::Interface)
    }

    pub fn is_enum(&self, ty: &TypeRef) -> bool {
        ty.type_id().is_some_and(|id| self.ty(id).kind == TypeKind::Enum)
    }

    /// Members named `name` declared directly on `ty`.
    pub fn members_named<'a>(
        &'a self,
        ty: TypeId,
        name: &'a str,
    ) -> impl Iterator<Item = MemberId> + 'a {
        self.ty(ty)
            .members
            .iter()
            .copied()
            .filter(move |m| self.member(*m).name == name)
    }

    /// Base type chain starting at `ty` itself. Stops on cycles.
    pub fn base_chain(&self, ty: TypeId) -> Vec<TypeId> {
        let mut chain = vec![ty];
        let mut current = ty;
        while let Some(base) = self.ty(current).base.as_ref().and_then(TypeRef::type_id) {
            if chain.contains(&base) {
                break;
            }
            chain.push(base);
            current = base;
        }
        chain
    }

    /// Interfaces implemented by `ty` or its bases, transitively.
    pub fn all_interfaces(&self, ty: TypeId) -> Vec<TypeId> {
        let mut out: Vec<TypeId> = Vec::new();
        let mut pending: Vec<TypeId> = self.base_chain(ty);
        while let Some(current) = pending.pop() {
            for interface in self.ty(current).interfaces.iter().filter_map(TypeRef::type_id) {
                if !out.contains(&interface) {
                    out.push(interface);
                    pending.push(interface);
                }
            }
        }
        out
    }

    /// Finds a member on `ty`, its bases or its interfaces. With `arity`, methods and
    /// constructors must take exactly that many parameters.
    pub fn find_member(&self, ty: TypeId, name: &str, arity: Option<usize>) -> Option<MemberId> {
        let mut search = self.base_chain(ty);
        search.extend(self.all_interfaces(ty));
        search.into_iter().find_map(|t| {
            self.members_named(t, name).find(|m| {
                let member = self.member(*m);
                match (member.kind, arity) {
                    (MemberKind::Method | MemberKind::Constructor, Some(n)) => member.params.len() == n,
                    _ => true,
                }
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute() {
        let list = TypeId(3);
        let t = TypeRef::generic(list, vec![TypeRef::param("T")]);
        let int = TypeRef::named(TypeId(1));
        assert_eq!(
            t.substitute(&["T".to_string()], &[int.clone()]),
            TypeRef::generic(list, vec![int])
        );
        assert_eq!(TypeRef::param("U").substitute(&["T".to_string()], &[]), TypeRef::param("U"));
    }

    #[test]
    fn test_accessibility_order() {
        assert!(Accessibility::Private.is_stricter_than(Accessibility::Public));
        assert!(Accessibility::Protected.is_stricter_than(Accessibility::Internal));
        assert!(!Accessibility::Public.is_stricter_than(Accessibility::Public));
        let modifiers = Modifiers::new([SyntaxKind::ProtectedKw, SyntaxKind::InternalKw]);
        assert_eq!(
            Accessibility::from_modifiers(&modifiers, Accessibility::Private),
            Accessibility::ProtectedInternal
        );
    }

    #[test]
    fn test_table_lookup_and_members() {
        let mut table = SymbolTable::new();
        let object = table.add_type(TypeSymbol::new("Object", "System", TypeKind::Class));
        let mut derived = TypeSymbol::new("Derived", "App.Models", TypeKind::Class);
        derived.base = Some(TypeRef::named(object));
        let derived = table.add_type(derived);
        table.add_member(MemberSymbol::new("Equals", MemberKind::Method, object));

        assert_eq!(table.lookup("App.Models", "Derived", 0), Some(derived));
        assert!(table.is_namespace("App"));
        assert!(table.is_namespace("App.Models"));
        assert_eq!(table.base_chain(derived), vec![derived, object]);
        assert!(table.find_member(derived, "Equals", None).is_some());
        assert_eq!(table.full_name(derived), "App.Models.Derived");
    }
}

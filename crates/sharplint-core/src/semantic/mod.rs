/*!
# Semantic Facts

The narrow set of semantic questions rules are allowed to ask about a tree.

- `SemanticModel`: the contract; any host can implement it over its own binder
- `Compilation`: the reference implementation for one `SyntaxTree`
- `SymbolTable`: id-addressed type and member symbols shared by both

Every query is pure. `None` means the fact is unknown, and rules treat
unknown as "do not flag".
*/

pub mod binder;
pub mod compilation;
pub mod conversions;
pub mod library;
mod lookup;
pub mod symbols;

pub use compilation::Compilation;
pub use library::CoreTypes;
pub use symbols::{
    AccessorSet, Accessibility, MemberId, MemberKind, MemberSymbol, Modifiers, Signature,
    SpecialType, SymbolTable, TypeId, TypeKind, TypeRef, TypeSymbol,
};

use crate::syntax::NodeId;

/// What a name, member access or declaration refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    Namespace(String),
    Type(TypeId),
    Member(MemberId),
    /// A local variable. `decl` is its `VariableDeclarator`, the declaring
    /// `ForeachStmt` or the declaring `CatchClause`.
    Local { decl: NodeId },
    /// A parameter. `decl` is its `Parameter` node, or the setter `Accessor`
    /// for the implicit `value`.
    Parameter { decl: NodeId },
}

/// Explicit conversions are split by the reason they are explicit, since
/// only some of them are legal for `as`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExplicitConversion {
    Reference,
    Unboxing,
    Numeric,
    Nullable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionKind {
    Identity,
    /// Includes boxing to `object` or an implemented interface.
    ImplicitReference,
    ImplicitNullable,
    ImplicitNumeric,
    Explicit(ExplicitConversion),
    UserDefined,
}

impl ConversionKind {
    pub fn is_implicit(self) -> bool {
        !matches!(self, ConversionKind::Explicit(_) | ConversionKind::UserDefined)
    }

    /// True when `expr as T` would perform the same conversion as `(T)expr`.
    pub fn permits_as(self) -> bool {
        matches!(
            self,
            ConversionKind::Identity
                | ConversionKind::ImplicitReference
                | ConversionKind::ImplicitNullable
                | ConversionKind::Explicit(ExplicitConversion::Reference)
                | ConversionKind::Explicit(ExplicitConversion::Unboxing)
        )
    }
}

/// Semantic queries available to rules.
///
/// Implementations must be shareable across threads; the engine analyzes
/// files in parallel.
pub trait SemanticModel: Sync {
    fn symbols(&self) -> &SymbolTable;

    /// Static type of an expression, or the type denoted by type syntax.
    fn type_of(&self, node: NodeId) -> Option<TypeRef>;

    /// Classification of converting `expr` to `target`. `None` when the
    /// source type is unknown or no conversion exists.
    fn conversion_kind(&self, expr: NodeId, target: &TypeRef) -> Option<ConversionKind>;

    fn symbol_of(&self, node: NodeId) -> Option<Symbol>;

    /// True when `member` is declared `override` and matches `signature`.
    fn is_override(&self, member: MemberId, signature: &Signature) -> bool {
        let symbol = self.symbols().member(member);
        symbol.is_override
            && symbol.name == signature.name
            && symbol.params.len() == signature.params.len()
            && symbol
                .params
                .iter()
                .zip(&signature.params)
                .all(|(declared, expected)| declared.as_ref() == Some(expected))
    }

    fn enum_members(&self, ty: TypeId) -> Option<&[String]> {
        let symbol = self.symbols().ty(ty);
        (symbol.kind == TypeKind::Enum).then_some(symbol.enum_members.as_slice())
    }

    /// Enum type brought into scope by `using static` that declares `name`.
    fn resolve_static_import(&self, name: &str) -> Option<TypeId>;

    /// Expressions that write to `member`: assignment targets, increment
    /// operands and `ref`/`out` arguments.
    fn write_references(&self, member: MemberId) -> Vec<NodeId>;
}

//! Token and node kinds for the syntax tree.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind tag shared by tokens and nodes.
///
/// Token kinds come first, node kinds after `CompilationUnit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SyntaxKind {
    // Literals and names
    Ident,
    IntLiteral,
    RealLiteral,
    StringLiteral,
    CharLiteral,
    EndOfFile,
    /// A character the lexer does not recognise.
    Unknown,

    // Keywords
    AbstractKw,
    AsKw,
    BaseKw,
    BoolKw,
    BreakKw,
    ByteKw,
    CaseKw,
    CatchKw,
    CharKw,
    ClassKw,
    ConstKw,
    ContinueKw,
    DecimalKw,
    DefaultKw,
    DoKw,
    DoubleKw,
    ElseKw,
    EnumKw,
    ExplicitKw,
    ExternKw,
    FalseKw,
    FinallyKw,
    FloatKw,
    ForKw,
    ForeachKw,
    GotoKw,
    IfKw,
    ImplicitKw,
    InKw,
    IntKw,
    InterfaceKw,
    InternalKw,
    IsKw,
    LongKw,
    NamespaceKw,
    NewKw,
    NullKw,
    ObjectKw,
    OperatorKw,
    OutKw,
    OverrideKw,
    ParamsKw,
    PrivateKw,
    ProtectedKw,
    PublicKw,
    ReadonlyKw,
    RefKw,
    ReturnKw,
    SbyteKw,
    SealedKw,
    ShortKw,
    StaticKw,
    StringKw,
    StructKw,
    SwitchKw,
    ThisKw,
    ThrowKw,
    TrueKw,
    TryKw,
    TypeofKw,
    UintKw,
    UlongKw,
    UnsafeKw,
    UshortKw,
    UsingKw,
    VirtualKw,
    VoidKw,
    VolatileKw,
    WhileKw,
    /// Reserved words the frontend recognises but has no grammar for.
    ReservedKw,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Dot,
    Colon,
    Question,
    QuestionQuestion,
    QuestionQuestionEq,
    Eq,
    EqEq,
    BangEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Tilde,
    Amp,
    AmpAmp,
    Pipe,
    PipePipe,
    Caret,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AmpEq,
    PipeEq,
    CaretEq,
    PlusPlus,
    MinusMinus,
    FatArrow,

    // Nodes
    CompilationUnit,
    UsingDirective,
    NamespaceDecl,
    ClassDecl,
    StructDecl,
    InterfaceDecl,
    EnumDecl,
    EnumMember,
    TypeParameterList,
    BaseList,
    AttributeList,
    Attribute,
    FieldDecl,
    PropertyDecl,
    AccessorList,
    Accessor,
    MethodDecl,
    ConstructorDecl,
    ConstructorInitializer,
    ConversionOperatorDecl,
    ParameterList,
    Parameter,
    ArrowClause,
    EqualsValueClause,

    PredefinedType,
    NameType,
    TypeArgumentList,
    NullableType,
    ArrayType,

    Block,
    EmptyStmt,
    LocalDeclStmt,
    VariableDeclaration,
    VariableDeclarator,
    ExprStmt,
    IfStmt,
    ElseClause,
    WhileStmt,
    DoStmt,
    ForStmt,
    ForeachStmt,
    SwitchStmt,
    SwitchSection,
    CaseLabel,
    DefaultLabel,
    GotoStmt,
    LabeledStmt,
    BreakStmt,
    ContinueStmt,
    ReturnStmt,
    ThrowStmt,
    TryStmt,
    CatchClause,
    FinallyClause,

    LiteralExpr,
    NameExpr,
    ThisExpr,
    BaseExpr,
    ParenExpr,
    MemberAccessExpr,
    InvocationExpr,
    ElementAccessExpr,
    ArgumentList,
    BracketedArgumentList,
    Argument,
    ObjectCreationExpr,
    InitializerExpr,
    CastExpr,
    AsExpr,
    IsExpr,
    ConditionalExpr,
    AssignmentExpr,
    BinaryExpr,
    PrefixUnaryExpr,
    PostfixUnaryExpr,
    LambdaExpr,
    TypeofExpr,
    DefaultExpr,

    /// Tokens the parser could not place.
    Error,
}

impl SyntaxKind {
    pub fn is_token(self) -> bool {
        self < SyntaxKind::CompilationUnit
    }

    pub fn is_node(self) -> bool {
        !self.is_token()
    }

    pub fn is_keyword(self) -> bool {
        self >= SyntaxKind::AbstractKw && self <= SyntaxKind::ReservedKw
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            SyntaxKind::IntLiteral
                | SyntaxKind::RealLiteral
                | SyntaxKind::StringLiteral
                | SyntaxKind::CharLiteral
                | SyntaxKind::TrueKw
                | SyntaxKind::FalseKw
                | SyntaxKind::NullKw
        )
    }

    /// Keywords naming a built-in type (`int`, `string`, `void`, ...).
    pub fn is_predefined_type(self) -> bool {
        matches!(
            self,
            SyntaxKind::BoolKw
                | SyntaxKind::ByteKw
                | SyntaxKind::SbyteKw
                | SyntaxKind::ShortKw
                | SyntaxKind::UshortKw
                | SyntaxKind::IntKw
                | SyntaxKind::UintKw
                | SyntaxKind::LongKw
                | SyntaxKind::UlongKw
                | SyntaxKind::FloatKw
                | SyntaxKind::DoubleKw
                | SyntaxKind::DecimalKw
                | SyntaxKind::CharKw
                | SyntaxKind::StringKw
                | SyntaxKind::ObjectKw
                | SyntaxKind::VoidKw
        )
    }

    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            SyntaxKind::PublicKw
                | SyntaxKind::PrivateKw
                | SyntaxKind::ProtectedKw
                | SyntaxKind::InternalKw
                | SyntaxKind::StaticKw
                | SyntaxKind::ReadonlyKw
                | SyntaxKind::ConstKw
                | SyntaxKind::OverrideKw
                | SyntaxKind::VirtualKw
                | SyntaxKind::AbstractKw
                | SyntaxKind::SealedKw
                | SyntaxKind::NewKw
                | SyntaxKind::ExternKw
                | SyntaxKind::UnsafeKw
                | SyntaxKind::VolatileKw
        )
    }

    pub fn is_assignment_operator(self) -> bool {
        matches!(
            self,
            SyntaxKind::Eq
                | SyntaxKind::PlusEq
                | SyntaxKind::MinusEq
                | SyntaxKind::StarEq
                | SyntaxKind::SlashEq
                | SyntaxKind::PercentEq
                | SyntaxKind::AmpEq
                | SyntaxKind::PipeEq
                | SyntaxKind::CaretEq
                | SyntaxKind::QuestionQuestionEq
        )
    }

    pub fn is_type_decl(self) -> bool {
        matches!(
            self,
            SyntaxKind::ClassDecl
                | SyntaxKind::StructDecl
                | SyntaxKind::InterfaceDecl
                | SyntaxKind::EnumDecl
        )
    }

    /// Nodes that start a new member or lambda body. Ancestor chains handed
    /// to rules stop at the nearest one of these.
    pub fn is_boundary(self) -> bool {
        matches!(
            self,
            SyntaxKind::MethodDecl
                | SyntaxKind::ConstructorDecl
                | SyntaxKind::ConversionOperatorDecl
                | SyntaxKind::PropertyDecl
                | SyntaxKind::Accessor
                | SyntaxKind::FieldDecl
                | SyntaxKind::EnumMember
                | SyntaxKind::LambdaExpr
        ) || self.is_type_decl()
    }

    pub fn is_loop(self) -> bool {
        matches!(
            self,
            SyntaxKind::WhileStmt | SyntaxKind::DoStmt | SyntaxKind::ForStmt | SyntaxKind::ForeachStmt
        )
    }

    /// Kinds that may appear where the grammar expects a type.
    pub fn is_type(self) -> bool {
        matches!(
            self,
            SyntaxKind::PredefinedType
                | SyntaxKind::NameType
                | SyntaxKind::NullableType
                | SyntaxKind::ArrayType
        )
    }

    pub fn is_statement(self) -> bool {
        matches!(
            self,
            SyntaxKind::Block
                | SyntaxKind::EmptyStmt
                | SyntaxKind::LocalDeclStmt
                | SyntaxKind::ExprStmt
                | SyntaxKind::IfStmt
                | SyntaxKind::WhileStmt
                | SyntaxKind::DoStmt
                | SyntaxKind::ForStmt
                | SyntaxKind::ForeachStmt
                | SyntaxKind::SwitchStmt
                | SyntaxKind::GotoStmt
                | SyntaxKind::LabeledStmt
                | SyntaxKind::BreakStmt
                | SyntaxKind::ContinueStmt
                | SyntaxKind::ReturnStmt
                | SyntaxKind::ThrowStmt
                | SyntaxKind::TryStmt
        )
    }

    pub fn is_expression(self) -> bool {
        self >= SyntaxKind::LiteralExpr && self <= SyntaxKind::DefaultExpr
            && !matches!(
                self,
                SyntaxKind::ArgumentList | SyntaxKind::BracketedArgumentList | SyntaxKind::Argument
            )
            || self == SyntaxKind::PredefinedType
    }

    /// Expressions that bind at least as tightly as a unary operator and so
    /// can be the operand of a cast without parentheses.
    pub fn is_unary_level_expression(self) -> bool {
        matches!(
            self,
            SyntaxKind::LiteralExpr
                | SyntaxKind::NameExpr
                | SyntaxKind::ThisExpr
                | SyntaxKind::BaseExpr
                | SyntaxKind::ParenExpr
                | SyntaxKind::MemberAccessExpr
                | SyntaxKind::InvocationExpr
                | SyntaxKind::ElementAccessExpr
                | SyntaxKind::ObjectCreationExpr
                | SyntaxKind::CastExpr
                | SyntaxKind::PrefixUnaryExpr
                | SyntaxKind::PostfixUnaryExpr
                | SyntaxKind::TypeofExpr
                | SyntaxKind::DefaultExpr
                | SyntaxKind::PredefinedType
        )
    }

    /// Maps reserved and contextual-free keywords to their kind.
    pub fn from_keyword(text: &str) -> Option<SyntaxKind> {
        let kind = match text {
            "abstract" => SyntaxKind::AbstractKw,
            "as" => SyntaxKind::AsKw,
            "base" => SyntaxKind::BaseKw,
            "bool" => SyntaxKind::BoolKw,
            "break" => SyntaxKind::BreakKw,
            "byte" => SyntaxKind::ByteKw,
            "case" => SyntaxKind::CaseKw,
            "catch" => SyntaxKind::CatchKw,
            "char" => SyntaxKind::CharKw,
            "class" => SyntaxKind::ClassKw,
            "const" => SyntaxKind::ConstKw,
            "continue" => SyntaxKind::ContinueKw,
            "decimal" => SyntaxKind::DecimalKw,
            "default" => SyntaxKind::DefaultKw,
            "do" => SyntaxKind::DoKw,
            "double" => SyntaxKind::DoubleKw,
            "else" => SyntaxKind::ElseKw,
            "enum" => SyntaxKind::EnumKw,
            "explicit" => SyntaxKind::ExplicitKw,
            "extern" => SyntaxKind::ExternKw,
            "false" => SyntaxKind::FalseKw,
            "finally" => SyntaxKind::FinallyKw,
            "float" => SyntaxKind::FloatKw,
            "for" => SyntaxKind::ForKw,
            "foreach" => SyntaxKind::ForeachKw,
            "goto" => SyntaxKind::GotoKw,
            "if" => SyntaxKind::IfKw,
            "implicit" => SyntaxKind::ImplicitKw,
            "in" => SyntaxKind::InKw,
            "int" => SyntaxKind::IntKw,
            "interface" => SyntaxKind::InterfaceKw,
            "internal" => SyntaxKind::InternalKw,
            "is" => SyntaxKind::IsKw,
            "long" => SyntaxKind::LongKw,
            "namespace" => SyntaxKind::NamespaceKw,
            "new" => SyntaxKind::NewKw,
            "null" => SyntaxKind::NullKw,
            "object" => SyntaxKind::ObjectKw,
            "operator" => SyntaxKind::OperatorKw,
            "out" => SyntaxKind::OutKw,
            "override" => SyntaxKind::OverrideKw,
            "params" => SyntaxKind::ParamsKw,
            "private" => SyntaxKind::PrivateKw,
            "protected" => SyntaxKind::ProtectedKw,
            "public" => SyntaxKind::PublicKw,
            "readonly" => SyntaxKind::ReadonlyKw,
            "ref" => SyntaxKind::RefKw,
            "return" => SyntaxKind::ReturnKw,
            "sbyte" => SyntaxKind::SbyteKw,
            "sealed" => SyntaxKind::SealedKw,
            "short" => SyntaxKind::ShortKw,
            "static" => SyntaxKind::StaticKw,
            "string" => SyntaxKind::StringKw,
            "struct" => SyntaxKind::StructKw,
            "switch" => SyntaxKind::SwitchKw,
            "this" => SyntaxKind::ThisKw,
            "throw" => SyntaxKind::ThrowKw,
            "true" => SyntaxKind::TrueKw,
            "try" => SyntaxKind::TryKw,
            "typeof" => SyntaxKind::TypeofKw,
            "uint" => SyntaxKind::UintKw,
            "ulong" => SyntaxKind::UlongKw,
            "unsafe" => SyntaxKind::UnsafeKw,
            "ushort" => SyntaxKind::UshortKw,
            "using" => SyntaxKind::UsingKw,
            "virtual" => SyntaxKind::VirtualKw,
            "void" => SyntaxKind::VoidKw,
            "volatile" => SyntaxKind::VolatileKw,
            "while" => SyntaxKind::WhileKw,
            "checked" | "delegate" | "event" | "fixed" | "lock" | "sizeof" | "stackalloc"
            | "unchecked" => SyntaxKind::ReservedKw,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

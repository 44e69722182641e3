//! Recursive-descent parser for the supported language subset.
//!
//! The parser never fails: constructs outside the subset produce
//! [`ParseError`]s and `Error` nodes, and every loop consumes at least one
//! token per iteration.

use super::builder::{Checkpoint, TreeBuilder};
use super::kind::SyntaxKind::{self, *};
use super::lexer::{lex, LexedToken};
use super::{ParseError, ParseResult};

/// How a trailing `?` after a type is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeMode {
    /// Declarations and type arguments: `?` is always nullable.
    Decl,
    /// After `as`/`is`: `?` is nullable unless an expression follows,
    /// in which case it starts a conditional.
    AsIs,
    /// Inside cast parentheses.
    Cast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemberKind {
    Namespace,
    Type(SyntaxKind),
    Constructor,
    Conversion,
    Method,
    Property,
    Field,
    Unsupported,
}

pub fn parse(source: &str) -> ParseResult {
    let (tokens, errors) = lex(source);
    let mut parser = Parser { tokens, pos: 0, builder: TreeBuilder::new(), errors };
    parser.compilation_unit();
    ParseResult { tree: parser.builder.finish(), errors: parser.errors }
}

struct Parser {
    tokens: Vec<LexedToken>,
    pos: usize,
    builder: TreeBuilder,
    errors: Vec<ParseError>,
}

impl Parser {
    // ---- token access -------------------------------------------------

    fn nth(&self, n: usize) -> SyntaxKind {
        self.kind_at(self.pos + n)
    }

    fn kind_at(&self, index: usize) -> SyntaxKind {
        self.tokens
            .get(index)
            .map_or(EndOfFile, |t| t.kind)
    }

    fn text_at(&self, index: usize) -> &str {
        self.tokens.get(index).map_or("", |t| t.text.as_str())
    }

    fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    fn at_contextual(&self, word: &str) -> bool {
        self.at(Ident) && self.text_at(self.pos) == word
    }

    /// True when the token at `index` follows the previous one with no
    /// trivia in between.
    fn adjacent(&self, index: usize) -> bool {
        match (index.checked_sub(1).and_then(|i| self.tokens.get(i)), self.tokens.get(index)) {
            (Some(prev), Some(next)) => prev.trailing.is_empty() && next.leading.is_empty(),
            _ => false,
        }
    }

    fn bump(&mut self) {
        if self.at(EndOfFile) {
            return;
        }
        let token = &mut self.tokens[self.pos];
        let text = std::mem::take(&mut token.text);
        let leading = std::mem::take(&mut token.leading);
        let trailing = std::mem::take(&mut token.trailing);
        self.builder.token(token.kind, text, leading, trailing);
        self.pos += 1;
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error(format!("expected {kind}, found {}", self.current()));
        false
    }

    fn error(&mut self, message: impl Into<String>) {
        let span = self
            .tokens
            .get(self.pos)
            .map(|t| t.span)
            .unwrap_or_default();
        self.errors.push(ParseError { message: message.into(), span });
    }

    /// Wraps the current token in an `Error` node unless it closes an
    /// enclosing construct.
    fn recover(&mut self, message: &str) {
        self.error(message.to_string());
        if matches!(self.current(), EndOfFile) {
            return;
        }
        self.builder.start_node(Error);
        self.bump();
        self.builder.finish_node();
    }

    fn start(&mut self, kind: SyntaxKind) {
        self.builder.start_node(kind);
    }

    fn start_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind);
    }

    fn finish(&mut self) {
        self.builder.finish_node();
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.builder.checkpoint()
    }

    // ---- lookahead scanners ---------------------------------------------

    fn skip_balanced(&self, mut index: usize) -> Option<usize> {
        let open = self.kind_at(index);
        let close = match open {
            LParen => RParen,
            LBracket => RBracket,
            LBrace => RBrace,
            _ => return None,
        };
        let mut depth = 0usize;
        loop {
            match self.kind_at(index) {
                EndOfFile => return None,
                k if k == open => depth += 1,
                k if k == close => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(index + 1);
                    }
                }
                _ => {}
            }
            index += 1;
        }
    }

    fn scan_type_args(&self, index: usize) -> Option<usize> {
        if self.kind_at(index) != Lt {
            return None;
        }
        let mut index = index + 1;
        loop {
            index = self.scan_type(index, TypeMode::Decl)?;
            match self.kind_at(index) {
                Comma => index += 1,
                Gt => return Some(index + 1),
                _ => return None,
            }
        }
    }

    fn scan_name(&self, mut index: usize) -> Option<usize> {
        loop {
            if self.kind_at(index) != Ident {
                return None;
            }
            index += 1;
            if self.kind_at(index) == Lt {
                index = self.scan_type_args(index)?;
            }
            if self.kind_at(index) == Dot && self.kind_at(index + 1) == Ident {
                index += 1;
            } else {
                return Some(index);
            }
        }
    }

    fn scan_type(&self, index: usize, mode: TypeMode) -> Option<usize> {
        let kind = self.kind_at(index);
        let mut index = if kind.is_predefined_type() {
            index + 1
        } else if kind == Ident {
            self.scan_name(index)?
        } else {
            return None;
        };
        if self.kind_at(index) == Question && self.nullable_allowed(index, mode) {
            index += 1;
        }
        while self.kind_at(index) == LBracket
            && matches!(self.kind_at(index + 1), RBracket | Comma)
        {
            index += 1;
            while self.kind_at(index) == Comma {
                index += 1;
            }
            if self.kind_at(index) != RBracket {
                return None;
            }
            index += 1;
        }
        Some(index)
    }

    fn nullable_allowed(&self, question: usize, mode: TypeMode) -> bool {
        match mode {
            TypeMode::Decl | TypeMode::Cast => true,
            TypeMode::AsIs => !starts_expression(self.kind_at(question + 1)),
        }
    }

    /// `Type name` followed by `=`, `;` or `,` (or `in` inside foreach).
    fn at_local_declaration(&self) -> bool {
        match self.scan_type(self.pos, TypeMode::Decl) {
            Some(end) => {
                self.kind_at(end) == Ident
                    && matches!(self.kind_at(end + 1), Eq | Semicolon | Comma | InKw)
            }
            None => false,
        }
    }

    /// At `<` right after a name: true when it opens a type argument list.
    fn at_generic_name(&self) -> bool {
        match self.scan_type_args(self.pos) {
            Some(end) => matches!(
                self.kind_at(end),
                LParen | RParen | RBracket | RBrace | Colon | Semicolon | Comma | Dot
                    | Question | EqEq | BangEq | EndOfFile
            ),
            None => false,
        }
    }

    fn at_cast(&self) -> bool {
        let Some(end) = self.scan_type(self.pos + 1, TypeMode::Cast) else {
            return false;
        };
        if self.kind_at(end) != RParen {
            return false;
        }
        if self.nth(1).is_predefined_type() {
            return true;
        }
        let after = self.kind_at(end + 1);
        after == Ident
            || after.is_literal()
            || after.is_predefined_type()
            || matches!(after, LParen | ThisKw | BaseKw | NewKw | Bang | Tilde | TypeofKw | DefaultKw)
    }

    fn at_lambda(&self) -> bool {
        match self.current() {
            Ident => self.nth(1) == FatArrow,
            LParen => self
                .skip_balanced(self.pos)
                .is_some_and(|end| self.kind_at(end) == FatArrow),
            _ => false,
        }
    }

    fn classify_member(&self) -> MemberKind {
        let mut index = self.pos;
        while self.kind_at(index) == LBracket {
            match self.skip_balanced(index) {
                Some(end) => index = end,
                None => return MemberKind::Unsupported,
            }
        }
        while self.kind_at(index).is_modifier() || self.is_contextual_modifier(index) {
            index += 1;
        }
        match self.kind_at(index) {
            NamespaceKw => MemberKind::Namespace,
            ClassKw => MemberKind::Type(ClassDecl),
            StructKw => MemberKind::Type(StructDecl),
            InterfaceKw => MemberKind::Type(InterfaceDecl),
            EnumKw => MemberKind::Type(EnumDecl),
            ImplicitKw | ExplicitKw => MemberKind::Conversion,
            Ident if self.kind_at(index + 1) == LParen => MemberKind::Constructor,
            _ => {
                let Some(end) = self.scan_type(index, TypeMode::Decl) else {
                    return MemberKind::Unsupported;
                };
                if self.kind_at(end) != Ident {
                    return MemberKind::Unsupported;
                }
                match self.kind_at(end + 1) {
                    LParen | Lt => MemberKind::Method,
                    LBrace | FatArrow => MemberKind::Property,
                    Eq | Semicolon | Comma => MemberKind::Field,
                    _ => MemberKind::Unsupported,
                }
            }
        }
    }

    fn is_contextual_modifier(&self, index: usize) -> bool {
        self.kind_at(index) == Ident
            && matches!(self.text_at(index), "partial" | "async")
            && matches!(
                self.kind_at(index + 1),
                Ident | ClassKw | StructKw | InterfaceKw | VoidKw
            )
            || self.kind_at(index) == Ident
                && self.text_at(index) == "async"
                && self.kind_at(index + 1).is_predefined_type()
    }

    // ---- declarations -----------------------------------------------------

    fn compilation_unit(&mut self) {
        self.start(CompilationUnit);
        self.members_until(EndOfFile);
        if !self.at(EndOfFile) {
            self.error("expected end of file");
        }
        let eof = self.pos.min(self.tokens.len().saturating_sub(1));
        self.pos = eof;
        let token = &mut self.tokens[eof];
        let leading = std::mem::take(&mut token.leading);
        self.builder.token(EndOfFile, "", leading, Vec::new());
        self.finish();
    }

    fn members_until(&mut self, close: SyntaxKind) {
        while !self.at(close) && !self.at(EndOfFile) {
            let before = self.pos;
            if self.at(UsingKw) {
                self.using_directive();
            } else {
                self.member();
            }
            if self.pos == before {
                self.recover("expected a declaration");
            }
        }
    }

    fn using_directive(&mut self) {
        self.start(UsingDirective);
        self.bump();
        self.eat(StaticKw);
        if self.at(Ident) && self.nth(1) == Eq {
            self.bump();
            self.bump();
        }
        self.name_type();
        self.expect(Semicolon);
        self.finish();
    }

    fn member(&mut self) {
        let kind = self.classify_member();
        let node = match kind {
            MemberKind::Namespace => NamespaceDecl,
            MemberKind::Type(kind) => kind,
            MemberKind::Constructor => ConstructorDecl,
            MemberKind::Conversion => ConversionOperatorDecl,
            MemberKind::Method => MethodDecl,
            MemberKind::Property => PropertyDecl,
            MemberKind::Field => FieldDecl,
            MemberKind::Unsupported => {
                self.recover("unsupported member declaration");
                return;
            }
        };
        self.start(node);
        self.attributes();
        while self.current().is_modifier() || self.is_contextual_modifier(self.pos) {
            self.bump();
        }
        match kind {
            MemberKind::Namespace => self.namespace_body(),
            MemberKind::Type(EnumDecl) => self.enum_body(),
            MemberKind::Type(_) => self.type_body(),
            MemberKind::Constructor => self.constructor_body(),
            MemberKind::Conversion => self.conversion_body(),
            MemberKind::Method => self.method_body(),
            MemberKind::Property => self.property_body(),
            MemberKind::Field => {
                self.variable_declaration();
                self.expect(Semicolon);
            }
            MemberKind::Unsupported => {}
        }
        self.finish();
    }

    fn attributes(&mut self) {
        while self.at(LBracket) {
            self.start(AttributeList);
            self.bump();
            // attribute targets such as `return:`
            if (self.at(Ident) || self.current().is_keyword()) && self.nth(1) == Colon {
                self.bump();
                self.bump();
            }
            loop {
                self.start(Attribute);
                self.name_type();
                if self.at(LParen) {
                    self.argument_list();
                }
                self.finish();
                if !self.eat(Comma) || self.at(RBracket) {
                    break;
                }
            }
            self.expect(RBracket);
            self.finish();
        }
    }

    fn namespace_body(&mut self) {
        self.bump();
        self.name_type();
        if self.eat(Semicolon) {
            self.members_until(EndOfFile);
            return;
        }
        if self.expect(LBrace) {
            self.members_until(RBrace);
            self.expect(RBrace);
        }
    }

    fn type_body(&mut self) {
        self.bump();
        self.expect(Ident);
        if self.at(Lt) {
            self.type_parameter_list();
        }
        if self.at(Colon) {
            self.start(BaseList);
            self.bump();
            loop {
                self.parse_type(TypeMode::Decl);
                if !self.eat(Comma) {
                    break;
                }
            }
            self.finish();
        }
        if self.at_contextual("where") {
            self.error("type parameter constraints are not supported");
        }
        if self.expect(LBrace) {
            self.members_until(RBrace);
            self.expect(RBrace);
        }
        self.eat(Semicolon);
    }

    fn type_parameter_list(&mut self) {
        self.start(TypeParameterList);
        self.bump();
        loop {
            self.expect(Ident);
            if !self.eat(Comma) {
                break;
            }
        }
        self.expect(Gt);
        self.finish();
    }

    fn enum_body(&mut self) {
        self.bump();
        self.expect(Ident);
        if self.at(Colon) {
            self.start(BaseList);
            self.bump();
            self.parse_type(TypeMode::Decl);
            self.finish();
        }
        if !self.expect(LBrace) {
            return;
        }
        while self.at(Ident) || self.at(LBracket) {
            self.start(EnumMember);
            self.attributes();
            self.expect(Ident);
            if self.at(Eq) {
                self.equals_value();
            }
            self.finish();
            if !self.eat(Comma) {
                break;
            }
        }
        self.expect(RBrace);
        self.eat(Semicolon);
    }

    fn constructor_body(&mut self) {
        self.bump();
        self.parameter_list();
        if self.at(Colon) {
            self.start(ConstructorInitializer);
            self.bump();
            if !self.eat(BaseKw) {
                self.expect(ThisKw);
            }
            if self.at(LParen) {
                self.argument_list();
            } else {
                self.error("expected argument list");
            }
            self.finish();
        }
        self.member_body();
    }

    fn conversion_body(&mut self) {
        self.bump();
        self.expect(OperatorKw);
        self.parse_type(TypeMode::Decl);
        self.parameter_list();
        self.member_body();
    }

    fn method_body(&mut self) {
        self.parse_type(TypeMode::Decl);
        self.expect(Ident);
        if self.at(Lt) {
            self.type_parameter_list();
        }
        self.parameter_list();
        if self.at_contextual("where") {
            self.error("type parameter constraints are not supported");
        }
        self.member_body();
    }

    /// Block, `=> expr;` or `;`.
    fn member_body(&mut self) {
        match self.current() {
            LBrace => self.block(),
            FatArrow => {
                self.arrow_clause();
                self.expect(Semicolon);
            }
            _ => {
                self.expect(Semicolon);
            }
        }
    }

    fn arrow_clause(&mut self) {
        self.start(ArrowClause);
        self.bump();
        self.expression();
        self.finish();
    }

    fn property_body(&mut self) {
        self.parse_type(TypeMode::Decl);
        self.expect(Ident);
        if self.at(FatArrow) {
            self.arrow_clause();
            self.expect(Semicolon);
            return;
        }
        self.start(AccessorList);
        self.expect(LBrace);
        while !self.at(RBrace) && !self.at(EndOfFile) {
            let before = self.pos;
            self.accessor();
            if self.pos == before {
                self.recover("expected accessor");
            }
        }
        self.expect(RBrace);
        self.finish();
        if self.at(Eq) {
            self.equals_value();
            self.expect(Semicolon);
        }
    }

    fn accessor(&mut self) {
        let mut index = self.pos;
        while self.kind_at(index) == LBracket {
            match self.skip_balanced(index) {
                Some(end) => index = end,
                None => break,
            }
        }
        while self.kind_at(index).is_modifier() {
            index += 1;
        }
        if !(self.kind_at(index) == Ident && matches!(self.text_at(index), "get" | "set" | "init")) {
            return;
        }
        self.start(Accessor);
        self.attributes();
        while self.current().is_modifier() {
            self.bump();
        }
        self.bump();
        self.member_body();
        self.finish();
    }

    fn parameter_list(&mut self) {
        self.start(ParameterList);
        if self.expect(LParen) {
            if !self.at(RParen) {
                loop {
                    self.parameter();
                    if !self.eat(Comma) {
                        break;
                    }
                }
            }
            self.expect(RParen);
        }
        self.finish();
    }

    fn parameter(&mut self) {
        self.start(Parameter);
        self.attributes();
        while matches!(self.current(), RefKw | OutKw | InKw | ParamsKw | ThisKw) {
            self.bump();
        }
        self.parse_type(TypeMode::Decl);
        self.expect(Ident);
        if self.at(Eq) {
            self.equals_value();
        }
        self.finish();
    }

    fn equals_value(&mut self) {
        self.start(EqualsValueClause);
        self.bump();
        if self.at(LBrace) {
            self.initializer();
        } else {
            self.expression();
        }
        self.finish();
    }

    /// `Type a = 1, b` without the terminating semicolon.
    fn variable_declaration(&mut self) {
        self.start(VariableDeclaration);
        self.parse_type(TypeMode::Decl);
        loop {
            self.start(VariableDeclarator);
            self.expect(Ident);
            if self.at(Eq) {
                self.equals_value();
            }
            self.finish();
            if !self.eat(Comma) {
                break;
            }
        }
        self.finish();
    }

    // ---- types ------------------------------------------------------------

    fn name_type(&mut self) {
        self.start(NameType);
        self.expect(Ident);
        loop {
            if self.at(Lt) {
                self.type_argument_list();
            }
            if self.at(Dot) && self.nth(1) == Ident {
                self.bump();
                self.bump();
            } else {
                break;
            }
        }
        self.finish();
    }

    fn type_argument_list(&mut self) {
        self.start(TypeArgumentList);
        self.bump();
        loop {
            self.parse_type(TypeMode::Decl);
            if !self.eat(Comma) {
                break;
            }
        }
        self.expect(Gt);
        self.finish();
    }

    fn parse_type(&mut self, mode: TypeMode) {
        self.parse_type_inner(mode, true);
    }

    fn parse_type_inner(&mut self, mode: TypeMode, arrays: bool) {
        let checkpoint = self.checkpoint();
        if self.current().is_predefined_type() {
            self.start(PredefinedType);
            self.bump();
            self.finish();
        } else if self.at(Ident) {
            self.name_type();
        } else {
            self.error(format!("expected type, found {}", self.current()));
            return;
        }
        if self.at(Question) && self.nullable_allowed(self.pos, mode) {
            self.start_at(checkpoint, NullableType);
            self.bump();
            self.finish();
        }
        while arrays && self.at(LBracket) && matches!(self.nth(1), RBracket | Comma) {
            self.start_at(checkpoint, ArrayType);
            self.bump();
            while self.eat(Comma) {}
            self.expect(RBracket);
            self.finish();
        }
    }

    // ---- statements ---------------------------------------------------------

    fn block(&mut self) {
        self.start(Block);
        self.expect(LBrace);
        self.statements_until(|p| p.at(RBrace));
        self.expect(RBrace);
        self.finish();
    }

    fn statements_until(&mut self, stop: impl Fn(&Parser) -> bool) {
        while !stop(self) && !self.at(EndOfFile) {
            let before = self.pos;
            self.statement();
            if self.pos == before {
                self.recover("expected statement");
            }
        }
    }

    fn statement(&mut self) {
        match self.current() {
            LBrace => self.block(),
            Semicolon => {
                self.start(EmptyStmt);
                self.bump();
                self.finish();
            }
            IfKw => self.if_statement(),
            WhileKw => {
                self.start(WhileStmt);
                self.bump();
                self.parenthesized_condition();
                self.embedded_statement();
                self.finish();
            }
            DoKw => {
                self.start(DoStmt);
                self.bump();
                self.embedded_statement();
                self.expect(WhileKw);
                self.parenthesized_condition();
                self.expect(Semicolon);
                self.finish();
            }
            ForKw => self.for_statement(),
            ForeachKw => self.foreach_statement(),
            SwitchKw => self.switch_statement(),
            GotoKw => self.goto_statement(),
            BreakKw => self.keyword_statement(BreakStmt),
            ContinueKw => self.keyword_statement(ContinueStmt),
            ReturnKw => self.expression_tail_statement(ReturnStmt),
            ThrowKw => self.expression_tail_statement(ThrowStmt),
            TryKw => self.try_statement(),
            Ident if self.nth(1) == Colon => {
                self.start(LabeledStmt);
                self.bump();
                self.bump();
                self.statement();
                self.finish();
            }
            ConstKw => {
                self.start(LocalDeclStmt);
                self.bump();
                self.variable_declaration();
                self.expect(Semicolon);
                self.finish();
            }
            _ if self.at_local_declaration() => {
                self.start(LocalDeclStmt);
                self.variable_declaration();
                self.expect(Semicolon);
                self.finish();
            }
            RBrace | EndOfFile => {}
            _ => {
                self.start(ExprStmt);
                self.expression();
                self.expect(Semicolon);
                self.finish();
            }
        }
    }

    fn embedded_statement(&mut self) {
        if matches!(self.current(), RBrace | EndOfFile) {
            self.error("expected statement");
            return;
        }
        let before = self.pos;
        self.statement();
        if self.pos == before {
            self.recover("expected statement");
        }
    }

    fn parenthesized_condition(&mut self) {
        self.expect(LParen);
        self.expression();
        self.expect(RParen);
    }

    fn if_statement(&mut self) {
        self.start(IfStmt);
        self.bump();
        self.parenthesized_condition();
        self.embedded_statement();
        if self.at(ElseKw) {
            self.start(ElseClause);
            self.bump();
            self.embedded_statement();
            self.finish();
        }
        self.finish();
    }

    fn for_statement(&mut self) {
        self.start(ForStmt);
        self.bump();
        self.expect(LParen);
        if !self.at(Semicolon) {
            if self.at_local_declaration() {
                self.variable_declaration();
            } else {
                self.expression_list(Semicolon);
            }
        }
        self.expect(Semicolon);
        if !self.at(Semicolon) {
            self.expression();
        }
        self.expect(Semicolon);
        if !self.at(RParen) {
            self.expression_list(RParen);
        }
        self.expect(RParen);
        self.embedded_statement();
        self.finish();
    }

    fn expression_list(&mut self, close: SyntaxKind) {
        loop {
            self.expression();
            if self.at(close) || !self.eat(Comma) {
                break;
            }
        }
    }

    fn foreach_statement(&mut self) {
        self.start(ForeachStmt);
        self.bump();
        self.expect(LParen);
        self.parse_type(TypeMode::Decl);
        self.expect(Ident);
        self.expect(InKw);
        self.expression();
        self.expect(RParen);
        self.embedded_statement();
        self.finish();
    }

    fn switch_statement(&mut self) {
        self.start(SwitchStmt);
        self.bump();
        self.parenthesized_condition();
        if self.expect(LBrace) {
            while matches!(self.current(), CaseKw | DefaultKw) {
                self.switch_section();
            }
            if !self.at(RBrace) {
                self.error("expected case or default label");
            }
            self.expect(RBrace);
        }
        self.finish();
    }

    fn at_switch_label(&self) -> bool {
        self.at(CaseKw) || (self.at(DefaultKw) && self.nth(1) == Colon)
    }

    fn switch_section(&mut self) {
        self.start(SwitchSection);
        while self.at_switch_label() {
            if self.at(CaseKw) {
                self.start(CaseLabel);
                self.bump();
                self.expression();
                if self.at_contextual("when") {
                    self.error("case guards are not supported");
                }
                self.expect(Colon);
            } else {
                self.start(DefaultLabel);
                self.bump();
                self.bump();
            }
            self.finish();
        }
        self.statements_until(|p| p.at(RBrace) || p.at_switch_label());
        self.finish();
    }

    fn goto_statement(&mut self) {
        self.start(GotoStmt);
        self.bump();
        match self.current() {
            CaseKw => {
                self.bump();
                self.expression();
            }
            DefaultKw => self.bump(),
            _ => {
                self.expect(Ident);
            }
        }
        self.expect(Semicolon);
        self.finish();
    }

    fn keyword_statement(&mut self, kind: SyntaxKind) {
        self.start(kind);
        self.bump();
        self.expect(Semicolon);
        self.finish();
    }

    fn expression_tail_statement(&mut self, kind: SyntaxKind) {
        self.start(kind);
        self.bump();
        if !self.at(Semicolon) {
            self.expression();
        }
        self.expect(Semicolon);
        self.finish();
    }

    fn try_statement(&mut self) {
        self.start(TryStmt);
        self.bump();
        self.block();
        while self.at(CatchKw) {
            self.start(CatchClause);
            self.bump();
            if self.eat(LParen) {
                self.parse_type(TypeMode::Decl);
                self.eat(Ident);
                self.expect(RParen);
            }
            self.block();
            self.finish();
        }
        if self.at(FinallyKw) {
            self.start(FinallyClause);
            self.bump();
            self.block();
            self.finish();
        }
        self.finish();
    }

    // ---- expressions --------------------------------------------------------

    fn expression(&mut self) {
        if self.at_lambda() {
            self.lambda();
            return;
        }
        let checkpoint = self.checkpoint();
        self.conditional();
        let compound_shift = matches!((self.current(), self.nth(1)), (Gt, GtEq) | (Lt, LtEq))
            && self.adjacent(self.pos + 1);
        if self.current().is_assignment_operator() || compound_shift {
            self.start_at(checkpoint, AssignmentExpr);
            self.bump();
            if compound_shift {
                self.bump();
            }
            self.expression();
            self.finish();
        }
    }

    fn lambda(&mut self) {
        self.start(LambdaExpr);
        if self.at(Ident) {
            self.start(Parameter);
            self.bump();
            self.finish();
        } else {
            self.start(ParameterList);
            self.bump();
            if !self.at(RParen) {
                loop {
                    self.start(Parameter);
                    if self.at(Ident) && matches!(self.nth(1), Comma | RParen) {
                        self.bump();
                    } else {
                        while matches!(self.current(), RefKw | OutKw | InKw) {
                            self.bump();
                        }
                        self.parse_type(TypeMode::Decl);
                        self.expect(Ident);
                    }
                    self.finish();
                    if !self.eat(Comma) {
                        break;
                    }
                }
            }
            self.expect(RParen);
            self.finish();
        }
        self.expect(FatArrow);
        if self.at(LBrace) {
            self.block();
        } else {
            self.expression();
        }
        self.finish();
    }

    fn conditional(&mut self) {
        let checkpoint = self.checkpoint();
        self.binary(1);
        if self.at(Question) {
            self.start_at(checkpoint, ConditionalExpr);
            self.bump();
            self.expression();
            self.expect(Colon);
            self.expression();
            self.finish();
        }
    }

    /// Current binary operator as `(precedence, token count, right assoc)`.
    fn binary_operator(&self) -> Option<(u8, usize, bool)> {
        let op = match self.current() {
            // `a >>= b` and `a <<= b` are assignments
            Gt if self.nth(1) == GtEq && self.adjacent(self.pos + 1) => return None,
            Lt if self.nth(1) == LtEq && self.adjacent(self.pos + 1) => return None,
            QuestionQuestion => (1, 1, true),
            PipePipe => (2, 1, false),
            AmpAmp => (3, 1, false),
            Pipe => (4, 1, false),
            Caret => (5, 1, false),
            Amp => (6, 1, false),
            EqEq | BangEq => (7, 1, false),
            Gt if self.nth(1) == Gt && self.adjacent(self.pos + 1) => (9, 2, false),
            Lt if self.nth(1) == Lt && self.adjacent(self.pos + 1) => (9, 2, false),
            Lt | Gt | LtEq | GtEq | IsKw | AsKw => (8, 1, false),
            Plus | Minus => (10, 1, false),
            Star | Slash | Percent => (11, 1, false),
            _ => return None,
        };
        Some(op)
    }

    fn binary(&mut self, min_precedence: u8) {
        let checkpoint = self.checkpoint();
        self.unary();
        while let Some((precedence, width, right_assoc)) = self.binary_operator() {
            if precedence < min_precedence {
                break;
            }
            match self.current() {
                AsKw => {
                    self.start_at(checkpoint, AsExpr);
                    self.bump();
                    self.parse_type(TypeMode::AsIs);
                    self.finish();
                }
                IsKw => {
                    self.start_at(checkpoint, IsExpr);
                    self.bump();
                    if self.current().is_literal() {
                        self.unary();
                    } else {
                        self.parse_type(TypeMode::AsIs);
                        if self.at(Ident) && !self.at_contextual("when") {
                            self.bump();
                        }
                    }
                    self.finish();
                }
                _ => {
                    self.start_at(checkpoint, BinaryExpr);
                    for _ in 0..width {
                        self.bump();
                    }
                    let next = if right_assoc { precedence } else { precedence + 1 };
                    self.binary(next);
                    self.finish();
                }
            }
        }
    }

    fn unary(&mut self) {
        match self.current() {
            Plus | Minus | Bang | Tilde | PlusPlus | MinusMinus => {
                self.start(PrefixUnaryExpr);
                self.bump();
                self.unary();
                self.finish();
            }
            LParen if self.at_cast() => {
                self.start(CastExpr);
                self.bump();
                self.parse_type(TypeMode::Cast);
                self.expect(RParen);
                self.unary();
                self.finish();
            }
            _ => self.postfix(),
        }
    }

    fn postfix(&mut self) {
        let checkpoint = self.checkpoint();
        if !self.primary() {
            return;
        }
        loop {
            match self.current() {
                Dot => {
                    self.start_at(checkpoint, MemberAccessExpr);
                    self.bump();
                    self.expect(Ident);
                    if self.at(Lt) && self.at_generic_name() {
                        self.type_argument_list();
                    }
                    self.finish();
                }
                LParen => {
                    self.start_at(checkpoint, InvocationExpr);
                    self.argument_list();
                    self.finish();
                }
                LBracket => {
                    self.start_at(checkpoint, ElementAccessExpr);
                    self.bracketed_argument_list();
                    self.finish();
                }
                PlusPlus | MinusMinus => {
                    self.start_at(checkpoint, PostfixUnaryExpr);
                    self.bump();
                    self.finish();
                }
                _ => break,
            }
        }
    }

    /// Returns false when no expression could be started.
    fn primary(&mut self) -> bool {
        let kind = self.current();
        match kind {
            _ if kind.is_literal() => {
                self.start(LiteralExpr);
                self.bump();
                self.finish();
            }
            Ident => {
                self.start(NameExpr);
                self.bump();
                if self.at(Lt) && self.at_generic_name() {
                    self.type_argument_list();
                }
                self.finish();
            }
            _ if kind.is_predefined_type() => {
                self.start(PredefinedType);
                self.bump();
                self.finish();
            }
            ThisKw => {
                self.start(ThisExpr);
                self.bump();
                self.finish();
            }
            BaseKw => {
                self.start(BaseExpr);
                self.bump();
                self.finish();
            }
            LParen => {
                self.start(ParenExpr);
                self.bump();
                self.expression();
                self.expect(RParen);
                self.finish();
            }
            NewKw => self.object_creation(),
            TypeofKw => {
                self.start(TypeofExpr);
                self.bump();
                self.expect(LParen);
                self.parse_type(TypeMode::Decl);
                self.expect(RParen);
                self.finish();
            }
            DefaultKw => {
                self.start(DefaultExpr);
                self.bump();
                if self.eat(LParen) {
                    self.parse_type(TypeMode::Decl);
                    self.expect(RParen);
                }
                self.finish();
            }
            RParen | RBrace | RBracket | Semicolon | Comma | EndOfFile => {
                self.error(format!("expected expression, found {kind}"));
                return false;
            }
            _ => {
                self.recover("expected expression");
                return false;
            }
        }
        true
    }

    fn object_creation(&mut self) {
        self.start(ObjectCreationExpr);
        self.bump();
        if !self.at(LParen) && !self.at(LBrace) {
            self.parse_type_inner(TypeMode::Decl, false);
        }
        match self.current() {
            LParen => self.argument_list(),
            LBracket if matches!(self.nth(1), RBracket | Comma) => {
                while self.at(LBracket) {
                    self.start(ArrayType);
                    self.bump();
                    while self.eat(Comma) {}
                    self.expect(RBracket);
                    self.finish();
                }
            }
            LBracket => self.bracketed_argument_list(),
            _ => {}
        }
        if self.at(LBrace) {
            self.initializer();
        }
        self.finish();
    }

    fn initializer(&mut self) {
        self.start(InitializerExpr);
        self.bump();
        while !self.at(RBrace) && !self.at(EndOfFile) {
            let before = self.pos;
            if self.at(LBrace) {
                self.initializer();
            } else {
                self.expression();
            }
            if !self.eat(Comma) {
                break;
            }
            if self.pos == before {
                break;
            }
        }
        self.expect(RBrace);
        self.finish();
    }

    fn argument_list(&mut self) {
        self.start(ArgumentList);
        self.bump();
        self.arguments(RParen);
        self.expect(RParen);
        self.finish();
    }

    fn bracketed_argument_list(&mut self) {
        self.start(BracketedArgumentList);
        self.bump();
        self.arguments(RBracket);
        self.expect(RBracket);
        self.finish();
    }

    fn arguments(&mut self, close: SyntaxKind) {
        if self.at(close) {
            return;
        }
        loop {
            self.start(Argument);
            if self.at(Ident) && self.nth(1) == Colon {
                self.bump();
                self.bump();
            }
            while matches!(self.current(), RefKw | OutKw | InKw) {
                self.bump();
            }
            self.expression();
            self.finish();
            if !self.eat(Comma) {
                break;
            }
        }
    }
}

fn starts_expression(kind: SyntaxKind) -> bool {
    kind == Ident
        || kind.is_literal()
        || kind.is_predefined_type()
        || matches!(
            kind,
            LParen | ThisKw | BaseKw | NewKw | TypeofKw | DefaultKw | Bang | Tilde | Minus
                | Plus | PlusPlus | MinusMinus
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SyntaxTree;
    use pretty_assertions::assert_eq;

    fn parse_ok(source: &str) -> SyntaxTree {
        let parsed = parse(source);
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        assert_eq!(parsed.tree.text(), source);
        parsed.tree
    }

    fn kinds_of(tree: &SyntaxTree, kind: SyntaxKind) -> Vec<String> {
        tree.descendants(tree.root())
            .filter(|n| tree.kind(*n) == kind)
            .map(|n| tree.node_text(n))
            .collect()
    }

    #[test]
    fn test_members() {
        let tree = parse_ok(
            "using System;\nusing static System.DayOfWeek;\nnamespace N {\n  [Serializable]\n  public partial class C<T> : Base, IDisposable {\n    private int _x = 1, _y;\n    public int P { get; private set; } = 3;\n    public C() : base(1) { }\n    public override bool Equals(object o) => false;\n    public static implicit operator int(C c) { return 0; }\n  }\n  enum Color { Red, Green = 2, }\n}\n",
        );
        assert_eq!(kinds_of(&tree, ClassDecl).len(), 1);
        assert_eq!(kinds_of(&tree, FieldDecl), vec!["private int _x = 1, _y;"]);
        assert_eq!(kinds_of(&tree, Accessor), vec!["get;", "private set;"]);
        assert_eq!(kinds_of(&tree, ConstructorInitializer), vec![": base(1)"]);
        assert_eq!(kinds_of(&tree, ConversionOperatorDecl).len(), 1);
        assert_eq!(kinds_of(&tree, EnumMember), vec!["Red", "Green = 2"]);
        assert_eq!(kinds_of(&tree, UsingDirective).len(), 2);
    }

    #[test]
    fn test_casts_and_conversions() {
        let tree = parse_ok(
            "class C { void M() { var a = (int)x; var b = (a) + 1; var c = o as int?; var d = (T)(y); var e = x is int ? 1 : 2; var f = o as string ?? \"\"; } }",
        );
        assert_eq!(kinds_of(&tree, CastExpr), vec!["(int)x", "(T)(y)"]);
        assert_eq!(kinds_of(&tree, AsExpr), vec!["o as int?", "o as string"]);
        assert_eq!(kinds_of(&tree, ConditionalExpr), vec!["x is int ? 1 : 2"]);
        assert_eq!(kinds_of(&tree, NullableType), vec!["int?"]);
    }

    #[test]
    fn test_generics_and_lambdas() {
        let tree = parse_ok(
            "class C { void M() { IEnumerable<List<int>> xs = new List<List<int>>(); var n = F<int>(1); var g = a < b; Func<int, int> f = x => x + 1; Action h = () => { }; } }",
        );
        assert_eq!(kinds_of(&tree, LambdaExpr), vec!["x => x + 1", "() => { }"]);
        assert_eq!(
            kinds_of(&tree, BinaryExpr),
            vec!["a < b", "x + 1"]
        );
        assert_eq!(kinds_of(&tree, LocalDeclStmt).len(), 5);
    }

    #[test]
    fn test_statements() {
        let tree = parse_ok(
            "class C { void M() {\n  for (int i = 0; i < 10; i++) { }\n  foreach (var x in xs) continue;\n  while (true) break;\n  do { } while (false);\n  switch (c) { case 1: case 2: goto default; default: goto case 1; }\n  label: goto label;\n  try { } catch (Exception e) { throw; } finally { }\n  if (false) return; else ;\n} }",
        );
        assert_eq!(kinds_of(&tree, GotoStmt).len(), 3);
        assert_eq!(kinds_of(&tree, CaseLabel), vec!["case 1:", "case 2:"]);
        assert_eq!(kinds_of(&tree, DefaultLabel), vec!["default:"]);
        assert_eq!(kinds_of(&tree, SwitchSection).len(), 2);
        assert_eq!(kinds_of(&tree, ElseClause), vec!["else ;"]);
        assert_eq!(kinds_of(&tree, LabeledStmt), vec!["label: goto label;"]);
    }

    #[test]
    fn test_precedence() {
        let tree = parse_ok("class C { bool M() => a || b && c == d + e * f; }");
        let binaries = kinds_of(&tree, BinaryExpr);
        assert_eq!(binaries[0], "a || b && c == d + e * f");
        assert_eq!(binaries[1], "b && c == d + e * f");
        assert_eq!(binaries.last().map(String::as_str), Some("e * f"));
    }

    #[test]
    fn test_errors_still_round_trip() {
        let source = "class C { void M() { x = ; } #}";
        let parsed = parse(source);
        assert!(!parsed.errors.is_empty());
        assert_eq!(parsed.tree.text(), source);
    }
}

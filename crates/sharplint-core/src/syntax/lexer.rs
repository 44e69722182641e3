//! Lossless lexer.
//!
//! Every byte of the input ends up either in a token's text or in its
//! leading/trailing trivia. A token's trailing trivia runs up to and
//! including the first end-of-line after it.

use super::kind::SyntaxKind;
use super::text::{Span, Trivia, TriviaKind};
use super::ParseError;

#[derive(Debug, Clone)]
pub struct LexedToken {
    pub kind: SyntaxKind,
    pub text: String,
    pub leading: Vec<Trivia>,
    pub trailing: Vec<Trivia>,
    pub span: Span,
}

/// Lexes the whole input. The last token is always `EndOfFile` and carries
/// whatever trivia remains at the end of the file.
pub fn lex(source: &str) -> (Vec<LexedToken>, Vec<ParseError>) {
    let mut lexer = Lexer { src: source, pos: 0, errors: Vec::new() };
    let mut tokens = Vec::new();
    loop {
        let leading = lexer.trivia(false);
        let start = lexer.pos;
        let kind = lexer.token_kind();
        let text = source[start..lexer.pos].to_string();
        let trailing = if kind == SyntaxKind::EndOfFile {
            Vec::new()
        } else {
            lexer.trivia(true)
        };
        let done = kind == SyntaxKind::EndOfFile;
        tokens.push(LexedToken {
            kind,
            text,
            leading,
            trailing,
            span: Span::new(start, lexer.pos.max(start)),
        });
        if done {
            break;
        }
    }
    (tokens, lexer.errors)
}

struct Lexer<'s> {
    src: &'s str,
    pos: usize,
    errors: Vec<ParseError>,
}

impl<'s> Lexer<'s> {
    fn rest(&self) -> &'s str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
    }

    fn error(&mut self, message: impl Into<String>, start: usize) {
        self.errors.push(ParseError {
            message: message.into(),
            span: Span::new(start, self.pos),
        });
    }

    fn trivia(&mut self, trailing: bool) -> Vec<Trivia> {
        let mut out = Vec::new();
        loop {
            let start = self.pos;
            let rest = self.rest();
            let kind = match self.peek() {
                Some(' ' | '\t' | '\u{feff}' | '\u{0b}' | '\u{0c}') => {
                    self.eat_while(|c| matches!(c, ' ' | '\t' | '\u{feff}' | '\u{0b}' | '\u{0c}'));
                    TriviaKind::Whitespace
                }
                Some('\r') if rest.starts_with("\r\n") => {
                    self.pos += 2;
                    TriviaKind::EndOfLine
                }
                Some('\n' | '\r') => {
                    self.bump();
                    TriviaKind::EndOfLine
                }
                Some('/') if rest.starts_with("//") => {
                    self.eat_while(|c| c != '\n' && c != '\r');
                    TriviaKind::LineComment
                }
                Some('/') if rest.starts_with("/*") => {
                    match rest[2..].find("*/") {
                        Some(end) => self.pos += end + 4,
                        None => {
                            self.pos = self.src.len();
                            self.error("unterminated block comment", start);
                        }
                    }
                    TriviaKind::BlockComment
                }
                _ => break,
            };
            let text = &self.src[start..self.pos];
            let doc = match kind {
                TriviaKind::LineComment => text.starts_with("///") && !text.starts_with("////"),
                TriviaKind::BlockComment => text.starts_with("/**") && text != "/**/",
                _ => false,
            };
            out.push(Trivia { kind, text: text.to_string(), doc });
            if trailing && kind == TriviaKind::EndOfLine {
                break;
            }
        }
        out
    }

    fn token_kind(&mut self) -> SyntaxKind {
        let start = self.pos;
        let Some(c) = self.bump() else {
            return SyntaxKind::EndOfFile;
        };
        match c {
            c if c == '_' || c.is_alphabetic() => {
                self.eat_while(|c| c == '_' || c.is_alphanumeric());
                SyntaxKind::from_keyword(&self.src[start..self.pos]).unwrap_or(SyntaxKind::Ident)
            }
            '@' if self.peek() == Some('"') => {
                self.bump();
                self.verbatim_string(start)
            }
            '@' if self.peek().is_some_and(|c| c == '_' || c.is_alphabetic()) => {
                self.eat_while(|c| c == '_' || c.is_alphanumeric());
                SyntaxKind::Ident
            }
            '$' if self.rest().starts_with('"') => {
                self.bump();
                self.interpolated_string(start, false)
            }
            '$' if self.rest().starts_with("@\"") => {
                self.pos += 2;
                self.interpolated_string(start, true)
            }
            '@' if self.rest().starts_with("$\"") => {
                self.pos += 2;
                self.interpolated_string(start, true)
            }
            '"' => self.regular_string(start),
            '\'' => self.char_literal(start),
            '0'..='9' => self.number(c),
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => self.number('.'),
            _ => self.punctuation(c, start),
        }
    }

    fn regular_string(&mut self, start: usize) -> SyntaxKind {
        loop {
            match self.bump() {
                Some('\\') => {
                    self.bump();
                }
                Some('"') => return SyntaxKind::StringLiteral,
                Some('\n') | None => {
                    self.error("unterminated string literal", start);
                    return SyntaxKind::StringLiteral;
                }
                Some(_) => {}
            }
        }
    }

    fn verbatim_string(&mut self, start: usize) -> SyntaxKind {
        loop {
            match self.bump() {
                Some('"') if self.peek() == Some('"') => {
                    self.bump();
                }
                Some('"') => return SyntaxKind::StringLiteral,
                None => {
                    self.error("unterminated verbatim string", start);
                    return SyntaxKind::StringLiteral;
                }
                Some(_) => {}
            }
        }
    }

    fn interpolated_string(&mut self, start: usize, verbatim: bool) -> SyntaxKind {
        let mut depth = 0usize;
        loop {
            match self.bump() {
                Some('{') if depth == 0 && self.peek() == Some('{') => {
                    self.bump();
                }
                Some('}') if depth == 0 && self.peek() == Some('}') => {
                    self.bump();
                }
                Some('{') => depth += 1,
                Some('}') if depth > 0 => depth -= 1,
                Some('"') if depth > 0 => {
                    let nested = self.pos - 1;
                    self.regular_string(nested);
                }
                Some('\\') if !verbatim && depth == 0 => {
                    self.bump();
                }
                Some('"') if verbatim && self.peek() == Some('"') => {
                    self.bump();
                }
                Some('"') => return SyntaxKind::StringLiteral,
                Some('\n') if !verbatim && depth == 0 => {
                    self.error("unterminated interpolated string", start);
                    return SyntaxKind::StringLiteral;
                }
                None => {
                    self.error("unterminated interpolated string", start);
                    return SyntaxKind::StringLiteral;
                }
                Some(_) => {}
            }
        }
    }

    fn char_literal(&mut self, start: usize) -> SyntaxKind {
        loop {
            match self.bump() {
                Some('\\') => {
                    self.bump();
                }
                Some('\'') => return SyntaxKind::CharLiteral,
                Some('\n') | None => {
                    self.error("unterminated character literal", start);
                    return SyntaxKind::CharLiteral;
                }
                Some(_) => {}
            }
        }
    }

    fn number(&mut self, first: char) -> SyntaxKind {
        let mut real = first == '.';
        if first == '0' && matches!(self.peek(), Some('x' | 'X' | 'b' | 'B')) {
            self.bump();
            self.eat_while(|c| c.is_ascii_hexdigit() || c == '_');
            self.integer_suffix();
            return SyntaxKind::IntLiteral;
        }
        self.eat_while(|c| c.is_ascii_digit() || c == '_');
        if !real
            && self.peek() == Some('.')
            && self.peek_at(1).is_some_and(|c| c.is_ascii_digit())
        {
            real = true;
            self.bump();
            self.eat_while(|c| c.is_ascii_digit() || c == '_');
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let signed = matches!(self.peek_at(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                real = true;
                self.pos += digit_at;
                self.eat_while(|c| c.is_ascii_digit());
            }
        }
        match self.peek() {
            Some('f' | 'F' | 'd' | 'D' | 'm' | 'M') => {
                self.bump();
                SyntaxKind::RealLiteral
            }
            _ if real => SyntaxKind::RealLiteral,
            _ => {
                self.integer_suffix();
                SyntaxKind::IntLiteral
            }
        }
    }

    fn integer_suffix(&mut self) {
        for _ in 0..2 {
            if matches!(self.peek(), Some('u' | 'U' | 'l' | 'L')) {
                self.bump();
            }
        }
    }

    fn punctuation(&mut self, c: char, start: usize) -> SyntaxKind {
        use SyntaxKind::*;
        let next = self.peek();
        let (kind, extra) = match (c, next) {
            ('(', _) => (LParen, 0),
            (')', _) => (RParen, 0),
            ('{', _) => (LBrace, 0),
            ('}', _) => (RBrace, 0),
            ('[', _) => (LBracket, 0),
            (']', _) => (RBracket, 0),
            (';', _) => (Semicolon, 0),
            (',', _) => (Comma, 0),
            ('.', _) => (Dot, 0),
            (':', _) => (Colon, 0),
            ('?', Some('?')) if self.peek_at(1) == Some('=') => (QuestionQuestionEq, 2),
            ('?', Some('?')) => (QuestionQuestion, 1),
            ('?', _) => (Question, 0),
            ('=', Some('=')) => (EqEq, 1),
            ('=', Some('>')) => (FatArrow, 1),
            ('=', _) => (Eq, 0),
            ('!', Some('=')) => (BangEq, 1),
            ('!', _) => (Bang, 0),
            ('<', Some('=')) => (LtEq, 1),
            ('<', _) => (Lt, 0),
            // `>>` is two tokens so nested type argument lists close cleanly
            ('>', Some('=')) => (GtEq, 1),
            ('>', _) => (Gt, 0),
            ('+', Some('+')) => (PlusPlus, 1),
            ('+', Some('=')) => (PlusEq, 1),
            ('+', _) => (Plus, 0),
            ('-', Some('-')) => (MinusMinus, 1),
            ('-', Some('=')) => (MinusEq, 1),
            ('-', _) => (Minus, 0),
            ('*', Some('=')) => (StarEq, 1),
            ('*', _) => (Star, 0),
            ('/', Some('=')) => (SlashEq, 1),
            ('/', _) => (Slash, 0),
            ('%', Some('=')) => (PercentEq, 1),
            ('%', _) => (Percent, 0),
            ('~', _) => (Tilde, 0),
            ('&', Some('&')) => (AmpAmp, 1),
            ('&', Some('=')) => (AmpEq, 1),
            ('&', _) => (Amp, 0),
            ('|', Some('|')) => (PipePipe, 1),
            ('|', Some('=')) => (PipeEq, 1),
            ('|', _) => (Pipe, 0),
            ('^', Some('=')) => (CaretEq, 1),
            ('^', _) => (Caret, 0),
            _ => {
                self.error(format!("unexpected character {c:?}"), start);
                return Unknown;
            }
        };
        self.pos += extra;
        kind
    }
}

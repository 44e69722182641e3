/*!
# Syntax Model

Lossless, immutable syntax trees stored in a single arena per parse.

- `SyntaxTree`: nodes and tokens addressed by `NodeId`/`TokenId` handles
- `TreeBuilder`: incremental construction, shared by the parser and the rewriter
- `Fragment`: detached subtrees used as fix payloads
- `lexer`/`parser`: the reference frontend for the supported language subset

Printing every token of a tree together with its trivia reproduces the
source byte for byte, so a rewritten tree can be handed back as text.
*/

pub mod builder;
pub mod fragment;
pub mod kind;
pub mod lexer;
pub mod parser;
pub mod text;
pub mod tree;

pub use builder::{Checkpoint, TreeBuilder};
pub use fragment::{Fragment, TokenFragment};
pub use kind::SyntaxKind;
pub use parser::parse;
pub use text::{line_indent, trivia_text, without_comments, LineCol, LineIndex, Span, Trivia, TriviaKind};
pub use tree::{Element, NodeId, SyntaxTree, TokenData, TokenId, TreeId};

use serde::Serialize;
use thiserror::Error;

/// A lexing or parsing problem at a location in the source.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{message} at {span}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

/// Output of the reference frontend. The tree is always complete; `errors`
/// lists everything that fell outside the supported subset.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub tree: SyntaxTree,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

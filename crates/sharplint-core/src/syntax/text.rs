//! Spans, trivia and line/column mapping.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Half-open byte range `[start, end)` into a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} past end {end}");
        Self { start, end }
    }

    pub fn empty(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True when the two ranges share at least one byte. Empty spans never
    /// overlap anything.
    pub fn overlaps(&self, other: Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn cover(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriviaKind {
    Whitespace,
    EndOfLine,
    LineComment,
    BlockComment,
}

/// Non-semantic text attached to a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Trivia {
    pub kind: TriviaKind,
    pub text: String,
    /// `///` and `/** */` comments.
    pub doc: bool,
}

impl Trivia {
    pub fn whitespace(text: impl Into<String>) -> Self {
        Self { kind: TriviaKind::Whitespace, text: text.into(), doc: false }
    }

    pub fn end_of_line(text: impl Into<String>) -> Self {
        Self { kind: TriviaKind::EndOfLine, text: text.into(), doc: false }
    }

    pub fn space() -> Self {
        Self::whitespace(" ")
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, TriviaKind::LineComment | TriviaKind::BlockComment)
    }

    pub fn is_end_of_line(&self) -> bool {
        self.kind == TriviaKind::EndOfLine
    }
}

pub fn trivia_len(trivia: &[Trivia]) -> usize {
    trivia.iter().map(|t| t.text.len()).sum()
}

pub fn trivia_text(trivia: &[Trivia]) -> String {
    trivia.iter().map(|t| t.text.as_str()).collect()
}

/// Whitespace following the last end-of-line: the indentation of the token
/// these trivia lead.
pub fn line_indent(trivia: &[Trivia]) -> Vec<Trivia> {
    let start = trivia.iter().rposition(Trivia::is_end_of_line).map_or(0, |i| i + 1);
    trivia[start..]
        .iter()
        .filter(|t| t.kind == TriviaKind::Whitespace)
        .cloned()
        .collect()
}

/// Trailing trivia with comments removed. Whitespace that only separated a
/// comment goes with it; a run that loses everything becomes one space.
pub fn without_comments(trivia: &[Trivia]) -> Vec<Trivia> {
    if !trivia.iter().any(Trivia::is_comment) {
        return trivia.to_vec();
    }
    let kept: Vec<Trivia> = trivia.iter().filter(|t| t.is_end_of_line()).cloned().collect();
    if kept.is_empty() {
        vec![Trivia::space()]
    } else {
        kept
    }
}

/// One-based line and column of a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
}

/// Precomputed line starts for offset to line/column conversion.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { line_starts }
    }

    pub fn line_col(&self, offset: usize) -> LineCol {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        LineCol {
            line: line + 1,
            column: offset - self.line_starts[line] + 1,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_relations() {
        let outer = Span::new(2, 10);
        assert!(outer.contains(Span::new(2, 10)));
        assert!(outer.contains(Span::new(4, 6)));
        assert!(!outer.contains(Span::new(1, 4)));
        assert!(outer.overlaps(Span::new(9, 12)));
        assert!(!outer.overlaps(Span::new(10, 12)));
        assert!(!outer.overlaps(Span::empty(5)));
        assert_eq!(outer.cover(Span::new(0, 3)), Span::new(0, 10));
    }

    #[test]
    fn test_line_index() {
        let index = LineIndex::new("ab\ncd\n\nx");
        assert_eq!(index.line_col(0), LineCol { line: 1, column: 1 });
        assert_eq!(index.line_col(4), LineCol { line: 2, column: 2 });
        assert_eq!(index.line_col(6), LineCol { line: 3, column: 1 });
        assert_eq!(index.line_col(7), LineCol { line: 4, column: 1 });
        assert_eq!(index.line_count(), 4);
    }
}

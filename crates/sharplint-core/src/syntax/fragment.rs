//! Detached subtrees used as replacement payloads.

use super::kind::SyntaxKind;
use super::text::Trivia;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenFragment {
    pub kind: SyntaxKind,
    pub text: String,
    pub leading: Vec<Trivia>,
    pub trailing: Vec<Trivia>,
}

/// An owned subtree not yet attached to any arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Node { kind: SyntaxKind, children: Vec<Fragment> },
    Token(TokenFragment),
}

impl Fragment {
    pub fn node(kind: SyntaxKind, children: Vec<Fragment>) -> Self {
        Fragment::Node { kind, children }
    }

    /// A token without trivia.
    pub fn token(kind: SyntaxKind, text: impl Into<String>) -> Self {
        Fragment::Token(TokenFragment {
            kind,
            text: text.into(),
            leading: Vec::new(),
            trailing: Vec::new(),
        })
    }

    pub fn kind(&self) -> SyntaxKind {
        match self {
            Fragment::Node { kind, .. } => *kind,
            Fragment::Token(token) => token.kind,
        }
    }

    pub fn with_leading(mut self, trivia: Vec<Trivia>) -> Self {
        if let Some(token) = self.first_token_mut() {
            token.leading = trivia;
        }
        self
    }

    pub fn with_trailing(mut self, trivia: Vec<Trivia>) -> Self {
        if let Some(token) = self.last_token_mut() {
            token.trailing = trivia;
        }
        self
    }

    pub fn first_token(&self) -> Option<&TokenFragment> {
        match self {
            Fragment::Token(token) => Some(token),
            Fragment::Node { children, .. } => children.iter().find_map(Fragment::first_token),
        }
    }

    pub fn last_token(&self) -> Option<&TokenFragment> {
        match self {
            Fragment::Token(token) => Some(token),
            Fragment::Node { children, .. } => {
                children.iter().rev().find_map(Fragment::last_token)
            }
        }
    }

    pub fn first_token_mut(&mut self) -> Option<&mut TokenFragment> {
        match self {
            Fragment::Token(token) => Some(token),
            Fragment::Node { children, .. } => {
                children.iter_mut().find_map(Fragment::first_token_mut)
            }
        }
    }

    pub fn last_token_mut(&mut self) -> Option<&mut TokenFragment> {
        match self {
            Fragment::Token(token) => Some(token),
            Fragment::Node { children, .. } => {
                children.iter_mut().rev().find_map(Fragment::last_token_mut)
            }
        }
    }

    /// Moves the outer trivia of the first and last tokens out of the
    /// fragment, returning `(leading, trailing)`.
    pub fn take_outer_trivia(&mut self) -> (Vec<Trivia>, Vec<Trivia>) {
        let leading = self
            .first_token_mut()
            .map(|t| std::mem::take(&mut t.leading))
            .unwrap_or_default();
        let trailing = self
            .last_token_mut()
            .map(|t| std::mem::take(&mut t.trailing))
            .unwrap_or_default();
        (leading, trailing)
    }

    /// The fragment with its outer trivia dropped.
    pub fn trimmed(mut self) -> Self {
        self.take_outer_trivia();
        self
    }

    pub fn text(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) {
        match self {
            Fragment::Token(token) => {
                token.leading.iter().for_each(|t| out.push_str(&t.text));
                out.push_str(&token.text);
                token.trailing.iter().for_each(|t| out.push_str(&t.text));
            }
            Fragment::Node { children, .. } => {
                children.iter().for_each(|c| c.write_text(out));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outer_trivia() {
        let mut fragment = Fragment::node(
            SyntaxKind::ParenExpr,
            vec![
                Fragment::token(SyntaxKind::LParen, "(").with_leading(vec![Trivia::space()]),
                Fragment::node(
                    SyntaxKind::NameExpr,
                    vec![Fragment::token(SyntaxKind::Ident, "x")],
                ),
                Fragment::token(SyntaxKind::RParen, ")")
                    .with_trailing(vec![Trivia::end_of_line("\n")]),
            ],
        );
        assert_eq!(fragment.text(), " (x)\n");
        let (leading, trailing) = fragment.take_outer_trivia();
        assert_eq!(leading, vec![Trivia::space()]);
        assert_eq!(trailing.len(), 1);
        assert_eq!(fragment.text(), "(x)");
        assert_eq!(fragment.first_token().map(|t| t.kind), Some(SyntaxKind::LParen));
    }
}

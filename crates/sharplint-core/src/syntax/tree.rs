//! Arena-backed immutable syntax tree.

use std::sync::atomic::{AtomicU64, Ordering};

use super::fragment::{Fragment, TokenFragment};
use super::kind::SyntaxKind;
use super::text::{trivia_len, Span, Trivia};

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// Snapshot identity. Every parse and every rewrite gets a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct TreeId(u64);

impl TreeId {
    pub(crate) fn fresh() -> Self {
        TreeId(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl TokenId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A child slot: either a nested node or a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Node(NodeId),
    Token(TokenId),
}

#[derive(Debug, Clone)]
pub struct NodeData {
    pub(crate) kind: SyntaxKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<Element>,
    /// Tokens of a node are contiguous in the token arena.
    pub(crate) first_token: u32,
    pub(crate) end_token: u32,
    /// Full start of the node; for empty nodes the position they sit at.
    pub(crate) offset: usize,
}

#[derive(Debug, Clone)]
pub struct TokenData {
    pub(crate) kind: SyntaxKind,
    pub(crate) text: String,
    pub(crate) leading: Vec<Trivia>,
    pub(crate) trailing: Vec<Trivia>,
    pub(crate) parent: NodeId,
    pub(crate) offset: usize,
}

impl TokenData {
    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn leading(&self) -> &[Trivia] {
        &self.leading
    }

    pub fn trailing(&self) -> &[Trivia] {
        &self.trailing
    }

    pub fn parent(&self) -> NodeId {
        self.parent
    }

    pub fn span(&self) -> Span {
        let start = self.offset + trivia_len(&self.leading);
        Span::new(start, start + self.text.len())
    }

    pub fn full_span(&self) -> Span {
        Span::new(
            self.offset,
            self.span().end + trivia_len(&self.trailing),
        )
    }

    pub fn has_comments(&self) -> bool {
        self.leading.iter().chain(&self.trailing).any(Trivia::is_comment)
    }
}

/// Immutable tree: one arena of nodes and one of tokens in source order.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub(crate) id: TreeId,
    pub(crate) nodes: Vec<NodeData>,
    pub(crate) tokens: Vec<TokenData>,
    pub(crate) root: NodeId,
}

impl SyntaxTree {
    pub fn id(&self) -> TreeId {
        self.id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn kind(&self, node: NodeId) -> SyntaxKind {
        self.nodes[node.index()].kind
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.index()].parent
    }

    pub fn children(&self, node: NodeId) -> &[Element] {
        &self.nodes[node.index()].children
    }

    pub fn child_nodes(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(node).iter().filter_map(|e| match e {
            Element::Node(n) => Some(*n),
            Element::Token(_) => None,
        })
    }

    pub fn child_tokens(&self, node: NodeId) -> impl Iterator<Item = TokenId> + '_ {
        self.children(node).iter().filter_map(|e| match e {
            Element::Token(t) => Some(*t),
            Element::Node(_) => None,
        })
    }

    pub fn child_of_kind(&self, node: NodeId, kind: SyntaxKind) -> Option<NodeId> {
        self.child_nodes(node).find(|n| self.kind(*n) == kind)
    }

    pub fn children_of_kind(
        &self,
        node: NodeId,
        kind: SyntaxKind,
    ) -> impl Iterator<Item = NodeId> + '_ {
        self.child_nodes(node).filter(move |n| self.kind(*n) == kind)
    }

    pub fn token_of_kind(&self, node: NodeId, kind: SyntaxKind) -> Option<TokenId> {
        self.child_tokens(node).find(|t| self.token(*t).kind == kind)
    }

    pub fn has_token(&self, node: NodeId, kind: SyntaxKind) -> bool {
        self.token_of_kind(node, kind).is_some()
    }

    /// Direct child nodes whose kind satisfies `pred`, in order.
    pub fn child_where(
        &self,
        node: NodeId,
        pred: impl Fn(SyntaxKind) -> bool,
    ) -> Option<NodeId> {
        self.child_nodes(node).find(|n| pred(self.kind(*n)))
    }

    /// Parent chain, nearest first, excluding `node` itself.
    pub fn ancestors(&self, node: NodeId) -> Ancestors<'_> {
        Ancestors { tree: self, next: self.parent(node) }
    }

    /// Preorder walk of all nodes below `node`, excluding `node`.
    pub fn descendants(&self, node: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.child_nodes(node).collect();
        stack.reverse();
        Descendants { tree: self, stack }
    }

    pub fn token(&self, token: TokenId) -> &TokenData {
        &self.tokens[token.index()]
    }

    pub fn tokens(&self, node: NodeId) -> impl Iterator<Item = TokenId> {
        let data = &self.nodes[node.index()];
        (data.first_token..data.end_token).map(TokenId)
    }

    pub fn all_tokens(&self) -> impl Iterator<Item = &TokenData> {
        self.tokens.iter()
    }

    pub fn first_token(&self, node: NodeId) -> Option<TokenId> {
        let data = &self.nodes[node.index()];
        (data.first_token < data.end_token).then_some(TokenId(data.first_token))
    }

    pub fn last_token(&self, node: NodeId) -> Option<TokenId> {
        let data = &self.nodes[node.index()];
        (data.first_token < data.end_token).then(|| TokenId(data.end_token - 1))
    }

    pub fn next_token(&self, token: TokenId) -> Option<TokenId> {
        let next = token.0 + 1;
        ((next as usize) < self.tokens.len()).then_some(TokenId(next))
    }

    pub fn prev_token(&self, token: TokenId) -> Option<TokenId> {
        token.0.checked_sub(1).map(TokenId)
    }

    /// Span of the node's token text, trivia excluded at both ends.
    pub fn span(&self, node: NodeId) -> Span {
        match (self.first_token(node), self.last_token(node)) {
            (Some(first), Some(last)) => {
                Span::new(self.token(first).span().start, self.token(last).span().end)
            }
            _ => Span::empty(self.nodes[node.index()].offset),
        }
    }

    pub fn full_span(&self, node: NodeId) -> Span {
        match (self.first_token(node), self.last_token(node)) {
            (Some(first), Some(last)) => Span::new(
                self.token(first).full_span().start,
                self.token(last).full_span().end,
            ),
            _ => Span::empty(self.nodes[node.index()].offset),
        }
    }

    /// Text of the node without its outer leading/trailing trivia.
    pub fn node_text(&self, node: NodeId) -> String {
        let (Some(first), Some(last)) = (self.first_token(node), self.last_token(node)) else {
            return String::new();
        };
        let mut out = String::new();
        for id in first.0..=last.0 {
            let token = &self.tokens[id as usize];
            if id != first.0 {
                token.leading.iter().for_each(|t| out.push_str(&t.text));
            }
            out.push_str(&token.text);
            if id != last.0 {
                token.trailing.iter().for_each(|t| out.push_str(&t.text));
            }
        }
        out
    }

    /// Full source text, byte for byte.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            token.leading.iter().for_each(|t| out.push_str(&t.text));
            out.push_str(&token.text);
            token.trailing.iter().for_each(|t| out.push_str(&t.text));
        }
        out
    }

    /// Finds the node with exactly this span and kind.
    pub fn find_node(&self, span: Span, kind: SyntaxKind) -> Option<NodeId> {
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            let node_span = self.span(node);
            if !node_span.contains(span) {
                continue;
            }
            if node_span == span && self.kind(node) == kind {
                return Some(node);
            }
            stack.extend(self.child_nodes(node));
        }
        None
    }

    /// Innermost node whose span contains the given offset.
    pub fn covering_node(&self, offset: usize) -> NodeId {
        let mut node = self.root;
        'descend: loop {
            for child in self.child_nodes(node) {
                let span = self.span(child);
                if span.start <= offset && offset < span.end {
                    node = child;
                    continue 'descend;
                }
            }
            return node;
        }
    }

    /// First identifier token directly under `node`.
    pub fn ident(&self, node: NodeId) -> Option<TokenId> {
        self.token_of_kind(node, SyntaxKind::Ident)
    }

    pub fn ident_text(&self, node: NodeId) -> Option<&str> {
        self.ident(node).map(|t| self.token(t).text())
    }

    /// Declared name of a declaration node: its last direct identifier, so
    /// contextual modifiers such as `partial` are skipped.
    pub fn name_token(&self, node: NodeId) -> Option<TokenId> {
        self.child_tokens(node)
            .filter(|t| self.token(*t).kind == SyntaxKind::Ident)
            .last()
    }

    pub fn name_text(&self, node: NodeId) -> Option<&str> {
        self.name_token(node).map(|t| self.token(t).text())
    }

    /// True if any trivia strictly inside the node is a comment.
    pub fn has_inner_comments(&self, node: NodeId) -> bool {
        let (Some(first), Some(last)) = (self.first_token(node), self.last_token(node)) else {
            return false;
        };
        (first.0..=last.0).any(|id| {
            let token = &self.tokens[id as usize];
            (id != first.0 && token.leading.iter().any(Trivia::is_comment))
                || (id != last.0 && token.trailing.iter().any(Trivia::is_comment))
        })
    }

    /// Deep copy of a subtree, trivia included.
    pub fn to_fragment(&self, node: NodeId) -> Fragment {
        let children = self
            .children(node)
            .iter()
            .map(|element| match element {
                Element::Node(child) => self.to_fragment(*child),
                Element::Token(token) => Fragment::Token(self.token_fragment(*token)),
            })
            .collect();
        Fragment::Node { kind: self.kind(node), children }
    }

    pub fn token_fragment(&self, token: TokenId) -> TokenFragment {
        let data = self.token(token);
        TokenFragment {
            kind: data.kind,
            text: data.text.clone(),
            leading: data.leading.clone(),
            trailing: data.trailing.clone(),
        }
    }

    /// Indented kind dump used by tests and `--verbose` tracing.
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        self.dump_node(self.root, 0, &mut out);
        out
    }

    fn dump_node(&self, node: NodeId, depth: usize, out: &mut String) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&format!("{:?}@{}\n", self.kind(node), self.span(node)));
        for element in self.children(node) {
            match element {
                Element::Node(child) => self.dump_node(*child, depth + 1, out),
                Element::Token(token) => {
                    let data = self.token(*token);
                    out.push_str(&"  ".repeat(depth + 1));
                    out.push_str(&format!("{:?} {:?}\n", data.kind, data.text));
                }
            }
        }
    }
}

pub struct Ancestors<'a> {
    tree: &'a SyntaxTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

pub struct Descendants<'a> {
    tree: &'a SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.stack.pop()?;
        let start = self.stack.len();
        self.stack.extend(self.tree.child_nodes(node));
        self.stack[start..].reverse();
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    #[test]
    fn test_round_trip_text() {
        let source = "class C {\n    // note\n    void M() { int x = 1; }\n}\n";
        let parsed = parse(source);
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        assert_eq!(parsed.tree.text(), source);
    }

    #[test]
    fn test_parent_child_spans() {
        let parsed = parse("class C { void M() { if (a) { b = 1; } } }");
        let tree = &parsed.tree;
        for node in tree.descendants(tree.root()) {
            let parent = tree.parent(node).expect("non-root node has a parent");
            assert!(tree.full_span(parent).contains(tree.full_span(node)));
            let mut last_end = 0;
            for child in tree.child_nodes(node) {
                let span = tree.full_span(child);
                assert!(span.start >= last_end);
                last_end = span.end;
            }
        }
    }

    #[test]
    fn test_find_node_checks_kind() {
        let parsed = parse("class C { void M() { F(x); } }");
        let tree = &parsed.tree;
        let name = tree
            .descendants(tree.root())
            .find(|n| tree.kind(*n) == SyntaxKind::NameExpr && tree.node_text(*n) == "x")
            .unwrap();
        let span = tree.span(name);
        // the argument wrapper shares the span
        assert!(tree.find_node(span, SyntaxKind::Argument).is_some());
        assert_eq!(tree.find_node(span, SyntaxKind::NameExpr), Some(name));
        assert_eq!(tree.find_node(span, SyntaxKind::Block), None);
    }

    #[test]
    fn test_fresh_ids() {
        let a = parse("class A {}").tree;
        let b = parse("class A {}").tree;
        assert_ne!(a.id(), b.id());
    }
}

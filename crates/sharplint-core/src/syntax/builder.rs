//! Incremental construction of a [`SyntaxTree`].
//!
//! Used by the parser and by the rewriter; hosts with their own frontend can
//! build trees through it as well.

use super::fragment::Fragment;
use super::kind::SyntaxKind;
use super::text::{trivia_len, Trivia};
use super::tree::{Element, NodeData, NodeId, SyntaxTree, TokenData, TokenId, TreeId};

/// Position inside the currently open node, used to wrap already emitted
/// children in a new parent after the fact.
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint(usize);

struct OpenNode {
    kind: SyntaxKind,
    children: Vec<Element>,
}

const UNSET_PARENT: NodeId = NodeId(u32::MAX);

#[derive(Default)]
pub struct TreeBuilder {
    nodes: Vec<NodeData>,
    tokens: Vec<TokenData>,
    open: Vec<OpenNode>,
    offset: usize,
    root: Option<NodeId>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_node(&mut self, kind: SyntaxKind) {
        self.open.push(OpenNode { kind, children: Vec::new() });
    }

    pub fn checkpoint(&mut self) -> Checkpoint {
        Checkpoint(self.open.last().map_or(0, |node| node.children.len()))
    }

    /// Opens a node that adopts every child emitted since `checkpoint`.
    pub fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        let adopted = match self.open.last_mut() {
            Some(parent) if checkpoint.0 <= parent.children.len() => {
                parent.children.split_off(checkpoint.0)
            }
            _ => Vec::new(),
        };
        self.open.push(OpenNode { kind, children: adopted });
    }

    pub fn token(
        &mut self,
        kind: SyntaxKind,
        text: impl Into<String>,
        leading: Vec<Trivia>,
        trailing: Vec<Trivia>,
    ) -> TokenId {
        let text = text.into();
        let id = TokenId(self.tokens.len() as u32);
        let width = trivia_len(&leading) + text.len() + trivia_len(&trailing);
        self.tokens.push(TokenData {
            kind,
            text,
            leading,
            trailing,
            parent: UNSET_PARENT,
            offset: self.offset,
        });
        self.offset += width;
        if let Some(node) = self.open.last_mut() {
            node.children.push(Element::Token(id));
        }
        id
    }

    pub fn finish_node(&mut self) -> Option<NodeId> {
        let open = self.open.pop()?;
        let id = NodeId(self.nodes.len() as u32);

        for child in &open.children {
            match child {
                Element::Node(n) => self.nodes[n.index()].parent = Some(id),
                Element::Token(t) => self.tokens[t.index()].parent = id,
            }
        }

        let first_token = open
            .children
            .first()
            .map(|child| match child {
                Element::Token(t) => t.0,
                Element::Node(n) => self.nodes[n.index()].first_token,
            })
            .unwrap_or(self.tokens.len() as u32);
        let offset = self
            .tokens
            .get(first_token as usize)
            .map_or(self.offset, |t| t.offset);

        self.nodes.push(NodeData {
            kind: open.kind,
            parent: None,
            children: open.children,
            first_token,
            end_token: self.tokens.len() as u32,
            offset,
        });

        match self.open.last_mut() {
            Some(parent) => parent.children.push(Element::Node(id)),
            None => self.root = Some(id),
        }
        Some(id)
    }

    /// Emits a detached fragment as children of the open node.
    pub fn fragment(&mut self, fragment: &Fragment) {
        match fragment {
            Fragment::Token(token) => {
                self.token(
                    token.kind,
                    token.text.clone(),
                    token.leading.clone(),
                    token.trailing.clone(),
                );
            }
            Fragment::Node { kind, children } => {
                self.start_node(*kind);
                children.iter().for_each(|child| self.fragment(child));
                self.finish_node();
            }
        }
    }

    /// Closes any node left open and returns the tree with a fresh id.
    pub fn finish(mut self) -> SyntaxTree {
        while !self.open.is_empty() {
            self.finish_node();
        }
        let root = match self.root {
            Some(root) => root,
            None => {
                self.start_node(SyntaxKind::CompilationUnit);
                // an empty builder still yields a root
                self.finish_node().unwrap_or(NodeId(0))
            }
        };
        SyntaxTree {
            id: TreeId::fresh(),
            nodes: self.nodes,
            tokens: self.tokens,
            root,
        }
    }
}

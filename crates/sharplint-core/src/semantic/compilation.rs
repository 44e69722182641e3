//! Reference `SemanticModel` for a single tree.

use std::collections::HashMap;
use std::sync::OnceLock;

use dashmap::DashMap;
use tracing::debug;

use super::binder::{bind, Binding, Declared, Imports, TypeResolver};
use super::conversions::classify;
use super::library::CoreTypes;
use super::symbols::{MemberId, SymbolTable, TypeId, TypeRef};
use super::{ConversionKind, SemanticModel, Symbol};
use crate::syntax::{NodeId, SyntaxKind, SyntaxTree};

/// Deepest chain of nested expression queries before giving up.
pub(super) const MAX_QUERY_DEPTH: usize = 64;

/// Bound symbols plus lazily computed, memoized expression facts.
///
/// The caches are concurrent maps, so a compilation can be shared by
/// reference between threads.
pub struct Compilation<'t> {
    pub(super) tree: &'t SyntaxTree,
    pub(super) binding: Binding,
    pub(super) types: DashMap<NodeId, Option<TypeRef>>,
    pub(super) symbols: DashMap<NodeId, Option<Symbol>>,
    writes: OnceLock<HashMap<MemberId, Vec<NodeId>>>,
}

impl<'t> Compilation<'t> {
    pub fn new(tree: &'t SyntaxTree) -> Self {
        let binding = bind(tree);
        Self {
            tree,
            binding,
            types: DashMap::new(),
            symbols: DashMap::new(),
            writes: OnceLock::new(),
        }
    }

    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    pub fn core(&self) -> &CoreTypes {
        &self.binding.core
    }

    pub fn imports(&self) -> &Imports {
        &self.binding.imports
    }

    /// Symbol declared by a declaration node.
    pub fn declared(&self, node: NodeId) -> Option<Declared> {
        self.binding.declared.get(&node).copied()
    }

    pub(super) fn resolver(&self) -> TypeResolver<'_> {
        TypeResolver::new(self.tree, &self.binding)
    }

    pub(super) fn type_at(&self, node: NodeId, depth: usize) -> Option<TypeRef> {
        if depth > MAX_QUERY_DEPTH {
            return None;
        }
        if let Some(cached) = self.types.get(&node) {
            return cached.clone();
        }
        let computed = self.compute_type(node, depth + 1);
        self.types.insert(node, computed.clone());
        computed
    }

    pub(super) fn symbol_at(&self, node: NodeId, depth: usize) -> Option<Symbol> {
        if depth > MAX_QUERY_DEPTH {
            return None;
        }
        if let Some(cached) = self.symbols.get(&node) {
            return cached.clone();
        }
        let computed = self.compute_symbol(node, depth + 1);
        self.symbols.insert(node, computed.clone());
        computed
    }

    fn write_index(&self) -> &HashMap<MemberId, Vec<NodeId>> {
        self.writes.get_or_init(|| {
            let tree = self.tree;
            let mut index: HashMap<MemberId, Vec<NodeId>> = HashMap::new();
            for node in tree.descendants(tree.root()) {
                let target = match tree.kind(node) {
                    SyntaxKind::AssignmentExpr => tree.child_nodes(node).next(),
                    SyntaxKind::PrefixUnaryExpr | SyntaxKind::PostfixUnaryExpr
                        if tree.has_token(node, SyntaxKind::PlusPlus)
                            || tree.has_token(node, SyntaxKind::MinusMinus) =>
                    {
                        tree.child_nodes(node).next()
                    }
                    SyntaxKind::Argument
                        if tree.has_token(node, SyntaxKind::RefKw)
                            || tree.has_token(node, SyntaxKind::OutKw) =>
                    {
                        tree.child_where(node, SyntaxKind::is_expression)
                    }
                    _ => None,
                };
                let Some(mut target) = target else {
                    continue;
                };
                while tree.kind(target) == SyntaxKind::ParenExpr {
                    match tree.child_nodes(target).next() {
                        Some(inner) => target = inner,
                        None => break,
                    }
                }
                if let Some(Symbol::Member(member)) = self.symbol_of(target) {
                    index.entry(member).or_default().push(target);
                }
            }
            debug!(members = index.len(), "built write index");
            index
        })
    }
}

impl SemanticModel for Compilation<'_> {
    fn symbols(&self) -> &SymbolTable {
        &self.binding.table
    }

    fn type_of(&self, node: NodeId) -> Option<TypeRef> {
        self.type_at(node, 0)
    }

    fn conversion_kind(&self, expr: NodeId, target: &TypeRef) -> Option<ConversionKind> {
        let source = self.type_of(expr)?;
        classify(&self.binding.table, &source, target)
    }

    fn symbol_of(&self, node: NodeId) -> Option<Symbol> {
        self.symbol_at(node, 0)
    }

    fn resolve_static_import(&self, name: &str) -> Option<TypeId> {
        self.binding
            .imports
            .static_types
            .iter()
            .copied()
            .find(|id| self.enum_members(*id).is_some_and(|members| members.iter().any(|m| m == name)))
    }

    fn write_references(&self, member: MemberId) -> Vec<NodeId> {
        self.write_index().get(&member).cloned().unwrap_or_default()
    }
}

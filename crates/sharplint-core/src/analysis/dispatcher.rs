//! Single-traversal rule dispatch.

use tracing::{debug, trace};

use super::{Diagnostic, RuleContext, RuleRegistry};
use crate::semantic::SemanticModel;
use crate::syntax::{NodeId, SyntaxTree};

struct Walk<'a> {
    tree: &'a SyntaxTree,
    model: &'a dyn SemanticModel,
    registry: &'a RuleRegistry,
    /// Root-to-parent path of the node being visited.
    path: Vec<NodeId>,
    /// Indices into `path` of the boundary nodes on it.
    boundaries: Vec<usize>,
    found: Vec<(usize, Diagnostic)>,
}

impl Walk<'_> {
    fn visit(&mut self, node: NodeId) {
        let kind = self.tree.kind(node);
        let scope_start = self.boundaries.last().copied().unwrap_or(0);
        for rule in self.registry.for_kind(kind) {
            let context = RuleContext {
                tree: self.tree,
                model: self.model,
                node,
                scope: &self.path[scope_start..],
                descriptor: rule.descriptor,
                severity: rule.severity,
            };
            if let Some(diagnostic) = (rule.descriptor.check)(&context) {
                trace!(rule = %rule.descriptor.id, span = %diagnostic.span, "rule fired");
                self.found.push((rule.order, diagnostic));
            }
        }

        let is_boundary = kind.is_boundary();
        if is_boundary {
            self.boundaries.push(self.path.len());
        }
        self.path.push(node);
        for child in self.tree.child_nodes(node) {
            self.visit(child);
        }
        self.path.pop();
        if is_boundary {
            self.boundaries.pop();
        }
    }
}

/// Runs every registered rule over `tree` in one depth-first traversal.
///
/// Diagnostics are ordered by span start, then by rule table order.
pub fn dispatch(tree: &SyntaxTree, model: &dyn SemanticModel, registry: &RuleRegistry) -> Vec<Diagnostic> {
    let mut walk = Walk {
        tree,
        model,
        registry,
        path: Vec::new(),
        boundaries: Vec::new(),
        found: Vec::new(),
    };
    if !registry.is_empty() {
        walk.visit(tree.root());
    }
    let mut found = walk.found;
    found.sort_by_key(|(order, diagnostic)| (diagnostic.span.start, *order));
    debug!(diagnostics = found.len(), nodes = tree.node_count(), "dispatch complete");
    found.into_iter().map(|(_, diagnostic)| diagnostic).collect()
}

/*!
# Tree Rewriter

Applies fixes by copying the tree into a fresh arena, substituting
replacement fragments and dropping deleted nodes on the way.

Trivia rules:
- a replacement takes over the replaced node's leading and trailing trivia
- a deletion keeps its comments: leading trivia up to the last line break
  when it holds a comment, and trailing comments re-indented to the deleted
  line; everything kept moves to the front of the next token
- whitespace of a deleted node is dropped, so its line disappears
*/

use std::collections::HashMap;

use tracing::{debug, error};

use super::{Fix, FixAction};
use crate::analysis::Diagnostic;
use crate::syntax::{line_indent, Element, NodeId, SyntaxTree, Trivia, TreeBuilder};
use crate::{LintError, Result};

/// Result of a batched rewrite.
#[derive(Debug)]
pub struct Rewrite {
    pub tree: SyntaxTree,
    pub applied: Vec<Fix>,
    /// Fixes that overlapped an accepted fix. They must be recomputed
    /// against the new tree.
    pub deferred: Vec<Fix>,
}

/// Finds the node a diagnostic targets in `tree`.
pub fn locate(tree: &SyntaxTree, diagnostic: &Diagnostic) -> Result<NodeId> {
    if diagnostic.tree != tree.id() {
        error!(
            rule = %diagnostic.rule,
            expected = ?diagnostic.tree,
            actual = ?tree.id(),
            "fix applied to a different tree snapshot"
        );
        return Err(LintError::StaleSnapshot {
            expected: diagnostic.tree,
            actual: tree.id(),
        });
    }
    tree.find_node(diagnostic.span, diagnostic.target).ok_or_else(|| {
        error!(rule = %diagnostic.rule, span = %diagnostic.span, kind = ?diagnostic.target, "fix target not found");
        LintError::NodeNotFound {
            span: diagnostic.span,
            kind: diagnostic.target,
        }
    })
}

/// Applies a single fix.
pub fn apply_fix(tree: &SyntaxTree, fix: &Fix) -> Result<SyntaxTree> {
    let node = locate(tree, &fix.diagnostic)?;
    let edits = HashMap::from([(node, &fix.action)]);
    Ok(rebuild(tree, &edits))
}

/// Applies every fix that does not overlap an earlier one in a single
/// rebuild. Fixes are taken by span start, then rule order; the rest are
/// returned as deferred.
pub fn apply_batch(tree: &SyntaxTree, mut fixes: Vec<Fix>) -> Result<Rewrite> {
    fixes.sort_by_key(|f| (f.span().start, f.diagnostic.rule));

    let mut accepted: Vec<(NodeId, Fix)> = Vec::new();
    let mut deferred = Vec::new();
    for fix in fixes {
        let node = locate(tree, &fix.diagnostic)?;
        let region = tree.full_span(node);
        let clashes = accepted.iter().any(|(other, _)| {
            let taken = tree.full_span(*other);
            taken.overlaps(region) || *other == node
        });
        if clashes {
            debug!(rule = %fix.diagnostic.rule, span = %fix.span(), "fix deferred");
            deferred.push(fix);
        } else {
            accepted.push((node, fix));
        }
    }

    let edits: HashMap<NodeId, &FixAction> = accepted.iter().map(|(node, fix)| (*node, &fix.action)).collect();
    let tree = rebuild(tree, &edits);
    debug!(applied = accepted.len(), deferred = deferred.len(), "batch applied");
    Ok(Rewrite {
        tree,
        applied: accepted.into_iter().map(|(_, fix)| fix).collect(),
        deferred,
    })
}

struct Rebuild<'a> {
    tree: &'a SyntaxTree,
    edits: &'a HashMap<NodeId, &'a FixAction>,
    builder: TreeBuilder,
    /// Trivia rescued from deleted nodes, waiting for the next token.
    pending: Vec<Trivia>,
}

fn rebuild(tree: &SyntaxTree, edits: &HashMap<NodeId, &FixAction>) -> SyntaxTree {
    let mut rebuild = Rebuild {
        tree,
        edits,
        builder: TreeBuilder::new(),
        pending: Vec::new(),
    };
    rebuild.node(tree.root());
    rebuild.builder.finish()
}

impl Rebuild<'_> {
    fn with_pending(&mut self, leading: &[Trivia]) -> Vec<Trivia> {
        let mut out = std::mem::take(&mut self.pending);
        out.extend_from_slice(leading);
        out
    }

    fn node(&mut self, node: NodeId) {
        let (tree, edits) = (self.tree, self.edits);
        match edits.get(&node) {
            Some(FixAction::Replace(fragment)) => {
                let leading = tree
                    .first_token(node)
                    .map(|t| tree.token(t).leading().to_vec())
                    .unwrap_or_default();
                let trailing = tree
                    .last_token(node)
                    .map(|t| tree.token(t).trailing().to_vec())
                    .unwrap_or_default();
                let leading = self.with_pending(&leading);
                let fragment = fragment.clone().with_leading(leading).with_trailing(trailing);
                self.builder.fragment(&fragment);
            }
            Some(FixAction::Delete) => self.delete(node),
            None => {
                self.builder.start_node(tree.kind(node));
                for child in tree.children(node) {
                    match child {
                        Element::Node(child) => self.node(*child),
                        Element::Token(token) => {
                            let data = tree.token(*token);
                            let leading = self.with_pending(data.leading());
                            self.builder
                                .token(data.kind(), data.text(), leading, data.trailing().to_vec());
                        }
                    }
                }
                self.builder.finish_node();
            }
        }
    }

    fn delete(&mut self, node: NodeId) {
        let tree = self.tree;
        let (Some(first), Some(last)) = (tree.first_token(node), tree.last_token(node)) else {
            return;
        };
        // everything before the node's own indentation survives: blank
        // lines and comments on lines of their own
        let leading = tree.token(first).leading();
        let end = leading.iter().rposition(Trivia::is_end_of_line).map_or(0, |i| i + 1);
        self.pending.extend_from_slice(&leading[..end]);
        let trailing = tree.token(last).trailing();
        if let Some(comment) = trailing.iter().position(Trivia::is_comment) {
            self.pending.extend(line_indent(leading));
            self.pending.extend_from_slice(&trailing[comment..]);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::analysis::{RuleId, Severity};
    use crate::syntax::{parse, Fragment, Span, SyntaxKind};

    fn fix_at(tree: &SyntaxTree, text: &str, kind: SyntaxKind, action: FixAction) -> Fix {
        let source = tree.text();
        let start = source.find(text).unwrap();
        Fix {
            diagnostic: Diagnostic {
                rule: RuleId::DeadBranch,
                message: String::new(),
                span: Span::new(start, start + text.len()),
                target: kind,
                severity: Severity::Warning,
                tree: tree.id(),
            },
            title: "test",
            action,
        }
    }

    #[test]
    fn test_delete_drops_the_line() {
        let source = "class C {\n    void M() {\n        a();\n        b();\n        c();\n    }\n}\n";
        let tree = parse(source).tree;
        let fix = fix_at(&tree, "b();", SyntaxKind::ExprStmt, FixAction::Delete);
        let fixed = apply_fix(&tree, &fix).unwrap();
        assert_eq!(
            fixed.text(),
            "class C {\n    void M() {\n        a();\n        c();\n    }\n}\n"
        );
    }

    #[test]
    fn test_delete_keeps_preceding_blank_line() {
        let source = "class C {\n    void M() {\n        a();\n\n        b();\n        c();\n    }\n}\n";
        let tree = parse(source).tree;
        let fix = fix_at(&tree, "b();", SyntaxKind::ExprStmt, FixAction::Delete);
        let fixed = apply_fix(&tree, &fix).unwrap();
        assert_eq!(
            fixed.text(),
            "class C {\n    void M() {\n        a();\n\n        c();\n    }\n}\n"
        );
    }

    #[test]
    fn test_delete_keeps_comments() {
        let source = "class C {\n    void M() {\n        // lead\n        b(); // tail\n        c();\n    }\n}\n";
        let tree = parse(source).tree;
        let fix = fix_at(&tree, "b();", SyntaxKind::ExprStmt, FixAction::Delete);
        let fixed = apply_fix(&tree, &fix).unwrap();
        assert_eq!(
            fixed.text(),
            "class C {\n    void M() {\n        // lead\n        // tail\n        c();\n    }\n}\n"
        );
    }

    #[test]
    fn test_replace_keeps_outer_trivia() {
        let source = "class C { int M() { return /* x */ value  ; } }";
        let tree = parse(source).tree;
        let replacement = Fragment::node(SyntaxKind::NameExpr, vec![Fragment::token(SyntaxKind::Ident, "b")]);
        let fix = fix_at(&tree, "value", SyntaxKind::NameExpr, FixAction::Replace(replacement));
        let fixed = apply_fix(&tree, &fix).unwrap();
        assert_eq!(fixed.text(), "class C { int M() { return /* x */ b  ; } }");
        assert_ne!(fixed.id(), tree.id());
    }

    #[test]
    fn test_stale_and_missing_targets_are_errors() {
        let tree = parse("class C { void M() { a(); } }").tree;
        let other = parse("class C { void M() { a(); } }").tree;
        let fix = fix_at(&other, "a();", SyntaxKind::ExprStmt, FixAction::Delete);
        assert!(matches!(apply_fix(&tree, &fix), Err(LintError::StaleSnapshot { .. })));

        let fix = fix_at(&tree, "a();", SyntaxKind::Block, FixAction::Delete);
        assert!(matches!(apply_fix(&tree, &fix), Err(LintError::NodeNotFound { .. })));
    }

    #[test]
    fn test_batch_defers_overlapping_fixes() {
        let source = "class C { void M() { if (x) { a(); } b(); } }";
        let tree = parse(source).tree;
        let fixes = vec![
            fix_at(&tree, "a();", SyntaxKind::ExprStmt, FixAction::Delete),
            fix_at(&tree, "if (x) { a(); }", SyntaxKind::IfStmt, FixAction::Delete),
            fix_at(&tree, "b();", SyntaxKind::ExprStmt, FixAction::Delete),
        ];
        let rewrite = apply_batch(&tree, fixes).unwrap();
        assert_eq!(rewrite.applied.len(), 2);
        assert_eq!(rewrite.deferred.len(), 1);
        assert_eq!(rewrite.deferred[0].diagnostic.target, SyntaxKind::ExprStmt);
        assert_eq!(rewrite.tree.text(), "class C { void M() { } }");
    }
}

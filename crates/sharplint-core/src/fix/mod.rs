/*!
# Fixes

A fix pairs a diagnostic with an edit to the node the diagnostic targets.

- `providers`: static table of fix providers keyed by rule
- `rewriter`: applies fixes by rebuilding the tree, threading trivia

Fix values are immutable and only valid against the tree snapshot their
diagnostic was computed on.
*/

pub mod providers;
pub mod rewriter;

pub use providers::{provider_for, FixProviderDescriptor, FIX_PROVIDERS};
pub use rewriter::{apply_batch, apply_fix, locate, Rewrite};

use tracing::trace;

use crate::analysis::Diagnostic;
use crate::syntax::{Fragment, Span, SyntaxTree};
use crate::Result;

/// Edit applied to the diagnostic's target node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixAction {
    /// Substitute the node. The node's outer trivia moves onto the fragment.
    Replace(Fragment),
    /// Remove the node, keeping the comments around it.
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fix {
    pub diagnostic: Diagnostic,
    pub title: &'static str,
    pub action: FixAction,
}

impl Fix {
    pub fn span(&self) -> Span {
        self.diagnostic.span
    }
}

/// Asks the provider registered for the diagnostic's rule for a fix.
///
/// `Ok(None)` when the rule has no provider or the provider declines. A
/// diagnostic from another snapshot, or one whose target cannot be found,
/// is an error.
pub fn fix_for(tree: &SyntaxTree, diagnostic: &Diagnostic) -> Result<Option<Fix>> {
    let Some(provider) = provider_for(diagnostic.rule) else {
        return Ok(None);
    };
    let node = locate(tree, diagnostic)?;
    let fix = (provider.provide)(tree, node).map(|action| Fix {
        diagnostic: diagnostic.clone(),
        title: provider.title,
        action,
    });
    trace!(rule = %diagnostic.rule, span = %diagnostic.span, found = fix.is_some(), "fix requested");
    Ok(fix)
}

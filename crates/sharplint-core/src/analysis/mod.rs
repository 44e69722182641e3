/*!
# Analysis

Rule descriptors, diagnostics and the single-pass dispatcher.

Rules are plain functions registered in a static table. The registry maps
each syntax kind to the rules subscribed to it, and the dispatcher walks the
tree once, handing every interested rule a `RuleContext` for the node.
*/

pub mod dispatcher;
pub mod registry;

pub use dispatcher::dispatch;
pub use registry::RuleRegistry;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::semantic::SemanticModel;
use crate::syntax::{NodeId, Span, SyntaxKind, SyntaxTree, TreeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Suggestion,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Suggestion => write!(f, "suggestion"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Identity of a built-in rule. Declaration order is the tie-break order
/// for diagnostics at the same position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleId {
    AsToCast,
    CastToAs,
    DeadBranch,
    RedundantTernary,
    StaleTimestamp,
    PairedOverride,
    Goto,
    LoopAllocation,
    RedundantPrivateSetter,
    TrivialConstructor,
    IncompleteEnumSwitch,
    MissingDefault,
    ExplicitToVar,
}

impl RuleId {
    pub const ALL: [RuleId; 13] = [
        RuleId::AsToCast,
        RuleId::CastToAs,
        RuleId::DeadBranch,
        RuleId::RedundantTernary,
        RuleId::StaleTimestamp,
        RuleId::PairedOverride,
        RuleId::Goto,
        RuleId::LoopAllocation,
        RuleId::RedundantPrivateSetter,
        RuleId::TrivialConstructor,
        RuleId::IncompleteEnumSwitch,
        RuleId::MissingDefault,
        RuleId::ExplicitToVar,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RuleId::AsToCast => "as-to-cast",
            RuleId::CastToAs => "cast-to-as",
            RuleId::DeadBranch => "dead-branch",
            RuleId::RedundantTernary => "redundant-ternary",
            RuleId::StaleTimestamp => "stale-timestamp",
            RuleId::PairedOverride => "paired-override",
            RuleId::Goto => "goto",
            RuleId::LoopAllocation => "loop-allocation",
            RuleId::RedundantPrivateSetter => "redundant-private-setter",
            RuleId::TrivialConstructor => "trivial-constructor",
            RuleId::IncompleteEnumSwitch => "incomplete-enum-switch",
            RuleId::MissingDefault => "missing-default",
            RuleId::ExplicitToVar => "explicit-to-var",
        }
    }

    /// Stable `SLnnnn` code, numbered in declaration order.
    pub fn code(self) -> String {
        format!("SL{:04}", self.index() + 1)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Accepts a rule name or its code.
    pub fn from_name(name: &str) -> Option<RuleId> {
        RuleId::ALL
            .into_iter()
            .find(|id| id.name() == name || id.code().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One finding of one rule against one tree snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub rule: RuleId,
    pub message: String,
    /// Primary location, token text only.
    pub span: Span,
    /// Kind of the node a fix for this diagnostic rewrites.
    pub target: SyntaxKind,
    pub severity: Severity,
    #[serde(skip)]
    pub tree: TreeId,
}

impl Diagnostic {
    pub fn code(&self) -> String {
        self.rule.code()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} [{}]: {}", self.severity, self.rule.code(), self.rule, self.message)
    }
}

/// Static registration entry of a rule.
pub struct RuleDescriptor {
    pub id: RuleId,
    pub description: &'static str,
    pub severity: Severity,
    pub enabled_by_default: bool,
    /// Node kinds the rule is called for.
    pub kinds: &'static [SyntaxKind],
    /// Message with `{0}`, `{1}`... placeholders.
    pub message: &'static str,
    pub check: fn(&RuleContext<'_>) -> Option<Diagnostic>,
}

impl fmt::Debug for RuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleDescriptor")
            .field("id", &self.id)
            .field("severity", &self.severity)
            .field("kinds", &self.kinds)
            .finish()
    }
}

/// Everything a rule may look at while checking one node.
pub struct RuleContext<'a> {
    pub tree: &'a SyntaxTree,
    pub model: &'a dyn SemanticModel,
    pub node: NodeId,
    /// Enclosing nodes from the nearest member or lambda boundary (included)
    /// down to the parent of `node`.
    pub scope: &'a [NodeId],
    pub descriptor: &'static RuleDescriptor,
    pub severity: Severity,
}

impl<'a> RuleContext<'a> {
    pub fn kind(&self) -> SyntaxKind {
        self.tree.kind(self.node)
    }

    /// Enclosing nodes, nearest first, stopping at the boundary.
    pub fn ancestors(&self) -> impl Iterator<Item = NodeId> + 'a {
        self.scope.iter().rev().copied()
    }

    /// Nearest enclosing member or lambda.
    pub fn boundary(&self) -> Option<NodeId> {
        self.scope
            .first()
            .copied()
            .filter(|n| self.tree.kind(*n).is_boundary())
    }

    /// Builds a diagnostic for this rule, filling `{i}` placeholders of the
    /// message template with `args[i]`.
    pub fn diagnostic(&self, span: Span, target: SyntaxKind, args: &[&str]) -> Diagnostic {
        let mut message = self.descriptor.message.to_string();
        for (i, arg) in args.iter().enumerate() {
            message = message.replace(&format!("{{{i}}}"), arg);
        }
        Diagnostic {
            rule: self.descriptor.id,
            message,
            span,
            target,
            severity: self.severity,
            tree: self.tree.id(),
        }
    }

    /// Diagnostic spanning the current node.
    pub fn report(&self, args: &[&str]) -> Diagnostic {
        self.diagnostic(self.tree.span(self.node), self.kind(), args)
    }
}

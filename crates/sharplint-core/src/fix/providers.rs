/*!
# Fix Providers

One entry per fixable rule. A provider receives the node the diagnostic
targets and returns the edit, or `None` when it declines.

Replacement fragments carry no outer trivia; the rewriter moves the
replaced node's trivia onto them.
*/

use super::FixAction;
use crate::analysis::RuleId;
use crate::syntax::{line_indent, without_comments, Fragment, NodeId, SyntaxKind, SyntaxTree, Trivia};

pub struct FixProviderDescriptor {
    pub rule: RuleId,
    pub title: &'static str,
    pub provide: fn(&SyntaxTree, NodeId) -> Option<FixAction>,
}

pub static FIX_PROVIDERS: &[FixProviderDescriptor] = &[
    FixProviderDescriptor {
        rule: RuleId::AsToCast,
        title: "Replace `as` with a cast",
        provide: as_to_cast,
    },
    FixProviderDescriptor {
        rule: RuleId::CastToAs,
        title: "Replace the cast with `as`",
        provide: cast_to_as,
    },
    FixProviderDescriptor {
        rule: RuleId::DeadBranch,
        title: "Remove the unreachable branch",
        provide: dead_branch,
    },
    FixProviderDescriptor {
        rule: RuleId::RedundantTernary,
        title: "Use the condition directly",
        provide: redundant_ternary,
    },
    FixProviderDescriptor {
        rule: RuleId::StaleTimestamp,
        title: "Use `DateTime.UtcNow`",
        provide: stale_timestamp,
    },
    FixProviderDescriptor {
        rule: RuleId::TrivialConstructor,
        title: "Remove the constructor",
        provide: trivial_constructor,
    },
    FixProviderDescriptor {
        rule: RuleId::MissingDefault,
        title: "Add a throwing `default` section",
        provide: missing_default,
    },
    FixProviderDescriptor {
        rule: RuleId::ExplicitToVar,
        title: "Use `var`",
        provide: explicit_to_var,
    },
];

pub fn provider_for(rule: RuleId) -> Option<&'static FixProviderDescriptor> {
    FIX_PROVIDERS.iter().find(|p| p.rule == rule)
}

fn token(kind: SyntaxKind, text: &str) -> Fragment {
    Fragment::token(kind, text)
}

fn spaced(kind: SyntaxKind, text: &str) -> Fragment {
    token(kind, text).with_trailing(vec![Trivia::space()])
}

fn parenthesize(inner: Fragment) -> Fragment {
    Fragment::node(
        SyntaxKind::ParenExpr,
        vec![token(SyntaxKind::LParen, "("), inner, token(SyntaxKind::RParen, ")")],
    )
}

/// `(T)-x` reads as a subtraction, so signed operands keep parentheses.
fn needs_parens_as_cast_operand(tree: &SyntaxTree, operand: NodeId) -> bool {
    let kind = tree.kind(operand);
    if !kind.is_unary_level_expression() {
        return true;
    }
    kind == SyntaxKind::PrefixUnaryExpr
        && tree
            .first_token(operand)
            .is_some_and(|t| matches!(tree.token(t).kind(), SyntaxKind::Plus | SyntaxKind::Minus))
}

fn as_to_cast(tree: &SyntaxTree, node: NodeId) -> Option<FixAction> {
    let mut parts = tree.child_nodes(node);
    let operand = parts.next()?;
    let ty = parts.next()?;
    let mut value = tree.to_fragment(operand).trimmed();
    if needs_parens_as_cast_operand(tree, operand) {
        value = parenthesize(value);
    }
    Some(FixAction::Replace(Fragment::node(
        SyntaxKind::CastExpr,
        vec![
            token(SyntaxKind::LParen, "("),
            tree.to_fragment(ty).trimmed(),
            token(SyntaxKind::RParen, ")"),
            value,
        ],
    )))
}

fn cast_to_as(tree: &SyntaxTree, node: NodeId) -> Option<FixAction> {
    let mut parts = tree.child_nodes(node);
    let ty = parts.next()?;
    let operand = parts.next()?;
    let expr = Fragment::node(
        SyntaxKind::AsExpr,
        vec![
            tree.to_fragment(operand).trimmed().with_trailing(vec![Trivia::space()]),
            spaced(SyntaxKind::AsKw, "as"),
            tree.to_fragment(ty).trimmed(),
        ],
    );
    // `as` binds like a relational operator
    let binds_tighter = tree.parent(node).is_some_and(|parent| {
        matches!(
            tree.kind(parent),
            SyntaxKind::MemberAccessExpr
                | SyntaxKind::InvocationExpr
                | SyntaxKind::ElementAccessExpr
                | SyntaxKind::PrefixUnaryExpr
                | SyntaxKind::PostfixUnaryExpr
                | SyntaxKind::CastExpr
                | SyntaxKind::AsExpr
                | SyntaxKind::IsExpr
                | SyntaxKind::BinaryExpr
                | SyntaxKind::ConditionalExpr
        )
    });
    Some(FixAction::Replace(if binds_tighter { parenthesize(expr) } else { expr }))
}

fn dead_branch(tree: &SyntaxTree, node: NodeId) -> Option<FixAction> {
    if let Some(else_clause) = tree.child_of_kind(node, SyntaxKind::ElseClause) {
        let statement = tree.child_nodes(else_clause).next()?;
        return Some(FixAction::Replace(tree.to_fragment(statement).trimmed()));
    }
    let in_statement_list = tree
        .parent(node)
        .is_some_and(|p| matches!(tree.kind(p), SyntaxKind::Block | SyntaxKind::SwitchSection));
    if in_statement_list {
        return Some(FixAction::Delete);
    }
    // an embedded statement cannot simply vanish
    Some(FixAction::Replace(Fragment::node(
        SyntaxKind::Block,
        vec![spaced(SyntaxKind::LBrace, "{"), token(SyntaxKind::RBrace, "}")],
    )))
}

fn redundant_ternary(tree: &SyntaxTree, node: NodeId) -> Option<FixAction> {
    let condition = tree.child_nodes(node).next()?;
    Some(FixAction::Replace(tree.to_fragment(condition).trimmed()))
}

fn stale_timestamp(tree: &SyntaxTree, node: NodeId) -> Option<FixAction> {
    let mut fragment = tree.to_fragment(node).trimmed();
    let Fragment::Node { children, .. } = &mut fragment else {
        return None;
    };
    let name = children.iter_mut().rev().find_map(|child| match child {
        Fragment::Token(t) if t.kind == SyntaxKind::Ident => Some(t),
        _ => None,
    })?;
    name.text = "UtcNow".to_string();
    Some(FixAction::Replace(fragment))
}

fn trivial_constructor(_tree: &SyntaxTree, _node: NodeId) -> Option<FixAction> {
    Some(FixAction::Delete)
}

/// Appends `default: throw new NotImplementedException();` after the last
/// section, copying that section's layout.
fn missing_default(tree: &SyntaxTree, node: NodeId) -> Option<FixAction> {
    let close = tree.token_of_kind(node, SyntaxKind::RBrace)?;
    let open = tree.token_of_kind(node, SyntaxKind::LBrace)?;

    let (label_indent, colon_trailing, statement_leading, semicolon_trailing) =
        match tree.children_of_kind(node, SyntaxKind::SwitchSection).last() {
            Some(section) => {
                let leading = |n: NodeId| {
                    tree.first_token(n)
                        .map(|t| line_indent(tree.token(t).leading()))
                        .unwrap_or_default()
                };
                let trailing = |n: NodeId| {
                    tree.last_token(n)
                        .map(|t| without_comments(tree.token(t).trailing()))
                        .unwrap_or_default()
                };
                let label = tree
                    .child_nodes(section)
                    .filter(|n| matches!(tree.kind(*n), SyntaxKind::CaseLabel | SyntaxKind::DefaultLabel))
                    .last()?;
                let statement = tree.child_where(section, SyntaxKind::is_statement);
                (
                    leading(section),
                    trailing(label),
                    statement.map(leading).unwrap_or_default(),
                    trailing(section),
                )
            }
            None => {
                let multiline = tree.token(open).trailing().iter().any(Trivia::is_end_of_line);
                if multiline {
                    let mut indent = line_indent(tree.token(close).leading());
                    indent.push(Trivia::whitespace("    "));
                    (indent, vec![Trivia::space()], Vec::new(), vec![Trivia::end_of_line("\n")])
                } else {
                    (Vec::new(), vec![Trivia::space()], Vec::new(), vec![Trivia::space()])
                }
            }
        };

    let section = Fragment::node(
        SyntaxKind::SwitchSection,
        vec![
            Fragment::node(
                SyntaxKind::DefaultLabel,
                vec![
                    token(SyntaxKind::DefaultKw, "default").with_leading(label_indent),
                    token(SyntaxKind::Colon, ":").with_trailing(colon_trailing),
                ],
            ),
            Fragment::node(
                SyntaxKind::ThrowStmt,
                vec![
                    spaced(SyntaxKind::ThrowKw, "throw").with_leading(statement_leading),
                    Fragment::node(
                        SyntaxKind::ObjectCreationExpr,
                        vec![
                            spaced(SyntaxKind::NewKw, "new"),
                            Fragment::node(
                                SyntaxKind::NameType,
                                vec![token(SyntaxKind::Ident, "NotImplementedException")],
                            ),
                            Fragment::node(
                                SyntaxKind::ArgumentList,
                                vec![token(SyntaxKind::LParen, "("), token(SyntaxKind::RParen, ")")],
                            ),
                        ],
                    ),
                    token(SyntaxKind::Semicolon, ";").with_trailing(semicolon_trailing),
                ],
            ),
        ],
    );

    let mut switch = tree.to_fragment(node).trimmed();
    let Fragment::Node { children, .. } = &mut switch else {
        return None;
    };
    let close_at = children
        .iter()
        .rposition(|c| c.kind() == SyntaxKind::RBrace)?;
    children.insert(close_at, section);
    Some(FixAction::Replace(switch))
}

fn explicit_to_var(_tree: &SyntaxTree, _node: NodeId) -> Option<FixAction> {
    Some(FixAction::Replace(Fragment::node(
        SyntaxKind::NameType,
        vec![token(SyntaxKind::Ident, "var")],
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::RuleId;

    #[test]
    fn test_every_provider_is_unique() {
        for (i, provider) in FIX_PROVIDERS.iter().enumerate() {
            assert!(
                FIX_PROVIDERS[..i].iter().all(|p| p.rule != provider.rule),
                "{} registered twice",
                provider.rule
            );
        }
        assert!(provider_for(RuleId::Goto).is_none());
        assert!(provider_for(RuleId::PairedOverride).is_none());
        assert!(provider_for(RuleId::AsToCast).is_some());
    }
}

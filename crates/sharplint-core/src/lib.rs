//! # sharplint core
//!
//! Rule-matching and fix-application engine for a C#-like language:
//! - Lossless arena syntax trees and a reference lexer/parser
//! - Semantic facts (types, conversions, symbols) behind the `SemanticModel` contract
//! - A single-pass rule dispatcher over a static rule table
//! - Fix providers and a trivia-preserving tree rewriter
//!
//! `Linter` ties these together for hosts and the command-line tool.

#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod engine;
pub mod fix;
pub mod rules;
pub mod semantic;
pub mod syntax;

pub use analysis::{Diagnostic, RuleContext, RuleDescriptor, RuleId, RuleRegistry, Severity};
pub use config::LintConfig;
pub use engine::{collect_sources, BatchOutcome, FileReport, FixOutcome, Linter, RuleStats};
pub use fix::{Fix, FixAction};
pub use semantic::{Compilation, SemanticModel};
pub use syntax::{parse, ParseError, Span, SyntaxKind, SyntaxTree};

use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// sharplint version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Error, Debug)]
pub enum LintError {
    #[error("Parse error: {}", .errors.first().map(ToString::to_string).unwrap_or_default())]
    Parse { errors: Vec<ParseError> },

    #[error("Stale snapshot: diagnostic computed against tree {expected:?}, got {actual:?}")]
    StaleSnapshot {
        expected: syntax::TreeId,
        actual: syntax::TreeId,
    },

    #[error("No {kind:?} node at {span}")]
    NodeNotFound { span: Span, kind: SyntaxKind },

    #[error("Fixes did not converge after {limit} iterations")]
    FixLimitExceeded { limit: usize },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LintError>;

/// Installs the global `tracing` subscriber. A valid `RUST_LOG` replaces the
/// default `sharplint_core=info`; `verbose` raises that default to debug.
pub fn init_tracing(verbose: bool) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_filter(env.as_deref(), verbose))
        .with_writer(std::io::stderr)
        .try_init();
}

fn tracing_filter(env: Option<&str>, verbose: bool) -> EnvFilter {
    if let Some(filter) = env.filter(|e| !e.trim().is_empty()).and_then(|e| EnvFilter::try_new(e).ok()) {
        return filter;
    }
    let level = if verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    EnvFilter::new(format!("sharplint_core={level}"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_rust_log_overrides_default_filter() {
        assert_eq!(tracing_filter(Some("sharplint_core=trace"), false).to_string(), "sharplint_core=trace");
        assert_eq!(tracing_filter(None, false).to_string(), "sharplint_core=info");
        assert_eq!(tracing_filter(None, true).to_string(), "sharplint_core=debug");
        assert_eq!(tracing_filter(Some(""), true).to_string(), "sharplint_core=debug");
    }
}

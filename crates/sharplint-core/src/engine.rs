/*!
# Linter Engine

Facade tying the frontend, the semantic model, the dispatcher and the
rewriter together.

- `lint_source`/`lint_files`: analysis only, files in parallel
- `apply_fix`: one fix against one snapshot
- `fix_batch`: every non-overlapping fix in one rebuild
- `fix_until_stable`: batched passes until nothing fixable is left
*/

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analysis::{dispatch, Diagnostic, RuleId, RuleRegistry};
use crate::config::LintConfig;
use crate::fix::{self, Fix};
use crate::semantic::{Compilation, SemanticModel};
use crate::syntax::{parse, LineCol, LineIndex, ParseError, Span, SyntaxTree};
use crate::{LintError, Result};

/// File extensions picked up by `collect_sources`.
const SOURCE_EXTENSIONS: &[&str] = &["cs"];

/// Per-rule counters accumulated over the lifetime of a `Linter`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleStats {
    pub rule_name: String,
    pub diagnostics: u64,
    pub fixes_applied: u64,
    pub fixes_deferred: u64,
}

impl RuleStats {
    pub fn new(rule_name: String) -> Self {
        Self {
            rule_name,
            ..Default::default()
        }
    }

    /// Share of diagnostics that ended in an applied fix.
    pub fn fix_rate(&self) -> f64 {
        if self.diagnostics == 0 {
            0.0
        } else {
            (self.fixes_applied as f64) / (self.diagnostics as f64)
        }
    }
}

/// Analysis result for one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub diagnostics: Vec<Diagnostic>,
    /// When non-empty no rule ran.
    pub parse_errors: Vec<ParseError>,
    #[serde(skip)]
    pub lines: LineIndex,
}

impl FileReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty() && self.parse_errors.is_empty()
    }

    /// Line and column where `span` starts in the linted text.
    pub fn location(&self, span: Span) -> LineCol {
        self.lines.line_col(span.start)
    }
}

/// Result of one batched fix pass.
#[derive(Debug)]
pub struct BatchOutcome {
    pub tree: SyntaxTree,
    /// Every diagnostic of the input tree.
    pub diagnostics: Vec<Diagnostic>,
    pub applied: Vec<Diagnostic>,
    /// Fixable diagnostics skipped because they overlapped an applied fix.
    pub deferred: Vec<Diagnostic>,
}

/// Result of `fix_until_stable`.
#[derive(Debug)]
pub struct FixOutcome {
    pub tree: SyntaxTree,
    /// Diagnostics whose fixes were applied, in application order.
    pub applied: Vec<Diagnostic>,
    /// Diagnostics left on the final tree; none of them has a fix.
    pub remaining: Vec<Diagnostic>,
    /// Batched passes that changed the tree.
    pub iterations: usize,
}

impl FixOutcome {
    pub fn text(&self) -> String {
        self.tree.text()
    }

    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

pub struct Linter {
    config: LintConfig,
    registry: RuleRegistry,
    stats: Mutex<HashMap<RuleId, RuleStats>>,
}

impl Default for Linter {
    fn default() -> Self {
        let config = LintConfig::default();
        Self {
            registry: RuleRegistry::new(&config),
            config,
            stats: Mutex::new(HashMap::new()),
        }
    }
}

impl Linter {
    pub fn new(config: LintConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            registry: RuleRegistry::new(&config),
            config,
            stats: Mutex::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &LintConfig {
        &self.config
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Parses `source`, failing when the frontend reports any error.
    pub fn parse(&self, source: &str) -> Result<SyntaxTree> {
        let parsed = parse(source);
        if parsed.is_ok() {
            Ok(parsed.tree)
        } else {
            Err(LintError::Parse { errors: parsed.errors })
        }
    }

    /// Runs the enabled rules over `tree` with the reference semantic model.
    pub fn analyze(&self, tree: &SyntaxTree) -> Vec<Diagnostic> {
        let model = Compilation::new(tree);
        self.analyze_with(tree, &model)
    }

    /// Runs the enabled rules over `tree` with a host-provided model.
    pub fn analyze_with(&self, tree: &SyntaxTree, model: &dyn SemanticModel) -> Vec<Diagnostic> {
        let diagnostics = dispatch(tree, model, &self.registry);
        self.record(&diagnostics, |stats| &mut stats.diagnostics);
        diagnostics
    }

    /// Lints one file's text. Unparsable text yields a report carrying the
    /// parse errors and no diagnostics.
    pub fn lint_source(&self, path: &Path, text: &str) -> FileReport {
        let parsed = parse(text);
        let lines = LineIndex::new(text);
        if !parsed.is_ok() {
            warn!(path = %path.display(), errors = parsed.errors.len(), "skipping rules on unparsable file");
            return FileReport {
                path: path.to_path_buf(),
                diagnostics: Vec::new(),
                parse_errors: parsed.errors,
                lines,
            };
        }
        let diagnostics = self.analyze(&parsed.tree);
        debug!(path = %path.display(), diagnostics = diagnostics.len(), "linted");
        FileReport {
            path: path.to_path_buf(),
            diagnostics,
            parse_errors: Vec::new(),
            lines,
        }
    }

    /// Lints files in parallel. Reports come back in input order.
    pub fn lint_files(&self, files: &[PathBuf]) -> Vec<Result<FileReport>> {
        info!(files = files.len(), "linting");
        files
            .par_iter()
            .map(|path| {
                let text = fs::read_to_string(path)?;
                Ok(self.lint_source(path, &text))
            })
            .collect()
    }

    /// Fix offered for `diagnostic`, if its rule has a provider.
    pub fn available_fix(&self, diagnostic: &Diagnostic, tree: &SyntaxTree) -> Result<Option<Fix>> {
        fix::fix_for(tree, diagnostic)
    }

    /// Applies a single fix; the result is a new tree.
    pub fn apply_fix(&self, tree: &SyntaxTree, fix: &Fix) -> Result<SyntaxTree> {
        let fixed = fix::apply_fix(tree, fix)?;
        self.record(std::slice::from_ref(&fix.diagnostic), |stats| &mut stats.fixes_applied);
        Ok(fixed)
    }

    /// Analyzes `tree` and applies every available fix that does not
    /// overlap another in one rebuild.
    pub fn fix_batch(&self, tree: &SyntaxTree) -> Result<BatchOutcome> {
        let diagnostics = self.analyze(tree);
        let mut fixes = Vec::new();
        for diagnostic in &diagnostics {
            if let Some(fix) = fix::fix_for(tree, diagnostic)? {
                fixes.push(fix);
            }
        }
        let rewrite = fix::apply_batch(tree, fixes)?;
        let applied: Vec<Diagnostic> = rewrite.applied.into_iter().map(|f| f.diagnostic).collect();
        let deferred: Vec<Diagnostic> = rewrite.deferred.into_iter().map(|f| f.diagnostic).collect();
        self.record(&applied, |stats| &mut stats.fixes_applied);
        self.record(&deferred, |stats| &mut stats.fixes_deferred);
        Ok(BatchOutcome {
            tree: rewrite.tree,
            diagnostics,
            applied,
            deferred,
        })
    }

    /// Alternates analysis and batched fixing until no fix applies, at most
    /// `max_fix_iterations` times. Fixable diagnostics left over after the
    /// last pass are an error.
    pub fn fix_until_stable(&self, text: &str) -> Result<FixOutcome> {
        let limit = self.config.max_fix_iterations;
        let mut tree = self.parse(text)?;
        let mut applied = Vec::new();
        for iteration in 0..limit {
            let batch = self.fix_batch(&tree)?;
            if batch.applied.is_empty() {
                debug!(iterations = iteration, fixed = applied.len(), "fixes converged");
                return Ok(FixOutcome {
                    tree,
                    applied,
                    remaining: batch.diagnostics,
                    iterations: iteration,
                });
            }
            applied.extend(batch.applied);
            tree = batch.tree;
        }

        let remaining = self.analyze(&tree);
        for diagnostic in &remaining {
            if fix::fix_for(&tree, diagnostic)?.is_some() {
                warn!(limit, rule = %diagnostic.rule, "fix limit reached with fixable diagnostics left");
                return Err(LintError::FixLimitExceeded { limit });
            }
        }
        Ok(FixOutcome {
            tree,
            applied,
            remaining,
            iterations: limit,
        })
    }

    /// Reads and fixes files in parallel. Nothing is written back.
    pub fn fix_files(&self, files: &[PathBuf]) -> Vec<Result<FixOutcome>> {
        info!(files = files.len(), "fixing");
        files
            .par_iter()
            .map(|path| {
                let text = fs::read_to_string(path)?;
                self.fix_until_stable(&text)
            })
            .collect()
    }

    /// Statistics for every rule that has produced something, in rule
    /// table order.
    pub fn stats(&self) -> Vec<RuleStats> {
        let stats = self.stats.lock();
        RuleId::ALL
            .iter()
            .filter_map(|id| stats.get(id).cloned())
            .collect()
    }

    pub fn clear_stats(&self) {
        self.stats.lock().clear();
    }

    fn record(&self, diagnostics: &[Diagnostic], counter: impl Fn(&mut RuleStats) -> &mut u64) {
        if diagnostics.is_empty() {
            return;
        }
        let mut stats = self.stats.lock();
        for diagnostic in diagnostics {
            let entry = stats
                .entry(diagnostic.rule)
                .or_insert_with(|| RuleStats::new(diagnostic.rule.name().to_string()));
            *counter(entry) += 1;
        }
    }
}

/// Source files under `root`, sorted. A file path is returned as is.
pub fn collect_sources(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if root.is_file() {
        files.push(root.to_path_buf());
    } else {
        collect_recursive(root, &mut files)?;
        files.sort();
    }
    debug!(root = %root.display(), files = files.len(), "collected sources");
    Ok(files)
}

fn collect_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let hidden = path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().starts_with('.'));
        if hidden {
            continue;
        }
        if path.is_dir() {
            collect_recursive(&path, files)?;
        } else if is_source_file(&path) {
            files.push(path);
        }
    }
    Ok(())
}

fn is_source_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        let ext = ext.to_string_lossy().to_lowercase();
        SOURCE_EXTENSIONS.iter().any(|known| *known == ext)
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_unparsable_source_skips_rules() {
        let linter = Linter::default();
        let report = linter.lint_source(Path::new("broken.cs"), "class C { void M() { goto ; } ");
        assert!(report.diagnostics.is_empty());
        assert!(!report.parse_errors.is_empty());
        assert_eq!(report.location(report.parse_errors[0].span).line, 1);
        assert!(matches!(linter.parse("class {"), Err(LintError::Parse { .. })));
    }

    #[test]
    fn test_stats_track_diagnostics_and_fixes() {
        let linter = Linter::default();
        let outcome = linter
            .fix_until_stable("class C {\n    bool M(bool b) {\n        return b ? true : false;\n    }\n}\n")
            .unwrap();
        assert_eq!(
            outcome.text(),
            "class C {\n    bool M(bool b) {\n        return b;\n    }\n}\n"
        );
        let stats = linter.stats();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].rule_name, "redundant-ternary");
        assert_eq!(stats[0].diagnostics, 1);
        assert_eq!(stats[0].fixes_applied, 1);
        assert_eq!(stats[0].fix_rate(), 1.0);
        linter.clear_stats();
        assert!(linter.stats().is_empty());
    }

    #[test]
    fn test_converged_tree_is_analyzed_once() {
        let linter = Linter::default();
        let outcome = linter.fix_until_stable("class C { void M() { again: goto again; } }").unwrap();
        assert_eq!(outcome.iterations, 0);
        assert_eq!(outcome.remaining.len(), 1);
        assert_eq!(outcome.remaining[0].tree, outcome.tree.id());
        let stats = linter.stats();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].rule_name, "goto");
        assert_eq!(stats[0].diagnostics, 1);
        assert_eq!(stats[0].fixes_applied, 0);
    }

    #[test]
    fn test_fix_limit() {
        let mut config = LintConfig::default();
        config.max_fix_iterations = 1;
        let linter = Linter::new(config).unwrap();
        // the inner ternary overlaps the outer fix and waits for a second pass
        let nested = "class C { bool M(bool b) { return (b ? true : false) ? true : false; } }";
        assert!(matches!(
            linter.fix_until_stable(nested),
            Err(LintError::FixLimitExceeded { limit: 1 })
        ));

        let linter = Linter::default();
        let outcome = linter.fix_until_stable(nested).unwrap();
        assert_eq!(outcome.text(), "class C { bool M(bool b) { return (b); } }");
        assert_eq!(outcome.iterations, 2);
        assert!(outcome.remaining.is_empty());
    }

    #[test]
    fn test_report_serializes_without_tree_identity() {
        let report = Linter::default().lint_source(Path::new("a.cs"), "class C { void M() { again: goto again; } }");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["path"], "a.cs");
        assert_eq!(json["diagnostics"][0]["rule"], "goto");
        assert_eq!(json["diagnostics"][0]["severity"], report.diagnostics[0].severity.to_string());
        assert!(json["diagnostics"][0].get("tree").is_none());
        assert!(json.get("lines").is_none());
    }

    #[test]
    fn test_collect_sources() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join("b.cs"), "class B { }").unwrap();
        fs::write(dir.path().join("nested/a.CS"), "class A { }").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::write(dir.path().join(".git/c.cs"), "").unwrap();

        let files = collect_sources(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().display().to_string())
            .collect();
        assert_eq!(names, vec!["b.cs", "nested/a.CS"]);

        let reports = Linter::default().lint_files(&files);
        assert!(reports.iter().all(|r| r.as_ref().is_ok_and(FileReport::is_clean)));
    }
}

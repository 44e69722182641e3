//! Output backends for lint and fix results.
//!
//! `TextReporter` prints one `path:line:column: ...` line per finding as it
//! arrives; `JsonReporter` collects everything and writes a single document
//! at the end.

use std::io::{self, Write};

use serde::Serialize;
use sharplint_core::fix::provider_for;
use sharplint_core::rules::BUILTIN_RULES;
use sharplint_core::{FileReport, LintConfig, RuleId, Severity};

/// Fix results attached to a file report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FixSummary {
    pub applied: usize,
    pub written: bool,
}

/// Totals over one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub files: usize,
    pub diagnostics: usize,
    pub parse_failures: usize,
    pub fixes_applied: usize,
    /// Fixes found but not written back.
    pub fixes_pending: usize,
}

impl Summary {
    pub fn add(&mut self, report: &FileReport, fixes: Option<FixSummary>) {
        self.files += 1;
        self.diagnostics += report.diagnostics.len();
        if !report.parse_errors.is_empty() {
            self.parse_failures += 1;
        }
        if let Some(fixes) = fixes {
            if fixes.written {
                self.fixes_applied += fixes.applied;
            } else {
                self.fixes_pending += fixes.applied;
            }
        }
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics == 0 && self.parse_failures == 0 && self.fixes_pending == 0
    }
}

/// Receives results as the runner produces them.
pub trait Reporter {
    fn file(&mut self, report: &FileReport, fixes: Option<FixSummary>) -> io::Result<()>;

    fn rules(&mut self, config: &LintConfig) -> io::Result<()>;

    fn finish(&mut self, summary: &Summary) -> io::Result<()>;
}

pub struct TextReporter<W: Write> {
    out: W,
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn file(&mut self, report: &FileReport, fixes: Option<FixSummary>) -> io::Result<()> {
        let path = report.path.display();
        if let Some(fixes) = fixes.filter(|f| f.applied > 0) {
            let verb = if fixes.written { "fixed" } else { "would fix" };
            writeln!(self.out, "{path}: {verb} {} issue(s)", fixes.applied)?;
        }
        for error in &report.parse_errors {
            let at = report.location(error.span);
            writeln!(self.out, "{path}:{}:{}: error: {}", at.line, at.column, error.message)?;
        }
        for diagnostic in &report.diagnostics {
            let at = report.location(diagnostic.span);
            writeln!(self.out, "{path}:{}:{}: {diagnostic}", at.line, at.column)?;
        }
        Ok(())
    }

    fn rules(&mut self, config: &LintConfig) -> io::Result<()> {
        for descriptor in BUILTIN_RULES {
            let enabled = if config.is_enabled(descriptor) { "on" } else { "off" };
            let fixable = if provider_for(descriptor.id).is_some() { "fix" } else { "-" };
            writeln!(
                self.out,
                "{}  {:<26} {:<10} {:<3} {:<3}  {}",
                descriptor.id.code(),
                descriptor.id.name(),
                config.severity_for(descriptor).to_string(),
                enabled,
                fixable,
                descriptor.description
            )?;
        }
        Ok(())
    }

    fn finish(&mut self, summary: &Summary) -> io::Result<()> {
        write!(
            self.out,
            "{} diagnostic(s) in {} file(s)",
            summary.diagnostics, summary.files
        )?;
        if summary.parse_failures > 0 {
            write!(self.out, ", {} file(s) could not be parsed", summary.parse_failures)?;
        }
        if summary.fixes_applied > 0 {
            write!(self.out, ", {} fix(es) applied", summary.fixes_applied)?;
        }
        if summary.fixes_pending > 0 {
            write!(self.out, ", {} fix(es) available", summary.fixes_pending)?;
        }
        writeln!(self.out)
    }
}

#[derive(Debug, Serialize)]
struct JsonDiagnostic {
    code: String,
    rule: RuleId,
    severity: Severity,
    message: String,
    line: usize,
    column: usize,
    start: usize,
    end: usize,
}

#[derive(Debug, Serialize)]
struct JsonParseError {
    message: String,
    line: usize,
    column: usize,
}

#[derive(Debug, Serialize)]
struct JsonFile {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fixes: Option<FixSummary>,
    diagnostics: Vec<JsonDiagnostic>,
    parse_errors: Vec<JsonParseError>,
}

#[derive(Debug, Serialize)]
struct JsonRule {
    code: String,
    name: &'static str,
    description: &'static str,
    severity: Severity,
    enabled: bool,
    fixable: bool,
}

#[derive(Debug, Serialize)]
struct JsonDocument<'a> {
    files: &'a [JsonFile],
    summary: &'a Summary,
}

pub struct JsonReporter<W: Write> {
    out: W,
    files: Vec<JsonFile>,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            files: Vec::new(),
        }
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn file(&mut self, report: &FileReport, fixes: Option<FixSummary>) -> io::Result<()> {
        let diagnostics = report
            .diagnostics
            .iter()
            .map(|d| {
                let at = report.location(d.span);
                JsonDiagnostic {
                    code: d.code(),
                    rule: d.rule,
                    severity: d.severity,
                    message: d.message.clone(),
                    line: at.line,
                    column: at.column,
                    start: d.span.start,
                    end: d.span.end,
                }
            })
            .collect();
        let parse_errors = report
            .parse_errors
            .iter()
            .map(|e| {
                let at = report.location(e.span);
                JsonParseError {
                    message: e.message.clone(),
                    line: at.line,
                    column: at.column,
                }
            })
            .collect();
        self.files.push(JsonFile {
            path: report.path.display().to_string(),
            fixes,
            diagnostics,
            parse_errors,
        });
        Ok(())
    }

    fn rules(&mut self, config: &LintConfig) -> io::Result<()> {
        let rules: Vec<JsonRule> = BUILTIN_RULES
            .iter()
            .map(|descriptor| JsonRule {
                code: descriptor.id.code(),
                name: descriptor.id.name(),
                description: descriptor.description,
                severity: config.severity_for(descriptor),
                enabled: config.is_enabled(descriptor),
                fixable: provider_for(descriptor.id).is_some(),
            })
            .collect();
        serde_json::to_writer_pretty(&mut self.out, &rules)?;
        writeln!(self.out)
    }

    fn finish(&mut self, summary: &Summary) -> io::Result<()> {
        let document = JsonDocument {
            files: &self.files,
            summary,
        };
        serde_json::to_writer_pretty(&mut self.out, &document)?;
        writeln!(self.out)
    }
}

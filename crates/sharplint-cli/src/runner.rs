//! Executes a parsed invocation against the engine.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use sharplint_core::config::DEFAULT_CONFIG_FILE;
use sharplint_core::syntax::LineIndex;
use sharplint_core::{collect_sources, FileReport, LintConfig, LintError, Linter, RuleId};
use tracing::{debug, info};

use crate::cli::{Action, CliArgs, OutputFormat};
use crate::report::{FixSummary, JsonReporter, Reporter, Summary, TextReporter};

/// Overall result of a run, mapped to the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Clean,
    /// Diagnostics, unparsable files or unwritten fixes remain.
    Findings,
}

impl Status {
    pub fn exit_code(self) -> u8 {
        match self {
            Status::Clean => 0,
            Status::Findings => 1,
        }
    }
}

/// Runs `args` with relative paths resolved against `cwd`, writing all
/// results to `out`.
pub fn run(args: &CliArgs, cwd: &Path, out: &mut dyn Write) -> Result<Status> {
    let config = load_config(args, cwd)?;
    let linter = Linter::new(config).context("invalid configuration")?;
    let mut reporter: Box<dyn Reporter + '_> = match args.format {
        OutputFormat::Text => Box::new(TextReporter::new(out)),
        OutputFormat::Json => Box::new(JsonReporter::new(out)),
    };

    match &args.action {
        Action::Check { paths } => check(&linter, &sources(paths, cwd)?, reporter.as_mut()),
        Action::Fix { paths, write } => fix(&linter, &sources(paths, cwd)?, *write, reporter.as_mut()),
        Action::Rules => {
            reporter.rules(linter.config())?;
            Ok(Status::Clean)
        }
    }
}

/// The explicit `--config` file, else `sharplint.toml` in `cwd` when it
/// exists, else defaults; `--enable`/`--disable` are applied on top.
pub fn load_config(args: &CliArgs, cwd: &Path) -> Result<LintConfig> {
    let path = match &args.config {
        Some(path) => Some(cwd.join(path)),
        None => Some(cwd.join(DEFAULT_CONFIG_FILE)).filter(|p| p.is_file()),
    };
    let mut config = match path {
        Some(path) => {
            debug!(path = %path.display(), "using config file");
            LintConfig::load(&path).with_context(|| format!("failed to load {}", path.display()))?
        }
        None => LintConfig::default(),
    };
    for name in &args.enable {
        config.enable(rule_named(name)?);
    }
    for name in &args.disable {
        config.disable(rule_named(name)?);
    }
    Ok(config)
}

fn rule_named(name: &str) -> Result<RuleId> {
    RuleId::from_name(name).ok_or_else(|| anyhow!("unknown rule `{name}`"))
}

fn sources(paths: &[PathBuf], cwd: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        let path = cwd.join(path);
        let found = collect_sources(&path).with_context(|| format!("failed to scan {}", path.display()))?;
        files.extend(found);
    }
    files.dedup();
    Ok(files)
}

fn check(linter: &Linter, files: &[PathBuf], reporter: &mut dyn Reporter) -> Result<Status> {
    let mut summary = Summary::default();
    for (path, report) in files.iter().zip(linter.lint_files(files)) {
        let report = report.with_context(|| format!("failed to read {}", path.display()))?;
        summary.add(&report, None);
        reporter.file(&report, None)?;
    }
    reporter.finish(&summary)?;
    Ok(status(&summary))
}

fn fix(linter: &Linter, files: &[PathBuf], write: bool, reporter: &mut dyn Reporter) -> Result<Status> {
    let mut summary = Summary::default();
    for (path, outcome) in files.iter().zip(linter.fix_files(files)) {
        let (report, fixes) = match outcome {
            Ok(outcome) => {
                let text = outcome.text();
                let written = write && outcome.changed();
                if written {
                    fs::write(path, &text).with_context(|| format!("failed to write {}", path.display()))?;
                    info!(path = %path.display(), fixes = outcome.applied.len(), "wrote fixes");
                }
                let fixes = FixSummary {
                    applied: outcome.applied.len(),
                    written,
                };
                let report = FileReport {
                    path: path.clone(),
                    diagnostics: outcome.remaining,
                    parse_errors: Vec::new(),
                    lines: LineIndex::new(&text),
                };
                (report, Some(fixes))
            }
            Err(LintError::Parse { errors }) => {
                let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
                let report = FileReport {
                    path: path.clone(),
                    diagnostics: Vec::new(),
                    parse_errors: errors,
                    lines: LineIndex::new(&text),
                };
                (report, None)
            }
            Err(e) => return Err(e).with_context(|| format!("failed to fix {}", path.display())),
        };
        summary.add(&report, fixes);
        reporter.file(&report, fixes)?;
    }
    reporter.finish(&summary)?;
    Ok(status(&summary))
}

fn status(summary: &Summary) -> Status {
    if summary.is_clean() {
        Status::Clean
    } else {
        Status::Findings
    }
}

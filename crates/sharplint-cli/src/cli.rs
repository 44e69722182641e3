//! Command-line definition and argument extraction.
//!
//! Options shared by every subcommand (`--config`, `--enable`, `--disable`,
//! `--format`, `--verbose`) are global so they can appear on either side of
//! the subcommand name.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// What the invocation asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Report diagnostics without touching any file
    Check { paths: Vec<PathBuf> },
    /// Fix until stable; files are only rewritten with `write`
    Fix { paths: Vec<PathBuf>, write: bool },
    /// List the built-in rules under the effective configuration
    Rules,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub action: Action,
    pub config: Option<PathBuf>,
    pub enable: Vec<String>,
    pub disable: Vec<String>,
    pub format: OutputFormat,
    pub verbose: bool,
}

pub fn build_command() -> Command {
    let paths = Arg::new("paths")
        .value_name("PATH")
        .help("Source files or directories to scan")
        .num_args(1..)
        .required(true)
        .value_parser(value_parser!(PathBuf));

    Command::new("sharplint")
        .version(sharplint_core::VERSION)
        .about("Diagnostics and automatic fixes for C# sources")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("Configuration file (defaults to ./sharplint.toml when present)")
                .global(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("enable")
                .long("enable")
                .value_name("RULE")
                .help("Enable a rule by name or code")
                .global(true)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("disable")
                .long("disable")
                .value_name("RULE")
                .help("Disable a rule by name or code")
                .global(true)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .value_name("FORMAT")
                .help("Output format")
                .global(true)
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Enable debug logging")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("check")
                .about("Report diagnostics")
                .arg(paths.clone()),
        )
        .subcommand(
            Command::new("fix")
                .about("Apply fixes until nothing fixable is left")
                .arg(paths)
                .arg(
                    Arg::new("write")
                        .long("write")
                        .short('w')
                        .help("Write fixed sources back to disk")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("rules").about("List the built-in rules"))
}

impl CliArgs {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let (name, sub) = matches
            .subcommand()
            .ok_or_else(|| anyhow!("a subcommand is required"))?;
        let paths = |m: &ArgMatches| -> Vec<PathBuf> {
            m.get_many::<PathBuf>("paths")
                .map(|values| values.cloned().collect())
                .unwrap_or_default()
        };
        let action = match name {
            "check" => Action::Check { paths: paths(sub) },
            "fix" => Action::Fix {
                paths: paths(sub),
                write: sub.get_flag("write"),
            },
            "rules" => Action::Rules,
            other => bail!("unknown subcommand `{other}`"),
        };

        let names = |id: &str| -> Vec<String> {
            sub.get_many::<String>(id)
                .map(|values| values.cloned().collect())
                .unwrap_or_default()
        };
        let format = match sub.get_one::<String>("format").map(String::as_str) {
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Text,
        };
        Ok(Self {
            action,
            config: sub.get_one::<PathBuf>("config").cloned(),
            enable: names("enable"),
            disable: names("disable"),
            format,
            verbose: sub.get_flag("verbose"),
        })
    }

    /// Parses an argument vector, program name first.
    pub fn try_parse_from<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = build_command().try_get_matches_from(args)?;
        Self::from_matches(&matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_global_options_on_either_side() {
        let args = CliArgs::try_parse_from([
            "sharplint",
            "--enable",
            "cast-to-as",
            "fix",
            "src",
            "lib",
            "--write",
            "--format",
            "json",
            "--disable",
            "SL0007",
        ])
        .unwrap();
        assert_eq!(
            args.action,
            Action::Fix {
                paths: vec![PathBuf::from("src"), PathBuf::from("lib")],
                write: true
            }
        );
        assert_eq!(args.enable, vec!["cast-to-as"]);
        assert_eq!(args.disable, vec!["SL0007"]);
        assert_eq!(args.format, OutputFormat::Json);
        assert!(!args.verbose);
    }

    #[test]
    fn test_check_requires_paths() {
        assert!(CliArgs::try_parse_from(["sharplint", "check"]).is_err());
        assert!(CliArgs::try_parse_from(["sharplint", "--format", "xml", "rules"]).is_err());
        let args = CliArgs::try_parse_from(["sharplint", "rules", "-v"]).unwrap();
        assert_eq!(args.action, Action::Rules);
        assert_eq!(args.format, OutputFormat::Text);
        assert!(args.verbose);
    }

    #[test]
    fn test_command_definition_is_consistent() {
        build_command().debug_assert();
    }
}

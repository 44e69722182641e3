//! sharplint command-line front end
//!
//! Argument parsing, the check/fix/rules runner and the text and JSON
//! reporters behind the `sharplint` binary.

pub mod cli;
pub mod report;
pub mod runner;

pub use cli::{build_command, Action, CliArgs, OutputFormat};
pub use report::{FixSummary, JsonReporter, Reporter, Summary, TextReporter};
pub use runner::{load_config, run, Status};

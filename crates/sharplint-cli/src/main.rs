use std::io;
use std::process::ExitCode;

use anyhow::Result;
use sharplint_cli::{build_command, run, CliArgs, Status};
use sharplint_core::init_tracing;

fn main() -> ExitCode {
    match try_main() {
        Ok(status) => ExitCode::from(status.exit_code()),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn try_main() -> Result<Status> {
    let matches = build_command().get_matches();
    let args = CliArgs::from_matches(&matches)?;
    init_tracing(args.verbose);

    let cwd = std::env::current_dir()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&args, &cwd, &mut out)
}

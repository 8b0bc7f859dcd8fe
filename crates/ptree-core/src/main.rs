//! ptree - display a tree of processes
//!
//! The main entry point handles:
//! - Command-line parsing and the `--version` forms
//! - Logging setup
//! - Mapping failures to messages and exit codes

use clap::error::ErrorKind;
use ptree_common::Error;
use ptree_core::cli::{version_text, Cli};
use ptree_core::collect::open_default;
use ptree_core::config::Config;
use ptree_core::exit_codes::ExitCode;
use ptree_core::logging::{init_logging, level_from_flags, LogConfig};
use ptree_core::owners::SystemUsers;
use ptree_core::pipeline::print_tree;
use ptree_core::terminal::TerminalCaps;
use std::io::{self, BufWriter, Write};
use tracing::debug;

// ============================================================================
// Main entry point
// ============================================================================

fn main() {
    let cli = match Cli::try_parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::Success,
                _ => ExitCode::ArgsError,
            };
            std::process::exit(code.as_i32());
        }
    };

    init_logging(&LogConfig::from_env(level_from_flags(cli.verbose, cli.quiet)));

    if let Some(style) = &cli.version {
        print!("{}", version_text(style.as_deref()));
        std::process::exit(ExitCode::Success.as_i32());
    }

    let exit_code = match run(&cli) {
        Ok(()) => ExitCode::Success,
        Err(err) => report(&err),
    };
    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Command implementation
// ============================================================================

fn run(cli: &Cli) -> Result<(), Error> {
    let caps = TerminalCaps::detect();
    let owners = SystemUsers::new();
    let config = Config::resolve(cli, &caps, &owners)?;
    let source = open_default(cli.snapshot.as_deref())?;

    let stdout = io::stdout();
    let out = BufWriter::new(stdout.lock());
    match print_tree(&config, &owners, source.as_ref(), out) {
        Ok(mut out) => finish_output(out.flush()),
        Err(Error::Io(err)) => finish_output(Err(err)),
        Err(err) => Err(err),
    }
}

/// A reader that went away (`ptree | head`) is not a failure.
fn finish_output(result: io::Result<()>) -> Result<(), Error> {
    match result {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
            debug!("stdout closed early");
            Ok(())
        }
        other => other.map_err(Error::from),
    }
}

fn report(err: &Error) -> ExitCode {
    eprintln!("ptree: {err}");
    if err.wants_usage() {
        eprint!("{}", Cli::usage());
        eprintln!();
        eprintln!("{}", err.remediation());
    }
    let code = ExitCode::from(err);
    debug!(code = %code, error_code = err.code(), "exiting with error");
    code
}

//! Command line interface for kodegen_bundler_playstore.
//!
//! Parses the single-dash flags, resolves the publish configuration
//! and runs the publish command with console progress output.

mod args;
pub mod commands;
mod output;

pub use args::{Args, RuntimeConfig, normalize_legacy_flags};
pub use commands::execute_command;
pub use output::OutputManager;

use crate::error::{CliError, FAILURE_EXIT_CODE, Result};
use clap::CommandFactory;
use std::ffi::OsString;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    run_from(std::env::args_os()).await
}

/// Run with an explicit argument vector (argv[0] included)
pub async fn run_from<I, T>(argv: I) -> Result<i32>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();

    if argv.len() <= 1 {
        let output = OutputManager::new();
        output.error(&CliError::NoArguments.to_string());
        let _ = output.eprintln("Options:");
        let _ = output.eprintln(&Args::command().render_help().to_string());
        return Ok(FAILURE_EXIT_CODE);
    }

    let args = match Args::try_parse_args(argv) {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return Ok(e.exit_code());
        }
    };

    execute_command(args).await
}

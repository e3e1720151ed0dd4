//! # Native Dependencies CLI
//!
//! This is the binary entry point for the `native-deps` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Reporting errors, with their hints, on stderr.
//!
//! Exit codes: 0 on success, 1 when a command fails, 2 for usage errors
//! (reported by `clap` before any command runs).
//!
//! The core application logic is defined in the `lib.rs` library crate, so
//! the binary stays a thin wrapper around it.

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;

use native_deps::suggestions;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    let output = cli.output_config();

    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = format!("{e:#}");
            let (error, hints) = suggestions::split_hints(&message);
            eprintln!("{}", output.error(error));
            if !hints.is_empty() {
                eprintln!();
                for hint in hints {
                    eprintln!("{}", output.hint(hint));
                }
            }
            ExitCode::FAILURE
        }
    }
}

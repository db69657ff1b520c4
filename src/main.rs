//! # antsibull-tool CLI
//!
//! This is the binary entry point for the `antsibull-tool` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Loading the configuration file and setting up logging.
//! - Executing the appropriate command and turning its outcome into the
//!   process exit code.
//!
//! The core application logic is defined in the `lib.rs` library crate, ensuring
//! that the binary is a thin wrapper around the reusable library functionality.

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    cli.execute()
}

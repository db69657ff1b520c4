//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `antsibull-tool` command-line tool. Each subcommand is defined in its own
//! file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and the loaded
//!   configuration, performs the command's logic through the `antsibull_tool`
//!   library and returns the process exit code.

pub mod run_local_collection;

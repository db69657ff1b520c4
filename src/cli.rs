//! CLI argument parsing and command dispatch

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{debug, LevelFilter};

use antsibull_tool::config::{self, CONFIG_ENV};
use antsibull_tool::exit_codes;
use antsibull_tool::logging::{self, parse_level, ColorChoice};

use crate::commands;

/// Ansible Community Toolkit
#[derive(Parser, Debug)]
#[command(name = "antsibull-tool")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Path to a YAML configuration file
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        env = CONFIG_ENV
    )]
    config_file: Option<PathBuf>,

    /// Colorize log output
    #[arg(long, global = true, value_name = "WHEN", value_enum)]
    color: Option<ColorChoice>,

    /// Set log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", value_parser = parse_level)]
    log_level: Option<LevelFilter>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run command in the local collection checkout.
    ///
    /// The command's return code is returned without modification.
    RunLocalCollection(commands::run_local_collection::RunLocalCollectionArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> ExitCode {
        let config = match config::load(self.config_file.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("error: {}", e);
                return ExitCode::from(if e.is_config_error() {
                    exit_codes::USAGE
                } else {
                    exit_codes::UNHANDLED
                });
            }
        };

        let level = self
            .log_level
            .or(config.log_level())
            .unwrap_or(logging::DEFAULT_LEVEL);
        let color = self.color.or(config.color).unwrap_or_default();
        logging::init(level, color);
        match config::resolve_path(self.config_file.as_deref()) {
            Some(path) => debug!("Loaded configuration from {}", path.display()),
            None => debug!("No configuration file, using defaults"),
        }

        let result = match self.command {
            Commands::RunLocalCollection(args) => {
                commands::run_local_collection::execute(args, &config)
            }
        };

        match result {
            Ok(code) => code,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                ExitCode::from(exit_codes::UNHANDLED)
            }
        }
    }
}

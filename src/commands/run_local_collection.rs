//! # Run Local Collection Command Implementation
//!
//! This module implements the `run-local-collection` subcommand, which copies
//! the collection checkout in the current directory into a temporary
//! `ansible_collections/<namespace>/<name>` tree and runs a command inside it.
//!
//! ## Usage
//!
//! ```text
//! antsibull-tool run-local-collection ansible-test sanity --docker
//! antsibull-tool run-local-collection --template -- tox -e {collection_name}
//! ```
//!
//! The exit code of the command is returned unchanged. Problems with the
//! collection metadata, templating or the temporary tree exit with code 5.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use antsibull_tool::config::AppConfig;
use antsibull_tool::exit_codes;
use antsibull_tool::run::{run_local_collection, RunOptions};
use antsibull_tool::vcs::VcsMode;

/// Arguments for the run-local-collection command
#[derive(Args, Debug)]
pub struct RunLocalCollectionArgs {
    /// The command to run.
    #[arg(
        value_name = "COMMAND",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,

    /// The VCS to use to determine which files to copy [default: auto]
    #[arg(long, value_enum, value_name = "VCS")]
    pub vcs: Option<VcsMode>,

    /// Use templating for the command.
    ///
    /// Variables: {cwd}, {root_path}, {collection_path}, {namespace}, {name},
    /// {collection_name}. Use {{ and }} for literal braces.
    #[arg(long, overrides_with = "no_template")]
    pub template: bool,

    /// Pass the command through without templating (default)
    #[arg(long, overrides_with = "template")]
    pub no_template: bool,
}

impl RunLocalCollectionArgs {
    /// Combine the flags with the configured defaults.
    fn into_options(self, config: &AppConfig) -> RunOptions {
        let defaults = &config.run_local_collection;
        let template = if self.template {
            true
        } else if self.no_template {
            false
        } else {
            defaults.template.unwrap_or(false)
        };

        RunOptions {
            argv: self.command,
            vcs: self.vcs.or(defaults.vcs).unwrap_or_default(),
            template,
        }
    }
}

/// Execute the run-local-collection command
pub fn execute(args: RunLocalCollectionArgs, config: &AppConfig) -> Result<ExitCode> {
    let options = args.into_options(config);
    let cwd = std::env::current_dir().context("Failed to get current directory")?;

    let code = run_local_collection(&options, &cwd)?;
    Ok(ExitCode::from(exit_codes::from_child_code(code)))
}

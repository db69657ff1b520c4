//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for the
//! `antsibull-tool` application. It uses the `thiserror` library to create a
//! single `Error` enum that covers all anticipated failure modes, each variant
//! carrying enough context (a file path, an argument, a program name) to
//! diagnose the problem from the log line alone.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors that can
//!   occur within the application.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the library.
//!
//! The variants fall into the classes the CLI maps to exit codes:
//!
//! - Configuration errors (exit code 2).
//! - Orchestration failures: collection metadata, templating, VCS detection
//!   and copier lifecycle errors (exit code 5).
//! - Hard failures such as a command that cannot be spawned (exit code 1).

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for antsibull-tool operations
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration file could not be read or is invalid.
    #[error("Configuration error in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// A `galaxy.yml` or `MANIFEST.json` was found but could not be loaded.
    #[error("Error while loading collection details from {}: {reason}", path.display())]
    CollectionDetails { path: PathBuf, reason: String },

    /// Neither `galaxy.yml` nor `MANIFEST.json` exist in the directory.
    #[error("Cannot find galaxy.yml or MANIFEST.json in {}", dir.display())]
    MetadataNotFound { dir: PathBuf },

    /// A command line argument could not be templated.
    ///
    /// `index` is 1-based.
    #[error("Error while templating argument {argument:?} (#{index}): {reason}")]
    Template {
        index: usize,
        argument: String,
        reason: String,
    },

    /// The VCS of a directory could not be determined.
    #[error("VCS detection failed for {}: {message}", path.display())]
    Vcs { path: PathBuf, message: String },

    /// The synthetic collection tree could not be created, populated or removed.
    #[error("Copier error: {message}")]
    Copier { message: String },

    /// The command to run could not be started.
    #[error("Failed to run {program}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is one of the known orchestration failure classes.
    ///
    /// These are reported with [`crate::exit_codes::ORCHESTRATION_FAILURE`]
    /// instead of being treated as unhandled errors.
    pub fn is_orchestration_failure(&self) -> bool {
        matches!(
            self,
            Error::CollectionDetails { .. }
                | Error::MetadataNotFound { .. }
                | Error::Template { .. }
                | Error::Vcs { .. }
                | Error::Copier { .. }
        )
    }

    /// Whether this error should be reported as a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config { .. })
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

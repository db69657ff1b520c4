//! VCS detection.
//!
//! Decides which copier `run-local-collection` uses when `--vcs auto` is
//! given. Only git is recognized; everything else is treated as a plain
//! directory.

use std::fmt;
use std::path::Path;
use std::process::Command;

use log::{debug, info};

use crate::error::{Error, Result};

/// Version control system of a collection checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vcs {
    /// Not under version control; copy all files.
    None,
    /// A git work tree; copy tracked and unignored files.
    Git,
}

/// How the VCS is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VcsMode {
    /// Detect the VCS of the current directory.
    #[default]
    Auto,
    /// Copy all files.
    None,
    /// Copy only files known to git.
    Git,
}

impl VcsMode {
    /// Resolve the mode to a concrete VCS, running detection for `Auto`.
    pub fn resolve(self, path: &Path) -> Result<Vcs> {
        match self {
            VcsMode::Auto => detect_vcs(path),
            VcsMode::None => Ok(Vcs::None),
            VcsMode::Git => Ok(Vcs::Git),
        }
    }
}

impl fmt::Display for VcsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VcsMode::Auto => "auto",
            VcsMode::None => "none",
            VcsMode::Git => "git",
        })
    }
}

/// Detect the VCS used for `path`.
///
/// Runs `git rev-parse --show-toplevel` in `path`. If git is not installed or
/// `path` is not inside a work tree, the directory is treated as unversioned.
pub fn detect_vcs(path: &Path) -> Result<Vcs> {
    if !path.is_dir() {
        return Err(Error::Vcs {
            path: path.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }
    debug!("Trying to determine whether {} is a Git repository", path.display());
    let output = match Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .current_dir(path)
        .output()
    {
        Ok(output) => output,
        Err(e) => {
            debug!("Could not run git: {}", e);
            info!("No VCS found for {}", path.display());
            return Ok(Vcs::None);
        }
    };

    if output.status.success() {
        let toplevel = String::from_utf8_lossy(&output.stdout);
        info!(
            "Identified {} as a Git repository (root: {})",
            path.display(),
            toplevel.trim()
        );
        Ok(Vcs::Git)
    } else {
        debug!(
            "git rev-parse failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
        info!("No VCS found for {}", path.display());
        Ok(Vcs::None)
    }
}

/// Whether a usable `git` binary is on the `PATH`.
#[cfg(test)]
pub(crate) fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success())
}

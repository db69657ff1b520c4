//! Process exit codes used by the `antsibull-tool` binary.
//!
//! When `run-local-collection` succeeds in starting the command, the command's
//! own exit code is returned unchanged, so these values only describe the
//! tool's own outcomes.

/// The command ran and exited with status 0.
pub const SUCCESS: u8 = 0;

/// Unhandled error, for example a command that could not be started.
pub const UNHANDLED: u8 = 1;

/// Invalid command line usage or an invalid configuration file.
pub const USAGE: u8 = 2;

/// A known orchestration failure: collection metadata could not be loaded,
/// an argument could not be templated, or the collection tree could not be
/// created or removed.
pub const ORCHESTRATION_FAILURE: u8 = 5;

/// Convert a child process exit code into a process exit status byte.
///
/// Codes outside `0..=255` (possible on Windows) are truncated the same way
/// a POSIX shell would report them.
pub fn from_child_code(code: i32) -> u8 {
    (code & 0xff) as u8
}

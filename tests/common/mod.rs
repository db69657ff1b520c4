//! Shared test utilities for E2E tests.
//!
//! This module provides common fixtures and helper functions to reduce
//! duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_galaxy_yml(collections::MINIMAL);
//!     fixture.command().args(["run-local-collection", "true"]).assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::collections;
    #[allow(unused_imports)]
    pub use super::git_available;
    pub use super::TestFixture;
}

/// Collection metadata snippets for testing.
#[allow(dead_code)]
pub mod collections {
    /// Minimal valid `galaxy.yml`.
    pub const MINIMAL: &str = "---\nnamespace: ns\nname: col\n";

    /// `galaxy.yml` with the usual extra keys.
    pub const FULL: &str = r#"---
namespace: community
name: example
version: 1.0.0
readme: README.md
authors:
  - Someone
dependencies:
  community.general: ">=1.0.0"
"#;

    /// `galaxy.yml` without a name.
    pub const MISSING_NAME: &str = "---\nnamespace: ns\n";

    /// `MANIFEST.json` of an installed collection.
    pub const MANIFEST: &str =
        r#"{"collection_info": {"namespace": "testns", "name": "testcol", "dependencies": {}}, "format": 1}"#;
}

/// Whether a usable `git` binary is installed.
#[allow(dead_code)]
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success())
}

/// A test fixture that provides a temporary collection checkout.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new()
///     .with_galaxy_yml(collections::MINIMAL)
///     .with_file("plugins/modules/foo.py", "# module");
///
/// fixture.command()
///     .args(["run-local-collection", "--vcs", "none", "ls"])
///     .assert()
///     .success();
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `galaxy.yml` with the given content.
    pub fn with_galaxy_yml(self, content: &str) -> Self {
        self.with_file("galaxy.yml", content)
    }

    /// Add a `MANIFEST.json` with the given content.
    pub fn with_manifest_json(self, content: &str) -> Self {
        self.with_file("MANIFEST.json", content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Turn the checkout into a git repository, adding `tracked` to the index.
    pub fn with_git(self, tracked: &[&str]) -> Self {
        self.git(&["init", "-q"]);
        let mut args = vec!["add", "--"];
        args.extend_from_slice(tracked);
        self.git(&args);
        self
    }

    fn git(&self, args: &[&str]) {
        let status = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .status()
            .expect("Failed to run git");
        assert!(status.success(), "git {:?} failed", args);
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path for output files written by commands under test.
    ///
    /// Lives next to the checkout so it is not copied into the tree.
    pub fn output_path(&self, name: &str) -> PathBuf {
        let dir = self.temp_dir.path().with_extension("out");
        std::fs::create_dir_all(&dir).expect("Failed to create output directory");
        dir.join(name)
    }

    /// Create a child path in the temp directory.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command configured to run in this fixture's directory.
    ///
    /// Configuration from the environment of the test runner is ignored.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("antsibull-tool");
        cmd.current_dir(self.path())
            .env_remove("ANTSIBULL_TOOL_CONFIG")
            .env_remove("ANSIBLE_COLLECTIONS_PATH")
            .env_remove("ANSIBLE_COLLECTIONS_PATHS")
            .env_remove("RUST_LOG")
            .env("XDG_CONFIG_HOME", self.path().with_extension("config"));
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TestFixture {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(self.temp_dir.path().with_extension("out"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_galaxy_yml() {
        let fixture = TestFixture::new().with_galaxy_yml(collections::MINIMAL);
        assert!(fixture.path().join("galaxy.yml").exists());
    }

    #[test]
    fn test_output_path_is_outside_checkout() {
        let fixture = TestFixture::new();
        let out = fixture.output_path("record");
        assert!(!out.starts_with(fixture.path()));
    }

    #[test]
    fn test_collections_are_valid() {
        for content in [
            collections::MINIMAL,
            collections::FULL,
            collections::MISSING_NAME,
        ] {
            serde_yaml::from_str::<serde_yaml::Value>(content).expect("valid YAML");
        }
        serde_json::from_str::<serde_json::Value>(collections::MANIFEST).expect("valid JSON");
    }
}

//! # antsibull-tool Library
//!
//! Collection-aware tools such as `ansible-test` only work when the collection
//! they operate on lives at `ansible_collections/<namespace>/<name>`. This
//! library provides the pieces of the `antsibull-tool` command-line tool that
//! make that layout available for an arbitrary checkout: it copies the
//! checkout into a temporary tree, runs a command there and reports its exit
//! code.
//!
//! ## Quick Example
//!
//! ```
//! use antsibull_tool::template::{render, TemplateContext};
//! use antsibull_tool::collection::CollectionDetails;
//! use std::collections::BTreeMap;
//!
//! let details = CollectionDetails {
//!     namespace: "community".to_string(),
//!     name: "general".to_string(),
//!     dependencies: BTreeMap::new(),
//! };
//! let context = TemplateContext::new(
//!     "/src/general",
//!     "/tmp/root",
//!     "/tmp/root/ansible_collections/community/general",
//!     &details,
//! );
//! assert_eq!(
//!     render("--collection={collection_name}", &context).unwrap(),
//!     "--collection=community.general"
//! );
//! ```
//!
//! ## Core Concepts
//!
//! - **Collection details (`collection`)**: namespace, name and dependencies
//!   read from `galaxy.yml` or `MANIFEST.json`.
//! - **VCS detection (`vcs`)**: whether the checkout is a git work tree.
//! - **Copiers (`copier`)**: copy all files or only the files git knows about
//!   into a temporary collection tree that is removed afterwards.
//! - **Templating (`template`)**: `{placeholder}` substitution in command
//!   arguments.
//! - **Running (`run`)**: the `run-local-collection` orchestration, including
//!   the collection search path environment.
//! - **Configuration and logging (`config`, `logging`)**: the YAML config file
//!   and `env_logger` setup used by the binary.

pub mod collection;
pub mod config;
pub mod copier;
pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod run;
pub mod template;
pub mod vcs;

#[cfg(test)]
mod collection_proptest;

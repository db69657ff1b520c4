//! # Copiers and the Synthetic Collection Tree
//!
//! Collection-aware tools expect a collection to live at
//! `<root>/ansible_collections/<namespace>/<name>`. This module builds such a
//! tree in a temporary directory from a collection checkout.
//!
//! ## Key Components
//!
//! - **`Copier`**: copies a source directory to a destination. Two
//!   implementations decide which files are copied:
//!   - **`PlainCopier`** copies everything.
//!   - **`GitCopier`** copies the files git knows about (tracked files plus
//!     untracked files that are not ignored).
//! - **`CollectionTree`**: the scoped temporary tree. The temporary directory
//!   is deleted when the value is dropped, so it is cleaned up on every exit
//!   path. Use [`CollectionTree::close`] to observe removal errors.
//!   Directories the command made read-only are made writable again first.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::vcs::Vcs;

/// Name of the directory collection-aware tools search for collections in.
pub const ANSIBLE_COLLECTIONS: &str = "ansible_collections";

/// Copies a directory tree.
pub trait Copier {
    /// Copy the contents of `from` into `to`, creating `to` if needed.
    fn copy(&self, from: &Path, to: &Path) -> Result<()>;
}

/// Copier for the given VCS.
pub fn copier_for(vcs: Vcs) -> Box<dyn Copier> {
    match vcs {
        Vcs::None => Box::new(PlainCopier),
        Vcs::Git => Box::new(GitCopier),
    }
}

/// Recursively copies all files, directories and symlinks.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainCopier;

impl Copier for PlainCopier {
    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        debug!("Copying {} to {}", from.display(), to.display());
        copy_recursive(from, to)
    }
}

/// Copies the files listed by `git ls-files`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitCopier;

impl Copier for GitCopier {
    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        debug!(
            "Copying files known to git from {} to {}",
            from.display(),
            to.display()
        );
        fs::create_dir_all(to)
            .map_err(|e| copier_error(format!("Failed to create {}: {}", to.display(), e)))?;

        for rel in list_git_files(from)? {
            let source = from.join(&rel);
            let target = to.join(&rel);

            let meta = match source.symlink_metadata() {
                Ok(meta) => meta,
                Err(_) => {
                    // Listed by git but deleted in the work tree.
                    debug!("Skipping missing file {}", source.display());
                    continue;
                }
            };
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| {
                    copier_error(format!("Failed to create {}: {}", parent.display(), e))
                })?;
            }
            if meta.is_dir() {
                // Submodules are listed as a single entry.
                copy_recursive(&source, &target)?;
            } else {
                shallow_copy(&source, &target)?;
            }
        }
        Ok(())
    }
}

/// List the files git considers part of the work tree at `path`.
///
/// Returns paths relative to `path`, including untracked files that are not
/// ignored.
pub fn list_git_files(path: &Path) -> Result<BTreeSet<PathBuf>> {
    let output = Command::new("git")
        .args(["ls-files", "-z", "--cached", "--others", "--exclude-standard"])
        .current_dir(path)
        .output()
        .map_err(|e| copier_error(format!("Failed to run git ls-files: {}", e)))?;

    if !output.status.success() {
        return Err(copier_error(format!(
            "git ls-files failed in {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let mut files = BTreeSet::new();
    for raw in output.stdout.split(|byte| *byte == b'\0') {
        if raw.is_empty() {
            continue;
        }
        let rel = std::str::from_utf8(raw).map_err(|_| {
            copier_error(format!(
                "git ls-files returned a non-UTF-8 path in {}",
                path.display()
            ))
        })?;
        files.insert(PathBuf::from(rel));
    }
    Ok(files)
}

/// A temporary `ansible_collections` tree holding a copy of a collection.
#[derive(Debug)]
pub struct CollectionTree {
    // Only `None` once `close` has taken it.
    root: Option<TempDir>,
    root_dir: PathBuf,
    collection_dir: PathBuf,
}

impl CollectionTree {
    /// Create a temporary tree and copy `source` into
    /// `<root>/ansible_collections/<namespace>/<name>` with `copier`.
    ///
    /// On failure the partially populated tree is removed.
    pub fn acquire(
        source: &Path,
        namespace: &str,
        name: &str,
        copier: &dyn Copier,
    ) -> Result<Self> {
        let root = tempfile::Builder::new()
            .prefix("antsibull-tool-")
            .tempdir()
            .map_err(|e| copier_error(format!("Failed to create temporary directory: {}", e)))?;
        debug!("Created temporary directory {}", root.path().display());

        let namespace_dir = root.path().join(ANSIBLE_COLLECTIONS).join(namespace);
        fs::create_dir_all(&namespace_dir).map_err(|e| {
            copier_error(format!("Failed to create {}: {}", namespace_dir.display(), e))
        })?;

        let collection_dir = namespace_dir.join(name);
        copier.copy(source, &collection_dir)?;

        Ok(Self {
            root_dir: root.path().to_path_buf(),
            root: Some(root),
            collection_dir,
        })
    }

    /// The directory containing `ansible_collections`.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// The copy of the collection.
    pub fn collection_dir(&self) -> &Path {
        &self.collection_dir
    }

    /// Delete the tree, reporting failures.
    pub fn close(mut self) -> Result<()> {
        let Some(root) = self.root.take() else {
            return Ok(());
        };
        debug!("Removing temporary directory {}", self.root_dir.display());
        make_writable(root.path());
        root.close().map_err(|e| {
            copier_error(format!(
                "Failed to remove {}: {}",
                self.root_dir.display(),
                e
            ))
        })
    }
}

impl Drop for CollectionTree {
    fn drop(&mut self) {
        if let Some(root) = self.root.take() {
            make_writable(root.path());
            if let Err(e) = root.close() {
                debug!(
                    "Failed to remove temporary directory {}: {}",
                    self.root_dir.display(),
                    e
                );
            }
        }
    }
}

/// Give the owner full access to every directory below `root`.
///
/// Removing an entry needs write access to its parent directory, which the
/// command run in the tree may have taken away.
fn make_writable(root: &Path) {
    let mut granted = BTreeSet::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                // A directory that was unreadable until it was granted access.
                match e.path() {
                    Some(path) if granted.remove(path) => make_writable(path),
                    _ => debug!("Cannot inspect {}: {}", root.display(), e),
                }
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        let mut permissions = meta.permissions();
        if !grant_owner_access(&mut permissions) {
            continue;
        }
        match fs::set_permissions(entry.path(), permissions) {
            Ok(()) => {
                granted.insert(entry.path().to_path_buf());
            }
            Err(e) => debug!("Failed to make {} writable: {}", entry.path().display(), e),
        }
    }
}

/// Returns whether `permissions` changed.
#[cfg(unix)]
fn grant_owner_access(permissions: &mut fs::Permissions) -> bool {
    use std::os::unix::fs::PermissionsExt;
    let mode = permissions.mode();
    permissions.set_mode(mode | 0o700);
    mode & 0o700 != 0o700
}

#[cfg(not(unix))]
#[allow(clippy::permissions_set_readonly_false)]
fn grant_owner_access(permissions: &mut fs::Permissions) -> bool {
    let readonly = permissions.readonly();
    permissions.set_readonly(false);
    readonly
}

fn copy_recursive(from: &Path, to: &Path) -> Result<()> {
    for entry in WalkDir::new(from).follow_links(false) {
        let entry = entry.map_err(|e| copier_error(e.to_string()))?;
        let rel = entry.path().strip_prefix(from).map_err(|e| {
            copier_error(format!(
                "Failed to relativize {}: {}",
                entry.path().display(),
                e
            ))
        })?;
        shallow_copy(entry.path(), &to.join(rel))?;
    }
    Ok(())
}

/// Copy a file system entry, without recursing.
fn shallow_copy(source: &Path, dest: &Path) -> Result<()> {
    let meta = source.symlink_metadata().map_err(|e| {
        copier_error(format!(
            "Failed to read metadata from {}: {}",
            source.display(),
            e
        ))
    })?;
    if meta.is_dir() {
        fs::create_dir_all(dest)
            .map_err(|e| copier_error(format!("Failed to create {}: {}", dest.display(), e)))?;
    } else if meta.is_file() {
        fs::copy(source, dest).map_err(|e| {
            copier_error(format!(
                "Failed to copy {} to {}: {}",
                source.display(),
                dest.display(),
                e
            ))
        })?;
    } else if let Ok(target) = fs::read_link(source) {
        symlink(&target, dest, source).map_err(|e| {
            copier_error(format!("Failed to create symlink {}: {}", dest.display(), e))
        })?;
    }
    Ok(())
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path, _source: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path, source: &Path) -> std::io::Result<()> {
    if source.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}

fn copier_error(message: String) -> Error {
    Error::Copier { message }
}

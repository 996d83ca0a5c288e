//! File operations
//!
//! Materializes copyfile and linkfile directives after a project checkout.
//! Sources are confined to the project checkout, destinations to the
//! workspace root. Every check runs before the first filesystem mutation.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::core::manifest::{CopyFile, LinkFile};

#[derive(Error, Debug)]
pub enum FileError {
    #[error("{kind} {field} is empty")]
    EmptyPath {
        kind: &'static str,
        field: &'static str,
    },

    #[error("{kind} {field} is not a relative path: {path}")]
    AbsolutePath {
        kind: &'static str,
        field: &'static str,
        path: String,
    },

    #[error("{kind} {field} ({path}) is outside of {root}")]
    PathEscape {
        kind: &'static str,
        field: &'static str,
        path: String,
        root: PathBuf,
    },

    #[error("copyfile src is not a file: {0}")]
    NotAFile(String),

    #[error("{action} {path} failed: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FileError {
    /// Whether this error came from the sandbox checks rather than the filesystem
    pub fn is_sandbox(&self) -> bool {
        matches!(
            self,
            FileError::EmptyPath { .. } | FileError::AbsolutePath { .. } | FileError::PathEscape { .. }
        )
    }
}

/// Apply every copyfile, then every linkfile, stopping at the first failure
pub fn materialize(
    workspace_root: &Path,
    checkout_root: &Path,
    copyfiles: &[CopyFile],
    linkfiles: &[LinkFile],
) -> Result<(), FileError> {
    for copyfile in copyfiles {
        apply_copyfile(workspace_root, checkout_root, copyfile)?;
    }
    for linkfile in linkfiles {
        apply_linkfile(workspace_root, checkout_root, linkfile)?;
    }
    Ok(())
}

/// Copy `src` from the checkout to `dest` under the workspace, overwriting it
pub fn apply_copyfile(
    workspace_root: &Path,
    checkout_root: &Path,
    copyfile: &CopyFile,
) -> Result<(), FileError> {
    const KIND: &str = "copyfile";
    let (src, dest) = sandbox_paths(KIND, workspace_root, checkout_root, &copyfile.src, &copyfile.dest)?;

    let is_file = std::fs::metadata(&src).map(|m| m.is_file()).unwrap_or(false);
    if !is_file {
        return Err(FileError::NotAFile(copyfile.src.clone()));
    }

    create_parent(&dest)?;
    debug!(src = %src.display(), dest = %dest.display(), "copyfile");
    std::fs::copy(&src, &dest).map_err(|source| FileError::Io {
        action: "copy to",
        path: dest.clone(),
        source,
    })?;
    Ok(())
}

/// Symlink `dest` under the workspace to `src` in the checkout, unless `dest` exists
pub fn apply_linkfile(
    workspace_root: &Path,
    checkout_root: &Path,
    linkfile: &LinkFile,
) -> Result<(), FileError> {
    const KIND: &str = "linkfile";
    let (src, dest) = sandbox_paths(KIND, workspace_root, checkout_root, &linkfile.src, &linkfile.dest)?;

    // symlink_metadata so a dangling link still counts as existing
    if std::fs::symlink_metadata(&dest).is_ok() {
        debug!(dest = %dest.display(), "linkfile dest exists. Skip.");
        return Ok(());
    }

    create_parent(&dest)?;
    // The target is workspace-root relative, so it only resolves for
    // links placed at the top of the workspace.
    let target = relative_path(&clean_path(workspace_root), &src);
    debug!(target = %target.display(), dest = %dest.display(), "linkfile");
    symlink(&target, &dest).map_err(|source| FileError::Io {
        action: "symlink",
        path: dest.clone(),
        source,
    })
}

/// Validate both directive paths and resolve them against their roots
fn sandbox_paths(
    kind: &'static str,
    workspace_root: &Path,
    checkout_root: &Path,
    src: &str,
    dest: &str,
) -> Result<(PathBuf, PathBuf), FileError> {
    check_relative(kind, "src", src)?;
    check_relative(kind, "dest", dest)?;
    let src = contained(kind, "src", checkout_root, src)?;
    let dest = contained(kind, "dest", workspace_root, dest)?;
    Ok((src, dest))
}

fn check_relative(kind: &'static str, field: &'static str, path: &str) -> Result<(), FileError> {
    if path.is_empty() {
        return Err(FileError::EmptyPath { kind, field });
    }
    let p = Path::new(path);
    if p.is_absolute() || p.has_root() {
        return Err(FileError::AbsolutePath {
            kind,
            field,
            path: path.to_string(),
        });
    }
    Ok(())
}

/// Join `rel` onto `root`, clean lexically, and require the result to stay under `root`
fn contained(
    kind: &'static str,
    field: &'static str,
    root: &Path,
    rel: &str,
) -> Result<PathBuf, FileError> {
    let root = clean_path(root);
    let joined = clean_path(&root.join(rel));
    if joined == root || !joined.starts_with(&root) {
        return Err(FileError::PathEscape {
            kind,
            field,
            path: rel.to_string(),
            root,
        });
    }
    Ok(joined)
}

/// Lexically normalize a path: drop `.` and resolve `..` against earlier components
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match cleaned.components().next_back() {
                Some(Component::Normal(_)) => {
                    cleaned.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => cleaned.push(".."),
            },
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

/// Path of `target` relative to the directory `base`; both must be clean
fn relative_path(base: &Path, target: &Path) -> PathBuf {
    let base: Vec<Component> = base.components().collect();
    let target: Vec<Component> = target.components().collect();
    let common = base
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base.len() {
        relative.push("..");
    }
    for component in &target[common..] {
        relative.push(component.as_os_str());
    }
    relative
}

fn create_parent(dest: &Path) -> Result<(), FileError> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|source| FileError::Io {
            action: "create directory",
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

#[cfg(unix)]
fn symlink(target: &Path, dest: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, dest)
}

#[cfg(windows)]
fn symlink(target: &Path, dest: &Path) -> std::io::Result<()> {
    let resolved = dest.parent().map(|p| p.join(target)).unwrap_or_default();
    if resolved.is_dir() {
        std::os::windows::fs::symlink_dir(target, dest)
    } else {
        std::os::windows::fs::symlink_file(target, dest)
    }
}

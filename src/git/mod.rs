//! Git operations wrapper
//!
//! Thin functions over git2 (libgit2 bindings). This is the only place the
//! crate talks to the git engine; everything above works in terms of these
//! calls and `git2::Oid`.

pub mod branch;
pub mod remote;
pub mod revision;
pub mod status;

pub use branch::*;
pub use remote::*;
pub use revision::{resolve_remote_branch, resolve_revision, RevisionError, RevisionKind};
pub use status::*;

use git2::{Oid, Repository};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during git operations
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Not a git repository: {0}")]
    NotARepo(String),

    #[error("Remote not found: {0}")]
    RemoteNotFound(String),

    #[error("Reference error: {0}")]
    Reference(String),
}

/// Open a git repository at the given path
pub fn open_repo<P: AsRef<Path>>(path: P) -> Result<Repository, GitError> {
    Repository::open(path.as_ref())
        .map_err(|e| GitError::NotARepo(format!("{}: {}", path.as_ref().display(), e)))
}

/// Initialize an empty, non-bare repository (creates the directory)
pub fn init_repo<P: AsRef<Path>>(path: P) -> Result<Repository, GitError> {
    debug!(path = %path.as_ref().display(), "init repository");
    Ok(Repository::init(path.as_ref())?)
}

/// Check if a path is a git repository
pub fn is_git_repo<P: AsRef<Path>>(path: P) -> bool {
    Repository::open(path.as_ref()).is_ok()
}

/// Commit HEAD currently points at
pub fn head_commit(repo: &Repository) -> Result<Oid, GitError> {
    let head = repo
        .head()
        .map_err(|e| GitError::Reference(e.to_string()))?;
    Ok(head.peel_to_commit()?.id())
}

//! Manifest repository bootstrap and refresh
//!
//! The manifest repository lives under the configuration directory and is
//! always checked out on its configured branch (attached HEAD), unlike
//! project checkouts.

use git2::Oid;
use std::path::Path;
use tracing::{debug, info};

use super::job::{JobError, Step};
use crate::git::{
    self, add_remote, checkout_branch, fetch_remote, local_branch_target, pin_branch,
    resolve_remote_branch,
};

/// Remote name used for the manifest repository
pub const MANIFEST_REMOTE: &str = "origin";

/// Clone the manifest repository into `dir` and check out `branch`.
///
/// `dir` must not exist yet (or be empty).
pub fn clone_manifest_repo(dir: &Path, url: &str, branch: &str) -> Result<Oid, JobError> {
    info!(url, branch, "Cloning manifest repository");
    let repo = git::init_repo(dir).map_err(JobError::git(Step::Init))?;
    add_remote(&repo, MANIFEST_REMOTE, url).map_err(JobError::git(Step::CreateRemote))?;
    fetch_remote(&repo, MANIFEST_REMOTE).map_err(JobError::git(Step::Fetch))?;

    let oid = resolve_remote_branch(&repo, MANIFEST_REMOTE, branch)?;
    pin_branch(&repo, branch, oid).map_err(JobError::git(Step::PinBranch))?;
    checkout_branch(&repo, branch, false).map_err(JobError::git(Step::Checkout))?;
    Ok(oid)
}

/// Fetch the manifest repository and move `branch` to its remote head.
///
/// Returns whether the checkout moved.
pub fn sync_manifest_repo(dir: &Path, branch: &str) -> Result<bool, JobError> {
    let repo = git::open_repo(dir).map_err(JobError::git(Step::Open))?;
    let fetched = fetch_remote(&repo, MANIFEST_REMOTE).map_err(JobError::git(Step::Fetch))?;
    debug!(?fetched, "manifest repository fetch");

    let oid = resolve_remote_branch(&repo, MANIFEST_REMOTE, branch)?;
    let local = local_branch_target(&repo, branch).map_err(JobError::git(Step::PinBranch))?;
    if local == Some(oid) {
        return Ok(false);
    }

    info!(branch, from = ?local, to = %oid, "Updating manifest repository");
    pin_branch(&repo, branch, oid).map_err(JobError::git(Step::PinBranch))?;
    checkout_branch(&repo, branch, true).map_err(JobError::git(Step::Checkout))?;
    Ok(true)
}

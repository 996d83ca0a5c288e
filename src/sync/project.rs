//! Per-repository sync state machine
//!
//! A checkout is in one of three states when its job starts:
//!
//! - absent: clone it;
//! - present with the manifest's URL: fetch and move `manifest-rev`;
//! - present with another URL: fail, or remove and clone again when forced.
//!
//! Whatever the path, a successful job leaves `manifest-rev` at the resolved
//! commit and HEAD detached on it, then applies the copy and link directives.

use git2::Repository;
use std::path::Path;
use tracing::{debug, info, warn};

use super::job::{JobError, Step, SyncJob, SyncOutcome};
use crate::files;
use crate::git::{
    self, add_remote, checkout_detached, fetch_remote, first_remote_url, local_branch_target,
    pin_branch, FetchOutcome, PINNED_BRANCH,
};

/// Bring one checkout to the revision its job names
pub fn sync_project(workspace_root: &Path, job: &SyncJob) -> Result<SyncOutcome, JobError> {
    // The project path is trusted as written: an absolute or `..` path is
    // used as-is, and a forced re-clone removes it. This is a simplification,
    // not a security boundary.
    let dir = job.checkout_dir(workspace_root);

    // A directory without `.git` may just be the parent of a nested project
    let outcome = if !dir.join(".git").exists() {
        clone(&dir, job)?;
        SyncOutcome::Cloned
    } else {
        let repo = git::open_repo(&dir).map_err(JobError::git(Step::Open))?;
        let existing = first_remote_url(&repo).map_err(JobError::git(Step::Open))?;

        // A checkout without any remote is treated as matching; the fetch
        // below then fails if the named remote is missing.
        match existing {
            Some(existing) if existing != job.url => {
                if !job.force {
                    return Err(JobError::RemoteMismatch {
                        existing,
                        wanted: job.url.clone(),
                    });
                }
                info!(from = %existing, to = %job.url, "remote changed, re-cloning");
                drop(repo);
                std::fs::remove_dir_all(&dir).map_err(|source| JobError::Remove {
                    path: dir.clone(),
                    source,
                })?;
                clone(&dir, job)?;
                SyncOutcome::Recloned
            }
            _ => update(&repo, job)?,
        }
    };

    if let Err(e) = files::materialize(workspace_root, &dir, &job.copyfiles, &job.linkfiles) {
        if e.is_sandbox() {
            warn!(project = %job.name, "rejected unsafe file directive");
        }
        return Err(e.into());
    }
    Ok(outcome)
}

fn clone(dir: &Path, job: &SyncJob) -> Result<(), JobError> {
    debug!(url = %job.url, dir = %dir.display(), "clone");
    let repo = git::init_repo(dir).map_err(JobError::git(Step::Init))?;
    add_remote(&repo, &job.remote, &job.url).map_err(JobError::git(Step::CreateRemote))?;
    fetch_remote(&repo, &job.remote).map_err(JobError::git(Step::Fetch))?;

    let oid = git::resolve_revision(&repo, &job.remote, &job.revision)?;
    pin_branch(&repo, PINNED_BRANCH, oid).map_err(JobError::git(Step::PinBranch))?;
    checkout_detached(&repo, oid, false).map_err(JobError::git(Step::Checkout))?;
    Ok(())
}

fn update(repo: &Repository, job: &SyncJob) -> Result<SyncOutcome, JobError> {
    // An up-to-date remote is not an error; the pinned branch may still lag
    if fetch_remote(repo, &job.remote).map_err(JobError::git(Step::Fetch))? == FetchOutcome::UpToDate {
        debug!(remote = %job.remote, "already up to date");
    }

    let oid = git::resolve_revision(repo, &job.remote, &job.revision)?;
    let pinned = local_branch_target(repo, PINNED_BRANCH).map_err(JobError::git(Step::PinBranch))?;
    if pinned == Some(oid) {
        return Ok(SyncOutcome::UpToDate);
    }

    debug!(from = ?pinned, to = %oid, "move {}", PINNED_BRANCH);
    pin_branch(repo, PINNED_BRANCH, oid).map_err(JobError::git(Step::PinBranch))?;
    checkout_detached(repo, oid, true).map_err(JobError::git(Step::Checkout))?;
    Ok(SyncOutcome::Updated)
}

//! Sync jobs and their outcomes

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::manifest::{CopyFile, LinkFile, Manifest, ManifestError, Project};
use crate::files::FileError;
use crate::git::{GitError, RevisionError};

/// Git engine step a job was executing when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Open,
    Init,
    CreateRemote,
    Fetch,
    PinBranch,
    Checkout,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Open => "open",
            Step::Init => "init",
            Step::CreateRemote => "create remote",
            Step::Fetch => "fetch",
            Step::PinBranch => "pin branch",
            Step::Checkout => "checkout",
        };
        f.write_str(name)
    }
}

/// Why a dispatched job failed
#[derive(Error, Debug)]
pub enum JobError {
    #[error("{step} failed: {source}")]
    Git {
        step: Step,
        #[source]
        source: GitError,
    },

    #[error("remove {path} failed: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("resolve failed: {0}")]
    Resolve(#[from] RevisionError),

    #[error("remote URL mismatch: checkout has {existing}, manifest wants {wanted} (use --force-sync to re-clone)")]
    RemoteMismatch { existing: String, wanted: String },

    #[error(transparent)]
    Materialize(#[from] FileError),

    #[error("job panicked: {0}")]
    Panicked(String),
}

impl JobError {
    /// Wrap an engine failure with the step that produced it
    pub fn git(step: Step) -> impl FnOnce(GitError) -> JobError {
        move |source| JobError::Git { step, source }
    }
}

/// What a successful job did to its checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Fresh clone into an absent directory
    Cloned,
    /// Directory removed and cloned again after a remote URL change
    Recloned,
    /// Pinned branch moved and the new revision checked out
    Updated,
    /// Pinned branch already at the resolved revision; nothing checked out
    UpToDate,
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncOutcome::Cloned => "cloned",
            SyncOutcome::Recloned => "re-cloned",
            SyncOutcome::Updated => "updated",
            SyncOutcome::UpToDate => "up to date",
        };
        f.write_str(s)
    }
}

/// One unit of work: bring one checkout to its manifest revision.
///
/// Owned by exactly one party at a time. The dispatcher hands it to a
/// worker, which fills in `result` and hands it to the collector.
#[derive(Debug)]
pub struct SyncJob {
    pub name: String,
    /// Full fetch URL
    pub url: String,
    pub remote: String,
    /// Revision specifier, still unresolved
    pub revision: String,
    /// Checkout path, relative to the workspace root unless absolute
    pub path: String,
    /// Re-clone on remote URL mismatch instead of failing
    pub force: bool,
    pub copyfiles: Vec<CopyFile>,
    pub linkfiles: Vec<LinkFile>,
    pub result: Option<Result<SyncOutcome, JobError>>,
}

impl SyncJob {
    /// Build the job for a project, applying the manifest defaults
    pub fn from_project(
        manifest: &Manifest,
        project: &Project,
        force: bool,
    ) -> Result<Self, ManifestError> {
        let revision = manifest.resolve_revision(project)?;
        let (remote, url) = manifest.resolve_remote(project)?;
        Ok(Self {
            name: project.name.clone(),
            url,
            remote,
            revision,
            path: project.checkout_path().to_string(),
            force,
            copyfiles: project.copyfiles.clone(),
            linkfiles: project.linkfiles.clone(),
            result: None,
        })
    }

    /// Absolute checkout directory under `workspace_root`
    pub fn checkout_dir(&self, workspace_root: &Path) -> PathBuf {
        // Path::join keeps an absolute `path` as-is
        workspace_root.join(&self.path)
    }
}

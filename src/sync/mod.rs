//! Workspace synchronization
//!
//! Builds one [`SyncJob`] per manifest project and runs them on a bounded
//! worker pool. Each job drives its checkout through the state machine in
//! [`project`].

pub mod job;
pub mod manifest_repo;
pub mod project;
pub mod scheduler;

pub use job::{JobError, Step, SyncJob, SyncOutcome};
pub use manifest_repo::{clone_manifest_repo, sync_manifest_repo};
pub use project::sync_project;
pub use scheduler::{
    build_jobs, resolve_concurrency, sync_projects, FailedProject, SkippedProject, SyncOptions,
    SyncReport, SyncedProject,
};

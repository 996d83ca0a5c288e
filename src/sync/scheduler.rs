//! Fixed-width worker pool that runs one sync job per project
//!
//! One dispatcher thread feeds jobs over a rendezvous channel to `width`
//! worker threads. Workers send each finished job back over a result
//! channel. The collector stops once it holds one result per dispatched
//! job, then drops the stop sender so idle workers exit.

use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender};
use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::thread;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::job::{JobError, SyncJob, SyncOutcome};
use super::project::sync_project;
use crate::core::manifest::Manifest;
use crate::telemetry::job_span;

/// Caller-side knobs for a sync run
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Pool width; 0 defers to the manifest's `sync-j`
    pub jobs: usize,
    /// Re-clone checkouts whose remote URL changed
    pub force: bool,
}

/// Project that never became a job
#[derive(Debug, Clone, Serialize)]
pub struct SkippedProject {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncedProject {
    pub name: String,
    pub path: String,
    pub outcome: SyncOutcome,
}

#[derive(Debug)]
pub struct FailedProject {
    pub name: String,
    pub path: String,
    pub error: JobError,
}

/// Everything a sync run did, one entry per project
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Jobs handed to the pool; equals `succeeded.len() + failures.len()`
    pub dispatched: usize,
    pub skipped: Vec<SkippedProject>,
    pub succeeded: Vec<SyncedProject>,
    pub failures: Vec<FailedProject>,
}

impl SyncReport {
    /// True iff at least one dispatched job failed
    pub fn failed(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Pool width: explicit request, else the manifest's advisory value, else 1
pub fn resolve_concurrency(requested: usize, advisory: Option<usize>) -> usize {
    if requested > 0 {
        return requested;
    }
    match advisory {
        Some(n) if n > 0 => n,
        _ => 1,
    }
}

/// Sync every project in the manifest and report per-project results.
///
/// Projects whose revision or remote cannot be determined are skipped.
/// A failing job never stops its siblings.
pub fn sync_projects(workspace_root: &Path, manifest: &Manifest, options: &SyncOptions) -> SyncReport {
    let width = resolve_concurrency(options.jobs, manifest.sync_j());
    let (jobs, skipped) = build_jobs(manifest, options.force);

    info!(projects = jobs.len(), width, "Syncing projects");
    let prepare = |job: &SyncJob| prepare_parent(workspace_root, job);
    let done = run_pool(workspace_root, jobs, width, prepare, sync_project);

    let mut report = SyncReport {
        dispatched: done.len(),
        skipped,
        ..Default::default()
    };
    for job in done {
        match job.result {
            Some(Ok(outcome)) => report.succeeded.push(SyncedProject {
                name: job.name,
                path: job.path,
                outcome,
            }),
            Some(Err(error)) => report.failures.push(FailedProject {
                name: job.name,
                path: job.path,
                error,
            }),
            None => report.failures.push(FailedProject {
                name: job.name,
                path: job.path,
                error: JobError::Panicked("job returned without a result".to_string()),
            }),
        }
    }
    report.succeeded.sort_by(|a, b| a.path.cmp(&b.path));
    report.failures.sort_by(|a, b| a.path.cmp(&b.path));
    report
}

/// Build one job per project in manifest order; projects that fail defaulting are skipped
pub fn build_jobs(manifest: &Manifest, force: bool) -> (Vec<SyncJob>, Vec<SkippedProject>) {
    let mut jobs = Vec::with_capacity(manifest.projects.len());
    let mut skipped = Vec::new();

    for project in &manifest.projects {
        match SyncJob::from_project(manifest, project, force) {
            Ok(job) => jobs.push(job),
            Err(e) => {
                warn!(project = %project.name, "Skipping project: {}", e);
                skipped.push(SkippedProject {
                    name: project.name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    (jobs, skipped)
}

fn prepare_parent(workspace_root: &Path, job: &SyncJob) {
    let dir = job.checkout_dir(workspace_root);
    if let Some(parent) = dir.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            warn!(path = %job.path, "Failed to create {}: {}", parent.display(), e);
        }
    }
}

/// Run `jobs` on `width` workers and return every job with its result filled in.
///
/// The dispatcher calls `prepare` on each job right before handing it over.
fn run_pool<P, F>(
    workspace_root: &Path,
    jobs: Vec<SyncJob>,
    width: usize,
    prepare: P,
    run: F,
) -> Vec<SyncJob>
where
    P: Fn(&SyncJob) + Send,
    F: Fn(&Path, &SyncJob) -> Result<SyncOutcome, JobError> + Sync,
{
    let expected = jobs.len();
    let width = width.max(1);
    let (job_tx, job_rx) = bounded::<SyncJob>(0);
    let (result_tx, result_rx) = unbounded::<SyncJob>();
    let (stop_tx, stop_rx) = bounded::<()>(0);
    let run = &run;

    thread::scope(|scope| {
        for worker in 0..width {
            let rx = job_rx.clone();
            let tx = result_tx.clone();
            let stop = stop_rx.clone();
            scope.spawn(move || worker_loop(worker, workspace_root, rx, tx, stop, run));
        }
        // Only workers hold these from here on, so a dead pool disconnects
        drop((job_rx, result_tx, stop_rx));

        scope.spawn(move || {
            for job in jobs {
                prepare(&job);
                if job_tx.send(job).is_err() {
                    error!("All workers exited before dispatch finished");
                    break;
                }
            }
        });

        let mut done = Vec::with_capacity(expected);
        while done.len() < expected {
            match result_rx.recv() {
                Ok(job) => done.push(job),
                Err(_) => break,
            }
        }
        drop(stop_tx);
        done
    })
}

fn worker_loop<F>(
    worker: usize,
    workspace_root: &Path,
    jobs: Receiver<SyncJob>,
    results: Sender<SyncJob>,
    stop: Receiver<()>,
    run: &F,
) where
    F: Fn(&Path, &SyncJob) -> Result<SyncOutcome, JobError>,
{
    debug!(worker, "Worker started");
    loop {
        let next = select! {
            recv(stop) -> _ => None,
            recv(jobs) -> msg => msg.ok(),
        };
        let Some(mut job) = next else { break };

        let span = job_span(worker, &job.path, &job.remote);
        let _enter = span.enter();

        let start = Instant::now();
        let result = panic::catch_unwind(AssertUnwindSafe(|| run(workspace_root, &job)))
            .unwrap_or_else(|payload| Err(JobError::Panicked(panic_message(payload))));
        let duration_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(outcome) => info!(duration_ms, "{}: {}", job.name, outcome),
            Err(e) => error!(duration_ms, "{}: {}", job.name, e),
        }

        job.result = Some(result);
        if results.send(job).is_err() {
            break;
        }
    }
    debug!(worker, "Worker stopped");
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

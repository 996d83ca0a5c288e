//! Span helpers for sync jobs.

use tracing::Span;

/// Span wrapping one sync job on one worker.
pub fn job_span(worker: usize, path: &str, remote: &str) -> Span {
    tracing::info_span!("job", worker, path = %path, remote = %remote)
}

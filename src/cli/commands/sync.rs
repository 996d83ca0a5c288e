//! Sync command implementation

use anyhow::Context;

use crate::cli::context::WorkspaceContext;
use crate::cli::output::Output;
use crate::sync::{sync_manifest_repo, sync_projects, SyncOptions, SyncReport};

/// Run the sync command.
///
/// Returns the report so the caller can map failures to an exit status.
pub fn run_sync(ctx: &WorkspaceContext, options: &SyncOptions) -> anyhow::Result<SyncReport> {
    let moved = sync_manifest_repo(&ctx.manifest_repo_dir(), &ctx.config.manifest.branch)
        .context("updating manifest repository")?;
    if moved {
        Output::info("Manifest repository updated");
    }

    let manifest = ctx.load_manifest()?;
    Output::header(&format!("Syncing {} projects...", manifest.projects.len()));

    let spinner = Output::spinner("Syncing...");
    let report = sync_projects(ctx.root(), &manifest, options);
    spinner.finish_and_clear();

    print_report(&report);
    Ok(report)
}

fn print_report(report: &SyncReport) {
    for project in &report.succeeded {
        println!(
            "  {}: {}",
            Output::project_path(&project.path),
            Output::outcome(project.outcome)
        );
    }
    for project in &report.skipped {
        Output::warning(&format!("{}: skipped - {}", project.name, project.reason));
    }
    for project in &report.failures {
        Output::error(&format!("{}: {}", project.path, project.error));
    }

    println!();
    if report.failed() {
        Output::warning(&format!(
            "{} synced, {} failed",
            report.succeeded.len(),
            report.failures.len()
        ));
    } else {
        Output::success(&format!(
            "All {} projects synced successfully.",
            report.succeeded.len()
        ));
    }
}

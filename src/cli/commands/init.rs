//! Init command implementation

use anyhow::Context;
use std::path::Path;

use crate::cli::output::Output;
use crate::core::config::{ManifestInfo, RunConfig};
use crate::core::manifest::Manifest;
use crate::core::workspace::Workspace;
use crate::sync::{build_jobs, clone_manifest_repo};

/// Options for `reposync init`
#[derive(Debug, Clone)]
pub struct InitOptions {
    pub url: String,
    /// Manifest file name inside the manifest repository
    pub manifest_file: String,
    pub branch: String,
    pub dump: bool,
    pub force_delete: bool,
}

/// Run the init command
pub fn run_init(root: &Path, options: &InitOptions) -> anyhow::Result<()> {
    let workspace = Workspace::at(root);
    let conf_dir = workspace.conf_dir();
    let config = RunConfig {
        manifest: ManifestInfo {
            file: options.manifest_file.clone(),
            branch: options.branch.clone(),
            ..ManifestInfo::default()
        },
    };

    let repo_dir = config.manifest_repo_dir(&conf_dir);
    if repo_dir.exists() {
        if !options.force_delete {
            anyhow::bail!(
                "Manifest repository already exists at {}. Use --force-delete to replace it",
                repo_dir.display()
            );
        }
        std::fs::remove_dir_all(&repo_dir)
            .with_context(|| format!("removing {}", repo_dir.display()))?;
    }

    let spinner = Output::spinner(&format!("Cloning manifest from {}...", options.url));
    let cloned = clone_manifest_repo(&repo_dir, &options.url, &options.branch);
    spinner.finish_and_clear();
    cloned.with_context(|| format!("cloning manifest repository {}", options.url))?;

    let manifest_path = config.manifest_file(&conf_dir);
    let manifest = Manifest::load(&manifest_path)
        .with_context(|| format!("loading manifest {}", manifest_path.display()))?;

    let (jobs, skipped) = build_jobs(&manifest, false);
    for project in &skipped {
        Output::warning(&format!("{}: {}", project.name, project.reason));
    }

    if options.dump {
        dump_manifest(&manifest);
    }

    config
        .save(&conf_dir)
        .context("saving workspace configuration")?;

    Output::success(&format!(
        "Workspace initialized at {} ({} projects)",
        root.display(),
        jobs.len()
    ));
    Ok(())
}

fn dump_manifest(manifest: &Manifest) {
    Output::header("Remotes");
    for remote in &manifest.remotes {
        Output::kv(&remote.name, &remote.fetch);
    }

    Output::header("Defaults");
    let defaults = &manifest.defaults;
    Output::kv("revision", defaults.revision.as_deref().unwrap_or("-"));
    Output::kv("remote", defaults.remote.as_deref().unwrap_or("-"));
    Output::kv("sync-j", defaults.sync_j.as_deref().unwrap_or("-"));

    Output::header("Projects");
    for project in &manifest.projects {
        Output::kv(
            &project.name,
            &format!(
                "path={} remote={} revision={}",
                project.checkout_path(),
                project.remote.as_deref().unwrap_or("-"),
                project.revision.as_deref().unwrap_or("-"),
            ),
        );
    }
}

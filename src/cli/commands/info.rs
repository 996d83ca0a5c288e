//! Info command implementation

use serde::Serialize;

use crate::cli::context::WorkspaceContext;
use crate::cli::output::{Output, Table};
use crate::core::manifest::{Manifest, Project};
use crate::git::{head_commit, open_repo, resolve_revision};

/// One row of `reposync info`
#[derive(Debug, Clone, Serialize)]
pub struct ProjectInfo {
    pub path: String,
    /// Commit HEAD points at, if the checkout exists
    pub current: Option<String>,
    /// Manifest revision resolved to a commit, if resolvable
    pub manifest_hash: Option<String>,
    /// Manifest revision as written
    pub manifest_revision: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct InfoReport {
    manifest_head: Option<String>,
    projects: Vec<ProjectInfo>,
}

/// Run the info command
pub fn run_info(ctx: &WorkspaceContext, show_url: bool, json: bool) -> anyhow::Result<()> {
    let manifest = ctx.load_manifest()?;
    let manifest_head = open_repo(ctx.manifest_repo_dir())
        .and_then(|repo| head_commit(&repo))
        .ok()
        .map(|oid| oid.to_string());

    let projects: Vec<ProjectInfo> = manifest
        .projects
        .iter()
        .map(|project| project_info(ctx, &manifest, project))
        .collect();

    if json {
        let report = InfoReport {
            manifest_head,
            projects,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    Output::kv("manifest", manifest_head.as_deref().unwrap_or("-"));
    println!();

    let mut headers = vec!["Path", "Current", "Manifest"];
    if show_url {
        headers.push("URL");
    }
    let mut table = Table::new(headers);
    for info in &projects {
        let mut row = vec![
            info.path.clone(),
            info.current
                .as_deref()
                .map(Output::short_hash)
                .unwrap_or("-")
                .to_string(),
            format_manifest_revision(info),
        ];
        if show_url {
            row.push(info.url.clone().unwrap_or_else(|| "-".to_string()));
        }
        table.add_row(row);
    }
    table.print();

    println!();
    println!("  Total: {} projects", projects.len());
    Ok(())
}

fn project_info(ctx: &WorkspaceContext, manifest: &Manifest, project: &Project) -> ProjectInfo {
    let path = project.checkout_path().to_string();
    let revision = manifest.resolve_revision(project).ok();
    let remote = manifest.resolve_remote(project).ok();

    let repo = open_repo(ctx.workspace.project_dir(&path)).ok();
    let current = repo
        .as_ref()
        .and_then(|r| head_commit(r).ok())
        .map(|oid| oid.to_string());
    let manifest_hash = match (&repo, &revision, &remote) {
        (Some(repo), Some(revision), Some((name, _))) => resolve_revision(repo, name, revision)
            .ok()
            .map(|oid| oid.to_string()),
        _ => None,
    };

    ProjectInfo {
        path,
        current,
        manifest_hash,
        manifest_revision: revision,
        url: remote.map(|(_, url)| url),
    }
}

/// `hash (spec)` when the manifest names something other than the hash itself
pub fn format_manifest_revision(info: &ProjectInfo) -> String {
    match (&info.manifest_hash, &info.manifest_revision) {
        (Some(hash), Some(rev)) if hash != rev => {
            format!("{} ({})", Output::short_hash(hash), rev)
        }
        (Some(hash), _) => Output::short_hash(hash).to_string(),
        (None, Some(rev)) => format!("? ({})", rev),
        (None, None) => "-".to_string(),
    }
}

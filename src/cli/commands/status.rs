//! Status command implementation

use colored::Colorize;

use crate::cli::context::WorkspaceContext;
use crate::cli::output::Output;
use crate::git::{is_git_repo, open_repo, worktree_status, PathStatus};

/// Run the status command
pub fn run_status(ctx: &WorkspaceContext) -> anyhow::Result<()> {
    let manifest = ctx.load_manifest()?;

    for project in &manifest.projects {
        let path = project.checkout_path();
        println!("=== Status of {}", Output::project_path(path));

        let dir = ctx.workspace.project_dir(path);
        if !is_git_repo(&dir) {
            println!("  {}", "not synced".dimmed());
            continue;
        }
        let entries = open_repo(&dir).and_then(|repo| worktree_status(&repo));
        match entries {
            Ok(entries) if entries.is_empty() => println!("  {}", "clean".dimmed()),
            Ok(entries) => {
                for entry in &entries {
                    println!("  {}", format_entry(entry));
                }
            }
            Err(e) => Output::error(&format!("{}: {}", path, e)),
        }
    }
    Ok(())
}

fn format_entry(entry: &PathStatus) -> String {
    let indicator = entry.indicator();
    let colored = match indicator.as_str() {
        "??" => indicator.red(),
        "UU" => indicator.magenta(),
        _ if entry.staging != crate::git::UNMODIFIED => indicator.green(),
        _ => indicator.yellow(),
    };
    format!("{} {}", colored, entry.path)
}

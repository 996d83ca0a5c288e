//! reposync CLI entry point

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use reposync::cli::commands::init::InitOptions;
use reposync::cli::{Output, WorkspaceContext};
use reposync::sync::SyncOptions;
use reposync::telemetry::{init_logging, LogConfig};

#[derive(Parser)]
#[command(name = "reposync")]
#[command(author, version, about = "Manifest-driven multi-repository sync", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clone the manifest repository and set up the workspace
    Init {
        /// URL of the manifest repository
        #[arg(short, long)]
        url: String,
        /// Manifest file inside the manifest repository
        #[arg(short, long, default_value = "default.xml")]
        manifest: String,
        /// Branch of the manifest repository
        #[arg(short, long, default_value = "main")]
        branch: String,
        /// Print the parsed manifest
        #[arg(long)]
        dump: bool,
        /// Replace an existing manifest checkout
        #[arg(long)]
        force_delete: bool,
    },
    /// Bring every project to its manifest revision
    Sync {
        /// Number of parallel jobs (default: manifest sync-j, else 1)
        #[arg(short, long, default_value_t = 0)]
        jobs: usize,
        /// Re-clone projects whose remote URL changed
        #[arg(long)]
        force_sync: bool,
    },
    /// Show working-tree changes of every project
    Status,
    /// Show current and manifest revisions of every project
    Info {
        /// Include fetch URLs
        #[arg(long)]
        show_url: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_config = if cli.debug {
        LogConfig::debug()
    } else {
        LogConfig::default()
    };
    if let Err(e) = init_logging(&log_config) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            Output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// Dispatch a command; `Ok(false)` means it ran but some work failed
fn run(command: Commands) -> anyhow::Result<bool> {
    let cwd = std::env::current_dir()?;

    match command {
        Commands::Init {
            url,
            manifest,
            branch,
            dump,
            force_delete,
        } => {
            let options = InitOptions {
                url,
                manifest_file: manifest,
                branch,
                dump,
                force_delete,
            };
            reposync::cli::commands::init::run_init(&cwd, &options)?;
        }
        Commands::Sync { jobs, force_sync } => {
            let ctx = WorkspaceContext::discover(&cwd)?;
            let options = SyncOptions {
                jobs,
                force: force_sync,
            };
            let report = reposync::cli::commands::sync::run_sync(&ctx, &options)?;
            return Ok(!report.failed());
        }
        Commands::Status => {
            let ctx = WorkspaceContext::discover(&cwd)?;
            reposync::cli::commands::status::run_status(&ctx)?;
        }
        Commands::Info { show_url, json } => {
            let ctx = WorkspaceContext::discover(&cwd)?;
            reposync::cli::commands::info::run_info(&ctx, show_url, json)?;
        }
    }
    Ok(true)
}

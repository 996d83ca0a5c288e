//! reposync: keep a workspace of git repositories at the revisions pinned
//! in an XML manifest.
//!
//! The library is organized leaves first:
//!
//! - [`core`]: manifest model and defaulting, run configuration, workspace layout
//! - [`git`]: thin wrappers over `git2`, including revision resolution
//! - [`files`]: sandboxed copyfile/linkfile materialization
//! - [`sync`]: per-repository state machine, worker pool, manifest repository
//! - [`cli`] and [`telemetry`]: command handlers and logging setup

pub mod cli;
pub mod core;
pub mod files;
pub mod git;
pub mod sync;
pub mod telemetry;

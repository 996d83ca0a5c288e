//! Core data model: manifest, run configuration, workspace layout

pub mod config;
pub mod manifest;
pub mod workspace;

pub use config::RunConfig;
pub use manifest::Manifest;
pub use workspace::Workspace;

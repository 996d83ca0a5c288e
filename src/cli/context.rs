//! Workspace context passed to command handlers

use anyhow::Context;
use std::path::{Path, PathBuf};

use crate::core::config::RunConfig;
use crate::core::manifest::Manifest;
use crate::core::workspace::Workspace;

/// Workspace state every command after `init` needs.
///
/// Created once in `main()` from the current directory, then passed by
/// reference to the command handlers.
pub struct WorkspaceContext {
    pub workspace: Workspace,
    pub config: RunConfig,
}

impl WorkspaceContext {
    /// Find the enclosing workspace and load its run configuration
    pub fn discover(start: &Path) -> anyhow::Result<Self> {
        let workspace = Workspace::discover(start)?;
        let config = RunConfig::load(&workspace.conf_dir())
            .with_context(|| format!("loading configuration in {}", workspace.root.display()))?;
        Ok(Self { workspace, config })
    }

    /// Get workspace root as a `&Path`
    pub fn root(&self) -> &Path {
        &self.workspace.root
    }

    /// Checkout directory of the manifest repository
    pub fn manifest_repo_dir(&self) -> PathBuf {
        self.config.manifest_repo_dir(&self.workspace.conf_dir())
    }

    /// Parse the manifest file from the manifest checkout
    pub fn load_manifest(&self) -> anyhow::Result<Manifest> {
        let path = self.config.manifest_file(&self.workspace.conf_dir());
        Manifest::load(&path).with_context(|| format!("loading manifest {}", path.display()))
    }
}

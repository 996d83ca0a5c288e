//! Workspace layout
//!
//! A workspace is a directory holding a `.reposync/` config directory plus
//! one checkout per manifest project. The root is always passed around as a
//! value; nothing reads it from process state.

use std::path::{Path, PathBuf};

/// Name of the config directory at the workspace root
pub const CONF_DIR_NAME: &str = ".reposync";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    /// Root directory; project paths are relative to it
    pub root: PathBuf,
}

impl Workspace {
    /// Workspace rooted at `root` (used by `init`)
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Find the nearest ancestor of `start` (inclusive) that holds a config directory
    pub fn discover(start: &Path) -> anyhow::Result<Self> {
        let mut search_path = start.to_path_buf();
        loop {
            if search_path.join(CONF_DIR_NAME).is_dir() {
                return Ok(Self::at(search_path));
            }

            match search_path.parent() {
                Some(parent) => search_path = parent.to_path_buf(),
                None => {
                    anyhow::bail!(
                        "Not in a reposync workspace (no {} directory found)",
                        CONF_DIR_NAME
                    );
                }
            }
        }
    }

    /// Config directory
    pub fn conf_dir(&self) -> PathBuf {
        self.root.join(CONF_DIR_NAME)
    }

    /// Absolute checkout directory for a project path
    pub fn project_dir(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

//! Persisted run configuration
//!
//! Written by `init`, read at the start of every other command. Lives in
//! `.reposync/config` as TOML.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the run configuration inside the config directory
pub const CONFIG_FILE_NAME: &str = "config";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Run configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunConfig {
    pub manifest: ManifestInfo,
}

/// Where the manifest lives and which branch of it is tracked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestInfo {
    /// Manifest checkout, relative to the config directory
    #[serde(default = "default_manifest_path")]
    pub path: String,
    /// Manifest file name inside the checkout
    #[serde(default = "default_manifest_file")]
    pub file: String,
    /// Tracked branch of the manifest repository
    #[serde(default = "default_manifest_branch")]
    pub branch: String,
}

fn default_manifest_path() -> String {
    "manifests".to_string()
}

fn default_manifest_file() -> String {
    "default.xml".to_string()
}

fn default_manifest_branch() -> String {
    "main".to_string()
}

impl Default for ManifestInfo {
    fn default() -> Self {
        Self {
            path: default_manifest_path(),
            file: default_manifest_file(),
            branch: default_manifest_branch(),
        }
    }
}

impl RunConfig {
    /// Load from `<conf_dir>/config`
    pub fn load(conf_dir: &Path) -> Result<Self, ConfigError> {
        let path = conf_dir.join(CONFIG_FILE_NAME);
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Save to `<conf_dir>/config`, creating the directory if needed
    pub fn save(&self, conf_dir: &Path) -> Result<(), ConfigError> {
        let path = conf_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string(self)?;
        std::fs::create_dir_all(conf_dir)
            .and_then(|_| std::fs::write(&path, content))
            .map_err(|source| ConfigError::Io { path, source })
    }

    /// Manifest checkout directory
    pub fn manifest_repo_dir(&self, conf_dir: &Path) -> PathBuf {
        conf_dir.join(&self.manifest.path)
    }

    /// Manifest file path
    pub fn manifest_file(&self, conf_dir: &Path) -> PathBuf {
        self.manifest_repo_dir(conf_dir).join(&self.manifest.file)
    }
}

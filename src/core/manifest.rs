//! Manifest parsing and defaulting
//!
//! The manifest (`default.xml`) declares remotes, defaults, and the projects
//! to keep in sync. It follows the git-repo XML layout; elements and
//! attributes this tool does not understand are ignored.

use quick_xml::de::from_str;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::warn;
use url::Url;

/// Errors that can occur when loading a manifest or resolving a project
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read manifest file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse manifest XML: {0}")]
    Parse(String),

    #[error("No revision is specified for '{0}', nor default revision is found")]
    NoRevision(String),

    #[error("No remote is specified for '{0}', nor default remote name is found")]
    NoRemote(String),

    #[error("Project '{project}' references remote '{remote}' which is not defined")]
    UnknownRemote { project: String, remote: String },
}

/// Parsed manifest document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename = "manifest")]
pub struct Manifest {
    #[serde(rename = "default", default)]
    pub defaults: Defaults,

    #[serde(rename = "remote", default)]
    pub remotes: Vec<Remote>,

    #[serde(rename = "project", default)]
    pub projects: Vec<Project>,
}

/// Fallback values for projects
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Defaults {
    #[serde(rename = "@revision", default)]
    pub revision: Option<String>,

    #[serde(rename = "@remote", default)]
    pub remote: Option<String>,

    /// Advisory worker-pool width
    #[serde(rename = "@sync-j", default)]
    pub sync_j: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Remote {
    #[serde(rename = "@name")]
    pub name: String,

    /// URL prefix; a project URL is this prefix joined with the project name
    #[serde(rename = "@fetch")]
    pub fetch: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    /// Upstream repository name, used to build the fetch URL
    #[serde(rename = "@name")]
    pub name: String,

    /// Workspace-relative checkout location
    #[serde(rename = "@path", default)]
    pub path: Option<String>,

    #[serde(rename = "@remote", default)]
    pub remote: Option<String>,

    #[serde(rename = "@revision", default)]
    pub revision: Option<String>,

    #[serde(rename = "copyfile", default)]
    pub copyfiles: Vec<CopyFile>,

    #[serde(rename = "linkfile", default)]
    pub linkfiles: Vec<LinkFile>,
}

/// Copy `src` (relative to the project checkout) to `dest` (relative to the workspace root)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CopyFile {
    #[serde(rename = "@src", default)]
    pub src: String,

    #[serde(rename = "@dest", default)]
    pub dest: String,
}

/// Symlink `dest` (relative to the workspace root) to `src` (relative to the project checkout)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LinkFile {
    #[serde(rename = "@src", default)]
    pub src: String,

    #[serde(rename = "@dest", default)]
    pub dest: String,
}

impl Project {
    /// Checkout path; falls back to the project name when `path` is absent
    pub fn checkout_path(&self) -> &str {
        non_empty(&self.path).unwrap_or(self.name.as_str())
    }
}

impl Manifest {
    /// Parse from an XML string
    pub fn parse(xml: &str) -> Result<Self, ManifestError> {
        from_str(xml).map_err(|e| ManifestError::Parse(e.to_string()))
    }

    /// Parse from a file
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// The `sync-j` default, if present and a valid number
    pub fn sync_j(&self) -> Option<usize> {
        let raw = non_empty(&self.defaults.sync_j)?;
        match raw.trim().parse::<usize>() {
            Ok(n) => Some(n),
            Err(e) => {
                warn!(sync_j = raw, "Ignoring invalid sync-j attribute: {}", e);
                None
            }
        }
    }

    /// Revision for a project: its own, else the manifest default
    pub fn resolve_revision(&self, project: &Project) -> Result<String, ManifestError> {
        non_empty(&project.revision)
            .or_else(|| non_empty(&self.defaults.revision))
            .map(str::to_string)
            .ok_or_else(|| ManifestError::NoRevision(project.name.clone()))
    }

    /// Remote name and fetch URL for a project
    pub fn resolve_remote(&self, project: &Project) -> Result<(String, String), ManifestError> {
        let remote_name = non_empty(&project.remote)
            .or_else(|| non_empty(&self.defaults.remote))
            .ok_or_else(|| ManifestError::NoRemote(project.name.clone()))?;

        let remote = self
            .remotes
            .iter()
            .find(|r| r.name == remote_name)
            .ok_or_else(|| ManifestError::UnknownRemote {
                project: project.name.clone(),
                remote: remote_name.to_string(),
            })?;

        Ok((
            remote_name.to_string(),
            join_fetch_url(&remote.fetch, &project.name),
        ))
    }
}

/// Join a remote fetch prefix with a project name.
///
/// URL prefixes are extended by path segment, so `https://host/` and
/// `https://host` both yield `https://host/<name>`. Anything that is not an
/// absolute URL (a local path, for instance) is joined with a single `/`.
pub fn join_fetch_url(fetch: &str, name: &str) -> String {
    match Url::parse(fetch) {
        Ok(mut url) if !url.cannot_be_a_base() => {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments
                    .pop_if_empty()
                    .extend(name.split('/').filter(|s| !s.is_empty()));
            }
            url.to_string()
        }
        _ => format!(
            "{}/{}",
            fetch.trim_end_matches('/'),
            name.trim_start_matches('/')
        ),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

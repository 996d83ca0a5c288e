//! Test fixtures for creating workspace environments.
//!
//! Provides a `WorkspaceBuilder` pattern for creating a temporary workspace
//! plus bare upstream repositories and a manifest repository, all offline.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use reposync::core::manifest::Manifest;

use super::git_helpers;

/// A test workspace with temporary directories that are cleaned up on drop.
pub struct WorkspaceFixture {
    /// Holds the workspace, the bare remotes and the staging clones.
    pub _temp: TempDir,
    /// Path to the (initially empty) workspace root.
    pub workspace_root: PathBuf,
    /// Directory holding one bare remote per project, at `<remotes_dir>/<name>`.
    pub remotes_dir: PathBuf,
    /// Directory holding the non-bare clones used to push upstream changes.
    pub staging_dir: PathBuf,
    /// Bare manifest repository (branch `main`, file `default.xml`).
    pub manifest_remote: PathBuf,
    /// Names of projects that were created.
    pub project_names: Vec<String>,
}

impl WorkspaceFixture {
    /// Fetch prefix under which every project remote lives.
    pub fn fetch_prefix(&self) -> String {
        format!("file://{}", self.remotes_dir.display())
    }

    /// file:// URL of a project's bare remote.
    pub fn remote_url(&self, name: &str) -> String {
        format!("file://{}", self.remotes_dir.join(name).display())
    }

    /// file:// URL of the manifest repository.
    pub fn manifest_url(&self) -> String {
        format!("file://{}", self.manifest_remote.display())
    }

    /// Checkout directory of a project path in the workspace.
    pub fn project_dir(&self, path: &str) -> PathBuf {
        self.workspace_root.join(path)
    }

    /// Staging clone of a project's upstream.
    pub fn staging(&self, name: &str) -> PathBuf {
        self.staging_dir.join(name)
    }

    /// Head commit of a project's upstream `main`.
    pub fn upstream_head(&self, name: &str) -> String {
        git_helpers::get_head_sha(&self.staging(name))
    }

    /// Commit a file upstream and push it to `main`. Returns the new commit.
    pub fn push_commit(&self, name: &str, filename: &str, content: &str) -> String {
        let staging = self.staging(name);
        let sha = git_helpers::commit_file(&staging, filename, content, &format!("Update {}", filename));
        git_helpers::push_branch(&staging, "origin", "main");
        sha
    }

    /// Tag the upstream head of a project and push the tag.
    pub fn push_tag(&self, name: &str, tag: &str) {
        git_helpers::push_tag(&self.staging(name), "origin", tag);
    }

    /// Manifest XML with an `origin` remote over the fixture remotes and the
    /// given `<project>` elements.
    pub fn manifest_xml(&self, projects: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest>
  <remote name="origin" fetch="{}" />
  <default revision="main" remote="origin" sync-j="4" />
{}
</manifest>
"#,
            self.fetch_prefix(),
            projects
        )
    }

    /// Parsed form of [`WorkspaceFixture::manifest_xml`].
    pub fn manifest(&self, projects: &str) -> Manifest {
        Manifest::parse(&self.manifest_xml(projects)).expect("fixture manifest must parse")
    }

    /// One `<project>` per fixture project, checked out at its own name.
    pub fn default_projects(&self) -> String {
        self.project_names
            .iter()
            .map(|name| format!(r#"  <project name="{}" />"#, name))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Commit `default.xml` with the given projects to the manifest repository.
    pub fn publish_manifest(&self, projects: &str) -> String {
        let staging = self.staging_dir.join("_manifest");
        let sha = git_helpers::commit_file(
            &staging,
            "default.xml",
            &self.manifest_xml(projects),
            "Update manifest",
        );
        git_helpers::push_branch(&staging, "origin", "main");
        sha
    }
}

/// Builder for creating test workspaces.
pub struct WorkspaceBuilder {
    projects: Vec<ProjectSpec>,
}

struct ProjectSpec {
    name: String,
    /// Files committed upstream during setup.
    files: Vec<(String, String)>,
}

impl WorkspaceBuilder {
    pub fn new() -> Self {
        Self {
            projects: Vec::new(),
        }
    }

    /// Add a project with a single README.
    pub fn add_project(mut self, name: &str) -> Self {
        self.projects.push(ProjectSpec {
            name: name.to_string(),
            files: vec![("README.md".to_string(), format!("# {}\n", name))],
        });
        self
    }

    /// Add a project with specific initial files.
    pub fn add_project_with_files(mut self, name: &str, files: Vec<(&str, &str)>) -> Self {
        self.projects.push(ProjectSpec {
            name: name.to_string(),
            files: files
                .into_iter()
                .map(|(n, c)| (n.to_string(), c.to_string()))
                .collect(),
        });
        self
    }

    /// Build the fixture. The manifest repository lists every project.
    pub fn build(self) -> WorkspaceFixture {
        let temp = TempDir::new().expect("failed to create temp dir");
        let workspace_root = temp.path().join("workspace");
        let remotes_dir = temp.path().join("remotes");
        let staging_dir = temp.path().join("staging");
        let manifest_remote = temp.path().join("manifest.git");
        fs::create_dir_all(&workspace_root).unwrap();
        fs::create_dir_all(&remotes_dir).unwrap();
        fs::create_dir_all(&staging_dir).unwrap();

        let mut project_names = Vec::new();
        for spec in &self.projects {
            let bare_path = remotes_dir.join(&spec.name);
            let staging = staging_dir.join(&spec.name);
            let files: Vec<(&str, &str)> = spec
                .files
                .iter()
                .map(|(n, c)| (n.as_str(), c.as_str()))
                .collect();
            create_upstream(&bare_path, &staging, &files);
            project_names.push(spec.name.clone());
        }

        let fixture = WorkspaceFixture {
            _temp: temp,
            workspace_root,
            remotes_dir,
            staging_dir,
            manifest_remote,
            project_names,
        };

        let manifest_xml = fixture.manifest_xml(&fixture.default_projects());
        create_upstream(
            &fixture.manifest_remote,
            &fixture.staging_dir.join("_manifest"),
            &[("default.xml", manifest_xml.as_str())],
        );
        fixture
    }
}

/// Bare repository at `bare_path` whose `main` holds `files`, pushed from a
/// staging clone at `staging`.
fn create_upstream(bare_path: &Path, staging: &Path, files: &[(&str, &str)]) {
    git_helpers::init_bare_repo(bare_path);
    git_helpers::init_repo(staging);
    for (filename, content) in files {
        git_helpers::commit_file(staging, filename, content, &format!("Add {}", filename));
    }
    git_helpers::add_remote(staging, "origin", &format!("file://{}", bare_path.display()));
    git_helpers::push_branch(staging, "origin", "main");
}

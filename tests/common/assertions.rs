//! Custom assertion helpers for reposync integration tests.

use std::path::Path;

use reposync::git::PINNED_BRANCH;

use super::git_helpers;

/// Assert that `manifest-rev` points at `expected` and HEAD is detached there.
pub fn assert_pinned_at(repo_path: &Path, expected: &str) {
    let pinned = git_helpers::rev_parse(repo_path, &format!("refs/heads/{}", PINNED_BRANCH));
    assert_eq!(
        pinned.as_deref(),
        Some(expected),
        "Expected {} in {} to point at {}",
        PINNED_BRANCH,
        repo_path.display(),
        expected
    );
    assert!(
        git_helpers::head_detached(repo_path),
        "Expected detached HEAD in {}",
        repo_path.display()
    );
    assert_eq!(git_helpers::get_head_sha(repo_path), expected);
}

/// Assert that a file exists at the given path.
pub fn assert_file_exists(path: &Path) {
    assert!(path.exists(), "Expected file to exist: {}", path.display());
}

/// Assert that a file does NOT exist at the given path.
pub fn assert_file_not_exists(path: &Path) {
    assert!(
        !path.exists(),
        "Expected file to NOT exist: {}",
        path.display()
    );
}

/// Assert the repo working tree is clean (no staged, modified, or untracked files).
pub fn assert_repo_clean(repo_path: &Path) {
    let output = std::process::Command::new("git")
        .args(["status", "--porcelain"])
        .current_dir(repo_path)
        .output()
        .expect("failed to run git status");
    let status = String::from_utf8_lossy(&output.stdout);
    assert!(
        status.trim().is_empty(),
        "Expected repo at {} to be clean, but had:\n{}",
        repo_path.display(),
        status
    );
}

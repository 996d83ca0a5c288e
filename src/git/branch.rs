//! Git branch, reference and checkout operations

use git2::build::CheckoutBuilder;
use git2::{Oid, Reference, ReferenceType, Repository};
use tracing::debug;

use super::GitError;

/// Local branch a successful sync always repoints to the manifest revision
pub const PINNED_BRANCH: &str = "manifest-rev";

/// Full reference name of a local branch
pub fn local_branch_ref(branch: &str) -> String {
    format!("refs/heads/{}", branch)
}

/// Names of references matching `glob`, keeping only those of the given kind
pub fn list_references(
    repo: &Repository,
    glob: &str,
    kind: ReferenceType,
) -> Result<Vec<String>, GitError> {
    let mut names = Vec::new();
    for reference in repo.references_glob(glob)? {
        let reference = reference?;
        if reference.kind() != Some(kind) {
            continue;
        }
        if let Some(name) = reference.name() {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

/// Find a local branch that points directly at a commit.
///
/// Returns `None` when the branch does not exist (or is symbolic).
pub fn find_local_branch<'r>(
    repo: &'r Repository,
    branch: &str,
) -> Result<Option<Reference<'r>>, GitError> {
    let wanted = local_branch_ref(branch);
    let direct = list_references(repo, "refs/heads/*", ReferenceType::Direct)?;
    if !direct.iter().any(|name| *name == wanted) {
        return Ok(None);
    }
    Ok(Some(repo.find_reference(&wanted)?))
}

/// Commit a local branch points at, if the branch exists
pub fn local_branch_target(repo: &Repository, branch: &str) -> Result<Option<Oid>, GitError> {
    Ok(find_local_branch(repo, branch)?.and_then(|r| r.target()))
}

/// Delete a reference by full name; missing references are not an error
pub fn delete_reference(repo: &Repository, name: &str) -> Result<(), GitError> {
    match repo.find_reference(name) {
        Ok(mut reference) => {
            debug!(reference = name, "delete reference");
            reference.delete()?;
            Ok(())
        }
        Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Point a local branch at `oid`, dropping whatever it pointed at before
pub fn pin_branch(repo: &Repository, branch: &str, oid: Oid) -> Result<(), GitError> {
    let name = local_branch_ref(branch);
    delete_reference(repo, &name)?;
    debug!(branch, %oid, "create branch");
    repo.reference(&name, oid, false, &format!("reposync: pin {} to {}", branch, oid))?;
    Ok(())
}

/// Check out `oid` with a detached HEAD.
///
/// With `force`, local modifications to tracked files are overwritten.
pub fn checkout_detached(repo: &Repository, oid: Oid, force: bool) -> Result<(), GitError> {
    let commit = repo.find_commit(oid)?;
    debug!(%oid, force, "checkout detached");
    repo.checkout_tree(commit.as_object(), Some(&mut checkout_builder(force)))?;
    repo.set_head_detached(oid)?;
    Ok(())
}

/// Check out the commit a local branch points at and attach HEAD to the branch
pub fn checkout_branch(repo: &Repository, branch: &str, force: bool) -> Result<(), GitError> {
    let name = local_branch_ref(branch);
    let commit = repo
        .find_reference(&name)
        .map_err(|e| GitError::Reference(format!("{}: {}", name, e)))?
        .peel_to_commit()?;
    debug!(branch, oid = %commit.id(), force, "checkout branch");
    repo.checkout_tree(commit.as_object(), Some(&mut checkout_builder(force)))?;
    repo.set_head(&name)?;
    Ok(())
}

fn checkout_builder(force: bool) -> CheckoutBuilder<'static> {
    let mut builder = CheckoutBuilder::new();
    if force {
        builder.force();
    } else {
        builder.safe();
    }
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use std::path::Path;
    use tempfile::TempDir;

    fn commit_file(repo: &Repository, name: &str, content: &str) -> Oid {
        let workdir = repo.workdir().unwrap().to_path_buf();
        std::fs::write(workdir.join(name), content).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = Signature::now("Test User", "test@example.com").unwrap();
        let parents: Vec<git2::Commit> = repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok())
            .into_iter()
            .collect();
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, name, &tree, &parent_refs)
            .unwrap()
    }

    #[test]
    fn test_pin_branch_creates_and_repoints() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        let first = commit_file(&repo, "a.txt", "a");
        let second = commit_file(&repo, "b.txt", "b");

        assert_eq!(local_branch_target(&repo, PINNED_BRANCH).unwrap(), None);

        pin_branch(&repo, PINNED_BRANCH, first).unwrap();
        assert_eq!(
            local_branch_target(&repo, PINNED_BRANCH).unwrap(),
            Some(first)
        );

        pin_branch(&repo, PINNED_BRANCH, second).unwrap();
        assert_eq!(
            local_branch_target(&repo, PINNED_BRANCH).unwrap(),
            Some(second)
        );
    }

    #[test]
    fn test_delete_missing_reference_is_ok() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        assert!(delete_reference(&repo, "refs/heads/nope").is_ok());
    }

    #[test]
    fn test_checkout_detached_restores_tree() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        let first = commit_file(&repo, "a.txt", "a");
        commit_file(&repo, "b.txt", "b");

        checkout_detached(&repo, first, true).unwrap();
        assert!(repo.head_detached().unwrap());
        assert_eq!(repo.head().unwrap().target(), Some(first));
        assert!(temp.path().join("a.txt").exists());
        assert!(!temp.path().join("b.txt").exists());
    }

    #[test]
    fn test_list_references_filters_kind() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        let oid = commit_file(&repo, "a.txt", "a");
        pin_branch(&repo, PINNED_BRANCH, oid).unwrap();
        repo.reference_symbolic("refs/heads/alias", "refs/heads/manifest-rev", false, "alias")
            .unwrap();

        let direct = list_references(&repo, "refs/heads/*", ReferenceType::Direct).unwrap();
        assert!(direct.contains(&"refs/heads/manifest-rev".to_string()));
        assert!(!direct.contains(&"refs/heads/alias".to_string()));
        assert!(find_local_branch(&repo, "alias").unwrap().is_none());
    }
}

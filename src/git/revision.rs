//! Revision specifier resolution
//!
//! A manifest revision is one of, checked in this order:
//!
//! 1. a full object id (40 hex characters), used as-is;
//! 2. a tag reference (`refs/tags/...`), looked up directly;
//! 3. anything else, taken as a branch name on the project's remote
//!    (`refs/remotes/<remote>/<spec>`).
//!
//! The order is fixed. A short hex string is never looked up as a tag or
//! branch: it is rejected as a malformed hash.

use git2::{Oid, Repository};
use thiserror::Error;

/// Length of a full object id in hex characters
pub const OBJECT_ID_HEX_LEN: usize = 40;

const TAG_PREFIX: &str = "refs/tags/";

#[derive(Error, Debug)]
pub enum RevisionError {
    #[error("Invalid hash format: {0}")]
    InvalidHashFormat(String),

    #[error("Invalid tag: {tag} ({source})")]
    InvalidTag {
        tag: String,
        #[source]
        source: git2::Error,
    },

    #[error("Invalid remote branch: {reference} ({source})")]
    InvalidRemoteBranch {
        reference: String,
        #[source]
        source: git2::Error,
    },
}

/// How a revision specifier will be interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevisionKind {
    /// Hex digits; valid only when it has exactly [`OBJECT_ID_HEX_LEN`] characters
    Hash,
    /// Full tag reference name
    Tag,
    /// Short branch name on the remote
    RemoteBranch,
}

/// Classify a revision specifier without touching any repository
pub fn classify(spec: &str) -> RevisionKind {
    if is_hex_bytes(spec) {
        RevisionKind::Hash
    } else if spec.starts_with(TAG_PREFIX) {
        RevisionKind::Tag
    } else {
        RevisionKind::RemoteBranch
    }
}

/// Resolve a revision specifier to a commit id.
///
/// `remote` is only consulted for branch names.
pub fn resolve_revision(repo: &Repository, remote: &str, spec: &str) -> Result<Oid, RevisionError> {
    match classify(spec) {
        RevisionKind::Hash => parse_object_id(spec),
        RevisionKind::Tag => {
            peel_reference(repo, spec).map_err(|source| RevisionError::InvalidTag {
                tag: spec.to_string(),
                source,
            })
        }
        RevisionKind::RemoteBranch => resolve_remote_branch(repo, remote, spec),
    }
}

/// Commit a remote-tracking branch points at, with no hash or tag interpretation
pub fn resolve_remote_branch(
    repo: &Repository,
    remote: &str,
    branch: &str,
) -> Result<Oid, RevisionError> {
    let reference = format!("refs/remotes/{}/{}", remote, branch);
    peel_reference(repo, &reference)
        .map_err(|source| RevisionError::InvalidRemoteBranch { reference, source })
}

/// Parse a full hex object id; shorter or longer hex strings are rejected
pub fn parse_object_id(spec: &str) -> Result<Oid, RevisionError> {
    if spec.len() != OBJECT_ID_HEX_LEN {
        return Err(RevisionError::InvalidHashFormat(spec.to_string()));
    }
    Oid::from_str(spec).map_err(|_| RevisionError::InvalidHashFormat(spec.to_string()))
}

/// Non-empty, even-length, all hex digits: decodes cleanly to bytes
fn is_hex_bytes(spec: &str) -> bool {
    !spec.is_empty() && spec.len() % 2 == 0 && spec.bytes().all(|b| b.is_ascii_hexdigit())
}

fn peel_reference(repo: &Repository, name: &str) -> Result<Oid, git2::Error> {
    Ok(repo.find_reference(name)?.peel_to_commit()?.id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_classify_precedence() {
        assert_eq!(
            classify("0123456789abcdef0123456789abcdef01234567"),
            RevisionKind::Hash
        );
        assert_eq!(classify("deadbeef"), RevisionKind::Hash);
        assert_eq!(classify("refs/tags/v1.0"), RevisionKind::Tag);
        assert_eq!(classify("main"), RevisionKind::RemoteBranch);
        assert_eq!(classify("release/1.x"), RevisionKind::RemoteBranch);
        // Odd-length hex does not decode to bytes, so it is a branch name
        assert_eq!(classify("abc"), RevisionKind::RemoteBranch);
        assert_eq!(classify(""), RevisionKind::RemoteBranch);
    }

    #[test]
    fn test_full_hash_needs_no_lookup() {
        let temp = TempDir::new().unwrap();
        // Empty repository: any lookup would fail
        let repo = Repository::init(temp.path()).unwrap();

        for hash in [
            "0123456789abcdef0123456789abcdef01234567",
            "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF",
            "0000000000000000000000000000000000000001",
        ] {
            let oid = resolve_revision(&repo, "origin", hash).unwrap();
            assert_eq!(oid.to_string(), hash.to_lowercase());
        }
    }

    #[test]
    fn test_short_hash_is_invalid_format() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        for spec in ["deadbeef", "0123456789abcdef0123456789abcdef0123456789"] {
            let result = resolve_revision(&repo, "origin", spec);
            assert!(
                matches!(result, Err(RevisionError::InvalidHashFormat(ref s)) if s == spec),
                "expected InvalidHashFormat for {}",
                spec
            );
        }
    }

    #[test]
    fn test_missing_tag() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        let result = resolve_revision(&repo, "origin", "refs/tags/v9.9");
        assert!(matches!(result, Err(RevisionError::InvalidTag { ref tag, .. }) if tag == "refs/tags/v9.9"));
    }

    #[test]
    fn test_missing_remote_branch() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        match resolve_revision(&repo, "upstream", "main") {
            Err(RevisionError::InvalidRemoteBranch { reference, .. }) => {
                assert_eq!(reference, "refs/remotes/upstream/main")
            }
            other => panic!("Expected InvalidRemoteBranch, got: {:?}", other),
        }
    }

    #[test]
    fn test_resolves_tag_and_remote_branch() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        let sig = git2::Signature::now("Test User", "test@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let commit = repo
            .commit(None, &sig, &sig, "Initial commit", &tree, &[])
            .unwrap();

        repo.reference("refs/remotes/origin/main", commit, false, "test")
            .unwrap();
        let target = repo.find_object(commit, None).unwrap();
        repo.tag("v1.0", &target, &sig, "annotated", false).unwrap();

        assert_eq!(resolve_revision(&repo, "origin", "main").unwrap(), commit);
        assert_eq!(
            resolve_revision(&repo, "origin", "refs/tags/v1.0").unwrap(),
            commit
        );
    }
}

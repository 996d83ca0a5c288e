//! Git working-tree status

use git2::{Repository, Status, StatusOptions};

use super::GitError;

/// Status of one changed path, as a pair of single-character codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStatus {
    pub path: String,
    /// Index (staged) change code
    pub staging: char,
    /// Working-tree (unstaged) change code
    pub worktree: char,
}

impl PathStatus {
    /// Two-column indicator, e.g. `M-` or `??`
    pub fn indicator(&self) -> String {
        format!("{}{}", self.staging, self.worktree)
    }
}

/// Code used when a side has no change
pub const UNMODIFIED: char = '-';

/// Changed paths in the working tree, ignored files excluded
pub fn worktree_status(repo: &Repository) -> Result<Vec<PathStatus>, GitError> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false);

    let statuses = repo.statuses(Some(&mut opts))?;
    let mut entries: Vec<PathStatus> = statuses
        .iter()
        .filter_map(|entry| {
            let status = entry.status();
            if status.is_ignored() {
                return None;
            }
            let path = entry.path()?.to_string();
            let (staging, worktree) = status_codes(status);
            Some(PathStatus {
                path,
                staging,
                worktree,
            })
        })
        .collect();
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

/// Map libgit2 status flags to (index, worktree) codes
pub fn status_codes(status: Status) -> (char, char) {
    if status.is_wt_new() && !status.intersects(index_flags()) {
        return ('?', '?');
    }
    if status.is_conflicted() {
        return ('U', 'U');
    }

    let staging = if status.is_index_new() {
        'A'
    } else if status.is_index_modified() || status.is_index_typechange() {
        'M'
    } else if status.is_index_deleted() {
        'D'
    } else if status.is_index_renamed() {
        'R'
    } else {
        UNMODIFIED
    };

    let worktree = if status.is_wt_modified() || status.is_wt_typechange() {
        'M'
    } else if status.is_wt_deleted() {
        'D'
    } else if status.is_wt_renamed() {
        'R'
    } else {
        UNMODIFIED
    };

    (staging, worktree)
}

fn index_flags() -> Status {
    Status::INDEX_NEW
        | Status::INDEX_MODIFIED
        | Status::INDEX_DELETED
        | Status::INDEX_RENAMED
        | Status::INDEX_TYPECHANGE
}

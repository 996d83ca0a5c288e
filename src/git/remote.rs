//! Git remote operations

use git2::{AutotagOption, FetchOptions, RemoteCallbacks, Repository};
use std::cell::Cell;
use std::time::Instant;
use tracing::debug;

use super::GitError;

/// Result of a fetch that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// At least one remote-tracking reference moved
    Updated,
    /// Nothing changed on the remote since the last fetch
    UpToDate,
}

/// Register a remote with a single fetch URL and the default refspec
pub fn add_remote(repo: &Repository, name: &str, url: &str) -> Result<(), GitError> {
    debug!(remote = name, url, "create remote");
    repo.remote(name, url)?;
    Ok(())
}

/// Fetch all branches and tags of a named remote.
///
/// "Already up to date" is reported as [`FetchOutcome::UpToDate`], not as an error.
pub fn fetch_remote(repo: &Repository, remote: &str) -> Result<FetchOutcome, GitError> {
    let mut git_remote = repo
        .find_remote(remote)
        .map_err(|_| GitError::RemoteNotFound(remote.to_string()))?;

    let start = Instant::now();
    let updated_tips = Cell::new(0usize);
    {
        let mut callbacks = RemoteCallbacks::new();
        callbacks.update_tips(|refname, _old, _new| {
            debug!(refname, "update tip");
            updated_tips.set(updated_tips.get() + 1);
            true
        });

        let mut opts = FetchOptions::new();
        opts.remote_callbacks(callbacks);
        opts.download_tags(AutotagOption::All);

        git_remote.fetch(&[] as &[&str], Some(&mut opts), None)?;
    }

    let received = git_remote.stats().received_objects();
    debug!(
        remote,
        received,
        updated = updated_tips.get(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Git fetch complete"
    );

    if updated_tips.get() == 0 && received == 0 {
        Ok(FetchOutcome::UpToDate)
    } else {
        Ok(FetchOutcome::Updated)
    }
}

/// URL of the first configured remote, or `None` if the repository has no remotes
pub fn first_remote_url(repo: &Repository) -> Result<Option<String>, GitError> {
    let remotes = repo.remotes()?;
    let Some(name) = remotes.iter().flatten().next() else {
        return Ok(None);
    };

    let remote = repo
        .find_remote(name)
        .map_err(|_| GitError::RemoteNotFound(name.to_string()))?;
    Ok(remote.url().map(str::to_string))
}

//! Read-only repository inspection via `git2`

use std::path::{Path, PathBuf};

use git2::{Repository, StatusOptions};

use crate::{Error, Result};

/// Information about a git remote
#[derive(Debug, Clone)]
pub struct RemoteInfo {
    /// Name of the remote (e.g., "origin")
    pub name: String,
    /// URL of the remote, if it has one
    pub url: Option<String>,
}

/// Read-only view of a working tree used for status listings
pub struct GitRepo {
    /// The underlying git2 repository
    repo: Repository,
    /// Path to the repository root
    root: PathBuf,
}

impl std::fmt::Debug for GitRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepo")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl GitRepo {
    /// Open the working tree rooted exactly at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let repo = Repository::open(path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                Error::Config(format!("Not a git repository: {}", path.display()))
            } else {
                Error::Other(format!("Git error: {}", e))
            }
        })?;

        let root = repo
            .workdir()
            .ok_or_else(|| Error::Config("Bare repositories are not supported".to_string()))?
            .to_path_buf();

        Ok(Self { repo, root })
    }

    /// List all remotes
    pub fn list_remotes(&self) -> Result<Vec<RemoteInfo>> {
        let remotes = self
            .repo
            .remotes()
            .map_err(|e| Error::Other(format!("Failed to list remotes: {}", e)))?;

        let mut result = Vec::new();
        for remote_name in remotes.iter().flatten() {
            let url = self
                .repo
                .find_remote(remote_name)
                .ok()
                .and_then(|remote| remote.url().map(str::to_string));
            result.push(RemoteInfo {
                name: remote_name.to_string(),
                url,
            });
        }

        Ok(result)
    }

    /// Get the current branch name, `None` for a detached or unborn HEAD
    pub fn current_branch(&self) -> Result<Option<String>> {
        let head = match self.repo.head() {
            Ok(h) => h,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(Error::Other(format!("Failed to get HEAD: {}", e))),
        };

        if head.is_branch() {
            Ok(head.shorthand().map(|s| s.to_string()))
        } else {
            Ok(None)
        }
    }

    /// Check for staged, unstaged or untracked changes
    pub fn is_dirty(&self) -> Result<bool> {
        let mut options = StatusOptions::new();
        options.include_untracked(true).include_ignored(false);

        let statuses = self
            .repo
            .statuses(Some(&mut options))
            .map_err(|e| Error::Other(format!("Failed to read status: {}", e)))?;

        Ok(!statuses.is_empty())
    }

    /// Abbreviated id of the HEAD commit, if there is one
    pub fn head_short_id(&self) -> Option<String> {
        let commit = self.repo.head().ok()?.peel_to_commit().ok()?;
        let id = commit.id().to_string();
        Some(id.chars().take(8).collect())
    }
}

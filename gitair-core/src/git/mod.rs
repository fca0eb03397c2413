//! Git operations for git-air
//!
//! Every mutating or networked operation goes through [`GitClient`], a handle
//! bound to one working tree. The production implementation shells out to the
//! git tool so credential helpers and hooks behave exactly as they do for the
//! user. [`GitRepo`] is a read-only `git2` view used for status listings.

mod cli;
mod remotes;
mod repo;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;

use crate::Result;

pub use cli::GitCli;
pub use remotes::{has_drift, RemoteDescriptor, RemoteSet};
pub use repo::{GitRepo, RemoteInfo};

/// Git operations against a single working tree
///
/// Success or failure comes from the tool's exit status. Output is only
/// parsed where a value is returned.
#[async_trait]
pub trait GitClient: Send + Sync {
    /// True if `status --porcelain` reports tracked or untracked changes
    async fn has_changes(&self) -> Result<bool>;

    /// Stage everything, deletions included
    async fn stage_all(&self) -> Result<()>;

    /// Diff of the index against HEAD
    async fn staged_diff(&self) -> Result<String>;

    /// Commit the index with the given message
    async fn commit(&self, message: &str) -> Result<()>;

    /// Configured remote names, in the order git lists them
    async fn remotes(&self) -> Result<Vec<String>>;

    /// Name of the checked-out branch
    async fn current_branch(&self) -> Result<String>;

    /// Fetch from one remote
    async fn fetch(&self, remote: &str) -> Result<()>;

    /// Fetch and merge `branch` from `remote`
    async fn pull(&self, remote: &str, branch: &str) -> Result<()>;

    /// Push `branch` to `remote`
    async fn push(&self, remote: &str, branch: &str) -> Result<()>;

    /// Resolve a reference to a commit id
    async fn resolve_ref(&self, reference: &str) -> Result<String>;

    /// Move every submodule to its remote tracking branch, merging local work
    async fn submodule_update(&self) -> Result<()>;
}

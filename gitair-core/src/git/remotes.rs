//! Remote enumeration and drift detection

use std::fmt;

use super::GitClient;

/// A remote paired with the branch compared against it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDescriptor {
    pub remote: String,
    pub branch: String,
}

impl RemoteDescriptor {
    pub fn new(remote: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            remote: remote.into(),
            branch: branch.into(),
        }
    }

    /// Remote-tracking reference, e.g. `origin/main`
    pub fn tracking_ref(&self) -> String {
        format!("{}/{}", self.remote, self.branch)
    }
}

impl fmt::Display for RemoteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.remote, self.branch)
    }
}

/// Remotes and current branch of a working tree, read fresh every pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSet {
    pub remotes: Vec<String>,
    pub branch: String,
}

impl RemoteSet {
    /// Query the working tree
    ///
    /// A failed remote listing is treated as no remotes. A branch that cannot
    /// be resolved (query failure or detached HEAD) falls back to
    /// `default_branch`.
    pub async fn query(git: &dyn GitClient, default_branch: &str) -> Self {
        let remotes = git.remotes().await.unwrap_or_else(|e| {
            tracing::warn!("Failed to list remotes: {}", e);
            Vec::new()
        });

        let branch = match git.current_branch().await {
            Ok(branch) => branch,
            Err(e) => {
                tracing::debug!("Using default branch '{}': {}", default_branch, e);
                default_branch.to_string()
            }
        };

        Self { remotes, branch }
    }

    /// One descriptor per remote, in listing order
    pub fn descriptors(&self) -> impl Iterator<Item = RemoteDescriptor> + '_ {
        self.remotes
            .iter()
            .map(|remote| RemoteDescriptor::new(remote.as_str(), self.branch.as_str()))
    }
}

/// Check whether the local tip differs from the remote-tracking tip
///
/// Both sides are resolved from local references; the caller fetches first.
/// If either side cannot be resolved the answer is "no drift".
pub async fn has_drift(git: &dyn GitClient, descriptor: &RemoteDescriptor) -> bool {
    let local = match git.resolve_ref("HEAD").await {
        Ok(id) => id,
        Err(e) => {
            tracing::debug!("Cannot resolve HEAD: {}", e);
            return false;
        }
    };

    let remote = match git.resolve_ref(&descriptor.tracking_ref()).await {
        Ok(id) => id,
        Err(e) => {
            tracing::debug!("Cannot resolve {}: {}", descriptor, e);
            return false;
        }
    };

    local != remote
}

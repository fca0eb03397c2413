//! Fan-out push to every configured remote

use crate::git::{GitClient, RemoteSet};

/// Result of pushing to one remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushStatus {
    Pushed,
    Failed(String),
}

/// One remote's push attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePush {
    pub remote: String,
    pub status: PushStatus,
}

/// Per-remote results of a publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    /// Branch that was pushed
    pub branch: String,
    /// One entry per remote, in listing order
    pub pushes: Vec<RemotePush>,
}

impl PublishReport {
    /// Number of remotes a push was attempted to
    pub fn attempted(&self) -> usize {
        self.pushes.len()
    }

    /// Number of remotes that accepted the push
    pub fn succeeded(&self) -> usize {
        self.pushes
            .iter()
            .filter(|p| p.status == PushStatus::Pushed)
            .count()
    }

    /// True when there were no remotes to push to
    pub fn is_skipped(&self) -> bool {
        self.pushes.is_empty()
    }
}

/// Push the current branch to each remote independently
///
/// A failing remote never prevents attempts on the others. Zero remotes is
/// an empty report, not an error.
pub async fn publish(git: &dyn GitClient, default_branch: &str) -> PublishReport {
    let remotes = RemoteSet::query(git, default_branch).await;
    let mut pushes = Vec::with_capacity(remotes.remotes.len());

    for descriptor in remotes.descriptors() {
        let status = match git.push(&descriptor.remote, &descriptor.branch).await {
            Ok(()) => PushStatus::Pushed,
            Err(e) => {
                tracing::warn!("Push to {} failed: {}", descriptor, e);
                PushStatus::Failed(e.reason())
            }
        };
        pushes.push(RemotePush {
            remote: descriptor.remote,
            status,
        });
    }

    PublishReport {
        branch: remotes.branch,
        pushes,
    }
}

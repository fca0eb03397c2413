//! Fan-out fetch and drift-gated pull

use crate::git::{has_drift, GitClient, RemoteSet};

/// Result of reconciling against one remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullStatus {
    /// Fetched; local tip already matches (or could not be compared)
    UpToDate,
    /// Drift found and pulled
    Pulled,
    FetchFailed(String),
    PullFailed(String),
}

/// One remote's reconcile attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePull {
    pub remote: String,
    pub status: PullStatus,
}

/// Per-remote results of a reconcile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullReport {
    pub branch: String,
    pub pulls: Vec<RemotePull>,
}

/// Fetch every remote and pull from those that have drifted
///
/// Best effort: each remote is handled independently and nothing is
/// retried within the call.
pub async fn reconcile(git: &dyn GitClient, default_branch: &str) -> PullReport {
    let remotes = RemoteSet::query(git, default_branch).await;
    let mut pulls = Vec::with_capacity(remotes.remotes.len());

    for descriptor in remotes.descriptors() {
        let status = if let Err(e) = git.fetch(&descriptor.remote).await {
            tracing::warn!("Fetch from {} failed: {}", descriptor.remote, e);
            PullStatus::FetchFailed(e.reason())
        } else if !has_drift(git, &descriptor).await {
            PullStatus::UpToDate
        } else {
            match git.pull(&descriptor.remote, &descriptor.branch).await {
                Ok(()) => PullStatus::Pulled,
                Err(e) => {
                    tracing::warn!("Pull from {} failed: {}", descriptor, e);
                    PullStatus::PullFailed(e.reason())
                }
            }
        };

        pulls.push(RemotePull {
            remote: descriptor.remote,
            status,
        });
    }

    PullReport {
        branch: remotes.branch,
        pulls,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::mock::MockGit;

    #[tokio::test]
    async fn test_no_pull_when_tips_match() {
        let git = MockGit::new()
            .with_remotes(&["origin"])
            .with_branch("main")
            .with_ref("HEAD", "aaa")
            .with_ref("origin/main", "aaa");

        let report = reconcile(&git, "main").await;

        assert_eq!(report.pulls[0].status, PullStatus::UpToDate);
        assert!(git.called("fetch origin"));
        assert!(!git.called("pull"));
    }

    #[tokio::test]
    async fn test_pulls_when_tips_differ() {
        let git = MockGit::new()
            .with_remotes(&["origin"])
            .with_branch("main")
            .with_ref("HEAD", "aaa")
            .with_ref("origin/main", "bbb");

        let report = reconcile(&git, "main").await;

        assert_eq!(report.pulls[0].status, PullStatus::Pulled);
        assert!(git.called("pull origin main"));
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_to_next_remote() {
        let git = MockGit::new()
            .with_remotes(&["origin", "peer"])
            .with_branch("main")
            .with_ref("HEAD", "aaa")
            .with_ref("origin/main", "bbb")
            .with_ref("peer/main", "ccc")
            .failing("fetch origin");

        let report = reconcile(&git, "main").await;

        assert!(matches!(report.pulls[0].status, PullStatus::FetchFailed(_)));
        assert_eq!(report.pulls[1].status, PullStatus::Pulled);
        assert!(!git.called("pull origin"));
        assert!(git.called("pull peer main"));
    }

    #[tokio::test]
    async fn test_pull_failure_does_not_stop_other_remotes() {
        let git = MockGit::new()
            .with_remotes(&["origin", "peer"])
            .with_branch("main")
            .with_ref("HEAD", "aaa")
            .with_ref("origin/main", "bbb")
            .with_ref("peer/main", "ccc")
            .failing("pull origin");

        let report = reconcile(&git, "main").await;

        assert!(matches!(report.pulls[0].status, PullStatus::PullFailed(_)));
        assert_eq!(report.pulls[1].status, PullStatus::Pulled);
    }

    #[tokio::test]
    async fn test_unresolvable_tracking_ref_is_up_to_date() {
        let git = MockGit::new()
            .with_remotes(&["origin"])
            .with_branch("feature")
            .with_ref("HEAD", "aaa");

        let report = reconcile(&git, "main").await;
        assert_eq!(report.pulls[0].status, PullStatus::UpToDate);
        assert!(!git.called("pull"));
    }

    #[tokio::test]
    async fn test_no_remotes_does_nothing() {
        let git = MockGit::new().with_branch("main");
        let report = reconcile(&git, "main").await;
        assert!(report.pulls.is_empty());
        assert!(!git.called("fetch"));
    }
}

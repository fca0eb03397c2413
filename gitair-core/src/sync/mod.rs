//! Per-repository synchronization
//!
//! One commit/push pass over a repository runs, strictly in order:
//! classify, sync submodules (composite only), commit, publish (only after a
//! commit). A failed submodule sync ends the pass for that repository before
//! anything is committed.

mod commit;
mod publish;
mod pull;
mod submodule;

use crate::config::SyncSettings;
use crate::git::GitClient;
use crate::repo::{classify, Classification, RepositoryRecord};

pub use commit::{stage_and_commit, CommitOutcome, MessageGenerator, MessageSource};
pub use publish::{publish, PublishReport, PushStatus, RemotePush};
pub use pull::{reconcile, PullReport, PullStatus, RemotePull};
pub use submodule::{sync_submodules, SubmoduleSync};

/// Why a repository was left untouched this pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The working directory could not be entered
    Workdir(String),
    /// Submodule update or staging failed
    Submodules(String),
}

/// Result of one commit/push pass over one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoOutcome {
    Skipped(SkipReason),
    Synced {
        classification: Classification,
        /// `None` for simple repositories
        submodules: Option<SubmoduleSync>,
        commit: CommitOutcome,
        /// `None` unless a commit was created
        publish: Option<PublishReport>,
    },
}

impl RepoOutcome {
    /// Check if this pass created a commit
    pub fn committed(&self) -> bool {
        matches!(self, RepoOutcome::Synced { commit, .. } if commit.is_committed())
    }
}

/// Run the commit/push pass for one repository
pub async fn sync_repository(
    git: &dyn GitClient,
    repo: &RepositoryRecord,
    settings: &SyncSettings,
    generator: Option<MessageGenerator<'_>>,
) -> RepoOutcome {
    let classification = classify(repo.path(), settings.force_composite);

    let submodules = if classification.is_composite() {
        match sync_submodules(git, repo.path()).await {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::warn!(repo = %repo.name(), "Skipping repository: {}", e);
                return RepoOutcome::Skipped(SkipReason::Submodules(e.to_string()));
            }
        }
    } else {
        None
    };

    let commit = stage_and_commit(git, classification, generator).await;

    let publish = if commit.is_committed() {
        Some(publish(git, &settings.default_branch).await)
    } else {
        None
    };

    RepoOutcome::Synced {
        classification,
        submodules,
        commit,
        publish,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::git::mock::MockGit;
    use crate::repo::GITMODULES;
    use tempfile::TempDir;

    fn settings() -> SyncSettings {
        Config::default().validate().unwrap()
    }

    fn simple_repo() -> (TempDir, RepositoryRecord) {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".git")).unwrap();
        let record = RepositoryRecord::new(temp.path());
        (temp, record)
    }

    fn composite_repo() -> (TempDir, RepositoryRecord) {
        let (temp, record) = simple_repo();
        std::fs::write(temp.path().join(GITMODULES), "[submodule \"lib\"]\n").unwrap();
        (temp, record)
    }

    #[tokio::test]
    async fn test_failed_submodule_sync_blocks_parent_commit() {
        let (_temp, repo) = composite_repo();
        let git = MockGit::new()
            .with_changes()
            .with_remotes(&["origin"])
            .failing("submodule update");

        let outcome = sync_repository(&git, &repo, &settings(), None).await;

        assert!(matches!(outcome, RepoOutcome::Skipped(SkipReason::Submodules(_))));
        assert!(!outcome.committed());
        assert!(!git.called("status"));
        assert!(!git.called("commit"));
        assert!(!git.called("push"));
    }

    #[tokio::test]
    async fn test_submodules_synced_before_commit() {
        let (_temp, repo) = composite_repo();
        let git = MockGit::new()
            .with_changes()
            .with_remotes(&["origin"])
            .with_branch("main");

        let outcome = sync_repository(&git, &repo, &settings(), None).await;

        assert!(outcome.committed());
        let calls = git.calls();
        let update = calls.iter().position(|c| c == "submodule update").unwrap();
        let commit = calls.iter().position(|c| c.starts_with("commit")).unwrap();
        let push = calls.iter().position(|c| c.starts_with("push")).unwrap();
        assert!(update < commit);
        assert!(commit < push);
        assert!(calls[commit].contains("(monorepo)"));
    }

    #[tokio::test]
    async fn test_simple_repo_skips_submodules() {
        let (_temp, repo) = simple_repo();
        let git = MockGit::new().with_changes().with_branch("main");

        let outcome = sync_repository(&git, &repo, &settings(), None).await;

        match outcome {
            RepoOutcome::Synced {
                classification,
                submodules,
                publish,
                ..
            } => {
                assert_eq!(classification, Classification::Simple);
                assert!(submodules.is_none());
                assert!(publish.unwrap().is_skipped());
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(!git.called("submodule"));
    }

    #[tokio::test]
    async fn test_forced_composite_without_gitmodules_is_noop_sync() {
        let (_temp, repo) = simple_repo();
        let mut settings = settings();
        settings.force_composite = true;
        let git = MockGit::new();

        let outcome = sync_repository(&git, &repo, &settings, None).await;

        assert_eq!(
            outcome,
            RepoOutcome::Synced {
                classification: Classification::Composite,
                submodules: Some(SubmoduleSync::NoOp),
                commit: CommitOutcome::NoChanges,
                publish: None,
            }
        );
    }

    #[tokio::test]
    async fn test_no_push_without_commit() {
        let (_temp, repo) = simple_repo();
        let git = MockGit::new().with_remotes(&["origin"]).with_branch("main");

        let outcome = sync_repository(&git, &repo, &settings(), None).await;

        assert!(!outcome.committed());
        assert!(!git.called("push"));
    }

    #[tokio::test]
    async fn test_failed_commit_skips_publish() {
        let (_temp, repo) = simple_repo();
        let git = MockGit::new()
            .with_changes()
            .with_remotes(&["origin"])
            .failing("commit");

        let outcome = sync_repository(&git, &repo, &settings(), None).await;

        assert!(matches!(
            outcome,
            RepoOutcome::Synced {
                commit: CommitOutcome::Failed { .. },
                publish: None,
                ..
            }
        ));
        assert!(!git.called("push"));
    }
}

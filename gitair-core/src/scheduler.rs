//! The reconciliation loop
//!
//! A single sequential driver over the repository list discovered at
//! startup. Every cycle runs a commit/push pass; a pull pass follows when at
//! least `pull_interval` has elapsed since the previous one. Nothing carries
//! over between cycles except that timestamp: the next cycle is the retry.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::SyncSettings;
use crate::events::{commit_pass_events, pull_pass_events, EventSink, SyncEvent};
use crate::git::GitCli;
use crate::message::{CommandMessageProvider, MessageProvider};
use crate::repo::RepositoryRecord;
use crate::sync::{reconcile, sync_repository, MessageGenerator, RepoOutcome, SkipReason};
use crate::{Error, Result};

/// Per-iteration bookkeeping, discarded at the end of the cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleContext {
    pub iteration: u64,
    pub changes_found: bool,
}

impl CycleContext {
    pub fn new(iteration: u64) -> Self {
        Self {
            iteration,
            changes_found: false,
        }
    }
}

/// Check if a pull pass is due
pub fn pull_due(last_pull: Instant, now: Instant, pull_interval: Duration) -> bool {
    now.saturating_duration_since(last_pull) >= pull_interval
}

/// Drives commit/push and pull passes over a fixed set of repositories
pub struct Scheduler {
    settings: SyncSettings,
    repos: Vec<RepositoryRecord>,
    provider: Option<Arc<dyn MessageProvider>>,
    events: Arc<dyn EventSink>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("settings", &self.settings)
            .field("repos", &self.repos)
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    /// Create a scheduler
    ///
    /// When the settings enable commit messages, the configured command is
    /// used as the provider.
    pub fn new(
        settings: SyncSettings,
        repos: Vec<RepositoryRecord>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        let provider = settings.messages.as_ref().map(|m| {
            Arc::new(CommandMessageProvider::new(m.command.clone())) as Arc<dyn MessageProvider>
        });

        Self {
            settings,
            repos,
            provider,
            events,
        }
    }

    /// Replace the message provider
    ///
    /// Only consulted when the settings enable commit messages.
    pub fn with_provider(mut self, provider: Arc<dyn MessageProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Run forever, or until Ctrl-C arrives while sleeping between cycles
    pub async fn run(&self) -> Result<()> {
        let mut last_pull = Instant::now();
        let mut iteration = 0u64;

        loop {
            iteration += 1;
            self.commit_pass(iteration).await;

            if pull_due(last_pull, Instant::now(), self.settings.pull_interval) {
                self.pull_pass().await;
                last_pull = Instant::now();
            }

            self.emit(SyncEvent::Sleeping {
                interval: self.settings.check_interval,
            });

            tokio::select! {
                _ = tokio::time::sleep(self.settings.check_interval) => {}
                signal = tokio::signal::ctrl_c() => {
                    signal.map_err(|e| Error::Other(format!("ctrl-c handler failed: {}", e)))?;
                    self.emit(SyncEvent::ShuttingDown);
                    return Ok(());
                }
            }
        }
    }

    /// One commit/push pass followed by one pull pass
    pub async fn run_once(&self) -> CycleContext {
        let ctx = self.commit_pass(1).await;
        self.pull_pass().await;
        ctx
    }

    /// Commit and push every repository with local changes
    pub async fn commit_pass(&self, iteration: u64) -> CycleContext {
        let mut ctx = CycleContext::new(iteration);
        self.emit(SyncEvent::CycleStarted { iteration });

        for repo in &self.repos {
            let outcome = self.sync_one(repo).await;
            for event in commit_pass_events(repo.name(), &outcome) {
                self.emit(event);
            }
            if outcome.committed() {
                ctx.changes_found = true;
            }
        }

        if !ctx.changes_found {
            self.emit(SyncEvent::NoChanges);
        }

        ctx
    }

    /// Fetch every remote of every repository and pull where drifted
    pub async fn pull_pass(&self) {
        self.emit(SyncEvent::PullPassStarted);

        for repo in &self.repos {
            let git = match GitCli::open(&self.settings.git_program, repo.path()) {
                Ok(git) => git,
                Err(e) => {
                    self.emit(SyncEvent::RepositorySkipped {
                        repo: repo.name().to_string(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let report = reconcile(&git, &self.settings.default_branch).await;
            for event in pull_pass_events(repo.name(), &report) {
                self.emit(event);
            }
        }
    }

    /// Commit/push pass for a single repository
    pub async fn sync_one(&self, repo: &RepositoryRecord) -> RepoOutcome {
        let git = match GitCli::open(&self.settings.git_program, repo.path()) {
            Ok(git) => git,
            Err(e) => {
                tracing::warn!(repo = %repo.name(), "{}", e);
                return RepoOutcome::Skipped(SkipReason::Workdir(e.to_string()));
            }
        };

        sync_repository(&git, repo, &self.settings, self.generator()).await
    }

    fn generator(&self) -> Option<MessageGenerator<'_>> {
        let messages = self.settings.messages.as_ref()?;
        let provider = self.provider.as_deref()?;
        Some(MessageGenerator {
            provider,
            timeout: messages.timeout,
            max_diff_chars: messages.max_diff_chars,
        })
    }

    fn emit(&self, event: SyncEvent) {
        tracing::debug!(?event, "sync event");
        self.events.emit(&event);
    }
}

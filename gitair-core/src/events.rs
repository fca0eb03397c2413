//! Observable events emitted by the scheduler
//!
//! Every meaningful step of a pass maps to exactly one [`SyncEvent`]. How an
//! event is shown (console line, log record) is up to the [`EventSink`].

use std::time::Duration;

use crate::repo::Classification;
use crate::sync::{
    CommitOutcome, MessageSource, PullReport, PullStatus, PushStatus, RepoOutcome, SkipReason,
    SubmoduleSync,
};

/// One observable step of the reconciliation loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    CycleStarted { iteration: u64 },
    /// No repository committed anything this cycle
    NoChanges,
    RepositorySkipped { repo: String, reason: String },
    SubmodulesSynced { repo: String },
    SubmoduleSyncFailed { repo: String, reason: String },
    MessageFallback { repo: String, reason: String },
    Committed {
        repo: String,
        classification: Classification,
        message: String,
        generated: bool,
    },
    CommitFailed { repo: String, reason: String },
    NoRemotes { repo: String },
    Pushed { repo: String, remote: String },
    PushFailed { repo: String, remote: String, reason: String },
    PushSummary { repo: String, succeeded: usize, attempted: usize },
    PullPassStarted,
    UpToDate { repo: String, remote: String },
    Pulled { repo: String, remote: String },
    FetchFailed { repo: String, remote: String, reason: String },
    PullFailed { repo: String, remote: String, reason: String },
    Sleeping { interval: Duration },
    ShuttingDown,
}

/// Receiver of scheduler events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &SyncEvent);
}

/// Events describing a repository's commit/push pass, in the order they happened
pub fn commit_pass_events(repo: &str, outcome: &RepoOutcome) -> Vec<SyncEvent> {
    let repo = repo.to_string();

    let (classification, submodules, commit, publish) = match outcome {
        RepoOutcome::Skipped(SkipReason::Workdir(reason)) => {
            return vec![SyncEvent::RepositorySkipped {
                repo,
                reason: reason.clone(),
            }]
        }
        RepoOutcome::Skipped(SkipReason::Submodules(reason)) => {
            return vec![SyncEvent::SubmoduleSyncFailed {
                repo,
                reason: reason.clone(),
            }]
        }
        RepoOutcome::Synced {
            classification,
            submodules,
            commit,
            publish,
        } => (*classification, submodules, commit, publish),
    };

    let mut events = Vec::new();

    if *submodules == Some(SubmoduleSync::Updated) {
        events.push(SyncEvent::SubmodulesSynced { repo: repo.clone() });
    }

    match commit {
        CommitOutcome::NoChanges => {}
        CommitOutcome::Failed { reason } => events.push(SyncEvent::CommitFailed {
            repo: repo.clone(),
            reason: reason.clone(),
        }),
        CommitOutcome::Committed { message, source } => {
            if let MessageSource::Fallback { reason } = source {
                events.push(SyncEvent::MessageFallback {
                    repo: repo.clone(),
                    reason: reason.clone(),
                });
            }
            events.push(SyncEvent::Committed {
                repo: repo.clone(),
                classification,
                message: message.clone(),
                generated: *source == MessageSource::Generated,
            });
        }
    }

    if let Some(report) = publish {
        if report.is_skipped() {
            events.push(SyncEvent::NoRemotes { repo: repo.clone() });
        } else {
            for push in &report.pushes {
                events.push(match &push.status {
                    PushStatus::Pushed => SyncEvent::Pushed {
                        repo: repo.clone(),
                        remote: push.remote.clone(),
                    },
                    PushStatus::Failed(reason) => SyncEvent::PushFailed {
                        repo: repo.clone(),
                        remote: push.remote.clone(),
                        reason: reason.clone(),
                    },
                });
            }
            events.push(SyncEvent::PushSummary {
                repo,
                succeeded: report.succeeded(),
                attempted: report.attempted(),
            });
        }
    }

    events
}

/// Events describing a repository's pull pass
pub fn pull_pass_events(repo: &str, report: &PullReport) -> Vec<SyncEvent> {
    report
        .pulls
        .iter()
        .map(|pull| {
            let repo = repo.to_string();
            let remote = pull.remote.clone();
            match &pull.status {
                PullStatus::UpToDate => SyncEvent::UpToDate { repo, remote },
                PullStatus::Pulled => SyncEvent::Pulled { repo, remote },
                PullStatus::FetchFailed(reason) => SyncEvent::FetchFailed {
                    repo,
                    remote,
                    reason: reason.clone(),
                },
                PullStatus::PullFailed(reason) => SyncEvent::PullFailed {
                    repo,
                    remote,
                    reason: reason.clone(),
                },
            }
        })
        .collect()
}

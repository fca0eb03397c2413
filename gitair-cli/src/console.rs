//! Console presentation of scheduler events

use gitair_core::{EventSink, SyncEvent};

/// Prints one line per event to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl EventSink for ConsoleReporter {
    fn emit(&self, event: &SyncEvent) {
        if let Some(line) = format_event(event) {
            println!("{}", line);
        }
    }
}

/// Render an event as a console line
///
/// Returns `None` for events that have no console form.
pub fn format_event(event: &SyncEvent) -> Option<String> {
    let line = match event {
        SyncEvent::CycleStarted { iteration } => {
            format!("\n[{}] Checking for changes (#{})", now(), iteration)
        }
        SyncEvent::NoChanges => "No changes detected".to_string(),
        SyncEvent::RepositorySkipped { repo, reason } => {
            format!("  {}: skipped ({})", repo, reason)
        }
        SyncEvent::SubmodulesSynced { repo } => format!("  {}: submodules updated", repo),
        SyncEvent::SubmoduleSyncFailed { repo, reason } => {
            format!("  {}: submodule sync failed, skipping ({})", repo, reason)
        }
        SyncEvent::MessageFallback { repo, reason } => {
            format!("  {}: message generation failed, using timestamp ({})", repo, reason)
        }
        SyncEvent::Committed {
            repo,
            classification,
            message,
            generated,
        } => {
            let kind = if *generated { "generated" } else { "timestamp" };
            format!("  {} [{}]: committed ({}): {}", repo, classification, kind, message)
        }
        SyncEvent::CommitFailed { repo, reason } => {
            format!("  {}: commit failed ({})", repo, reason)
        }
        SyncEvent::NoRemotes { repo } => format!("  {}: no remotes configured", repo),
        SyncEvent::Pushed { repo, remote } => format!("  {}: pushed to {}", repo, remote),
        SyncEvent::PushFailed {
            repo,
            remote,
            reason,
        } => format!("  {}: push to {} failed ({})", repo, remote, reason),
        SyncEvent::PushSummary {
            repo,
            succeeded,
            attempted,
        } => format!("  {}: pushed to {}/{} remotes", repo, succeeded, attempted),
        SyncEvent::PullPassStarted => format!("[{}] Pulling remote changes", now()),
        SyncEvent::UpToDate { .. } => return None,
        SyncEvent::Pulled { repo, remote } => format!("  {}: pulled from {}", repo, remote),
        SyncEvent::FetchFailed {
            repo,
            remote,
            reason,
        } => format!("  {}: fetch from {} failed ({})", repo, remote, reason),
        SyncEvent::PullFailed {
            repo,
            remote,
            reason,
        } => format!("  {}: pull from {} failed ({})", repo, remote, reason),
        SyncEvent::Sleeping { interval } => format!(
            "Next check in {:.1} minutes (Ctrl-C to stop)",
            interval.as_secs_f64() / 60.0
        ),
        SyncEvent::ShuttingDown => "\nStopping git-air".to_string(),
    };
    Some(line)
}

fn now() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

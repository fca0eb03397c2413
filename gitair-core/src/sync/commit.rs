//! Change detection, staging and committing

use std::time::Duration;

use chrono::Local;

use crate::git::GitClient;
use crate::message::{
    build_prompt, sanitize_message, timestamp_message, truncate_diff, MessageProvider,
};
use crate::repo::Classification;

/// A message provider together with the limits applied to each call
#[derive(Clone, Copy)]
pub struct MessageGenerator<'a> {
    pub provider: &'a dyn MessageProvider,
    pub timeout: Duration,
    pub max_diff_chars: usize,
}

/// Where a commit message came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageSource {
    /// Produced by the configured provider
    Generated,
    /// Timestamp template; no provider configured
    Timestamp,
    /// Timestamp template after the provider could not deliver
    Fallback { reason: String },
}

/// Outcome of one commit attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Working tree was clean
    NoChanges,
    /// A commit was created
    Committed { message: String, source: MessageSource },
    /// Something failed; retried next cycle
    Failed { reason: String },
}

impl CommitOutcome {
    /// Check if a commit was created
    pub fn is_committed(&self) -> bool {
        matches!(self, CommitOutcome::Committed { .. })
    }
}

/// Commit local changes in one repository
///
/// Runs after any submodule sync, so staged submodule pointers count as
/// changes. Failures are reported in the outcome, never raised.
pub async fn stage_and_commit(
    git: &dyn GitClient,
    classification: Classification,
    generator: Option<MessageGenerator<'_>>,
) -> CommitOutcome {
    match git.has_changes().await {
        Ok(true) => {}
        Ok(false) => return CommitOutcome::NoChanges,
        Err(e) => {
            return CommitOutcome::Failed {
                reason: format!("status check failed: {}", e.reason()),
            }
        }
    }

    if let Err(e) = git.stage_all().await {
        return CommitOutcome::Failed {
            reason: format!("staging failed: {}", e.reason()),
        };
    }

    let (message, source) = choose_message(git, classification, generator).await;

    match git.commit(&message).await {
        Ok(()) => CommitOutcome::Committed { message, source },
        Err(e) => CommitOutcome::Failed {
            reason: format!("commit failed: {}", e.reason()),
        },
    }
}

async fn choose_message(
    git: &dyn GitClient,
    classification: Classification,
    generator: Option<MessageGenerator<'_>>,
) -> (String, MessageSource) {
    let Some(generator) = generator else {
        return (timestamp_message(classification, Local::now()), MessageSource::Timestamp);
    };

    match generate_message(git, generator).await {
        Ok(message) => (message, MessageSource::Generated),
        Err(reason) => {
            tracing::warn!("Falling back to timestamp message: {}", reason);
            (
                timestamp_message(classification, Local::now()),
                MessageSource::Fallback { reason },
            )
        }
    }
}

async fn generate_message(
    git: &dyn GitClient,
    generator: MessageGenerator<'_>,
) -> std::result::Result<String, String> {
    let diff = git
        .staged_diff()
        .await
        .map_err(|e| format!("no diff available: {}", e.reason()))?;

    if diff.trim().is_empty() {
        return Err("no diff available".to_string());
    }

    let prompt = build_prompt(&truncate_diff(&diff, generator.max_diff_chars));
    let name = generator.provider.name();

    let call = generator.provider.generate(&prompt);
    let raw = match tokio::time::timeout(generator.timeout, call).await {
        Ok(Ok(raw)) => raw,
        Ok(Err(e)) => return Err(e.to_string()),
        Err(_) => {
            return Err(format!(
                "{} timed out after {}s",
                name,
                generator.timeout.as_secs_f64()
            ))
        }
    };

    sanitize_message(&raw).ok_or_else(|| format!("no valid response from {}", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::mock::MockGit;
    use crate::{Error, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StaticProvider {
        reply: Result<String>,
        delay: Duration,
        prompts: Mutex<Vec<String>>,
    }

    impl StaticProvider {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                delay: Duration::ZERO,
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(Error::Provider("quota exceeded".to_string())),
                delay: Duration::ZERO,
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                delay,
                ..Self::replying("Too late")
            }
        }
    }

    #[async_trait]
    impl MessageProvider for StaticProvider {
        fn name(&self) -> &str {
            "static"
        }

        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(Error::Provider(e.to_string())),
            }
        }
    }

    fn generator(provider: &StaticProvider) -> MessageGenerator<'_> {
        MessageGenerator {
            provider,
            timeout: Duration::from_secs(30),
            max_diff_chars: 2000,
        }
    }

    fn committed_message(outcome: &CommitOutcome) -> &str {
        match outcome {
            CommitOutcome::Committed { message, .. } => message,
            other => panic!("expected a commit, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_clean_tree_is_noop() {
        let git = MockGit::new();
        let outcome = stage_and_commit(&git, Classification::Simple, None).await;
        assert_eq!(outcome, CommitOutcome::NoChanges);
        assert_eq!(git.calls(), vec!["status"]);
    }

    #[tokio::test]
    async fn test_commits_with_timestamp_message() {
        let git = MockGit::new().with_changes();
        let outcome = stage_and_commit(&git, Classification::Simple, None).await;

        assert!(outcome.is_committed());
        assert!(committed_message(&outcome).starts_with("auto commit - "));
        assert!(matches!(
            outcome,
            CommitOutcome::Committed { source: MessageSource::Timestamp, .. }
        ));
        let calls = git.calls();
        assert_eq!(calls[0], "status");
        assert_eq!(calls[1], "add");
    }

    #[tokio::test]
    async fn test_composite_marker_in_message() {
        let git = MockGit::new().with_changes();
        let outcome = stage_and_commit(&git, Classification::Composite, None).await;
        assert!(committed_message(&outcome).starts_with("auto commit (monorepo) - "));
    }

    #[tokio::test]
    async fn test_second_pass_finds_nothing() {
        let git = MockGit::new().with_changes();
        assert!(stage_and_commit(&git, Classification::Simple, None).await.is_committed());
        assert_eq!(
            stage_and_commit(&git, Classification::Simple, None).await,
            CommitOutcome::NoChanges
        );
    }

    #[tokio::test]
    async fn test_generated_message_is_sanitized() {
        let git = MockGit::new().with_changes().with_diff("+retry()");
        let provider = StaticProvider::replying("Loaded cached credentials.\nfeat: Add retry\n");
        let outcome =
            stage_and_commit(&git, Classification::Simple, Some(generator(&provider))).await;

        assert_eq!(
            outcome,
            CommitOutcome::Committed {
                message: "Add retry".to_string(),
                source: MessageSource::Generated,
            }
        );
        assert!(provider.prompts.lock().unwrap()[0].contains("+retry()"));
    }

    #[tokio::test]
    async fn test_prompt_diff_is_truncated() {
        let diff = "y".repeat(5000);
        let git = MockGit::new().with_changes().with_diff(&diff);
        let provider = StaticProvider::replying("Update data");
        stage_and_commit(&git, Classification::Simple, Some(generator(&provider))).await;

        let prompt = provider.prompts.lock().unwrap()[0].clone();
        assert!(prompt.contains("... (truncated)"));
        assert!(!prompt.contains(&"y".repeat(2001)));
    }

    #[tokio::test]
    async fn test_provider_error_falls_back() {
        let git = MockGit::new().with_changes().with_diff("+x");
        let provider = StaticProvider::failing();
        let outcome =
            stage_and_commit(&git, Classification::Simple, Some(generator(&provider))).await;

        assert!(committed_message(&outcome).starts_with("auto commit - "));
        assert!(matches!(
            outcome,
            CommitOutcome::Committed { source: MessageSource::Fallback { .. }, .. }
        ));
    }

    #[tokio::test]
    async fn test_provider_timeout_falls_back() {
        let git = MockGit::new().with_changes().with_diff("+x");
        let provider = StaticProvider::slow(Duration::from_secs(10));
        let generator = MessageGenerator {
            timeout: Duration::from_millis(20),
            ..generator(&provider)
        };
        let outcome = stage_and_commit(&git, Classification::Composite, Some(generator)).await;

        match outcome {
            CommitOutcome::Committed {
                message,
                source: MessageSource::Fallback { reason },
            } => {
                assert!(message.starts_with("auto commit (monorepo) - "));
                assert!(reason.contains("timed out"));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_diff_skips_provider() {
        let git = MockGit::new().with_changes();
        let provider = StaticProvider::replying("Never used");
        let outcome =
            stage_and_commit(&git, Classification::Simple, Some(generator(&provider))).await;

        assert!(matches!(
            outcome,
            CommitOutcome::Committed { source: MessageSource::Fallback { .. }, .. }
        ));
        assert!(provider.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unusable_reply_falls_back() {
        let git = MockGit::new().with_changes().with_diff("+x");
        let provider = StaticProvider::replying("\n\nLoaded cached credentials.\n");
        let outcome =
            stage_and_commit(&git, Classification::Simple, Some(generator(&provider))).await;
        assert!(committed_message(&outcome).starts_with("auto commit - "));
    }

    #[tokio::test]
    async fn test_commit_failure_is_reported_not_raised() {
        let git = MockGit::new().with_changes().failing("commit");
        let outcome = stage_and_commit(&git, Classification::Simple, None).await;
        assert!(matches!(outcome, CommitOutcome::Failed { .. }));
        assert!(!outcome.is_committed());
    }

    #[tokio::test]
    async fn test_status_failure_is_reported() {
        let git = MockGit::new().with_changes().failing("status");
        let outcome = stage_and_commit(&git, Classification::Simple, None).await;
        assert!(matches!(outcome, CommitOutcome::Failed { .. }));
        assert!(!git.called("add"));
    }
}

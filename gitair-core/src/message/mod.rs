//! Commit message sources
//!
//! Messages either come from an external text generator or from the fixed
//! timestamp template. The generator is optional and never allowed to block a
//! commit: anything other than a usable line falls back to the template.

mod command;

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::repo::Classification;
use crate::Result;

pub use command::CommandMessageProvider;

/// Longest message accepted from a provider, in characters
pub const MAX_MESSAGE_CHARS: usize = 72;

/// Appended to a diff that was cut short
pub const TRUNCATION_MARKER: &str = "\n... (truncated)";

/// Prefixes removed from generated messages, applied in this order
const STRIPPED_PREFIXES: &[&str] = &["feat: ", "fix: ", "chore: "];

/// Provider output lines containing this are tool chatter, not a message
const BOILERPLATE_MARKER: &str = "credentials";

/// External source of commit messages
#[async_trait]
pub trait MessageProvider: Send + Sync {
    /// Human readable name for log lines
    fn name(&self) -> &str;

    /// Produce raw text for the given prompt
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Fixed fallback message: `auto commit - YYYY-MM-DD HH:MM:SS`
///
/// Composite repositories get `auto commit (monorepo) - ...`.
pub fn timestamp_message(classification: Classification, at: DateTime<Local>) -> String {
    let timestamp = at.format("%Y-%m-%d %H:%M:%S");
    match classification {
        Classification::Simple => format!("auto commit - {}", timestamp),
        Classification::Composite => format!("auto commit (monorepo) - {}", timestamp),
    }
}

/// Cut a diff to at most `max_chars` characters, marking the cut
pub fn truncate_diff(diff: &str, max_chars: usize) -> String {
    match diff.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &diff[..cut], TRUNCATION_MARKER),
        None => diff.to_string(),
    }
}

/// Build the prompt sent to a provider
pub fn build_prompt(diff: &str) -> String {
    format!(
        "You are a git commit message generator. Based on the following git diff output, \
generate ONE concise commit message.

Rules:
- ONE line only
- Max 50 characters
- Use imperative mood (e.g., \"Add feature\" not \"Added feature\")
- Be specific about what changed
- No explanations, just the commit message

Git diff:
---
{}
---

Commit message:",
        diff
    )
}

/// Extract a commit message from raw provider output
///
/// Takes the first non-empty line that is not provider boilerplate, strips
/// conventional-commit prefixes and limits the length. Returns `None` when
/// nothing usable remains.
pub fn sanitize_message(raw: &str) -> Option<String> {
    let line = raw
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.contains(BOILERPLATE_MARKER))?;

    let mut message = line;
    for prefix in STRIPPED_PREFIXES {
        message = message.strip_prefix(prefix).unwrap_or(message);
    }

    let message: String = message.chars().take(MAX_MESSAGE_CHARS).collect();
    if message.trim().is_empty() {
        None
    } else {
        Some(message)
    }
}

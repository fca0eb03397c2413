//! Error types for git-air

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for git-air operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for git-air operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A git invocation exited unsuccessfully
    #[error("git {command} failed: {stderr}")]
    Git {
        /// The git subcommand and arguments, space separated
        command: String,
        /// Trimmed stderr of the failed invocation
        stderr: String,
    },

    /// A repository working directory could not be entered
    #[error("cannot enter {}: {reason}", path.display())]
    Workdir { path: PathBuf, reason: String },

    /// Submodule update or staging failed
    #[error("submodule sync failed: {0}")]
    Submodule(String),

    /// Commit message provider failed, timed out, or produced nothing usable
    #[error("message provider error: {0}")]
    Provider(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Short single-line description used in console events
    pub fn reason(&self) -> String {
        match self {
            Error::Git { stderr, .. } if !stderr.is_empty() => {
                stderr.lines().next().unwrap_or_default().to_string()
            }
            other => other.to_string(),
        }
    }
}

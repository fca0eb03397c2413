//! Message provider backed by an external command-line tool

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::MessageProvider;
use crate::{Error, Result};

/// Runs `<command> <prompt>` and returns its stdout
///
/// The child is killed if the future is dropped, so a caller that gives up
/// after a timeout does not leave the process running.
#[derive(Debug, Clone)]
pub struct CommandMessageProvider {
    command: String,
}

impl CommandMessageProvider {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl MessageProvider for CommandMessageProvider {
    fn name(&self) -> &str {
        &self.command
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let output = Command::new(&self.command)
            .arg(prompt)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::Provider(format!("'{}' not found. Is it installed?", self.command))
                } else {
                    Error::Provider(format!("failed to run '{}': {}", self.command, e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Provider(format!(
                "'{}' exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

//! Subprocess-backed [`GitClient`]

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};

use async_trait::async_trait;
use tokio::process::Command;

use super::GitClient;
use crate::{Error, Result};

/// Runs the git tool inside one repository's working tree
///
/// Commands are started with `current_dir` set to the repository, so the
/// process working directory is never touched. Dropping the handle is the
/// end of the repository's scope.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
    workdir: PathBuf,
}

impl GitCli {
    /// Enter a repository
    ///
    /// Fails with [`Error::Workdir`] when the path is not an accessible
    /// directory.
    pub fn open(program: impl Into<String>, workdir: impl AsRef<Path>) -> Result<Self> {
        let workdir = workdir.as_ref();

        let metadata = std::fs::metadata(workdir).map_err(|e| Error::Workdir {
            path: workdir.to_path_buf(),
            reason: e.to_string(),
        })?;

        if !metadata.is_dir() {
            return Err(Error::Workdir {
                path: workdir.to_path_buf(),
                reason: "not a directory".to_string(),
            });
        }

        Ok(Self {
            program: program.into(),
            workdir: workdir.to_path_buf(),
        })
    }

    async fn output(&self, args: &[&str]) -> Result<Output> {
        tracing::debug!(repo = %self.workdir.display(), "git {}", args.join(" "));

        Command::new(&self.program)
            .args(args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::Config(format!(
                        "git executable not found at '{}'. Is git installed?",
                        self.program
                    ))
                } else {
                    Error::Io(e)
                }
            })
    }

    /// Run git and return stdout, failing on a non-zero exit
    async fn run(&self, args: &[&str]) -> Result<String> {
        let output = self.output(args).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(Error::Git {
                command: args.join(" "),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl GitClient for GitCli {
    async fn has_changes(&self) -> Result<bool> {
        let status = self.run(&["status", "--porcelain"]).await?;
        Ok(!status.trim().is_empty())
    }

    async fn stage_all(&self) -> Result<()> {
        self.run(&["add", "--all"]).await.map(drop)
    }

    async fn staged_diff(&self) -> Result<String> {
        self.run(&["diff", "--staged"]).await
    }

    async fn commit(&self, message: &str) -> Result<()> {
        self.run(&["commit", "-m", message]).await.map(drop)
    }

    async fn remotes(&self) -> Result<Vec<String>> {
        let output = self.run(&["remote"]).await?;
        Ok(output.split_whitespace().map(str::to_string).collect())
    }

    async fn current_branch(&self) -> Result<String> {
        let branch = self.run(&["branch", "--show-current"]).await?;
        let branch = branch.trim();
        if branch.is_empty() {
            return Err(Error::Other("HEAD is not on a branch".to_string()));
        }
        Ok(branch.to_string())
    }

    async fn fetch(&self, remote: &str) -> Result<()> {
        self.run(&["fetch", remote]).await.map(drop)
    }

    async fn pull(&self, remote: &str, branch: &str) -> Result<()> {
        self.run(&["pull", remote, branch]).await.map(drop)
    }

    async fn push(&self, remote: &str, branch: &str) -> Result<()> {
        self.run(&["push", remote, branch]).await.map(drop)
    }

    async fn resolve_ref(&self, reference: &str) -> Result<String> {
        let id = self
            .run(&["rev-parse", "--verify", "--quiet", reference])
            .await?;
        Ok(id.trim().to_string())
    }

    async fn submodule_update(&self) -> Result<()> {
        self.run(&["submodule", "update", "--remote", "--merge"])
            .await
            .map(drop)
    }
}

//! In-memory [`GitClient`] for unit tests

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use super::GitClient;
use crate::{Error, Result};

/// Scriptable git double that records every invocation
#[derive(Debug, Default)]
pub(crate) struct MockGit {
    dirty: Mutex<bool>,
    diff: String,
    remotes: Vec<String>,
    branch: Option<String>,
    refs: HashMap<String, String>,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl MockGit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_changes(self) -> Self {
        *self.dirty.lock().unwrap() = true;
        self
    }

    pub fn with_diff(mut self, diff: &str) -> Self {
        self.diff = diff.to_string();
        self
    }

    pub fn with_remotes(mut self, remotes: &[&str]) -> Self {
        self.remotes = remotes.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn with_branch(mut self, branch: &str) -> Self {
        self.branch = Some(branch.to_string());
        self
    }

    pub fn with_ref(mut self, reference: &str, id: &str) -> Self {
        self.refs.insert(reference.to_string(), id.to_string());
        self
    }

    /// Make the invocation recorded as `call` fail, e.g. `"push backup"`
    pub fn failing(mut self, call: &str) -> Self {
        self.failing.insert(call.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, prefix: &str) -> bool {
        self.calls().iter().any(|c| c.starts_with(prefix))
    }

    fn record(&self, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call.clone());
        let failed = self
            .failing
            .iter()
            .any(|f| call == *f || call.starts_with(&format!("{} ", f)));
        if failed {
            return Err(Error::Git {
                command: call,
                stderr: "scripted failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl GitClient for MockGit {
    async fn has_changes(&self) -> Result<bool> {
        self.record("status".to_string())?;
        Ok(*self.dirty.lock().unwrap())
    }

    async fn stage_all(&self) -> Result<()> {
        self.record("add".to_string())
    }

    async fn staged_diff(&self) -> Result<String> {
        self.record("diff".to_string())?;
        Ok(self.diff.clone())
    }

    async fn commit(&self, message: &str) -> Result<()> {
        self.record(format!("commit {}", message))?;
        *self.dirty.lock().unwrap() = false;
        Ok(())
    }

    async fn remotes(&self) -> Result<Vec<String>> {
        self.record("remote".to_string())?;
        Ok(self.remotes.clone())
    }

    async fn current_branch(&self) -> Result<String> {
        self.record("branch".to_string())?;
        self.branch
            .clone()
            .ok_or_else(|| Error::Other("HEAD is not on a branch".to_string()))
    }

    async fn fetch(&self, remote: &str) -> Result<()> {
        self.record(format!("fetch {}", remote))
    }

    async fn pull(&self, remote: &str, branch: &str) -> Result<()> {
        self.record(format!("pull {} {}", remote, branch))
    }

    async fn push(&self, remote: &str, branch: &str) -> Result<()> {
        self.record(format!("push {} {}", remote, branch))
    }

    async fn resolve_ref(&self, reference: &str) -> Result<String> {
        self.record(format!("rev-parse {}", reference))?;
        self.refs.get(reference).cloned().ok_or_else(|| Error::Git {
            command: format!("rev-parse {}", reference),
            stderr: String::new(),
        })
    }

    async fn submodule_update(&self) -> Result<()> {
        self.record("submodule update".to_string())
    }
}

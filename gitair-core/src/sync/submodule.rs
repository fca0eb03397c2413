//! Submodule synchronization for composite repositories

use std::path::Path;

use crate::git::GitClient;
use crate::repo::has_gitmodules;
use crate::{Error, Result};

/// Result of a successful submodule sync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmoduleSync {
    /// Submodules were updated and their pointers staged
    Updated,
    /// No `.gitmodules`; nested working trees are left alone
    NoOp,
}

/// Update submodules and stage the new pointers in the parent index
///
/// Each step must succeed before the next runs. Any failure is returned as
/// [`Error::Submodule`] and the caller must not commit the parent this pass.
pub async fn sync_submodules(git: &dyn GitClient, repo: &Path) -> Result<SubmoduleSync> {
    if !has_gitmodules(repo) {
        return Ok(SubmoduleSync::NoOp);
    }

    git.submodule_update()
        .await
        .map_err(|e| Error::Submodule(format!("update failed: {}", e.reason())))?;

    git.stage_all().await.map_err(|e| {
        Error::Submodule(format!("failed to stage submodule changes: {}", e.reason()))
    })?;

    Ok(SubmoduleSync::Updated)
}

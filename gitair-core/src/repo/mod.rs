//! Repository discovery and classification
//!
//! Discovery runs once at startup and yields an immutable list of
//! [`RepositoryRecord`]s. Classification is recomputed every time a
//! repository enters a pass, since submodule layout can change between cycles.

mod classify;
mod locator;

use std::fmt;
use std::path::{Path, PathBuf};

pub use classify::{classify, has_gitmodules, is_composite};
pub use locator::{discover, is_excluded_dir_name, EXCLUDED_DIRS};

/// Name of the directory that marks a working-tree root
pub const GIT_DIR: &str = ".git";

/// Name of the file that declares submodules
pub const GITMODULES: &str = ".gitmodules";

/// One discovered working-tree root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRecord {
    path: PathBuf,
    name: String,
}

impl RepositoryRecord {
    /// Create a record for a working-tree root
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }

    /// Path to the working-tree root
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Display label (leaf directory name)
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Whether a repository is a plain working tree or contains nested ones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// A single working tree
    Simple,
    /// A monorepo: declares submodules or holds nested working trees
    Composite,
}

impl Classification {
    /// Check if this is a composite repository
    pub fn is_composite(self) -> bool {
        matches!(self, Classification::Composite)
    }

    /// Short label used in listings
    pub fn label(self) -> &'static str {
        match self {
            Classification::Simple => "repo",
            Classification::Composite => "MONOREPO",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

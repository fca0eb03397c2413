//! Working-tree discovery

use std::ffi::OsStr;
use std::path::Path;

use walkdir::WalkDir;

use super::{RepositoryRecord, GIT_DIR};

/// Directory names that are never reported nor descended into
pub const EXCLUDED_DIRS: &[&str] = &["node_modules", "vendor"];

/// Check if a directory name is pruned from discovery (exact match only)
pub fn is_excluded_dir_name(name: &OsStr) -> bool {
    EXCLUDED_DIRS.iter().any(|excluded| name == OsStr::new(excluded))
}

/// Find every working-tree root under `root`
///
/// A directory named `.git` marks its parent as a repository; the walk does
/// not enter `.git` itself. Unreadable entries are skipped and the walk
/// carries on with their siblings. Entries are visited in file-name order,
/// so the result is stable for a given tree.
pub fn discover(root: impl AsRef<Path>) -> Vec<RepositoryRecord> {
    let root = root.as_ref();
    let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());

    let mut repos = Vec::new();
    let mut walker = WalkDir::new(&root).sort_by_file_name().into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Skipping unreadable entry during discovery: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        let name = entry.file_name();
        if entry.depth() > 0 && is_excluded_dir_name(name) {
            walker.skip_current_dir();
            continue;
        }

        if name == OsStr::new(GIT_DIR) {
            if let Some(parent) = entry.path().parent() {
                tracing::debug!(repo = %parent.display(), "Discovered repository");
                repos.push(RepositoryRecord::new(parent));
            }
            walker.skip_current_dir();
        }
    }

    repos
}

//! Simple vs composite classification

use std::ffi::OsStr;
use std::path::Path;

use walkdir::WalkDir;

use super::{Classification, GITMODULES, GIT_DIR};

/// Check if the repository root declares submodules
pub fn has_gitmodules(repo: &Path) -> bool {
    repo.join(GITMODULES).exists()
}

/// Check if a repository is composite
///
/// True when a `.gitmodules` file sits at the root, or when a `.git`
/// directory exists anywhere below the root other than the root's own.
/// The nested search stops at the first hit.
pub fn is_composite(repo: &Path) -> bool {
    if has_gitmodules(repo) {
        return true;
    }

    let mut walker = WalkDir::new(repo).min_depth(1).into_iter();
    while let Some(entry) = walker.next() {
        let Ok(entry) = entry else {
            continue;
        };

        if !entry.file_type().is_dir() || entry.file_name() != OsStr::new(GIT_DIR) {
            continue;
        }

        if entry.depth() == 1 {
            // The repository's own metadata directory.
            walker.skip_current_dir();
            continue;
        }

        return true;
    }

    false
}

/// Classify a repository, honouring a force-composite override
pub fn classify(repo: &Path, force_composite: bool) -> Classification {
    if force_composite || is_composite(repo) {
        Classification::Composite
    } else {
        Classification::Simple
    }
}

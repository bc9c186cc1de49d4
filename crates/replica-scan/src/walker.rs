//! Serial directory walker producing root-relative paths.

use std::path::PathBuf;

use jwalk::{Parallelism, WalkDir};

use replica_core::ScanError;

/// Which kind of entry an enumeration collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Directories,
    Files,
}

/// Enumerates directories and files under a root as root-relative paths.
///
/// Each call is an independent snapshot of the tree; no consistency is
/// assumed across calls or across roots. Entries below the root that cannot
/// be read are skipped silently; a failure on the root itself is structural
/// and returned to the caller.
pub struct TreeWalker {
    root: PathBuf,
}

impl TreeWalker {
    /// Create a walker for the given root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// All directories below the root, relative to it, sorted.
    ///
    /// The root itself is never returned.
    pub fn directories(&self) -> Result<Vec<PathBuf>, ScanError> {
        self.walk(EntryKind::Directories)
    }

    /// All regular files below the root, relative to it, sorted.
    pub fn files(&self) -> Result<Vec<PathBuf>, ScanError> {
        self.walk(EntryKind::Files)
    }

    fn walk(&self, kind: EntryKind) -> Result<Vec<PathBuf>, ScanError> {
        let metadata =
            std::fs::metadata(&self.root).map_err(|e| ScanError::io(&self.root, e))?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory {
                path: self.root.clone(),
            });
        }

        let walker = WalkDir::new(&self.root)
            .parallelism(Parallelism::Serial)
            .sort(true)
            .skip_hidden(false)
            .follow_links(false)
            .min_depth(1);

        let mut paths = Vec::new();
        let mut skipped: u64 = 0;

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    tracing::debug!(
                        root = %self.root.display(),
                        error = %err,
                        "skipping unreadable entry"
                    );
                    skipped += 1;
                    continue;
                }
            };

            let file_type = entry.file_type();
            let wanted = match kind {
                EntryKind::Directories => file_type.is_dir(),
                EntryKind::Files => file_type.is_file(),
            };
            if !wanted {
                continue;
            }

            match entry.path().strip_prefix(&self.root) {
                Ok(rel) => paths.push(rel.to_path_buf()),
                // jwalk yields paths under the root it was given; anything
                // else (root renamed mid-walk) is skipped.
                Err(_) => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::debug!(root = %self.root.display(), skipped, "entries skipped during scan");
        }

        Ok(paths)
    }
}

//! Relative-path set differences between two tree snapshots.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// The difference between a source snapshot and a replica snapshot.
///
/// Membership is decided by relative-path equality; a renamed entry shows
/// up as one `missing` and one `extraneous` path, not as a move.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeDiff {
    /// Present in the source, absent from the replica (source order).
    pub missing: Vec<PathBuf>,
    /// Present in the replica, absent from the source (replica order).
    pub extraneous: Vec<PathBuf>,
}

impl TreeDiff {
    /// Compute the set differences between two snapshots of relative paths.
    pub fn between(source: &[PathBuf], replica: &[PathBuf]) -> Self {
        let source_set: HashSet<&Path> = source.iter().map(PathBuf::as_path).collect();
        let replica_set: HashSet<&Path> = replica.iter().map(PathBuf::as_path).collect();

        let missing = source
            .iter()
            .filter(|p| !replica_set.contains(p.as_path()))
            .cloned()
            .collect();
        let extraneous = replica
            .iter()
            .filter(|p| !source_set.contains(p.as_path()))
            .cloned()
            .collect();

        Self {
            missing,
            extraneous,
        }
    }

    /// True when both snapshots contain the same relative paths.
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.extraneous.is_empty()
    }
}

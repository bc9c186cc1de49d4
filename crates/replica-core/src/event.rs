//! Synchronization events and the sink that receives them.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::SyncConfig;

/// A discrete action taken against the replica tree, or the start-of-run
/// summary.
///
/// Paths are relative to their root; the relative path is the join key
/// between the source and replica trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncEvent {
    /// Synchronization started with the resolved configuration.
    Started {
        source: PathBuf,
        replica: PathBuf,
        interval: Duration,
    },
    /// A directory present in the source was created in the replica.
    DirectoryCreated { path: PathBuf },
    /// A directory absent from the source was deleted from the replica.
    DirectoryDeleted { path: PathBuf },
    /// A file present in the source was copied into the replica.
    FileCreated { path: PathBuf },
    /// A changed file was rewritten in the replica.
    FileUpdated { path: PathBuf },
    /// A file absent from the source was deleted from the replica.
    FileDeleted { path: PathBuf },
}

impl SyncEvent {
    /// Start-of-run summary for the resolved configuration.
    pub fn started(config: &SyncConfig) -> Self {
        Self::Started {
            source: config.source.clone(),
            replica: config.replica.clone(),
            interval: config.interval,
        }
    }

    /// Create a directory-created event.
    pub fn directory_created(path: impl Into<PathBuf>) -> Self {
        Self::DirectoryCreated { path: path.into() }
    }

    /// Create a directory-deleted event.
    pub fn directory_deleted(path: impl Into<PathBuf>) -> Self {
        Self::DirectoryDeleted { path: path.into() }
    }

    /// Create a file-created event.
    pub fn file_created(path: impl Into<PathBuf>) -> Self {
        Self::FileCreated { path: path.into() }
    }

    /// Create a file-updated event.
    pub fn file_updated(path: impl Into<PathBuf>) -> Self {
        Self::FileUpdated { path: path.into() }
    }

    /// Create a file-deleted event.
    pub fn file_deleted(path: impl Into<PathBuf>) -> Self {
        Self::FileDeleted { path: path.into() }
    }
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started {
                source,
                replica,
                interval,
            } => write!(
                f,
                "synchronization started (source: {}, replica: {}, interval: {:?})",
                source.display(),
                replica.display(),
                interval
            ),
            Self::DirectoryCreated { path } => {
                write!(f, "created directory '{}'", path.display())
            }
            Self::DirectoryDeleted { path } => {
                write!(f, "deleted directory '{}'", path.display())
            }
            Self::FileCreated { path } => write!(f, "created file '{}'", path.display()),
            Self::FileUpdated { path } => write!(f, "updated file '{}'", path.display()),
            Self::FileDeleted { path } => write!(f, "deleted file '{}'", path.display()),
        }
    }
}

/// Receives synchronization events as they happen.
///
/// The engine takes a sink at construction and calls `emit` synchronously
/// from its single execution context, once per filesystem action taken.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &SyncEvent);
}

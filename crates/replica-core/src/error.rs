//! Error types for enumeration and synchronization.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while enumerating a directory tree.
///
/// These are structural failures of an entire enumeration call, not
/// per-entry failures (inaccessible entries below the root are skipped by
/// the walker, never reported here).
#[derive(Debug, Error)]
pub enum ScanError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

/// Structural failures that abort a synchronization cycle.
///
/// Per-file copy and delete failures are contained inside the file-sync
/// phase and never appear here; the affected file is simply retried on the
/// next cycle.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Enumerating one of the trees failed.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// A replica directory could not be created.
    #[error("Cannot create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A replica directory could not be deleted.
    #[error("Cannot delete directory {path}: {source}")]
    DeleteDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

//! Synchronization configuration types.

use std::path::PathBuf;
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration for a synchronization run.
///
/// Immutable for the lifetime of the process; the engine re-reads nothing
/// from disk between cycles.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct SyncConfig {
    /// Source root to mirror from.
    pub source: PathBuf,

    /// Replica root to mirror onto.
    pub replica: PathBuf,

    /// Delay between synchronization cycles.
    #[builder(default = "Duration::from_secs(30)")]
    #[serde(default = "default_interval")]
    pub interval: Duration,
}

fn default_interval() -> Duration {
    Duration::from_secs(30)
}

impl SyncConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref source) = self.source {
            if source.as_os_str().is_empty() {
                return Err("Source path cannot be empty".to_string());
            }
        } else {
            return Err("Source path is required".to_string());
        }

        if let Some(ref replica) = self.replica {
            if replica.as_os_str().is_empty() {
                return Err("Replica path cannot be empty".to_string());
            }
        } else {
            return Err("Replica path is required".to_string());
        }

        if let Some(interval) = self.interval {
            if interval.is_zero() {
                return Err("Interval must be greater than zero".to_string());
            }
        }

        Ok(())
    }
}

impl SyncConfig {
    /// Create a new sync config builder.
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder::default()
    }

    /// Create a simple config for mirroring one root onto another.
    pub fn new(
        source: impl Into<PathBuf>,
        replica: impl Into<PathBuf>,
        interval: Duration,
    ) -> Self {
        Self {
            source: source.into(),
            replica: replica.into(),
            interval,
        }
    }
}

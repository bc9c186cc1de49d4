//! Synchronization engine for replica.
//!
//! One-way convergence of a replica tree onto a source tree: directories
//! first, then files, re-diffed from scratch every cycle. The engine owns
//! no persistent state; the replica filesystem itself is the state.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use replica_core::{EventSink, SyncConfig, SyncEvent};
//! use replica_sync::SyncEngine;
//!
//! struct StdoutSink;
//!
//! impl EventSink for StdoutSink {
//!     fn emit(&self, event: &SyncEvent) {
//!         println!("{event}");
//!     }
//! }
//!
//! let config = SyncConfig::new("/data/source", "/data/replica", Duration::from_secs(30));
//! let engine = SyncEngine::new(config, Arc::new(StdoutSink));
//! engine.run_cycle().unwrap();
//! ```

mod compare;
mod engine;

pub use compare::{files_equal, COMPARE_CHUNK_SIZE};
pub use engine::{CycleOutcome, CycleStats, SyncEngine};

// Re-export core types for convenience
pub use replica_core::{EventSink, SyncConfig, SyncError, SyncEvent};

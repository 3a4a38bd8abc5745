//! Batch download module - turns the queue into files on disk
//!
//! Provides the download orchestration with:
//! - Concurrent metadata resolution (all-or-nothing join)
//! - Sequential payload fetch and packaging with ordered progress events
//! - Direct delivery for a single item, one zip archive otherwise
//! - Cancellation honored at every suspension point

mod state;
mod types;
mod worker;

pub use state::BatchStateHandle;
pub use types::{BatchOutcome, BatchProgress, BatchState, BatchStatus};
pub use worker::BatchOrchestrator;

//! Batch status, progress and outcome types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum BatchStatus {
    #[default]
    #[serde(rename = "idle")]
    Idle,
    #[serde(rename = "fetching")]
    Fetching,
    #[serde(rename = "packaging")]
    Packaging,
    #[serde(rename = "delivering")]
    Delivering,
    #[serde(rename = "error")]
    Error,
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchStatus::Idle => write!(f, "idle"),
            BatchStatus::Fetching => write!(f, "fetching"),
            BatchStatus::Packaging => write!(f, "packaging"),
            BatchStatus::Delivering => write!(f, "delivering"),
            BatchStatus::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BatchProgress {
    pub total: usize,
    pub current: usize,
    pub file_name: String,
}

/// What the UI layer reads; only the orchestrator writes it
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BatchState {
    pub status: BatchStatus,
    pub progress: BatchProgress,
    /// Message of the most recent failure; kept after the reset to idle,
    /// cleared when the next batch starts
    pub error: Option<String>,
}

/// Result of a successful batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub path: PathBuf,
    pub file_name: String,
    pub entries: usize,
}

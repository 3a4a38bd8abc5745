//! Error taxonomy shared by the resolver, the orchestrator and the CLI

use serde::{Deserialize, Serialize};

pub type QueueResult<T> = Result<T, QueueError>;

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// Malformed input, rejected before any network call
    #[error("{0}")]
    Validation(String),

    /// No matching extension, version or installable asset
    #[error("{0}")]
    NotFound(String),

    /// Marketplace reachable but answered with a failure or an unreadable body
    #[error("{}", upstream_message(.status, .message))]
    Upstream { status: Option<u16>, message: String },

    /// A resolved payload could not be fetched or packed
    #[error("{0}")]
    Packaging(String),

    #[error("{0}")]
    Delivery(String),

    #[error("Download cancelled")]
    Cancelled,
}

fn upstream_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("Marketplace API request failed: {} {}", code, message),
        None => format!("Marketplace API request failed: {}", message),
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Upstream,
    Packaging,
    Delivery,
    Cancelled,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Validation => write!(f, "validation"),
            ErrorCategory::NotFound => write!(f, "not_found"),
            ErrorCategory::Upstream => write!(f, "upstream"),
            ErrorCategory::Packaging => write!(f, "packaging"),
            ErrorCategory::Delivery => write!(f, "delivery"),
            ErrorCategory::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl QueueError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            QueueError::Validation(_) => ErrorCategory::Validation,
            QueueError::NotFound(_) => ErrorCategory::NotFound,
            QueueError::Upstream { .. } => ErrorCategory::Upstream,
            QueueError::Packaging(_) => ErrorCategory::Packaging,
            QueueError::Delivery(_) => ErrorCategory::Delivery,
            QueueError::Cancelled => ErrorCategory::Cancelled,
        }
    }

    /// HTTP-equivalent status for the request/response surface
    pub fn status_code(&self) -> u16 {
        match self {
            QueueError::Validation(_) => 400,
            QueueError::NotFound(_) => 404,
            QueueError::Upstream { .. } => 502,
            QueueError::Packaging(_) | QueueError::Delivery(_) => 500,
            QueueError::Cancelled => 499,
        }
    }

    pub(crate) fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        QueueError::Upstream {
            status,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for QueueError {
    fn from(e: reqwest::Error) -> Self {
        QueueError::upstream(e.status().map(|s| s.as_u16()), e.to_string())
    }
}

impl From<std::io::Error> for QueueError {
    fn from(e: std::io::Error) -> Self {
        QueueError::Delivery(format!("Failed to write file: {}", e))
    }
}

impl From<zip::result::ZipError> for QueueError {
    fn from(e: zip::result::ZipError) -> Self {
        QueueError::Packaging(format!("Failed to build archive: {}", e))
    }
}

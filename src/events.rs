//! Event payloads and the emitter seam between the engine and whatever renders it

use log::{debug, info, warn};
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

/// Queue membership change payload
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QueueChanged {
    pub action: String, // "added" | "removed" | "cleared"
    pub id: Option<String>,
    pub size: usize,
}

/// Batch status change payload
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BatchStatusChanged {
    pub status: String,
    pub error: Option<String>,
}

/// Packaging progress payload
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BatchProgressEvent {
    pub total: usize,
    pub current: usize,
    pub file_name: String,
}

/// Emitted once a file has been handed to the delivery target
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BatchDelivered {
    pub file_name: String,
    pub path: String,
    pub entries: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum QueueEvent {
    QueueChanged(QueueChanged),
    BatchStatusChanged(BatchStatusChanged),
    BatchProgress(BatchProgressEvent),
    BatchDelivered(BatchDelivered),
}

impl QueueEvent {
    pub fn name(&self) -> &'static str {
        match self {
            QueueEvent::QueueChanged(_) => "queue-changed",
            QueueEvent::BatchStatusChanged(_) => "batch-status-changed",
            QueueEvent::BatchProgress(_) => "batch-progress",
            QueueEvent::BatchDelivered(_) => "batch-delivered",
        }
    }
}

pub trait Emitter: Send + Sync {
    fn emit(&self, event: QueueEvent);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEmitter;

impl Emitter for NoopEmitter {
    fn emit(&self, _event: QueueEvent) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogEmitter;

impl Emitter for LogEmitter {
    fn emit(&self, event: QueueEvent) {
        match &event {
            QueueEvent::BatchStatusChanged(BatchStatusChanged {
                status,
                error: Some(err),
            }) => warn!("{}: {} error={}", event.name(), status, err),
            QueueEvent::BatchProgress(p) => {
                debug!("{}: {}/{} {}", event.name(), p.current, p.total, p.file_name)
            }
            _ => match serde_json::to_string(&event) {
                Ok(json) => info!("{}: {}", event.name(), json),
                Err(_) => info!("{}", event.name()),
            },
        }
    }
}

/// Forwards events to an mpsc receiver (a UI loop, a test, the CLI renderer)
#[derive(Debug, Clone)]
pub struct ChannelEmitter {
    sender: UnboundedSender<QueueEvent>,
}

impl ChannelEmitter {
    pub fn new(sender: UnboundedSender<QueueEvent>) -> Self {
        Self { sender }
    }
}

impl Emitter for ChannelEmitter {
    fn emit(&self, event: QueueEvent) {
        // Receiver gone means nobody is listening any more
        let _ = self.sender.send(event);
    }
}

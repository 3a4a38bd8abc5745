use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use log::{info, warn};

use super::types::{BatchProgress, BatchState, BatchStatus};
use crate::error::{QueueError, QueueResult};
use crate::events::{BatchProgressEvent, BatchStatusChanged, Emitter, QueueEvent};

/// Shared batch state; the orchestrator writes, anyone holding a clone reads
#[derive(Clone)]
pub struct BatchStateHandle {
    state: Arc<Mutex<BatchState>>,
    running: Arc<AtomicBool>,
    emitter: Arc<dyn Emitter>,
}

/// Marks a batch as in flight until dropped
pub(crate) struct RunningGuard {
    running: Arc<AtomicBool>,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

impl BatchStateHandle {
    pub fn new(emitter: Arc<dyn Emitter>) -> Self {
        Self {
            state: Arc::new(Mutex::new(BatchState::default())),
            running: Arc::new(AtomicBool::new(false)),
            emitter,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BatchState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> BatchState {
        self.lock().clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub(crate) fn begin(&self) -> QueueResult<RunningGuard> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| {
                QueueError::Validation("A download is already in progress.".to_string())
            })?;
        Ok(RunningGuard {
            running: self.running.clone(),
        })
    }

    /// idle -> fetching; clears the previous error and progress
    pub(crate) fn start(&self, total: usize) {
        {
            let mut state = self.lock();
            state.error = None;
            state.progress = BatchProgress {
                total,
                current: 0,
                file_name: String::new(),
            };
        }
        self.update_status(BatchStatus::Fetching, None);
    }

    pub(crate) fn update_status(&self, status: BatchStatus, error: Option<String>) {
        let previous = {
            let mut state = self.lock();
            let previous = state.status;
            state.status = status;
            if error.is_some() {
                state.error = error.clone();
            }
            previous
        };
        match error.as_ref() {
            Some(err) => warn!("batch_status: {} -> {} error={}", previous, status, err),
            None => info!("batch_status: {} -> {}", previous, status),
        }
        self.emitter
            .emit(QueueEvent::BatchStatusChanged(BatchStatusChanged {
                status: status.to_string(),
                error,
            }));
    }

    pub(crate) fn update_progress(&self, current: usize, file_name: &str) {
        let total = {
            let mut state = self.lock();
            state.progress.current = current;
            state.progress.file_name = file_name.to_string();
            state.progress.total
        };
        self.emitter.emit(QueueEvent::BatchProgress(BatchProgressEvent {
            total,
            current,
            file_name: file_name.to_string(),
        }));
    }

    /// -> error (with message) -> idle; the message stays readable afterwards
    pub(crate) fn fail(&self, error: &QueueError) {
        self.update_status(BatchStatus::Error, Some(error.to_string()));
        self.update_status(BatchStatus::Idle, None);
    }
}

impl std::fmt::Debug for BatchStateHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchStateHandle")
            .field("state", &self.snapshot())
            .field("running", &self.is_running())
            .finish()
    }
}

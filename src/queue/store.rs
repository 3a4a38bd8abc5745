//! Queue store - the set of extensions selected for download

use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;

use crate::events::{Emitter, QueueChanged, QueueEvent};
use crate::marketplace::ExtensionSummary;

pub type QueuedExtension = ExtensionSummary;

/// Cloneable handle; clones share the same queue
#[derive(Clone)]
pub struct QueueStore {
    items: Arc<Mutex<Vec<QueuedExtension>>>,
    emitter: Arc<dyn Emitter>,
}

impl QueueStore {
    pub fn new(emitter: Arc<dyn Emitter>) -> Self {
        Self {
            items: Arc::new(Mutex::new(Vec::new())),
            emitter,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<QueuedExtension>> {
        // A panic mid-mutation cannot leave a torn Vec behind, so poison is safe to ignore
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Remove when present, insert otherwise. Returns whether it is queued afterwards.
    pub fn toggle(&self, extension: QueuedExtension) -> bool {
        let (queued, id, size) = {
            let mut items = self.lock();
            let id = extension.id.clone();
            let queued = match items.iter().position(|e| e.id == id) {
                Some(index) => {
                    items.remove(index);
                    false
                }
                None => {
                    items.push(extension);
                    true
                }
            };
            (queued, id, items.len())
        };

        debug!("queue_toggle: {} queued={} size={}", id, queued, size);
        self.emitter.emit(QueueEvent::QueueChanged(QueueChanged {
            action: if queued { "added" } else { "removed" }.to_string(),
            id: Some(id),
            size,
        }));
        queued
    }

    pub fn clear(&self) {
        self.lock().clear();
        debug!("queue_clear");
        self.emitter.emit(QueueEvent::QueueChanged(QueueChanged {
            action: "cleared".to_string(),
            id: None,
            size: 0,
        }));
    }

    pub fn is_queued(&self, id: &str) -> bool {
        self.lock().iter().any(|e| e.id == id)
    }

    /// Snapshot in insertion order
    pub fn items(&self) -> Vec<QueuedExtension> {
        self.lock().clone()
    }

    pub fn snapshot(&self) -> Vec<QueuedExtension> {
        self.items()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl std::fmt::Debug for QueueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueStore")
            .field("items", &self.items())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ChannelEmitter, NoopEmitter};

    fn ext(id: &str) -> QueuedExtension {
        ExtensionSummary::from_identifier(id)
    }

    fn store() -> QueueStore {
        QueueStore::new(Arc::new(NoopEmitter))
    }

    #[test]
    fn membership_follows_toggle_parity() {
        let queue = store();
        for count in 1..=7 {
            queue.toggle(ext("pub.a"));
            assert_eq!(queue.is_queued("pub.a"), count % 2 == 1);
        }
    }

    #[test]
    fn toggle_twice_restores_previous_state() {
        let queue = store();
        queue.toggle(ext("pub.a"));
        queue.toggle(ext("pub.b"));
        let before = queue.items();

        queue.toggle(ext("pub.c"));
        queue.toggle(ext("pub.c"));
        assert_eq!(queue.items(), before);

        queue.toggle(ext("pub.a"));
        queue.toggle(ext("pub.a"));
        let ids: Vec<_> = queue.items().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["pub.b", "pub.a"]);
    }

    #[test]
    fn never_holds_duplicate_identifiers() {
        let queue = store();
        let mut replacement = ext("pub.a");
        replacement.name = "Renamed".to_string();
        assert!(queue.toggle(ext("pub.a")));
        assert!(!queue.toggle(replacement.clone()));
        assert!(queue.toggle(replacement));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.items()[0].name, "Renamed");
    }

    #[test]
    fn clones_share_state_and_clear_empties() {
        let queue = store();
        let other = queue.clone();
        queue.toggle(ext("pub.a"));
        queue.toggle(ext("pub.b"));
        assert_eq!(other.len(), 2);

        other.clear();
        assert!(queue.is_empty());
        assert!(!queue.is_queued("pub.a"));
    }

    #[test]
    fn mutations_emit_queue_changed() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let queue = QueueStore::new(Arc::new(ChannelEmitter::new(tx)));
        queue.toggle(ext("pub.a"));
        queue.toggle(ext("pub.a"));
        queue.clear();

        let actions: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|event| match event {
                QueueEvent::QueueChanged(c) => (c.action, c.size),
                other => panic!("unexpected event {:?}", other),
            })
            .collect();
        assert_eq!(
            actions,
            vec![
                ("added".to_string(), 1),
                ("removed".to_string(), 0),
                ("cleared".to_string(), 0)
            ]
        );
    }
}

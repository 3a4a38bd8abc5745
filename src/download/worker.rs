//! Batch download worker - resolve, fetch, package and deliver the queue snapshot

use std::future::Future;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use futures_util::future::try_join_all;
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use super::state::BatchStateHandle;
use super::types::{BatchOutcome, BatchState, BatchStatus};
use crate::archive::{ArchivePackager, PackagerFactory, ZipPackager, ARCHIVE_EXTENSION};
use crate::config::DEFAULT_ARCHIVE_PREFIX;
use crate::delivery::{Delivery, DeliverySource};
use crate::error::{QueueError, QueueResult};
use crate::events::{BatchDelivered, Emitter, NoopEmitter, QueueEvent};
use crate::marketplace::{DownloadDescriptor, MarketplaceClient, MetadataResolver};
use crate::queue::{QueueStore, QueuedExtension};

pub struct BatchOrchestrator {
    queue: QueueStore,
    resolver: Arc<dyn MetadataResolver>,
    client: MarketplaceClient,
    delivery: Arc<dyn Delivery>,
    emitter: Arc<dyn Emitter>,
    state: BatchStateHandle,
    packager_factory: PackagerFactory,
    archive_prefix: String,
    last_archive_stamp: AtomicI64,
}

impl BatchOrchestrator {
    pub fn new(
        queue: QueueStore,
        resolver: Arc<dyn MetadataResolver>,
        client: MarketplaceClient,
        delivery: Arc<dyn Delivery>,
    ) -> Self {
        let emitter: Arc<dyn Emitter> = Arc::new(NoopEmitter);
        Self {
            queue,
            resolver,
            client,
            delivery,
            state: BatchStateHandle::new(emitter.clone()),
            emitter,
            packager_factory: Arc::new(ZipPackager::boxed),
            archive_prefix: DEFAULT_ARCHIVE_PREFIX.to_string(),
            last_archive_stamp: AtomicI64::new(0),
        }
    }

    pub fn with_emitter(mut self, emitter: Arc<dyn Emitter>) -> Self {
        self.state = BatchStateHandle::new(emitter.clone());
        self.emitter = emitter;
        self
    }

    pub fn with_packager<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn ArchivePackager> + Send + Sync + 'static,
    {
        self.packager_factory = Arc::new(factory);
        self
    }

    pub fn with_archive_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.archive_prefix = prefix.into();
        self
    }

    pub fn state(&self) -> BatchState {
        self.state.snapshot()
    }

    pub fn queue(&self) -> &QueueStore {
        &self.queue
    }

    pub async fn download_all(&self) -> QueueResult<Option<BatchOutcome>> {
        self.download_all_with_cancel(CancellationToken::new()).await
    }

    /// Runs one batch over the queue as it is right now.
    ///
    /// Returns `Ok(None)` for an empty queue. On success the queue is cleared;
    /// on any failure it is left untouched and the state goes error -> idle.
    pub async fn download_all_with_cancel(
        &self,
        cancel: CancellationToken,
    ) -> QueueResult<Option<BatchOutcome>> {
        if self.queue.is_empty() {
            debug!("download_all: queue empty");
            return Ok(None);
        }

        let _running = self.state.begin()?;

        let items = self.queue.snapshot();
        if items.is_empty() {
            debug!("download_all: queue emptied before start");
            return Ok(None);
        }

        let total = items.len();
        info!("batch_start: items={}", total);
        self.state.start(total);

        let result = if total == 1 {
            self.deliver_single(&items[0], &cancel).await
        } else {
            self.deliver_archive(&items, &cancel).await
        };

        match result {
            Ok(outcome) => {
                self.queue.clear();
                self.state.update_status(BatchStatus::Idle, None);
                self.emitter
                    .emit(QueueEvent::BatchDelivered(BatchDelivered {
                        file_name: outcome.file_name.clone(),
                        path: outcome.path.display().to_string(),
                        entries: outcome.entries,
                    }));
                info!(
                    "batch_done: {} entries={}",
                    outcome.file_name, outcome.entries
                );
                Ok(Some(outcome))
            }
            Err(e) => {
                warn!("batch_failed: items={} error={}", total, e);
                self.state.fail(&e);
                Err(e)
            }
        }
    }

    async fn deliver_single(
        &self,
        extension: &QueuedExtension,
        cancel: &CancellationToken,
    ) -> QueueResult<BatchOutcome> {
        let descriptor = cancellable(cancel, self.resolver.resolve(&extension.id, None)).await?;

        ensure_not_cancelled(cancel)?;
        self.state.update_status(BatchStatus::Delivering, None);
        let path = self
            .delivery
            .deliver(
                DeliverySource::Url(descriptor.download_url),
                &descriptor.file_name,
            )
            .await?;

        Ok(BatchOutcome {
            path,
            file_name: descriptor.file_name,
            entries: 1,
        })
    }

    async fn deliver_archive(
        &self,
        items: &[QueuedExtension],
        cancel: &CancellationToken,
    ) -> QueueResult<BatchOutcome> {
        let descriptors = self.resolve_all(items, cancel).await?;

        self.state.update_status(BatchStatus::Packaging, None);
        let mut packager = (self.packager_factory)();

        for (index, descriptor) in descriptors.iter().enumerate() {
            ensure_not_cancelled(cancel)?;
            let payload = cancellable(
                cancel,
                self.client
                    .fetch_payload(&descriptor.download_url, &descriptor.file_name, cancel),
            )
            .await?;
            packager.add_entry(&descriptor.file_name, &payload)?;
            drop(payload);
            self.state.update_progress(index + 1, &descriptor.file_name);
        }

        ensure_not_cancelled(cancel)?;
        self.state.update_status(BatchStatus::Delivering, None);
        let entries = packager.entry_count();
        let archive = tokio::task::spawn_blocking(move || packager.finalize())
            .await
            .map_err(|e| QueueError::Packaging(format!("Archive task failed: {}", e)))??;

        ensure_not_cancelled(cancel)?;
        let file_name = self.next_archive_name();
        let path = self
            .delivery
            .deliver(DeliverySource::Bytes(archive), &file_name)
            .await?;

        Ok(BatchOutcome {
            path,
            file_name,
            entries,
        })
    }

    /// All-or-nothing: the first failed resolution fails the whole join
    async fn resolve_all(
        &self,
        items: &[QueuedExtension],
        cancel: &CancellationToken,
    ) -> QueueResult<Vec<DownloadDescriptor>> {
        let pending = items
            .iter()
            .map(|extension| self.resolver.resolve(&extension.id, None));
        let descriptors = cancellable(cancel, try_join_all(pending)).await?;
        debug!("resolve_all_done: {}", descriptors.len());
        Ok(descriptors)
    }

    /// `<prefix>-<unix millis>.zip`, bumped by one if two batches share a millisecond
    fn next_archive_name(&self) -> String {
        let now = Utc::now().timestamp_millis();
        let mut last = self.last_archive_stamp.load(Ordering::SeqCst);
        let stamp = loop {
            let candidate = if now > last { now } else { last + 1 };
            match self.last_archive_stamp.compare_exchange(
                last,
                candidate,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => break candidate,
                Err(actual) => last = actual,
            }
        };
        format!("{}-{}.{}", self.archive_prefix, stamp, ARCHIVE_EXTENSION)
    }
}

fn ensure_not_cancelled(cancel: &CancellationToken) -> QueueResult<()> {
    if cancel.is_cancelled() {
        return Err(QueueError::Cancelled);
    }
    Ok(())
}

async fn cancellable<F, T>(cancel: &CancellationToken, fut: F) -> QueueResult<T>
where
    F: Future<Output = QueueResult<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(QueueError::Cancelled),
        result = fut => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::events::NoopEmitter;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct StaticResolver;

    #[async_trait]
    impl MetadataResolver for StaticResolver {
        async fn resolve(
            &self,
            identifier: &str,
            _version: Option<&str>,
        ) -> QueueResult<DownloadDescriptor> {
            Ok(DownloadDescriptor {
                identifier: identifier.to_string(),
                version: "1.0.0".to_string(),
                file_name: DownloadDescriptor::file_name_for(identifier, "1.0.0"),
                download_url: format!("http://127.0.0.1:9/{}", identifier),
            })
        }
    }

    #[derive(Default)]
    struct RecordingDelivery {
        delivered: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Delivery for RecordingDelivery {
        async fn deliver(&self, _source: DeliverySource, file_name: &str) -> QueueResult<PathBuf> {
            self.delivered.lock().unwrap().push(file_name.to_string());
            Ok(PathBuf::from(file_name))
        }
    }

    fn orchestrator(queue: QueueStore, delivery: Arc<RecordingDelivery>) -> BatchOrchestrator {
        let client = MarketplaceClient::new(&AppConfig::default()).unwrap();
        BatchOrchestrator::new(queue, Arc::new(StaticResolver), client, delivery)
    }

    #[tokio::test]
    async fn empty_queue_is_a_no_op() {
        let queue = QueueStore::new(Arc::new(NoopEmitter));
        let delivery = Arc::new(RecordingDelivery::default());
        let orchestrator = orchestrator(queue, delivery.clone());

        assert_eq!(orchestrator.download_all().await.unwrap(), None);
        assert_eq!(orchestrator.state().status, BatchStatus::Idle);
        assert!(delivery.delivered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn single_item_is_delivered_directly_and_queue_cleared() {
        let queue = QueueStore::new(Arc::new(NoopEmitter));
        queue.toggle(QueuedExtension::from_identifier("pub.ext-a"));
        let delivery = Arc::new(RecordingDelivery::default());
        let orchestrator = orchestrator(queue.clone(), delivery.clone());

        let outcome = orchestrator.download_all().await.unwrap().unwrap();
        assert_eq!(outcome.file_name, "pub.ext-a-1.0.0.vsix");
        assert_eq!(outcome.entries, 1);
        assert!(queue.is_empty());
        assert_eq!(
            *delivery.delivered.lock().unwrap(),
            vec!["pub.ext-a-1.0.0.vsix".to_string()]
        );
    }

    #[tokio::test]
    async fn cancelled_batch_keeps_queue() {
        let queue = QueueStore::new(Arc::new(NoopEmitter));
        queue.toggle(QueuedExtension::from_identifier("pub.ext-a"));
        queue.toggle(QueuedExtension::from_identifier("pub.ext-b"));
        let delivery = Arc::new(RecordingDelivery::default());
        let orchestrator = orchestrator(queue.clone(), delivery.clone());

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = orchestrator
            .download_all_with_cancel(cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, QueueError::Cancelled));
        assert_eq!(queue.len(), 2);
        let state = orchestrator.state();
        assert_eq!(state.status, BatchStatus::Idle);
        assert_eq!(state.error.as_deref(), Some("Download cancelled"));
        assert!(delivery.delivered.lock().unwrap().is_empty());
    }

    #[test]
    fn archive_names_are_unique_per_invocation() {
        let queue = QueueStore::new(Arc::new(NoopEmitter));
        let orchestrator = orchestrator(queue, Arc::new(RecordingDelivery::default()));
        let first = orchestrator.next_archive_name();
        let second = orchestrator.next_archive_name();
        assert_ne!(first, second);
        assert!(first.starts_with("vsix-extensions-"));
        assert!(first.ends_with(".zip"));
    }
}

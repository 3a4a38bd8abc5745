use std::path::PathBuf;
use std::sync::Arc;

use log::{info, warn};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::CommandContext;
use crate::delivery::FsDelivery;
use crate::download::{BatchOrchestrator, BatchOutcome};
use crate::error::QueueResult;
use crate::events::{ChannelEmitter, Emitter, QueueEvent};
use crate::marketplace::{validate_identifier, ExtensionSummary, MarketplaceResolver};
use crate::queue::QueueStore;

/// Queue every identifier, run one batch and render its progress on stderr
pub async fn run_download(
    ctx: &CommandContext,
    identifiers: &[String],
    output: Option<PathBuf>,
) -> QueueResult<Option<BatchOutcome>> {
    for id in identifiers {
        validate_identifier(id)?;
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let renderer = tokio::spawn(render_events(rx));

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("download_interrupted: cancelling batch");
            interrupt.cancel();
        }
    });

    let result = {
        let emitter: Arc<dyn Emitter> = Arc::new(ChannelEmitter::new(tx));
        let queue = QueueStore::new(emitter.clone());
        for id in identifiers {
            // Repeated identifiers on the command line would toggle themselves back out
            if !queue.is_queued(id) {
                queue.toggle(ExtensionSummary::from_identifier(id));
            }
        }

        let output_dir = output.unwrap_or_else(|| ctx.config.output_dir.clone());
        let delivery = FsDelivery::new(output_dir, ctx.client.http().clone());
        let orchestrator = BatchOrchestrator::new(
            queue,
            Arc::new(MarketplaceResolver::new(ctx.client.clone())),
            ctx.client.clone(),
            Arc::new(delivery),
        )
        .with_emitter(emitter)
        .with_archive_prefix(ctx.config.archive_prefix.clone());

        orchestrator.download_all_with_cancel(cancel).await
    };

    // every sender is gone once the orchestrator and queue are dropped
    ctrl_c.abort();
    let _ = renderer.await;

    if let Ok(Some(outcome)) = &result {
        info!(
            "download_done: {} entries={}",
            outcome.path.display(),
            outcome.entries
        );
    }
    result
}

async fn render_events(mut rx: mpsc::UnboundedReceiver<QueueEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            QueueEvent::BatchStatusChanged(change) => match change.error {
                Some(err) => eprintln!("[{}] {}", change.status, err),
                None => eprintln!("[{}]", change.status),
            },
            QueueEvent::BatchProgress(p) => {
                eprintln!("  ({}/{}) {}", p.current, p.total, p.file_name)
            }
            QueueEvent::BatchDelivered(d) => println!("Saved {}", d.path),
            QueueEvent::QueueChanged(_) => {}
        }
    }
}

//! Queue extensions from the VS Code marketplace and download them as VSIX
//! files, one at a time or bundled into a single zip.

pub mod archive;
pub mod commands;
pub mod config;
pub mod delivery;
pub mod download;
pub mod error;
pub mod events;
pub mod marketplace;
pub mod queue;

pub use archive::{ArchivePackager, ZipPackager};
pub use config::AppConfig;
pub use delivery::{Delivery, DeliverySource, FsDelivery};
pub use download::{BatchOrchestrator, BatchOutcome, BatchProgress, BatchState, BatchStatus};
pub use error::{ErrorCategory, QueueError, QueueResult};
pub use events::{ChannelEmitter, Emitter, LogEmitter, NoopEmitter, QueueEvent};
pub use marketplace::{DownloadDescriptor, ExtensionSummary, MarketplaceClient, MetadataResolver};
pub use queue::{QueueStore, QueuedExtension};

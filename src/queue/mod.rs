//! Download queue: explicitly owned, injectable store of selected extensions

mod store;

pub use store::{QueueStore, QueuedExtension};

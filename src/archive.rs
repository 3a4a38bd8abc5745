//! Archive packager - accumulates named payloads into one zip

use std::collections::HashSet;
use std::io::{Cursor, Write};

use log::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{QueueError, QueueResult};

pub const ARCHIVE_EXTENSION: &str = "zip";

pub trait ArchivePackager: Send {
    fn add_entry(&mut self, file_name: &str, payload: &[u8]) -> QueueResult<()>;

    fn entry_count(&self) -> usize;

    /// Consume the packager and return the finished archive bytes
    fn finalize(self: Box<Self>) -> QueueResult<Vec<u8>>;
}

/// Factory the orchestrator calls once per multi-item batch
pub type PackagerFactory = std::sync::Arc<dyn Fn() -> Box<dyn ArchivePackager> + Send + Sync>;

/// In-memory zip writer; entries are compressed as they are added
pub struct ZipPackager {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    names: HashSet<String>,
}

impl ZipPackager {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            names: HashSet::new(),
        }
    }

    pub fn boxed() -> Box<dyn ArchivePackager> {
        Box::new(Self::new())
    }
}

impl Default for ZipPackager {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchivePackager for ZipPackager {
    fn add_entry(&mut self, file_name: &str, payload: &[u8]) -> QueueResult<()> {
        if !self.names.insert(file_name.to_string()) {
            return Err(QueueError::Packaging(format!(
                "Duplicate archive entry: {}",
                file_name
            )));
        }
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.writer.start_file(file_name, options)?;
        self.writer.write_all(payload).map_err(|e| {
            QueueError::Packaging(format!("Failed to add {} to archive: {}", file_name, e))
        })?;
        debug!("archive_entry_added: {} bytes={}", file_name, payload.len());
        Ok(())
    }

    fn entry_count(&self) -> usize {
        self.names.len()
    }

    fn finalize(self: Box<Self>) -> QueueResult<Vec<u8>> {
        let entries = self.names.len();
        let bytes = self.writer.finish()?.into_inner();
        debug!("archive_finalized: entries={} bytes={}", entries, bytes.len());
        Ok(bytes)
    }
}

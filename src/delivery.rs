//! Delivery - hand a finished download to the host as a named file

use std::path::PathBuf;

use async_trait::async_trait;
use futures_util::StreamExt;
use log::info;
use reqwest::Client;
use tempfile::{Builder, NamedTempFile};
use tokio::io::AsyncWriteExt;

use crate::error::{QueueError, QueueResult};

/// Write buffer size for streamed deliveries (2 MB) - reduces I/O operations
const WRITE_BUFFER_SIZE: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone)]
pub enum DeliverySource {
    /// Transient reference to a remote resource
    Url(String),
    /// Generated content (the archive)
    Bytes(Vec<u8>),
}

#[async_trait]
pub trait Delivery: Send + Sync {
    /// Save `source` under `file_name`; returns where it landed
    async fn deliver(&self, source: DeliverySource, file_name: &str) -> QueueResult<PathBuf>;
}

/// Delivers into a local directory through a temp file that is renamed on success
#[derive(Debug, Clone)]
pub struct FsDelivery {
    output_dir: PathBuf,
    http: Client,
}

impl FsDelivery {
    pub fn new(output_dir: impl Into<PathBuf>, http: Client) -> Self {
        Self {
            output_dir: output_dir.into(),
            http,
        }
    }

    fn temp_file(&self) -> QueueResult<NamedTempFile> {
        Builder::new()
            .prefix(".vsix-queue-")
            .suffix(".part")
            .tempfile_in(&self.output_dir)
            .map_err(|e| QueueError::Delivery(format!("Failed to create temp file: {}", e)))
    }

    async fn stream_to(&self, url: &str, temp: &NamedTempFile, file_name: &str) -> QueueResult<()> {
        let response = self.http.get(url).send().await.map_err(|e| {
            QueueError::Delivery(format!("Download request failed for {}: {}", file_name, e))
        })?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(QueueError::Delivery(format!(
                "Download failed for {}: {} - {}",
                file_name, status, text
            )));
        }

        let mut file = tokio::fs::File::from_std(temp.reopen()?);
        let mut stream = response.bytes_stream();
        let mut write_buffer = Vec::with_capacity(WRITE_BUFFER_SIZE);

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result
                .map_err(|e| QueueError::Delivery(format!("Failed to read chunk: {}", e)))?;
            write_buffer.extend_from_slice(&chunk);
            if write_buffer.len() >= WRITE_BUFFER_SIZE {
                file.write_all(&write_buffer).await?;
                write_buffer.clear();
            }
        }
        if !write_buffer.is_empty() {
            file.write_all(&write_buffer).await?;
        }
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl Delivery for FsDelivery {
    async fn deliver(&self, source: DeliverySource, file_name: &str) -> QueueResult<PathBuf> {
        validate_file_name(file_name)?;
        tokio::fs::create_dir_all(&self.output_dir).await.map_err(|e| {
            QueueError::Delivery(format!("Failed to create directory: {}", e))
        })?;

        let temp = self.temp_file()?;
        match source {
            DeliverySource::Url(url) => self.stream_to(&url, &temp, file_name).await?,
            DeliverySource::Bytes(bytes) => {
                let mut file = tokio::fs::File::from_std(temp.reopen()?);
                file.write_all(&bytes).await?;
                file.flush().await?;
                // bytes dropped here: the generated archive is released once written
            }
        }

        let destination = self.output_dir.join(file_name);
        temp.persist(&destination)
            .map_err(|e| QueueError::Delivery(format!("Failed to save {}: {}", file_name, e)))?;
        info!("delivered: {} -> {}", file_name, destination.display());
        Ok(destination)
    }
}

pub fn validate_file_name(file_name: &str) -> QueueResult<()> {
    if file_name.is_empty()
        || file_name == "."
        || file_name == ".."
        || file_name.contains(['/', '\\'])
    {
        return Err(QueueError::Validation(format!(
            "Invalid file name: {:?}",
            file_name
        )));
    }
    Ok(())
}

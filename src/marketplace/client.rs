//! Marketplace HTTP client: the extension query endpoint and raw payload fetches

use std::time::Duration;

use futures_util::StreamExt;
use log::{debug, warn};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use tokio_util::sync::CancellationToken;

use super::types::{ExtensionQuery, QueryResponse, RawExtension};
use crate::config::AppConfig;
use crate::error::{QueueError, QueueResult};

/// Initial capacity cap for payload buffers when Content-Length is known (64 MB)
const MAX_PREALLOCATE: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct MarketplaceClient {
    http: Client,
    endpoint: String,
    api_version: String,
    query_timeout: Duration,
}

impl MarketplaceClient {
    /// Payload streams have no total deadline, only connect and per-read idle
    /// limits; the query POST gets the full request timeout
    pub fn new(config: &AppConfig) -> QueueResult<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()
            .map_err(|e| QueueError::upstream(None, format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_http(http, config))
    }

    pub fn with_http(http: Client, config: &AppConfig) -> Self {
        Self {
            http,
            endpoint: config.marketplace_url.clone(),
            api_version: config.api_version.clone(),
            query_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    /// POST one query and return the extensions of the first result set
    pub async fn query(&self, query: &ExtensionQuery) -> QueueResult<Vec<RawExtension>> {
        let response = self
            .http
            .post(&self.endpoint)
            .timeout(self.query_timeout)
            .header(CONTENT_TYPE, "application/json")
            .header(
                ACCEPT,
                format!("application/json;api-version={}", self.api_version),
            )
            .json(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!("marketplace_query_failed: status={} body={}", status, text);
            return Err(QueueError::upstream(Some(status.as_u16()), text));
        }

        let body = response
            .text()
            .await
            .map_err(|e| QueueError::upstream(None, format!("Failed to read response: {}", e)))?;
        let envelope: QueryResponse = serde_json::from_str(&body)
            .map_err(|e| QueueError::upstream(None, format!("Malformed response body: {}", e)))?;

        let extensions = envelope
            .results
            .into_iter()
            .next()
            .map(|r| r.extensions)
            .unwrap_or_default();
        debug!("marketplace_query_done: extensions={}", extensions.len());
        Ok(extensions)
    }

    /// Download a binary asset into memory, checking `cancel` between chunks
    pub async fn fetch_payload(
        &self,
        url: &str,
        file_name: &str,
        cancel: &CancellationToken,
    ) -> QueueResult<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| QueueError::Packaging(format!("Failed to download {}: {}", file_name, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(QueueError::Packaging(format!(
                "Failed to download {}: {}",
                file_name, status
            )));
        }

        let capacity = response
            .content_length()
            .map(|len| std::cmp::min(len as usize, MAX_PREALLOCATE))
            .unwrap_or(0);
        let mut payload = Vec::with_capacity(capacity);

        let mut stream = response.bytes_stream();
        while let Some(chunk_result) = stream.next().await {
            if cancel.is_cancelled() {
                return Err(QueueError::Cancelled);
            }
            let chunk = chunk_result.map_err(|e| {
                QueueError::Packaging(format!("Failed to read {}: {}", file_name, e))
            })?;
            payload.extend_from_slice(&chunk);
        }

        debug!("payload_fetched: {} bytes={}", file_name, payload.len());
        Ok(payload)
    }
}

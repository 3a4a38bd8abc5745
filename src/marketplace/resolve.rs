//! Metadata resolution: identifier (+ optional version) -> download descriptor

use async_trait::async_trait;
use log::debug;

use super::client::MarketplaceClient;
use super::types::{DownloadDescriptor, ExtensionQuery, RawExtension, ASSET_VSIX_PACKAGE};
use crate::error::{QueueError, QueueResult};

#[async_trait]
pub trait MetadataResolver: Send + Sync {
    async fn resolve(
        &self,
        identifier: &str,
        version: Option<&str>,
    ) -> QueueResult<DownloadDescriptor>;
}

/// Resolver backed by the live marketplace query endpoint
#[derive(Debug, Clone)]
pub struct MarketplaceResolver {
    client: MarketplaceClient,
}

impl MarketplaceResolver {
    pub fn new(client: MarketplaceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MetadataResolver for MarketplaceResolver {
    async fn resolve(
        &self,
        identifier: &str,
        version: Option<&str>,
    ) -> QueueResult<DownloadDescriptor> {
        debug!("resolve_start: {} version={:?}", identifier, version);
        let extensions = self
            .client
            .query(&ExtensionQuery::by_identifier(identifier))
            .await?;
        let extension = extensions
            .into_iter()
            .next()
            .ok_or_else(|| QueueError::NotFound("Extension not found.".to_string()))?;

        let descriptor = select_download(identifier, &extension, version)?;
        debug!(
            "resolve_done: {} -> {} ({})",
            identifier, descriptor.file_name, descriptor.download_url
        );
        Ok(descriptor)
    }
}

/// Pick the requested version when present, otherwise the first (latest) one
pub fn select_download(
    identifier: &str,
    extension: &RawExtension,
    version: Option<&str>,
) -> QueueResult<DownloadDescriptor> {
    let selected = version
        .and_then(|wanted| extension.versions.iter().find(|v| v.version == wanted))
        .or_else(|| extension.versions.first())
        .filter(|v| !v.version.is_empty())
        .ok_or_else(|| QueueError::NotFound("Could not determine extension version.".to_string()))?;

    let download_url = selected
        .asset_source(ASSET_VSIX_PACKAGE)
        .filter(|src| !src.is_empty())
        .ok_or_else(|| QueueError::NotFound("Could not find VSIX package asset.".to_string()))?;

    Ok(DownloadDescriptor {
        identifier: identifier.to_string(),
        version: selected.version.clone(),
        file_name: DownloadDescriptor::file_name_for(identifier, &selected.version),
        download_url: download_url.to_string(),
    })
}

//! Request/response surface for resolve and search (JSON in, JSON out)

use serde::{Deserialize, Serialize};

use super::client::MarketplaceClient;
use super::identifier::validate_identifier;
use super::resolve::MetadataResolver;
use super::search::search;
use super::types::ExtensionSummary;
use crate::error::{ErrorCategory, QueueError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    pub extension_identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolveResponse {
    pub file_name: String,
    pub version: String,
    pub download_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub search_term: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    pub category: ErrorCategory,
}

/// Error payload paired with its HTTP-equivalent status
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: u16,
    pub body: ErrorResponse,
}

impl From<&QueueError> for ApiError {
    fn from(e: &QueueError) -> Self {
        Self {
            status: e.status_code(),
            body: ErrorResponse {
                error: e.to_string(),
                category: e.category(),
            },
        }
    }
}

impl From<QueueError> for ApiError {
    fn from(e: QueueError) -> Self {
        Self::from(&e)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.status, self.body.category, self.body.error)
    }
}

impl std::error::Error for ApiError {}

pub type ApiReply<T> = Result<T, ApiError>;

pub async fn handle_resolve(
    resolver: &dyn MetadataResolver,
    request: ResolveRequest,
) -> ApiReply<ResolveResponse> {
    validate_identifier(&request.extension_identifier)?;
    let descriptor = resolver
        .resolve(&request.extension_identifier, request.version.as_deref())
        .await?;
    Ok(ResolveResponse {
        file_name: descriptor.file_name,
        version: descriptor.version,
        download_url: descriptor.download_url,
    })
}

pub async fn handle_search(
    client: &MarketplaceClient,
    request: SearchRequest,
    page_size: u32,
) -> ApiReply<Vec<ExtensionSummary>> {
    Ok(search(client, &request.search_term, page_size).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueueResult;
    use crate::marketplace::types::DownloadDescriptor;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingResolver {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MetadataResolver for CountingResolver {
        async fn resolve(
            &self,
            identifier: &str,
            _version: Option<&str>,
        ) -> QueueResult<DownloadDescriptor> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if identifier == "bad.id" {
                return Err(QueueError::NotFound("Extension not found.".to_string()));
            }
            Ok(DownloadDescriptor {
                identifier: identifier.to_string(),
                version: "1.0.0".to_string(),
                file_name: DownloadDescriptor::file_name_for(identifier, "1.0.0"),
                download_url: "https://cdn.example/a.vsix".to_string(),
            })
        }
    }

    fn request(id: &str) -> ResolveRequest {
        ResolveRequest {
            extension_identifier: id.to_string(),
            version: None,
        }
    }

    #[tokio::test]
    async fn unknown_identifier_maps_to_not_found() {
        let resolver = CountingResolver {
            calls: AtomicUsize::new(0),
        };
        let err = handle_resolve(&resolver, request("bad.id")).await.unwrap_err();
        assert_eq!(err.status, 404);
        assert_eq!(err.body.category, ErrorCategory::NotFound);
        assert_eq!(err.body.error, "Extension not found.");
    }

    #[tokio::test]
    async fn malformed_identifier_never_reaches_resolver() {
        let resolver = CountingResolver {
            calls: AtomicUsize::new(0),
        };
        let err = handle_resolve(&resolver, request("not an id")).await.unwrap_err();
        assert_eq!(err.status, 400);
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn resolved_descriptor_becomes_camel_case_response() {
        let resolver = CountingResolver {
            calls: AtomicUsize::new(0),
        };
        let reply = handle_resolve(&resolver, request("pub.ext-a")).await.unwrap();
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["fileName"], "pub.ext-a-1.0.0.vsix");
        assert_eq!(json["downloadUrl"], "https://cdn.example/a.vsix");
    }
}

//! Marketplace module - VS Code marketplace query API
//!
//! This module is organized into submodules:
//! - `types`: Wire types, query constants and the normalized summary
//! - `identifier`: Input validation
//! - `client`: HTTP client (query endpoint, payload fetch)
//! - `search`: Search and category listings
//! - `resolve`: Identifier -> download descriptor
//! - `api`: JSON request/response handlers

pub mod api;
mod client;
mod identifier;
mod resolve;
mod search;
mod types;

// Re-export types
pub use types::{
    marketplace_item_url, DownloadDescriptor, ExtensionQuery, ExtensionSummary, FilterCriterion,
    QueryFilter, QueryResponse, QueryResult, RawExtension, RawFile, RawPublisher, RawStatistic,
    RawVersion, ASSET_DEFAULT_ICON, ASSET_VSIX_PACKAGE, QUERY_FLAGS, TARGET_VSCODE,
};

pub use client::MarketplaceClient;
pub use identifier::{validate_identifier, validate_search_term};
pub use resolve::{select_download, MarketplaceResolver, MetadataResolver};
pub use search::{
    load_categories, load_category, normalize_extensions, search, Category, CategoryResults,
};

//! Marketplace query API wire types and the normalized extension summary

use serde::{Deserialize, Serialize};

/// Filter by exact `publisher.name`
pub const FILTER_EXTENSION_NAME: u32 = 7;
/// Filter by target product
pub const FILTER_TARGET: u32 = 8;
/// Free-text search
pub const FILTER_SEARCH_TEXT: u32 = 10;

pub const TARGET_VSCODE: &str = "Microsoft.VisualStudio.Code";

/// Include versions, files, statistics and publisher flags
pub const QUERY_FLAGS: u32 = 914;

pub const ASSET_VSIX_PACKAGE: &str = "Microsoft.VisualStudio.Services.VSIXPackage";
pub const ASSET_DEFAULT_ICON: &str = "Microsoft.VisualStudio.Services.Icons.Default";

pub const SORT_INSTALLS: u32 = 4;
pub const SORT_PUBLISHED: u32 = 10;
pub const SORT_TRENDING: u32 = 12;

pub const DEFAULT_ICON_URL: &str =
    "https://cdn.vsassets.io/v/M257_20250527.11/_content/Header/default_icon_128.png";
pub const ITEM_URL_BASE: &str = "https://marketplace.visualstudio.com/items?itemName=";

pub const PACKAGE_EXTENSION: &str = "vsix";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriterion {
    pub filter_type: u32,
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryFilter {
    pub criteria: Vec<FilterCriterion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtensionQuery {
    pub filters: Vec<QueryFilter>,
    pub flags: u32,
}

impl ExtensionQuery {
    /// Exact lookup of one `publisher.name`
    pub fn by_identifier(identifier: &str) -> Self {
        Self {
            filters: vec![QueryFilter {
                criteria: vec![FilterCriterion {
                    filter_type: FILTER_EXTENSION_NAME,
                    value: identifier.to_string(),
                }],
                ..Default::default()
            }],
            flags: QUERY_FLAGS,
        }
    }

    /// Free-text search restricted to VS Code, most installed first
    pub fn search(term: &str, page_size: u32) -> Self {
        Self {
            filters: vec![QueryFilter {
                criteria: vec![
                    FilterCriterion {
                        filter_type: FILTER_SEARCH_TEXT,
                        value: term.to_string(),
                    },
                    FilterCriterion {
                        filter_type: FILTER_TARGET,
                        value: TARGET_VSCODE.to_string(),
                    },
                ],
                page_size: Some(page_size),
                page_number: Some(1),
                sort_by: Some(SORT_INSTALLS),
                sort_order: Some(0),
            }],
            flags: QUERY_FLAGS,
        }
    }

    pub fn category(sort_by: u32, page_size: u32) -> Self {
        Self {
            filters: vec![QueryFilter {
                criteria: vec![FilterCriterion {
                    filter_type: FILTER_TARGET,
                    value: TARGET_VSCODE.to_string(),
                }],
                page_size: Some(page_size),
                page_number: Some(1),
                sort_by: Some(sort_by),
                sort_order: None,
            }],
            flags: QUERY_FLAGS,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<QueryResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub extensions: Vec<RawExtension>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPublisher {
    pub publisher_name: Option<String>,
    pub display_name: Option<String>,
    #[serde(default)]
    pub is_domain_verified: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFile {
    pub asset_type: String,
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVersion {
    pub version: String,
    #[serde(default)]
    pub files: Vec<RawFile>,
}

impl RawVersion {
    pub fn asset_source(&self, asset_type: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|f| f.asset_type == asset_type)
            .and_then(|f| f.source.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStatistic {
    pub statistic_name: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExtension {
    pub publisher: Option<RawPublisher>,
    pub extension_name: Option<String>,
    pub display_name: Option<String>,
    pub short_description: Option<String>,
    #[serde(default)]
    pub versions: Vec<RawVersion>,
    #[serde(default)]
    pub statistics: Vec<RawStatistic>,
}

/// Normalized extension record; this is also what sits in the queue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionSummary {
    pub id: String,
    pub name: String,
    pub publisher: String,
    pub description: String,
    pub icon_url: String,
    pub marketplace_url: String,
    pub is_verified: bool,
    pub install_count: Option<u64>,
}

impl ExtensionSummary {
    /// Minimal summary when only the identifier is known (CLI input)
    pub fn from_identifier(id: &str) -> Self {
        let (publisher, name) = id.split_once('.').unwrap_or((id, id));
        Self {
            id: id.to_string(),
            name: name.to_string(),
            publisher: publisher.to_string(),
            description: String::new(),
            icon_url: DEFAULT_ICON_URL.to_string(),
            marketplace_url: marketplace_item_url(id),
            is_verified: false,
            install_count: None,
        }
    }
}

pub fn marketplace_item_url(id: &str) -> String {
    format!("{}{}", ITEM_URL_BASE, urlencoding::encode(id))
}

/// Resolved download target for one extension
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DownloadDescriptor {
    pub identifier: String,
    pub version: String,
    pub file_name: String,
    pub download_url: String,
}

impl DownloadDescriptor {
    pub fn file_name_for(identifier: &str, version: &str) -> String {
        format!("{}-{}.{}", identifier, version, PACKAGE_EXTENSION)
    }
}

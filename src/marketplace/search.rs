//! Search and category listings, normalized into `ExtensionSummary`

use log::{info, warn};
use serde::Serialize;

use super::client::MarketplaceClient;
use super::identifier::validate_search_term;
use super::types::{
    marketplace_item_url, ExtensionQuery, ExtensionSummary, RawExtension, ASSET_DEFAULT_ICON,
    DEFAULT_ICON_URL, SORT_INSTALLS, SORT_PUBLISHED, SORT_TRENDING,
};
use crate::error::QueueResult;

/// Drop records without a usable identity and fill display defaults
pub fn normalize_extensions(extensions: Vec<RawExtension>) -> Vec<ExtensionSummary> {
    extensions.into_iter().filter_map(normalize_one).collect()
}

fn normalize_one(ext: RawExtension) -> Option<ExtensionSummary> {
    let publisher = ext.publisher.unwrap_or_default();
    let publisher_name = publisher.publisher_name.filter(|n| !n.is_empty())?;
    let extension_name = ext.extension_name.filter(|n| !n.is_empty())?;
    let latest = ext.versions.first()?;

    let id = format!("{}.{}", publisher_name, extension_name);
    let icon_url = latest
        .asset_source(ASSET_DEFAULT_ICON)
        .unwrap_or(DEFAULT_ICON_URL)
        .to_string();
    let install_count = ext
        .statistics
        .iter()
        .find(|s| s.statistic_name == "install")
        .filter(|s| s.value.is_finite() && s.value >= 0.0)
        .map(|s| s.value as u64);

    Some(ExtensionSummary {
        marketplace_url: marketplace_item_url(&id),
        name: non_empty_or(ext.display_name, "Unknown Name"),
        publisher: non_empty_or(publisher.display_name, "Unknown Publisher"),
        description: non_empty_or(ext.short_description, "No description available."),
        icon_url,
        is_verified: publisher.is_domain_verified,
        install_count,
        id,
    })
}

fn non_empty_or(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Free-text search; too-short terms fail before any request is made
pub async fn search(
    client: &MarketplaceClient,
    term: &str,
    page_size: u32,
) -> QueueResult<Vec<ExtensionSummary>> {
    validate_search_term(term)?;
    let raw = client.query(&ExtensionQuery::search(term, page_size)).await?;
    let results = normalize_extensions(raw);
    info!("search_done: term={:?} results={}", term, results.len());
    Ok(results)
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Popular,
    Featured,
    Recent,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Popular, Category::Featured, Category::Recent];

    pub fn sort_by(self) -> u32 {
        match self {
            Category::Popular => SORT_INSTALLS,
            Category::Featured => SORT_TRENDING,
            Category::Recent => SORT_PUBLISHED,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Popular => write!(f, "popular"),
            Category::Featured => write!(f, "featured"),
            Category::Recent => write!(f, "recent"),
        }
    }
}

/// Each category carries its own outcome; one failure never hides the others
#[derive(Debug)]
pub struct CategoryResults {
    pub popular: QueueResult<Vec<ExtensionSummary>>,
    pub featured: QueueResult<Vec<ExtensionSummary>>,
    pub recent: QueueResult<Vec<ExtensionSummary>>,
}

impl CategoryResults {
    pub fn get(&self, category: Category) -> &QueueResult<Vec<ExtensionSummary>> {
        match category {
            Category::Popular => &self.popular,
            Category::Featured => &self.featured,
            Category::Recent => &self.recent,
        }
    }
}

pub async fn load_category(
    client: &MarketplaceClient,
    category: Category,
    page_size: u32,
) -> QueueResult<Vec<ExtensionSummary>> {
    let query = ExtensionQuery::category(category.sort_by(), page_size);
    match client.query(&query).await {
        Ok(raw) => Ok(normalize_extensions(raw)),
        Err(e) => {
            warn!("category_load_failed: {} error={}", category, e);
            Err(e)
        }
    }
}

/// Load popular, featured and recent listings concurrently
pub async fn load_categories(client: &MarketplaceClient, page_size: u32) -> CategoryResults {
    let (popular, featured, recent) = tokio::join!(
        load_category(client, Category::Popular, page_size),
        load_category(client, Category::Featured, page_size),
        load_category(client, Category::Recent, page_size),
    );
    CategoryResults {
        popular,
        featured,
        recent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marketplace::types::{RawFile, RawPublisher, RawStatistic, RawVersion};

    fn raw(publisher: &str, name: &str) -> RawExtension {
        RawExtension {
            publisher: Some(RawPublisher {
                publisher_name: Some(publisher.to_string()),
                display_name: Some("Publisher Display".to_string()),
                is_domain_verified: true,
            }),
            extension_name: Some(name.to_string()),
            display_name: Some("Display".to_string()),
            short_description: None,
            versions: vec![RawVersion {
                version: "1.2.3".to_string(),
                files: vec![RawFile {
                    asset_type: ASSET_DEFAULT_ICON.to_string(),
                    source: Some("https://cdn.example/icon.png".to_string()),
                }],
            }],
            statistics: vec![RawStatistic {
                statistic_name: "install".to_string(),
                value: 1234.7,
            }],
        }
    }

    #[test]
    fn normalizes_identity_icon_and_install_count() {
        let results = normalize_extensions(vec![raw("pub", "ext-a")]);
        assert_eq!(results.len(), 1);
        let summary = &results[0];
        assert_eq!(summary.id, "pub.ext-a");
        assert_eq!(summary.icon_url, "https://cdn.example/icon.png");
        assert_eq!(summary.install_count, Some(1234));
        assert!(summary.is_verified);
        assert_eq!(summary.description, "No description available.");
        assert_eq!(
            summary.marketplace_url,
            "https://marketplace.visualstudio.com/items?itemName=pub.ext-a"
        );
    }

    #[test]
    fn drops_records_without_identity_or_versions() {
        let mut no_versions = raw("pub", "b");
        no_versions.versions.clear();
        let mut no_publisher = raw("pub", "c");
        no_publisher.publisher = None;

        let results = normalize_extensions(vec![no_versions, no_publisher, raw("pub", "d")]);
        let ids: Vec<_> = results.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["pub.d"]);
    }

    #[test]
    fn missing_statistics_and_icon_fall_back() {
        let mut ext = raw("pub", "e");
        ext.statistics.clear();
        ext.versions[0].files.clear();
        ext.display_name = None;

        let summary = &normalize_extensions(vec![ext])[0];
        assert_eq!(summary.install_count, None);
        assert_eq!(summary.icon_url, DEFAULT_ICON_URL);
        assert_eq!(summary.name, "Unknown Name");
    }
}

//! Runtime configuration: built-in defaults overlaid with `VSIX_*` env vars

use std::path::PathBuf;

use crate::error::{QueueError, QueueResult};

pub const DEFAULT_MARKETPLACE_URL: &str =
    "https://marketplace.visualstudio.com/_apis/public/gallery/extensionquery";
pub const DEFAULT_API_VERSION: &str = "7.2-preview.1";
pub const DEFAULT_ARCHIVE_PREFIX: &str = "vsix-extensions";

/// Page size for free-text searches
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Page size for the popular/featured/recent listings
pub const DEFAULT_CATEGORY_PAGE_SIZE: u32 = 12;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub marketplace_url: String,
    pub api_version: String,
    pub user_agent: String,
    pub page_size: u32,
    pub category_page_size: u32,
    pub output_dir: PathBuf,
    pub request_timeout_secs: u64,
    pub archive_prefix: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            marketplace_url: DEFAULT_MARKETPLACE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            user_agent: format!("vsix-queue/{}", env!("CARGO_PKG_VERSION")),
            page_size: DEFAULT_PAGE_SIZE,
            category_page_size: DEFAULT_CATEGORY_PAGE_SIZE,
            output_dir: PathBuf::from("."),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            archive_prefix: DEFAULT_ARCHIVE_PREFIX.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> QueueResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup so tests don't touch process env
    pub fn from_lookup<F>(lookup: F) -> QueueResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("VSIX_MARKETPLACE_URL") {
            config.marketplace_url = url;
        }
        if let Some(version) = lookup("VSIX_API_VERSION") {
            config.api_version = version;
        }
        if let Some(agent) = lookup("VSIX_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(size) = lookup("VSIX_PAGE_SIZE") {
            config.page_size = parse_number("VSIX_PAGE_SIZE", &size)?;
        }
        if let Some(dir) = lookup("VSIX_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(secs) = lookup("VSIX_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = parse_number("VSIX_REQUEST_TIMEOUT_SECS", &secs)?;
        }
        if let Some(prefix) = lookup("VSIX_ARCHIVE_PREFIX") {
            config.archive_prefix = prefix;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> QueueResult<()> {
        if !self.marketplace_url.starts_with("http://")
            && !self.marketplace_url.starts_with("https://")
        {
            return Err(QueueError::Validation(
                "VSIX_MARKETPLACE_URL must start with http:// or https://".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(QueueError::Validation(
                "VSIX_PAGE_SIZE must be greater than zero".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(QueueError::Validation(
                "VSIX_REQUEST_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        if self.archive_prefix.is_empty() || self.archive_prefix.contains(['/', '\\']) {
            return Err(QueueError::Validation(format!(
                "Invalid archive prefix: {:?}",
                self.archive_prefix
            )));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> QueueResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| QueueError::Validation(format!("{} must be a number, got {:?}", key, value)))
}

//! CLI command handlers
//!
//! - `search`: free-text search and the category listings
//! - `resolve`: identifier -> download descriptor
//! - `download`: queue identifiers and run one batch

mod download;
mod resolve;
mod search;

use crate::config::AppConfig;
use crate::error::QueueResult;
use crate::marketplace::{ExtensionSummary, MarketplaceClient};

pub use download::run_download;
pub use resolve::run_resolve;
pub use search::{run_browse, run_search};

/// Shared by every command: resolved config plus one HTTP client
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: AppConfig,
    pub client: MarketplaceClient,
}

impl CommandContext {
    pub fn new(config: AppConfig) -> QueueResult<Self> {
        let client = MarketplaceClient::new(&config)?;
        Ok(Self { config, client })
    }
}

fn format_installs(count: Option<u64>) -> String {
    match count {
        None => "-".to_string(),
        Some(n) if n >= 1_000_000 => format!("{:.1}M", n as f64 / 1_000_000.0),
        Some(n) if n >= 1_000 => format!("{:.1}K", n as f64 / 1_000.0),
        Some(n) => n.to_string(),
    }
}

pub(crate) fn format_summary(summary: &ExtensionSummary) -> String {
    format!(
        "{:<45} {:>8}  {}{} ({})",
        summary.id,
        format_installs(summary.install_count),
        summary.name,
        if summary.is_verified { " [verified]" } else { "" },
        summary.publisher
    )
}

use log::info;

use super::{format_summary, CommandContext};
use crate::error::{QueueError, QueueResult};
use crate::marketplace::{load_categories, search, Category, ExtensionSummary};

fn print_results(results: &[ExtensionSummary], json: bool) -> QueueResult<()> {
    if json {
        let out = serde_json::to_string_pretty(results)
            .map_err(|e| QueueError::Validation(format!("Failed to encode results: {}", e)))?;
        println!("{}", out);
    } else if results.is_empty() {
        println!("No extensions found.");
    } else {
        for summary in results {
            println!("{}", format_summary(summary));
        }
    }
    Ok(())
}

pub async fn run_search(ctx: &CommandContext, term: &str, json: bool) -> QueueResult<()> {
    let results = search(&ctx.client, term, ctx.config.page_size).await?;
    print_results(&results, json)
}

/// Print every category; fails only when none of them could be loaded
pub async fn run_browse(ctx: &CommandContext, json: bool) -> QueueResult<()> {
    let results = load_categories(&ctx.client, ctx.config.category_page_size).await;

    let mut loaded = 0;
    for category in Category::ALL {
        match results.get(category) {
            Ok(list) => {
                loaded += 1;
                if !json {
                    println!("== {} ==", category);
                }
                print_results(list, json)?;
            }
            Err(e) => {
                eprintln!("Failed to load {}: {}", category, e);
            }
        }
    }

    info!("browse_done: loaded={}/{}", loaded, Category::ALL.len());
    if loaded == 0 {
        return Err(QueueError::upstream(None, "no category could be loaded"));
    }
    Ok(())
}

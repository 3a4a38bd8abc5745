use super::CommandContext;
use crate::marketplace::api::{handle_resolve, ApiReply, ResolveRequest};
use crate::marketplace::MarketplaceResolver;

pub async fn run_resolve(
    ctx: &CommandContext,
    identifier: &str,
    version: Option<String>,
    json: bool,
) -> ApiReply<()> {
    let resolver = MarketplaceResolver::new(ctx.client.clone());
    let request = ResolveRequest {
        extension_identifier: identifier.to_string(),
        version,
    };

    match handle_resolve(&resolver, request).await {
        Ok(response) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&response).unwrap_or_default());
            } else {
                println!("{} {}", response.file_name, response.download_url);
            }
            Ok(())
        }
        Err(err) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&err.body).unwrap_or_default());
            }
            Err(err)
        }
    }
}

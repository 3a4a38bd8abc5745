//! vsix-queue CLI - search the marketplace and download extensions

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use vsix_queue_lib::commands::{run_browse, run_download, run_resolve, run_search, CommandContext};
use vsix_queue_lib::marketplace::api::ApiError;
use vsix_queue_lib::{AppConfig, QueueError};

#[derive(Debug, Parser)]
#[command(name = "vsix-queue", version, about = "Download VS Code extensions as VSIX files")]
struct Cli {
    /// Override the marketplace query endpoint
    #[arg(long, global = true)]
    marketplace_url: Option<String>,

    /// Directory delivered files are written to
    #[arg(long, short, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search extensions by free text (at least 2 characters)
    Search {
        term: String,
        #[arg(long)]
        json: bool,
    },
    /// Show the popular, featured and recent listings
    Browse {
        #[arg(long)]
        json: bool,
    },
    /// Resolve one extension to its download URL
    Resolve {
        /// publisher.extension-name
        id: String,
        #[arg(long)]
        version: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Download one extension, or several bundled into a zip
    Download {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Queue(#[from] QueueError),
    #[error("{0}")]
    Api(#[from] ApiError),
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = AppConfig::from_env()?;
    if let Some(url) = cli.marketplace_url {
        config.marketplace_url = url;
    }
    if let Some(dir) = cli.output.clone() {
        config.output_dir = dir;
    }
    config.validate()?;

    let ctx = CommandContext::new(config)?;
    match cli.command {
        Command::Search { term, json } => run_search(&ctx, &term, json).await?,
        Command::Browse { json } => run_browse(&ctx, json).await?,
        Command::Resolve { id, version, json } => run_resolve(&ctx, &id, version, json).await?,
        Command::Download { ids } => {
            if run_download(&ctx, &ids, cli.output).await?.is_none() {
                println!("Nothing to download.");
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

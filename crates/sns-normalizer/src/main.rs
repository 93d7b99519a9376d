use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sns_normalizer::{
    config::Config,
    server::Server,
    sns::{DryRunConfirmer, HttpConfirmer, SubscriptionConfirmer},
    NotificationRouter, Provider,
};

#[derive(Parser)]
#[command(name = "sns-normalizer", about = "Normalize SNS alarm and health notifications into events")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the notification webhook (default)
    Serve {
        /// Listen address, overrides SERVER_ADDR
        #[arg(long)]
        addr: Option<String>,
    },
    /// Parse a notification payload from a file and print the events
    Parse {
        /// cloudwatch or health
        #[arg(long)]
        provider: Provider,
        /// Actually call the SubscribeURL of confirmation payloads
        #[arg(long)]
        confirm: bool,
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so `parse` output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command.unwrap_or(Command::Serve { addr: None }) {
        Command::Serve { addr } => {
            let confirmer = Arc::new(HttpConfirmer::new(config.confirmation.timeout())?);
            let router = NotificationRouter::new(confirmer);
            let addr = addr.unwrap_or_else(|| config.server.addr.clone());

            info!("Starting server on {}", addr);
            Server::new(&config, router).start(&addr).await?;
        }
        Command::Parse { provider, confirm, file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let payload: Value = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not valid JSON", file.display()))?;

            let confirmer: Arc<dyn SubscriptionConfirmer> = if confirm {
                Arc::new(HttpConfirmer::new(config.confirmation.timeout())?)
            } else {
                Arc::new(DryRunConfirmer)
            };
            let router = NotificationRouter::new(confirmer);

            let events = router
                .route(provider, &config.parser_options, &payload)
                .await?;
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
    }

    Ok(())
}

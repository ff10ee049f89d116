//! Main entry point for the OHT client CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oht_client::cli::commands::{self, Commands};
use oht_client::{OhtClient, OhtConfig};

/// OHT Client - One Hour Translation API from the command line
#[derive(Parser, Debug)]
#[command(name = "oht", version, about, long_about = None)]
struct Args {
    /// Public API key (defaults to OHT_PUBLIC_KEY env var)
    #[arg(long)]
    public_key: Option<String>,

    /// Secret API key (defaults to OHT_SECRET_KEY env var)
    #[arg(long)]
    secret_key: Option<String>,

    /// Send requests to the sandbox
    #[arg(long)]
    sandbox: bool,

    /// Override the API root of the selected environment
    #[arg(long)]
    base_url: Option<String>,

    /// Load configuration from a JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn load_config(args: &Args) -> anyhow::Result<OhtConfig> {
    let mut config = match &args.config {
        Some(path) => OhtConfig::from_file(path)?,
        None => OhtConfig::from_env()?,
    };

    if let Some(public_key) = &args.public_key {
        config.public_key = public_key.clone();
    }
    if let Some(secret_key) = &args.secret_key {
        config.secret_key = secret_key.clone();
    }
    if args.sandbox {
        config.sandbox = true;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("oht_client={},oht={}", log_level, log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if args.command.is_none() {
        println!("Please specify a command. Use --help for more information.");
        return Ok(());
    }

    let config = load_config(&args)?;
    let mut client = OhtClient::new(config)?;

    if let Some(url) = &args.base_url {
        let available = if client.config().sandbox {
            client.set_sandbox_url(url).await?
        } else {
            client.set_base_url(url).await?
        };
        if !available {
            tracing::warn!("{} did not answer the availability probe", client.work_url());
        }
    }

    if let Some(command) = args.command {
        commands::handle(&client, command).await?;
    }

    Ok(())
}

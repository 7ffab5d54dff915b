//! Rummage main entry point
//!
//! Loads configuration, connects the job store, and runs the API server
//! until a shutdown signal arrives.

use clap::Parser;
use rummage::config::load_config;
use rummage::store::RedisJobStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Rummage: pages in, LLM-ready artifacts out
///
/// A self-hosted scraping service that converts web pages into Markdown,
/// cleaned HTML, raw HTML, link lists and metadata, with batch scraping,
/// site mapping and recursive crawling on top.
#[derive(Parser, Debug)]
#[command(name = "rummage")]
#[command(version)]
#[command(about = "Self-hosted web scraping service", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    tracing::info!("Connecting to job store at {}", config.redis.url);
    let store = match RedisJobStore::connect(&config.redis.url, config.job_expiration()).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("Failed to connect to job store: {}", e);
            return Err(e.into());
        }
    };

    rummage::server::serve(&config, store).await?;

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("rummage=info,tower_http=info,warn"),
            1 => EnvFilter::new("rummage=debug,tower_http=debug,info"),
            2 => EnvFilter::new("rummage=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

//! Miner binary entrypoint.
//!
//! Loads `.env`, merges configuration, sets up logging, then bootstraps the
//! wallet and chain connection and makes one commitment attempt.

use anyhow::Context;
use clap::Parser;
use tracing::instrument::WithSubscriber;

use nova_miner::chain::SubtensorConnector;
use nova_miner::cli::Cli;
use nova_miner::config::MinerConfig;
use nova_miner::logging::Logger;
use nova_miner::miner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config =
        MinerConfig::load(cli.overrides()).context("Failed to build miner configuration")?;

    let logger = Logger::from_config(&config).context("Failed to set up logging")?;
    miner::log_startup(&config, &logger)?;

    let connector = SubtensorConnector::from_config(&config.subtensor);
    miner::run(&config, &connector, &logger)
        .with_subscriber(logger.dispatch().clone())
        .await?;

    Ok(())
}

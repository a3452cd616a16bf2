//! Command-line flags for the miner binary.
//!
//! Flags follow the Python SDK's dotted naming (`--wallet.name`,
//! `--subtensor.network`, ...). Every flag is optional so that a flag that was
//! not given can fall through to the environment and built-in defaults.

use std::path::PathBuf;

use clap::Parser;

use crate::config::ConfigOverrides;
use crate::logging::LogFormat;

/// Subnet miner: publishes its repository commitment once and exits
#[derive(Parser, Debug, Default)]
#[command(name = "miner")]
#[command(author = "Cortex Foundation")]
#[command(version)]
#[command(about = "Subnet miner: publishes its repository commitment once and exits", long_about = None)]
pub struct Cli {
    /// Network to use [env: SUBTENSOR_NETWORK] [default: finney]
    #[arg(long)]
    pub network: Option<String>,

    /// The chain subnet uid [default: 68]
    #[arg(long)]
    pub netuid: Option<u16>,

    /// Parameter file (TOML) [env: MINER_CONFIG] [default: config/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Subtensor network name or ws(s):// URL; defaults to --network
    #[arg(long = "subtensor.network")]
    pub subtensor_network: Option<String>,

    /// Chain endpoint overriding the one the network name resolves to
    #[arg(long = "subtensor.chain_endpoint")]
    pub subtensor_chain_endpoint: Option<String>,

    /// Wallet name
    #[arg(long = "wallet.name")]
    pub wallet_name: Option<String>,

    /// Hotkey name
    #[arg(long = "wallet.hotkey")]
    pub wallet_hotkey: Option<String>,

    /// Directory holding the wallets
    #[arg(long = "wallet.path")]
    pub wallet_path: Option<String>,

    /// Enable debug logging
    #[arg(long = "logging.debug")]
    pub logging_debug: bool,

    /// Enable trace logging
    #[arg(long = "logging.trace")]
    pub logging_trace: bool,

    /// Root of the logging directory tree
    #[arg(long = "logging.logging_dir")]
    pub logging_dir: Option<String>,

    /// Log format: text, json or compact
    #[arg(long = "logging.format")]
    pub logging_format: Option<LogFormat>,

    /// Repository owner committed on chain
    #[arg(long = "commitment.owner")]
    pub commitment_owner: Option<String>,

    /// Repository name committed on chain
    #[arg(long = "commitment.repo")]
    pub commitment_repo: Option<String>,

    /// Branch committed on chain
    #[arg(long = "commitment.branch")]
    pub commitment_branch: Option<String>,

    /// Subnet the commitment is written to [default: 68]
    #[arg(long = "commitment.netuid")]
    pub commitment_netuid: Option<u16>,
}

impl Cli {
    /// The values given on the command line, unset where a flag was absent.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            network: self.network.clone(),
            netuid: self.netuid,
            config_file: self.config.clone(),
            subtensor_network: self.subtensor_network.clone(),
            chain_endpoint: self.subtensor_chain_endpoint.clone(),
            wallet_name: self.wallet_name.clone(),
            wallet_hotkey: self.wallet_hotkey.clone(),
            wallet_path: self.wallet_path.clone(),
            wallet_password: None,
            logging_debug: self.logging_debug.then_some(true),
            logging_trace: self.logging_trace.then_some(true),
            logging_dir: self.logging_dir.clone(),
            logging_format: self.logging_format,
            commitment_owner: self.commitment_owner.clone(),
            commitment_repo: self.commitment_repo.clone(),
            commitment_branch: self.commitment_branch.clone(),
            commitment_netuid: self.commitment_netuid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted_flags() {
        let cli = Cli::try_parse_from([
            "miner",
            "--netuid",
            "12",
            "--subtensor.network",
            "test",
            "--wallet.name",
            "alice",
            "--wallet.hotkey",
            "hk",
            "--logging.debug",
            "--logging.format",
            "json",
            "--commitment.branch",
            "dev",
        ])
        .unwrap();

        let overrides = cli.overrides();
        assert_eq!(overrides.netuid, Some(12));
        assert_eq!(overrides.subtensor_network.as_deref(), Some("test"));
        assert_eq!(overrides.wallet_name.as_deref(), Some("alice"));
        assert_eq!(overrides.wallet_hotkey.as_deref(), Some("hk"));
        assert_eq!(overrides.logging_debug, Some(true));
        assert_eq!(overrides.logging_trace, None);
        assert_eq!(overrides.logging_format, Some(LogFormat::Json));
        assert_eq!(overrides.commitment_branch.as_deref(), Some("dev"));
        assert_eq!(overrides.network, None);
    }

    #[test]
    fn test_no_flags_means_no_overrides() {
        let cli = Cli::try_parse_from(["miner"]).unwrap();
        assert_eq!(cli.overrides(), ConfigOverrides::default());
    }

    #[test]
    fn test_netuid_must_be_integer() {
        assert!(Cli::try_parse_from(["miner", "--netuid", "sixty-eight"]).is_err());
        assert!(Cli::try_parse_from(["miner", "--logging.format", "xml"]).is_err());
    }
}

//! Miner configuration.
//!
//! Configuration comes from three places, merged in this order:
//!
//! 1. CLI flags
//! 2. Environment variables (after `.env` has been loaded)
//! 3. Built-in defaults
//!
//! A TOML parameter file is then layered on top without overriding anything
//! the CLI or environment already set. The result is an immutable
//! [`MinerConfig`] which also carries the derived logging directory.

pub mod loader;
pub mod network;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::logging::LogFormat;

pub use loader::{FileCommitment, FileParams, DEFAULT_CONFIG_FILE};
pub use network::{determine_chain_endpoint_and_network, DEFAULT_NETWORK};

/// Subnet the miner serves by default
pub const DEFAULT_NETUID: u16 = 68;
pub const DEFAULT_WALLET_NAME: &str = "default";
pub const DEFAULT_WALLET_HOTKEY: &str = "default";
pub const DEFAULT_WALLET_PATH: &str = "~/.bittensor/wallets";
pub const DEFAULT_LOGGING_DIR: &str = "~/.bittensor/miners";

/// Default commitment identity
pub const DEFAULT_COMMITMENT_OWNER: &str = "alcantara0123";
pub const DEFAULT_COMMITMENT_REPO: &str = "nova-1119";
pub const DEFAULT_COMMITMENT_BRANCH: &str = "master";

/// Leaf directory of every miner log path
pub const MINER_DIR_NAME: &str = "miner";

/// Environment variables read as defaults
pub mod env {
    pub const NETWORK: &str = "SUBTENSOR_NETWORK";
    pub const SUBTENSOR_NETWORK: &str = "BT_SUBTENSOR_NETWORK";
    pub const SUBTENSOR_CHAIN_ENDPOINT: &str = "BT_SUBTENSOR_CHAIN_ENDPOINT";
    pub const WALLET_NAME: &str = "BT_WALLET_NAME";
    pub const WALLET_HOTKEY: &str = "BT_WALLET_HOTKEY";
    pub const WALLET_PATH: &str = "BT_WALLET_PATH";
    pub const WALLET_HOTKEY_PASSWORD: &str = "BT_WALLET_HOTKEY_PASSWORD";
    pub const LOGGING_DIR: &str = "BT_LOGGING_DIR";
    pub const LOGGING_DEBUG: &str = "BT_LOGGING_DEBUG";
    pub const LOGGING_TRACE: &str = "BT_LOGGING_TRACE";
    pub const LOGGING_FORMAT: &str = "BT_LOGGING_FORMAT";
    pub const CONFIG_FILE: &str = "MINER_CONFIG";
}

/// Top-level names a parameter file may not claim as extra parameters
const RESERVED_KEYS: &[&str] = &[
    "network",
    "netuid",
    "subtensor",
    "wallet",
    "logging",
    "commitment",
    "full_path",
    "config_file",
];

/// Expand a leading `~` to the home directory.
pub fn expand_path(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Logging directory of a miner:
/// `<logging_dir>/<wallet_name>/<hotkey>/netuid<netuid>/miner`.
pub fn full_path(logging_dir: &str, wallet_name: &str, hotkey: &str, netuid: u16) -> PathBuf {
    expand_path(logging_dir)
        .join(wallet_name)
        .join(hotkey)
        .join(format!("netuid{}", netuid))
        .join(MINER_DIR_NAME)
}

/// Create the logging directory and any missing parents.
pub fn ensure_log_dir(path: &Path) -> Result<(), ConfigError> {
    std::fs::create_dir_all(path).map_err(|e| {
        ConfigError::with_path(
            format!("failed to create logging directory: {}", e),
            path.display().to_string(),
        )
    })
}

/// Subtensor connection settings
///
/// `chain_endpoint` is resolved from the top-level network unless set
/// explicitly. `network` is reported in the startup banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtensorConfig {
    pub network: String,
    pub chain_endpoint: String,
}

/// Wallet settings
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletConfig {
    pub name: String,
    pub hotkey: String,
    pub path: String,
    /// Hotkey password, never serialized
    #[serde(skip)]
    pub password: Option<String>,
}

impl fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletConfig")
            .field("name", &self.name)
            .field("hotkey", &self.hotkey)
            .field("path", &self.path)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub debug: bool,
    pub trace: bool,
    pub logging_dir: String,
    pub format: LogFormat,
}

/// Identity of the code the miner commits to on chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentConfig {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    /// Subnet the commitment is written to
    pub netuid: u16,
}

impl CommitmentConfig {
    /// The commitment string, `owner/repo@branch`.
    pub fn payload(&self) -> String {
        format!("{}/{}@{}", self.owner, self.repo, self.branch)
    }
}

impl Default for CommitmentConfig {
    fn default() -> Self {
        Self {
            owner: DEFAULT_COMMITMENT_OWNER.to_string(),
            repo: DEFAULT_COMMITMENT_REPO.to_string(),
            branch: DEFAULT_COMMITMENT_BRANCH.to_string(),
            netuid: DEFAULT_NETUID,
        }
    }
}

impl fmt::Display for CommitmentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.payload())
    }
}

/// Values supplied by one configuration source. `None` means "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub network: Option<String>,
    pub netuid: Option<u16>,
    pub config_file: Option<PathBuf>,
    pub subtensor_network: Option<String>,
    pub chain_endpoint: Option<String>,
    pub wallet_name: Option<String>,
    pub wallet_hotkey: Option<String>,
    pub wallet_path: Option<String>,
    pub wallet_password: Option<String>,
    pub logging_debug: Option<bool>,
    pub logging_trace: Option<bool>,
    pub logging_dir: Option<String>,
    pub logging_format: Option<LogFormat>,
    pub commitment_owner: Option<String>,
    pub commitment_repo: Option<String>,
    pub commitment_branch: Option<String>,
    pub commitment_netuid: Option<u16>,
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::new(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}

impl ConfigOverrides {
    /// Read environment defaults from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read environment defaults through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let logging_debug = get(env::LOGGING_DEBUG)
            .map(|v| parse_bool(env::LOGGING_DEBUG, &v))
            .transpose()?;
        let logging_trace = get(env::LOGGING_TRACE)
            .map(|v| parse_bool(env::LOGGING_TRACE, &v))
            .transpose()?;
        let logging_format = get(env::LOGGING_FORMAT)
            .map(|v| v.parse::<LogFormat>().map_err(ConfigError::new))
            .transpose()?;

        Ok(Self {
            network: get(env::NETWORK),
            config_file: get(env::CONFIG_FILE).map(PathBuf::from),
            subtensor_network: get(env::SUBTENSOR_NETWORK),
            chain_endpoint: get(env::SUBTENSOR_CHAIN_ENDPOINT),
            wallet_name: get(env::WALLET_NAME),
            wallet_hotkey: get(env::WALLET_HOTKEY),
            wallet_path: get(env::WALLET_PATH),
            wallet_password: lookup(env::WALLET_HOTKEY_PASSWORD),
            logging_debug,
            logging_trace,
            logging_dir: get(env::LOGGING_DIR),
            logging_format,
            ..Default::default()
        })
    }

    /// Field-wise merge: values in `self` win, `lower` fills the gaps.
    pub fn or(self, lower: Self) -> Self {
        Self {
            network: self.network.or(lower.network),
            netuid: self.netuid.or(lower.netuid),
            config_file: self.config_file.or(lower.config_file),
            subtensor_network: self.subtensor_network.or(lower.subtensor_network),
            chain_endpoint: self.chain_endpoint.or(lower.chain_endpoint),
            wallet_name: self.wallet_name.or(lower.wallet_name),
            wallet_hotkey: self.wallet_hotkey.or(lower.wallet_hotkey),
            wallet_path: self.wallet_path.or(lower.wallet_path),
            wallet_password: self.wallet_password.or(lower.wallet_password),
            logging_debug: self.logging_debug.or(lower.logging_debug),
            logging_trace: self.logging_trace.or(lower.logging_trace),
            logging_dir: self.logging_dir.or(lower.logging_dir),
            logging_format: self.logging_format.or(lower.logging_format),
            commitment_owner: self.commitment_owner.or(lower.commitment_owner),
            commitment_repo: self.commitment_repo.or(lower.commitment_repo),
            commitment_branch: self.commitment_branch.or(lower.commitment_branch),
            commitment_netuid: self.commitment_netuid.or(lower.commitment_netuid),
        }
    }
}

/// The merged miner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinerConfig {
    pub network: String,
    pub netuid: u16,
    pub subtensor: SubtensorConfig,
    pub wallet: WalletConfig,
    pub logging: LoggingConfig,
    pub commitment: CommitmentConfig,
    /// Logging directory derived from the wallet and netuid
    pub full_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    /// Parameters carried over from the parameter file
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
    /// File keys dropped because they name a built-in setting
    #[serde(skip)]
    pub ignored_file_keys: Vec<String>,
}

impl MinerConfig {
    /// Merge CLI and environment overrides with the parameter file.
    ///
    /// `overrides` must already be the CLI values layered over the
    /// environment. Fields it leaves unset take the file's value where the
    /// file has one, then the built-in default.
    pub fn build(overrides: ConfigOverrides, file: FileParams) -> Self {
        let network = overrides
            .network
            .unwrap_or_else(|| DEFAULT_NETWORK.to_string());
        let netuid = overrides.netuid.unwrap_or(DEFAULT_NETUID);

        // The miner connects to `network`; `subtensor.network` only labels it.
        let subtensor_network = overrides
            .subtensor_network
            .unwrap_or_else(|| network.clone());
        let chain_endpoint = overrides
            .chain_endpoint
            .unwrap_or_else(|| determine_chain_endpoint_and_network(&network).0);

        let wallet = WalletConfig {
            name: overrides
                .wallet_name
                .unwrap_or_else(|| DEFAULT_WALLET_NAME.to_string()),
            hotkey: overrides
                .wallet_hotkey
                .unwrap_or_else(|| DEFAULT_WALLET_HOTKEY.to_string()),
            path: overrides
                .wallet_path
                .unwrap_or_else(|| DEFAULT_WALLET_PATH.to_string()),
            password: overrides.wallet_password,
        };

        let logging = LoggingConfig {
            debug: overrides.logging_debug.unwrap_or(false),
            trace: overrides.logging_trace.unwrap_or(false),
            logging_dir: overrides
                .logging_dir
                .unwrap_or_else(|| DEFAULT_LOGGING_DIR.to_string()),
            format: overrides.logging_format.unwrap_or_default(),
        };

        let defaults = CommitmentConfig::default();
        let commitment = CommitmentConfig {
            owner: overrides
                .commitment_owner
                .or(file.commitment.owner)
                .unwrap_or(defaults.owner),
            repo: overrides
                .commitment_repo
                .or(file.commitment.repo)
                .unwrap_or(defaults.repo),
            branch: overrides
                .commitment_branch
                .or(file.commitment.branch)
                .unwrap_or(defaults.branch),
            netuid: overrides
                .commitment_netuid
                .or(file.commitment.netuid)
                .unwrap_or(defaults.netuid),
        };

        let mut extra = BTreeMap::new();
        let mut ignored_file_keys = Vec::new();
        for (key, value) in file.extra {
            if RESERVED_KEYS.contains(&key.as_str()) {
                ignored_file_keys.push(key);
            } else {
                extra.insert(key, value);
            }
        }

        let full_path = full_path(&logging.logging_dir, &wallet.name, &wallet.hotkey, netuid);

        Self {
            network,
            netuid,
            subtensor: SubtensorConfig {
                network: subtensor_network,
                chain_endpoint,
            },
            wallet,
            logging,
            commitment,
            full_path,
            config_file: file.source,
            extra,
            ignored_file_keys,
        }
    }

    /// Build the configuration from CLI values, the process environment and
    /// the parameter file, then create the logging directory.
    pub fn load(cli: ConfigOverrides) -> Result<Self, ConfigError> {
        let overrides = cli.or(ConfigOverrides::from_env()?);
        let file = loader::load(overrides.config_file.as_deref())?;
        let config = Self::build(overrides, file);
        ensure_log_dir(&config.full_path)?;
        Ok(config)
    }

    /// Whether the commitment targets a different subnet than `--netuid`.
    pub fn commitment_netuid_differs(&self) -> bool {
        self.commitment.netuid != self.netuid
    }

    /// Pretty JSON rendering for the startup audit line.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self::build(ConfigOverrides::default(), FileParams::default())
    }
}

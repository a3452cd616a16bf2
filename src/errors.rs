//! Error types for the miner
//!
//! Each failure the miner can hit has its own error struct carrying a message
//! plus whatever context is known at the failure site. They are wrapped by the
//! unified [`MinerError`] enum, which is what every fallible operation returns.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Error when building the miner configuration fails
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
#[error("Config error: {message}")]
pub struct ConfigError {
    /// Detailed error message
    pub message: String,
    /// The file the configuration was read from, if any
    pub path: Option<String>,
}

impl ConfigError {
    /// Create a new config error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
        }
    }

    /// Create a new config error for a specific file
    pub fn with_path(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

// =============================================================================
// Chain/Network Errors
// =============================================================================

/// Error when connecting to the RPC endpoint fails
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
#[error("Chain connection error: {message}")]
pub struct ChainConnectionError {
    /// Detailed error message
    pub message: String,
    /// The RPC URL that failed to connect
    pub rpc_url: Option<String>,
}

impl ChainConnectionError {
    /// Create a new chain connection error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            rpc_url: None,
        }
    }

    /// Create a new chain connection error with RPC URL
    pub fn with_url(message: impl Into<String>, rpc_url: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            rpc_url: Some(rpc_url.into()),
        }
    }
}

/// Error when querying chain storage fails
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
#[error("Chain query error: {message}")]
pub struct ChainQueryError {
    /// Detailed error message
    pub message: String,
    /// The storage module being queried
    pub module: Option<String>,
    /// The storage entry being queried
    pub entry: Option<String>,
}

impl ChainQueryError {
    /// Create a new chain query error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            module: None,
            entry: None,
        }
    }

    /// Create a new chain query error with module and entry info
    pub fn with_storage(
        message: impl Into<String>,
        module: impl Into<String>,
        entry: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            module: Some(module.into()),
            entry: Some(entry.into()),
        }
    }
}

/// Error when submitting an extrinsic fails before the chain could judge it
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
#[error("Extrinsic error: {message}")]
pub struct ExtrinsicError {
    /// Detailed error message
    pub message: String,
    /// The pallet/module name
    pub pallet: Option<String>,
    /// The call/function name
    pub call: Option<String>,
}

impl ExtrinsicError {
    /// Create a new extrinsic error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            pallet: None,
            call: None,
        }
    }

    /// Create a new extrinsic error with pallet and call info
    pub fn with_call(
        message: impl Into<String>,
        pallet: impl Into<String>,
        call: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            pallet: Some(pallet.into()),
            call: Some(call.into()),
        }
    }
}

/// Error when the chain rejects a metadata (commitment) write.
///
/// The Commitments pallet reports `CommitmentSetRateLimitExceeded` when a
/// hotkey commits again before the subnet's minimum interval has elapsed.
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
#[error("Metadata error: {message}")]
pub struct MetadataError {
    /// Detailed error message
    pub message: String,
    /// The pallet error name if the chain reported one
    pub pallet_error: Option<String>,
}

/// Pallet error raised when commitments are set too frequently
pub const COMMITMENT_RATE_LIMIT_ERROR: &str = "CommitmentSetRateLimitExceeded";

impl MetadataError {
    /// Create a new metadata error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            pallet_error: None,
        }
    }

    /// Create a new metadata error with the pallet error name
    pub fn with_pallet_error(message: impl Into<String>, pallet_error: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            pallet_error: Some(pallet_error.into()),
        }
    }

    /// Rejection raised by a pallet, named `Pallet::Variant` in the message
    pub fn from_pallet(pallet: &str, variant: &str) -> Self {
        Self::with_pallet_error(format!("Pallet error {}::{}", pallet, variant), variant)
    }

    /// Whether the rejection was the commitment rate limit
    pub fn is_rate_limited(&self) -> bool {
        self.pallet_error.as_deref() == Some(COMMITMENT_RATE_LIMIT_ERROR)
            || self.message.contains(COMMITMENT_RATE_LIMIT_ERROR)
    }
}

// =============================================================================
// Registration Errors
// =============================================================================

/// Error when a hotkey is not registered on a subnet
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
#[error("Not registered: {message}")]
pub struct NotRegistered {
    /// Detailed error message
    pub message: String,
    /// The hotkey SS58 address
    pub hotkey: Option<String>,
    /// The subnet netuid
    pub netuid: Option<u16>,
}

impl NotRegistered {
    /// Create a new not registered error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            hotkey: None,
            netuid: None,
        }
    }

    /// Create a new not registered error with hotkey and netuid
    pub fn with_details(message: impl Into<String>, hotkey: impl Into<String>, netuid: u16) -> Self {
        Self {
            message: message.into(),
            hotkey: Some(hotkey.into()),
            netuid: Some(netuid),
        }
    }
}

// =============================================================================
// Unified Error Enum
// =============================================================================

/// Unified error type for all miner operations
#[derive(Debug, Error)]
pub enum MinerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Wallet(#[from] crate::wallet::WalletError),
    #[error(transparent)]
    ChainConnection(#[from] ChainConnectionError),
    #[error(transparent)]
    ChainQuery(#[from] ChainQueryError),
    #[error(transparent)]
    Extrinsic(#[from] ExtrinsicError),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error(transparent)]
    NotRegistered(#[from] NotRegistered),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for miner operations
pub type MinerResult<T> = Result<T, MinerError>;

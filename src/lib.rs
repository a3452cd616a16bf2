pub mod chain;
pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod metagraph;
pub mod miner;
pub mod validator;
pub mod wallet;

pub use chain::{Connector, PairSigner, Subtensor, SubtensorClient, SubtensorConnector};
pub use config::{
    CommitmentConfig, ConfigOverrides, LoggingConfig, MinerConfig,
    SubtensorConfig, WalletConfig,
};
pub use metagraph::{sync_metagraph, Metagraph};
pub use miner::{CommitmentOutcome, MinerContext};

// Re-export logging module
pub use logging::{LineStyle, LogFormat, Logger, MemoryWriter, MinerFormatter};

// Re-export error types
pub use errors::{
    ChainConnectionError, ChainQueryError, ConfigError, ExtrinsicError, MetadataError, MinerError,
    MinerResult, NotRegistered, COMMITMENT_RATE_LIMIT_ERROR,
};

pub use wallet::{Keypair, Wallet};

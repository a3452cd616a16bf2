//! The miner's single pass: bootstrap, then one commitment attempt.
//!
//! ```rust,no_run
//! use nova_miner::chain::SubtensorConnector;
//! use nova_miner::config::MinerConfig;
//! use nova_miner::logging::Logger;
//! use nova_miner::miner;
//!
//! # async fn example() -> nova_miner::MinerResult<()> {
//! let config = MinerConfig::default();
//! let logger = Logger::from_config(&config)?;
//! let connector = SubtensorConnector::from_config(&config.subtensor);
//!
//! let outcome = miner::run(&config, &connector, &logger).await?;
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```

use crate::chain::{Connector, Subtensor};
use crate::config::{CommitmentConfig, MinerConfig};
use crate::errors::{MinerError, MinerResult};
use crate::logging::Logger;
use crate::metagraph::Metagraph;
use crate::wallet::Wallet;

/// Everything the miner needs once bootstrap succeeded.
#[derive(Debug)]
pub struct MinerContext<S> {
    pub wallet: Wallet,
    pub subtensor: S,
    pub metagraph: Metagraph,
    pub uid: u16,
}

/// Result of the commitment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitmentOutcome {
    /// The chain accepted the commitment
    Committed,
    /// The chain answered but did not confirm the commitment
    NotCommitted,
    /// The chain rejected the commitment, usually the rate limit
    TooSoon,
}

/// Log the startup banner and the merged configuration.
pub fn log_startup(config: &MinerConfig, logger: &Logger) -> MinerResult<()> {
    logger.info(&format!(
        "Running miner for subnet: {} on network: {} with config:",
        config.netuid, config.subtensor.network
    ));
    logger.info(&config.to_json()?);

    if !config.ignored_file_keys.is_empty() {
        logger.warn(&format!(
            "Ignored parameter file keys that name built-in settings: {}",
            config.ignored_file_keys.join(", ")
        ));
    }
    if config.commitment_netuid_differs() {
        logger.warn(&format!(
            "Commitment goes to subnet {} while --netuid is {}",
            config.commitment.netuid, config.netuid
        ));
    }
    Ok(())
}

/// Open the wallet, connect, sync the metagraph and resolve the miner UID.
///
/// A wallet failure is returned as is. Failures after the wallet is open are
/// logged before being returned.
pub async fn setup<C: Connector>(
    config: &MinerConfig,
    connector: &C,
    logger: &Logger,
) -> MinerResult<MinerContext<C::Connection>> {
    logger.info("Setting up Bittensor objects.");

    let wallet = Wallet::open(
        &config.wallet.name,
        &config.wallet.hotkey,
        Some(&config.wallet.path),
        config.wallet.password.as_deref(),
    )?;
    logger.info(&format!("Wallet: {}", wallet));

    match connect_and_sync(config, connector, &wallet, logger).await {
        Ok((subtensor, metagraph, uid)) => Ok(MinerContext {
            wallet,
            subtensor,
            metagraph,
            uid,
        }),
        Err(e) => {
            logger.error(&format!("Failed to setup Bittensor objects: {}", e));
            logger.error("Please check your network connection and the subtensor network status");
            Err(e)
        }
    }
}

async fn connect_and_sync<C: Connector>(
    config: &MinerConfig,
    connector: &C,
    wallet: &Wallet,
    logger: &Logger,
) -> MinerResult<(C::Connection, Metagraph, u16)> {
    let subtensor = connector.connect(&config.network).await?;
    logger.info(&format!(
        "Connected to subtensor network: {}",
        subtensor.network()
    ));

    let mut metagraph = subtensor.metagraph(config.netuid).await?;
    subtensor.sync_metagraph(&mut metagraph).await?;
    logger.info("Metagraph synced successfully.");

    logger.info(&format!(
        "Subtensor: Network: {}, Chain: {}",
        subtensor.network(),
        subtensor.chain_endpoint()
    ));
    logger.info(&format!("Metagraph synced: {}", metagraph));

    let uid = metagraph.uid_for_hotkey(wallet.hotkey_ss58())?;
    logger.info(&format!("Miner UID: {}", uid));

    Ok((subtensor, metagraph, uid))
}

/// Make one commitment attempt.
///
/// A chain rejection of the commitment is expected when the miner commits
/// again too soon; it is logged at info level and reported as
/// [`CommitmentOutcome::TooSoon`]. Any other error is returned.
pub async fn submit_commitment<S: Subtensor + ?Sized>(
    subtensor: &S,
    wallet: &Wallet,
    commitment: &CommitmentConfig,
    logger: &Logger,
) -> MinerResult<CommitmentOutcome> {
    let payload = commitment.payload();

    let status = match subtensor
        .set_commitment(wallet, commitment.netuid, &payload)
        .await
    {
        Ok(status) => status,
        Err(MinerError::Metadata(e)) => {
            if e.is_rate_limited() {
                logger.debug("Commitment rate limit reached for this hotkey");
            } else {
                logger.debug(&format!("Commitment rejected: {}", e));
            }
            logger.info("Too soon to commit again. Will keep looking for better candidates.");
            return Ok(CommitmentOutcome::TooSoon);
        }
        Err(e) => return Err(e),
    };

    logger.announce(&format!("Chain commitment status: {}", status));
    if !status {
        return Ok(CommitmentOutcome::NotCommitted);
    }

    logger.announce(&format!("Commitment set successfully for ({})", payload));
    Ok(CommitmentOutcome::Committed)
}

/// Bootstrap and make the single commitment attempt.
pub async fn run<C: Connector>(
    config: &MinerConfig,
    connector: &C,
    logger: &Logger,
) -> MinerResult<CommitmentOutcome> {
    let context = setup(config, connector, logger).await?;
    submit_commitment(&context.subtensor, &context.wallet, &config.commitment, logger).await
}

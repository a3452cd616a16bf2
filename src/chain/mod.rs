//! Subtensor chain access.
//!
//! [`SubtensorClient`] wraps a subxt `OnlineClient` and exposes the handful
//! of storage reads and the extrinsic submission the miner needs. The
//! [`Subtensor`] and [`Connector`] traits are the seam the miner is written
//! against, so bootstrap and submission can run against a test double.

pub mod signer;

use async_trait::async_trait;
use subxt::dynamic::{DecodedValueThunk, Value};
use subxt::error::DispatchError;
use subxt::tx::TxStatus;
use subxt::{OnlineClient, PolkadotConfig};
use tracing::debug;

use crate::config::{determine_chain_endpoint_and_network, SubtensorConfig};
use crate::errors::{
    ChainConnectionError, ChainQueryError, ExtrinsicError, MetadataError, MinerError, MinerResult,
};
use crate::metagraph::Metagraph;
use crate::wallet::Wallet;

pub use signer::PairSigner;

/// Operations the miner performs against a subtensor chain.
#[async_trait]
pub trait Subtensor: Send + Sync {
    /// Network name this connection was opened for
    fn network(&self) -> &str;

    /// Endpoint the connection talks to
    fn chain_endpoint(&self) -> &str;

    /// Empty metagraph handle for a subnet. Fails if the subnet does not exist.
    async fn metagraph(&self, netuid: u16) -> MinerResult<Metagraph>;

    /// Refresh a metagraph in place from chain state.
    async fn sync_metagraph(&self, metagraph: &mut Metagraph) -> MinerResult<()>;

    /// Write `data` to the Commitments registry for `netuid`, signed by the
    /// wallet's hotkey. `Ok(true)` once the extrinsic succeeded in a block.
    async fn set_commitment(&self, wallet: &Wallet, netuid: u16, data: &str)
        -> MinerResult<bool>;
}

/// Opens [`Subtensor`] connections.
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: Subtensor;

    async fn connect(&self, network: &str) -> MinerResult<Self::Connection>;
}

/// Connector for real chains.
#[derive(Debug, Clone, Default)]
pub struct SubtensorConnector {
    /// Endpoint used instead of the one the network name resolves to
    pub chain_endpoint: Option<String>,
}

impl SubtensorConnector {
    pub fn new(chain_endpoint: Option<String>) -> Self {
        Self { chain_endpoint }
    }

    /// Connector honouring the configured chain endpoint.
    pub fn from_config(config: &SubtensorConfig) -> Self {
        Self::new(Some(config.chain_endpoint.clone()))
    }
}

#[async_trait]
impl Connector for SubtensorConnector {
    type Connection = SubtensorClient;

    async fn connect(&self, network: &str) -> MinerResult<SubtensorClient> {
        let endpoint = match &self.chain_endpoint {
            Some(endpoint) => endpoint.clone(),
            None => determine_chain_endpoint_and_network(network).0,
        };
        SubtensorClient::connect(network, &endpoint).await
    }
}

/// Subtensor client over a subxt connection
pub struct SubtensorClient {
    api: OnlineClient<PolkadotConfig>,
    rpc_url: String,
    network: String,
}

impl SubtensorClient {
    /// Connect to `rpc_url`. Plain `ws://` endpoints are allowed for local
    /// and private nodes.
    pub async fn connect(network: &str, rpc_url: &str) -> MinerResult<Self> {
        debug!(network, rpc_url, "Connecting to subtensor");
        let api = if rpc_url.starts_with("ws://") {
            OnlineClient::<PolkadotConfig>::from_insecure_url(rpc_url).await
        } else {
            OnlineClient::<PolkadotConfig>::from_url(rpc_url).await
        }
        .map_err(|e| ChainConnectionError::with_url(e.to_string(), rpc_url))?;

        Ok(Self {
            api,
            rpc_url: rpc_url.to_string(),
            network: network.to_string(),
        })
    }

    /// Get the underlying subxt API client
    pub fn api(&self) -> &OnlineClient<PolkadotConfig> {
        &self.api
    }

    /// Get the RPC URL
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Query a storage entry at the latest block
    pub async fn storage(
        &self,
        module: &str,
        entry: &str,
        keys: Vec<Value>,
    ) -> MinerResult<Option<DecodedValueThunk>> {
        let query = subxt::dynamic::storage(module, entry, keys);
        let storage = self
            .api
            .storage()
            .at_latest()
            .await
            .map_err(|e| ChainQueryError::with_storage(e.to_string(), module, entry))?;
        let value = storage
            .fetch(&query)
            .await
            .map_err(|e| ChainQueryError::with_storage(e.to_string(), module, entry))?;
        Ok(value)
    }

    /// Get the current block number
    pub async fn block_number(&self) -> MinerResult<u64> {
        let block = self
            .api
            .blocks()
            .at_latest()
            .await
            .map_err(|e| ChainQueryError::new(format!("Failed to get latest block: {}", e)))?;
        Ok(block.number() as u64)
    }

    /// Submit a dynamic call signed by `signer` and wait for block inclusion.
    ///
    /// Returns `Ok(true)` when the extrinsic succeeded and `Ok(false)` when
    /// the status stream ended before inclusion. A dispatch failure, or a
    /// transaction the pool reports invalid, dropped or errored, is a
    /// [`MetadataError`].
    pub async fn submit_extrinsic(
        &self,
        module: &str,
        function: &str,
        args: Vec<Value>,
        signer: &PairSigner,
    ) -> MinerResult<bool> {
        let call = subxt::dynamic::tx(module, function, args);

        let mut progress = self
            .api
            .tx()
            .sign_and_submit_then_watch_default(&call, signer)
            .await
            .map_err(|e| classify_submission_error(e, module, function))?;

        while let Some(status) = progress.next().await {
            let status = status.map_err(|e| {
                ExtrinsicError::with_call(
                    format!("Transaction status error: {}", e),
                    module,
                    function,
                )
            })?;
            match status {
                TxStatus::InBestBlock(in_block) | TxStatus::InFinalizedBlock(in_block) => {
                    let events = in_block
                        .wait_for_success()
                        .await
                        .map_err(|e| classify_submission_error(e, module, function))?;
                    debug!(
                        extrinsic = ?events.extrinsic_hash(),
                        "{}.{} included",
                        module,
                        function
                    );
                    return Ok(true);
                }
                TxStatus::Error { message } => {
                    return Err(pool_rejection("Transaction error", &message).into())
                }
                TxStatus::Invalid { message } => {
                    return Err(pool_rejection("Invalid transaction", &message).into())
                }
                TxStatus::Dropped { message } => {
                    return Err(pool_rejection("Transaction dropped", &message).into())
                }
                _ => continue,
            }
        }

        Ok(false)
    }
}

#[async_trait]
impl Subtensor for SubtensorClient {
    fn network(&self) -> &str {
        &self.network
    }

    fn chain_endpoint(&self) -> &str {
        &self.rpc_url
    }

    async fn metagraph(&self, netuid: u16) -> MinerResult<Metagraph> {
        if !crate::metagraph::sync::subnet_exists(self, netuid).await? {
            return Err(ChainQueryError::with_storage(
                format!("Subnet {} does not exist", netuid),
                crate::metagraph::sync::SUBTENSOR_MODULE,
                "NetworksAdded",
            )
            .into());
        }
        Ok(Metagraph::new(netuid, &self.network))
    }

    async fn sync_metagraph(&self, metagraph: &mut Metagraph) -> MinerResult<()> {
        crate::metagraph::sync_metagraph(self, metagraph).await
    }

    async fn set_commitment(
        &self,
        wallet: &Wallet,
        netuid: u16,
        data: &str,
    ) -> MinerResult<bool> {
        let signer = PairSigner::from_wallet(wallet);
        crate::validator::commitments::set_commitment(self, &signer, netuid, data.as_bytes())
            .await
    }
}

fn pool_rejection(kind: &str, message: &str) -> MetadataError {
    MetadataError::new(format!("{}: {}", kind, message))
}

/// Dispatch failures become [`MetadataError`]; anything else is an
/// [`ExtrinsicError`] for the call.
fn classify_submission_error(err: subxt::Error, module: &str, function: &str) -> MinerError {
    match err {
        subxt::Error::Runtime(dispatch) => dispatch_error(&dispatch).into(),
        other => ExtrinsicError::with_call(other.to_string(), module, function).into(),
    }
}

fn dispatch_error(err: &DispatchError) -> MetadataError {
    if let DispatchError::Module(module_err) = err {
        if let Ok(details) = module_err.details() {
            return MetadataError::from_pallet(details.pallet.name(), &details.variant.name);
        }
    }
    MetadataError::new(err.to_string())
}

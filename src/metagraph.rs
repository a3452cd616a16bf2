//! Metagraph - the miner's view of subnet membership
//!
//! The miner only needs to know which hotkey sits at which UID, so the
//! snapshot holds the hotkey list and the block it was read at. Hotkeys are
//! indexed by UID.
//!
//! # Example
//!
//! ```
//! use nova_miner::metagraph::Metagraph;
//!
//! let mut metagraph = Metagraph::new(68, "finney");
//! metagraph.set_hotkeys(vec!["5Alice".to_string(), "5Bob".to_string()]);
//!
//! assert_eq!(metagraph.get_uid("5Bob"), Some(1));
//! assert_eq!(metagraph.get_uid("5Carol"), None);
//! ```

pub mod sync;

use serde::{Deserialize, Serialize};

use crate::errors::NotRegistered;

pub use sync::sync_metagraph;

/// Hotkey membership of a subnet at a given block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metagraph {
    /// Subnet unique identifier
    pub netuid: u16,
    /// Network name (e.g., "finney", "test")
    pub network: String,
    /// Total number of neurons in the subnet
    pub n: u16,
    /// Block the snapshot was read at
    pub block: u64,
    /// Unique identifiers (0 to n-1)
    pub uids: Vec<u16>,
    /// Hotkey SS58 addresses (indexed by UID)
    pub hotkeys: Vec<String>,
}

impl Metagraph {
    /// Create a new empty metagraph for a subnet
    pub fn new(netuid: u16, network: &str) -> Self {
        Self {
            netuid,
            network: network.to_string(),
            n: 0,
            block: 0,
            uids: Vec::new(),
            hotkeys: Vec::new(),
        }
    }

    /// Replace the hotkey list, keeping `n` and `uids` consistent with it.
    pub fn set_hotkeys(&mut self, hotkeys: Vec<String>) {
        self.n = hotkeys.len() as u16;
        self.uids = (0..self.n).collect();
        self.hotkeys = hotkeys;
    }

    /// Get UID for a hotkey
    pub fn get_uid(&self, hotkey: &str) -> Option<u16> {
        self.hotkeys
            .iter()
            .position(|h| h == hotkey)
            .map(|idx| idx as u16)
    }

    /// UID for a hotkey, or a `NotRegistered` error naming it.
    pub fn uid_for_hotkey(&self, hotkey: &str) -> Result<u16, NotRegistered> {
        self.get_uid(hotkey).ok_or_else(|| {
            NotRegistered::with_details(
                format!(
                    "Hotkey {} is not registered on subnet {}",
                    hotkey, self.netuid
                ),
                hotkey,
                self.netuid,
            )
        })
    }
}

impl std::fmt::Display for Metagraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Metagraph( netuid={}, network={}, n={}, block={} )",
            self.netuid, self.network, self.n, self.block
        )
    }
}

//! SR25519 hotkey keypair.
//!
//! The miner only ever loads an existing hotkey and signs extrinsics with it,
//! so this type is restore-only: seeds, secret URIs and raw secret bytes.

// ZeroizeOnDrop generates field writes that clippy reports as unused assignments
#![allow(unused_assignments)]

use sp_core::{
    crypto::{Ss58AddressFormat, Ss58Codec},
    sr25519, Pair,
};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Bittensor SS58 address format (42 = "bt")
pub const BITTENSOR_SS58_FORMAT: u16 = 42;

/// SS58 address of a raw 32-byte public key under the Bittensor format.
pub fn ss58_encode(public_key: &[u8; 32]) -> String {
    sr25519::Public::from_raw(*public_key)
        .to_ss58check_with_version(Ss58AddressFormat::custom(BITTENSOR_SS58_FORMAT))
}

/// Errors that can occur while restoring a keypair.
#[derive(Debug, Error)]
pub enum KeypairError {
    #[error("Invalid seed length: expected 32 bytes, got {0}")]
    InvalidSeedLength(usize),

    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    #[error("Key derivation error: {0}")]
    DerivationError(String),
}

/// An SR25519 keypair used to sign the miner's extrinsics.
///
/// `sr25519::Pair` does not implement `Zeroize`, so only the public key copy
/// is wiped on drop.
#[derive(ZeroizeOnDrop)]
pub struct Keypair {
    #[zeroize(skip)]
    pair: sr25519::Pair,
    public_key: [u8; 32],
    #[zeroize(skip)]
    ss58_address: String,
}

impl Clone for Keypair {
    fn clone(&self) -> Self {
        Self {
            pair: self.pair.clone(),
            public_key: self.public_key,
            ss58_address: self.ss58_address.clone(),
        }
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("ss58_address", &self.ss58_address)
            .finish()
    }
}

impl Keypair {
    fn from_pair(pair: sr25519::Pair) -> Self {
        let public = pair.public();
        let public_key: [u8; 32] = public.0;
        let ss58_address = ss58_encode(&public_key);

        Self {
            pair,
            public_key,
            ss58_address,
        }
    }

    /// Create a keypair from a 32-byte mini secret seed.
    ///
    /// # Example
    /// ```
    /// use nova_miner::wallet::Keypair;
    /// let keypair = Keypair::from_seed(&[7u8; 32]).unwrap();
    /// assert!(keypair.ss58_address().starts_with('5'));
    /// ```
    pub fn from_seed(seed: &[u8]) -> Result<Self, KeypairError> {
        if seed.len() != 32 {
            return Err(KeypairError::InvalidSeedLength(seed.len()));
        }

        let mut seed_arr = [0u8; 32];
        seed_arr.copy_from_slice(seed);
        let pair = sr25519::Pair::from_seed(&seed_arr);
        seed_arr.zeroize();

        Ok(Self::from_pair(pair))
    }

    /// Create a keypair from a secret URI: a mnemonic phrase, a `0x` seed, or
    /// a dev account such as `//Alice`, each optionally followed by a
    /// derivation path.
    pub fn from_uri(uri: &str) -> Result<Self, KeypairError> {
        let pair = sr25519::Pair::from_string(uri, None)
            .map_err(|e| KeypairError::InvalidUri(format!("{:?}", e)))?;
        Ok(Self::from_pair(pair))
    }

    /// Restore a keypair from raw secret bytes: a 32-byte seed or the 64-byte
    /// expanded secret key.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeypairError> {
        let pair = sr25519::Pair::from_seed_slice(bytes).map_err(|e| {
            KeypairError::DerivationError(format!("Failed to restore keypair: {:?}", e))
        })?;
        Ok(Self::from_pair(pair))
    }

    /// The 32-byte public key.
    pub fn public_key(&self) -> &[u8; 32] {
        &self.public_key
    }

    /// The SS58 address with Bittensor format (prefix 42).
    pub fn ss58_address(&self) -> &str {
        &self.ss58_address
    }

    /// The underlying sr25519 pair, used to build the extrinsic signer.
    pub fn pair(&self) -> &sr25519::Pair {
        &self.pair
    }
}

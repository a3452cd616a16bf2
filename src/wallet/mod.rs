//! Wallet loading for the miner.
//!
//! The miner signs with its hotkey only. Hotkeys are read from the standard
//! Bittensor wallet directory in any of the formats the Python SDK writes:
//! plain JSON key data, bare hex, or the encrypted v4 JSON format
//! (Argon2id + NaCl secretbox).
//!
//! ```no_run
//! use nova_miner::wallet::Wallet;
//!
//! let wallet = Wallet::open("my_wallet", "default", None, None).unwrap();
//! println!("Hotkey: {}", wallet.hotkey_ss58());
//! ```

pub mod keyfile;
pub mod keypair;
#[allow(clippy::module_inception)]
pub mod wallet;

pub use keyfile::{parse_keyfile, Keyfile, KeyfileError, KEYFILE_VERSION};
pub use keypair::{ss58_encode, Keypair, KeypairError, BITTENSOR_SS58_FORMAT};
pub use wallet::{default_wallet_path, hotkey_path, Wallet, WalletError};

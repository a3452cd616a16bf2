//! The miner's wallet handle.
//!
//! Wallets follow the Python SDK layout:
//! ```text
//! ~/.bittensor/wallets/
//!   └── <wallet_name>/
//!       ├── coldkey
//!       ├── coldkeypub.txt
//!       └── hotkeys/
//!           └── <hotkey_name>
//! ```
//!
//! Only the hotkey is loaded; the coldkey never leaves cold storage.

use crate::config::expand_path;
use crate::wallet::keyfile::{Keyfile, KeyfileError};
use crate::wallet::keypair::Keypair;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default wallet directory name under home
const WALLET_DIR_NAME: &str = ".bittensor/wallets";

/// Hotkeys directory name
const HOTKEYS_DIR: &str = "hotkeys";

/// Errors that can occur while opening a wallet.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Hotkey not found: {0}")]
    HotkeyNotFound(PathBuf),

    #[error("Keyfile error: {0}")]
    Keyfile(#[from] KeyfileError),

    #[error("Invalid name: {0}")]
    InvalidName(String),
}

/// Reject names that could escape the wallet directory.
fn sanitize_name(name: &str) -> Result<&str, WalletError> {
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(WalletError::InvalidName(format!(
            "Name '{}' contains invalid path characters",
            name
        )));
    }
    if name.trim().is_empty() {
        return Err(WalletError::InvalidName("Name cannot be empty".to_string()));
    }
    if name.starts_with('.') {
        return Err(WalletError::InvalidName(format!(
            "Name '{}' cannot start with a dot",
            name
        )));
    }
    Ok(name)
}

/// A wallet with its hotkey loaded and ready to sign.
#[derive(Clone)]
pub struct Wallet {
    /// Wallet name
    pub name: String,
    /// Base directory holding all wallets
    pub path: PathBuf,
    /// Name of the hotkey in use
    pub hotkey_name: String,
    hotkey: Keypair,
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("hotkey_name", &self.hotkey_name)
            .field("hotkey", &self.hotkey.ss58_address())
            .finish()
    }
}

impl std::fmt::Display for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Wallet (Name: '{}', Hotkey: '{}', Path: '{}')",
            self.name,
            self.hotkey_name,
            self.path.display()
        )
    }
}

impl Wallet {
    /// Open a wallet and load its hotkey.
    ///
    /// # Arguments
    /// * `name` - Wallet name (directory under the base path)
    /// * `hotkey` - Hotkey name (file under `hotkeys/`)
    /// * `path` - Base path; defaults to `~/.bittensor/wallets`
    /// * `password` - Password for an encrypted hotkey
    pub fn open(
        name: &str,
        hotkey: &str,
        path: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self, WalletError> {
        let name = sanitize_name(name)?;
        let hotkey = sanitize_name(hotkey)?;

        let base_path = match path {
            Some(p) => expand_path(p),
            None => default_wallet_path(),
        };

        let keyfile = Keyfile::new(hotkey_path(&base_path, name, hotkey));
        if !keyfile.exists() {
            return Err(WalletError::HotkeyNotFound(keyfile.path().to_path_buf()));
        }
        let keypair = keyfile.load(password)?;

        Ok(Self::from_keypair(name, hotkey, base_path, keypair))
    }

    /// Build a wallet around an already loaded hotkey.
    pub fn from_keypair(
        name: impl Into<String>,
        hotkey: impl Into<String>,
        path: impl Into<PathBuf>,
        keypair: Keypair,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            hotkey_name: hotkey.into(),
            hotkey: keypair,
        }
    }

    /// The hotkey keypair.
    pub fn hotkey(&self) -> &Keypair {
        &self.hotkey
    }

    /// SS58 address of the hotkey.
    pub fn hotkey_ss58(&self) -> &str {
        self.hotkey.ss58_address()
    }
}

/// Path of a hotkey file: `<base>/<name>/hotkeys/<hotkey>`.
pub fn hotkey_path(base: &Path, name: &str, hotkey: &str) -> PathBuf {
    base.join(name).join(HOTKEYS_DIR).join(hotkey)
}

/// Default wallet base directory (`~/.bittensor/wallets`).
pub fn default_wallet_path() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(WALLET_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(WALLET_DIR_NAME))
}

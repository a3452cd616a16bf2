//! Hotkey keyfile loading.
//!
//! Reads keyfiles written by the Python Bittensor SDK and by `btcli`-style
//! tooling. Supported layouts:
//!
//! - Plain JSON key data:
//!   `{"secretSeed": "0x..", "secretPhrase": "..", "ss58Address": ".."}`
//! - Bare hex of the raw secret (32-byte seed or 64-byte secret key)
//! - Encrypted v4 JSON:
//! ```json
//! {
//!     "crypto": {
//!         "cipher": "secretbox",
//!         "ciphertext": "<base64>",
//!         "cipherparams": {"nonce": "<base64 24-byte nonce>"},
//!         "kdf": "argon2id",
//!         "kdfparams": {"salt": "<base64 16-byte salt>", "n": 65536, "r": 1, "p": 4}
//!     },
//!     "version": 4
//! }
//! ```
//!
//! The plaintext of an encrypted keyfile is itself either JSON key data or raw
//! secret bytes.

use crate::wallet::keypair::{Keypair, KeypairError};
use argon2::{Argon2, Params, Version};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use crypto_secretbox::{
    aead::{Aead, KeyInit},
    XSalsa20Poly1305,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use zeroize::Zeroize;

/// Newest encrypted keyfile format version understood by the loader
pub const KEYFILE_VERSION: u32 = 4;

/// Prefix of the legacy NaCl keyfile format, which this loader does not read
const LEGACY_NACL_PREFIX: &[u8] = b"$NACL";

/// Errors that can occur while loading a keyfile.
#[derive(Debug, Error)]
pub enum KeyfileError {
    #[error("Keyfile not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid keyfile format: {0}")]
    InvalidFormat(String),

    #[error("Decryption failed: wrong password or corrupted keyfile")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Keypair error: {0}")]
    Keypair(#[from] KeypairError),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Unsupported keyfile version: {0}")]
    UnsupportedVersion(u32),

    #[error("Password required for encrypted keyfile")]
    PasswordRequired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KdfParams {
    pub salt: String,
    #[serde(rename = "n")]
    pub memory_cost: u32,
    #[serde(rename = "r")]
    pub time_cost: u32,
    #[serde(rename = "p")]
    pub parallelism: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CipherParams {
    pub nonce: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoData {
    pub cipher: String,
    pub ciphertext: String,
    pub cipherparams: CipherParams,
    pub kdf: String,
    pub kdfparams: KdfParams,
}

/// The encrypted keyfile structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyfileJson {
    pub crypto: CryptoData,
    pub version: u32,
}

/// Unencrypted key data as written by the Python SDK.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyData {
    secret_seed: Option<String>,
    secret_phrase: Option<String>,
    private_key: Option<String>,
    ss58_address: Option<String>,
}

/// A keyfile on disk holding one keypair.
#[derive(Debug, Clone)]
pub struct Keyfile {
    path: PathBuf,
}

impl Keyfile {
    /// Create a handle for the keyfile at `path`. Nothing is read yet.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of this keyfile.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the keyfile exists on disk.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the keypair, decrypting with `password` if the file is encrypted.
    pub fn load(&self, password: Option<&str>) -> Result<Keypair, KeyfileError> {
        if !self.exists() {
            return Err(KeyfileError::NotFound(self.path.clone()));
        }

        let data = fs::read(&self.path)?;
        parse_keyfile(&data, password)
    }
}

/// Parse keyfile bytes into a keypair.
pub fn parse_keyfile(data: &[u8], password: Option<&str>) -> Result<Keypair, KeyfileError> {
    if data.starts_with(LEGACY_NACL_PREFIX) {
        return Err(KeyfileError::InvalidFormat(
            "legacy $NACL keyfiles are not supported; re-encrypt with a current wallet tool"
                .to_string(),
        ));
    }

    if let Ok(json) = serde_json::from_slice::<KeyfileJson>(data) {
        let mut plaintext = decrypt_from_json(&json, password)?;
        let keypair = parse_plaintext(&plaintext);
        plaintext.zeroize();
        return keypair;
    }

    parse_plaintext(data)
}

/// Parse unencrypted key material: JSON key data, hex, or raw bytes.
fn parse_plaintext(data: &[u8]) -> Result<Keypair, KeyfileError> {
    if let Ok(key_data) = serde_json::from_slice::<KeyData>(data) {
        return keypair_from_key_data(&key_data);
    }

    if let Ok(text) = std::str::from_utf8(data) {
        let text = text.trim();
        if let Ok(bytes) = hex::decode(text.trim_start_matches("0x")) {
            return Keypair::from_bytes(&bytes).map_err(KeyfileError::Keypair);
        }
    }

    if data.len() == 32 || data.len() == 64 {
        return Keypair::from_bytes(data).map_err(KeyfileError::Keypair);
    }

    Err(KeyfileError::InvalidFormat(
        "Could not parse keyfile data".to_string(),
    ))
}

fn keypair_from_key_data(key_data: &KeyData) -> Result<Keypair, KeyfileError> {
    let keypair = if let Some(seed) = &key_data.secret_seed {
        let mut bytes = decode_hex_field("secretSeed", seed)?;
        let keypair = Keypair::from_seed(&bytes);
        bytes.zeroize();
        keypair?
    } else if let Some(phrase) = &key_data.secret_phrase {
        Keypair::from_uri(phrase)?
    } else if let Some(private_key) = &key_data.private_key {
        let mut bytes = decode_hex_field("privateKey", private_key)?;
        let keypair = Keypair::from_bytes(&bytes);
        bytes.zeroize();
        keypair?
    } else {
        return Err(KeyfileError::InvalidFormat(
            "key data has no secretSeed, secretPhrase or privateKey".to_string(),
        ));
    };

    if let Some(expected) = &key_data.ss58_address {
        if expected != keypair.ss58_address() {
            return Err(KeyfileError::InvalidFormat(format!(
                "ss58Address {} does not match the stored secret ({})",
                expected,
                keypair.ss58_address()
            )));
        }
    }

    Ok(keypair)
}

fn decode_hex_field(field: &str, value: &str) -> Result<Vec<u8>, KeyfileError> {
    hex::decode(value.trim_start_matches("0x"))
        .map_err(|e| KeyfileError::InvalidFormat(format!("{} is not valid hex: {}", field, e)))
}

fn decrypt_from_json(json: &KeyfileJson, password: Option<&str>) -> Result<Vec<u8>, KeyfileError> {
    if json.version > KEYFILE_VERSION {
        return Err(KeyfileError::UnsupportedVersion(json.version));
    }

    let password = password.ok_or(KeyfileError::PasswordRequired)?;

    let ciphertext = BASE64.decode(&json.crypto.ciphertext)?;
    let nonce_bytes = BASE64.decode(&json.crypto.cipherparams.nonce)?;
    let salt_bytes = BASE64.decode(&json.crypto.kdfparams.salt)?;

    let nonce: [u8; 24] = nonce_bytes.as_slice().try_into().map_err(|_| {
        KeyfileError::InvalidFormat(format!(
            "Invalid nonce length: expected 24, got {}",
            nonce_bytes.len()
        ))
    })?;
    let salt: [u8; 16] = salt_bytes.as_slice().try_into().map_err(|_| {
        KeyfileError::InvalidFormat(format!(
            "Invalid salt length: expected 16, got {}",
            salt_bytes.len()
        ))
    })?;

    let mut key = derive_key(password, &salt, &json.crypto.kdfparams)?;
    let cipher = XSalsa20Poly1305::new_from_slice(&key)
        .map_err(|e| KeyfileError::KeyDerivationFailed(e.to_string()))?;
    key.zeroize();

    cipher
        .decrypt(nonce.as_ref().into(), ciphertext.as_ref())
        .map_err(|_| KeyfileError::DecryptionFailed)
}

/// Derive the secretbox key with Argon2id using the keyfile's KDF parameters.
fn derive_key(password: &str, salt: &[u8; 16], kdf: &KdfParams) -> Result<[u8; 32], KeyfileError> {
    let params = Params::new(kdf.memory_cost, kdf.time_cost, kdf.parallelism, Some(32))
        .map_err(|e| KeyfileError::KeyDerivationFailed(e.to_string()))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

    let mut key = [0u8; 32];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut key)
        .map_err(|e| KeyfileError::KeyDerivationFailed(e.to_string()))?;

    Ok(key)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Small KDF parameters keep the tests fast.
    fn test_kdf(salt: &[u8; 16]) -> KdfParams {
        KdfParams {
            salt: BASE64.encode(salt),
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        }
    }

    pub(crate) fn encrypted_keyfile(plaintext: &[u8], password: &str) -> Vec<u8> {
        let salt = [3u8; 16];
        let nonce = [5u8; 24];
        let kdf = test_kdf(&salt);
        let key = derive_key(password, &salt, &kdf).unwrap();
        let cipher = XSalsa20Poly1305::new_from_slice(&key).unwrap();
        let ciphertext = cipher.encrypt(nonce.as_ref().into(), plaintext).unwrap();

        let json = KeyfileJson {
            crypto: CryptoData {
                cipher: "secretbox".to_string(),
                ciphertext: BASE64.encode(ciphertext),
                cipherparams: CipherParams {
                    nonce: BASE64.encode(nonce),
                },
                kdf: "argon2id".to_string(),
                kdfparams: kdf,
            },
            version: KEYFILE_VERSION,
        };
        serde_json::to_vec(&json).unwrap()
    }

    #[test]
    fn test_python_json_seed() {
        let seed = [11u8; 32];
        let expected = Keypair::from_seed(&seed).unwrap();
        let data = format!(
            r#"{{"accountId": "0x00", "secretSeed": "0x{}", "ss58Address": "{}"}}"#,
            hex::encode(seed),
            expected.ss58_address()
        );

        let keypair = parse_keyfile(data.as_bytes(), None).unwrap();
        assert_eq!(keypair.ss58_address(), expected.ss58_address());
    }

    #[test]
    fn test_python_json_phrase() {
        let phrase = "bottom drive obey lake curtain smoke basket hold race lonely fit walk";
        let data = format!(r#"{{"secretPhrase": "{}"}}"#, phrase);
        let keypair = parse_keyfile(data.as_bytes(), None).unwrap();
        assert_eq!(
            keypair.ss58_address(),
            Keypair::from_uri(phrase).unwrap().ss58_address()
        );
    }

    #[test]
    fn test_mismatched_address_rejected() {
        let data = format!(
            r#"{{"secretSeed": "0x{}", "ss58Address": "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY"}}"#,
            hex::encode([12u8; 32])
        );
        assert!(matches!(
            parse_keyfile(data.as_bytes(), None),
            Err(KeyfileError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_hex_keyfile() {
        let seed = [13u8; 32];
        let keypair = parse_keyfile(hex::encode(seed).as_bytes(), None).unwrap();
        assert_eq!(
            keypair.public_key(),
            Keypair::from_seed(&seed).unwrap().public_key()
        );
    }

    #[test]
    fn test_encrypted_keyfile() {
        let seed = [14u8; 32];
        let plaintext = format!(r#"{{"secretSeed": "0x{}"}}"#, hex::encode(seed));
        let data = encrypted_keyfile(plaintext.as_bytes(), "hunter2");

        let keypair = parse_keyfile(&data, Some("hunter2")).unwrap();
        assert_eq!(
            keypair.public_key(),
            Keypair::from_seed(&seed).unwrap().public_key()
        );
    }

    #[test]
    fn test_encrypted_keyfile_wrong_password() {
        let data = encrypted_keyfile(&[15u8; 32], "correct");
        assert!(matches!(
            parse_keyfile(&data, Some("wrong")),
            Err(KeyfileError::DecryptionFailed)
        ));
        assert!(matches!(
            parse_keyfile(&data, None),
            Err(KeyfileError::PasswordRequired)
        ));
    }

    #[test]
    fn test_legacy_nacl_rejected() {
        assert!(matches!(
            parse_keyfile(b"$NACLsomething", Some("pw")),
            Err(KeyfileError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_keyfile_on_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("default");
        let keyfile = Keyfile::new(&path);
        assert!(matches!(keyfile.load(None), Err(KeyfileError::NotFound(_))));

        let data = encrypted_keyfile(&[16u8; 32], "pw");
        fs::write(&path, data).unwrap();
        assert!(keyfile.exists());
        assert!(keyfile.load(Some("pw")).is_ok());
    }
}

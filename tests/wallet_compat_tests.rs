//! Wallet compatibility tests
//!
//! Validates:
//! - Hotkey files written by the Python SDK load to the expected address
//! - SS58 format 42 (Bittensor) is used consistently
//! - `//Alice` produces the known dev address

use nova_miner::wallet::{
    hotkey_path, parse_keyfile, Keypair, Wallet, WalletError, BITTENSOR_SS58_FORMAT,
};

const ABANDON: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
const ABANDON_SS58: &str = "5EPCUjPxiHAcNooYipQFWr9NmmXJKpNG5RhcntXwbtUySrgH";
const ALICE_SS58: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";

#[test]
fn test_ss58_format_is_42() {
    assert_eq!(BITTENSOR_SS58_FORMAT, 42);
}

#[test]
fn test_alice_dev_account() {
    let kp = Keypair::from_uri("//Alice").unwrap();
    assert_eq!(kp.ss58_address(), ALICE_SS58);
}

#[test]
fn test_python_keyfile_with_phrase() {
    let data = format!(
        r#"{{"accountId": "0x66933bd1f37070ef87bd1198af3dacceb095237f803f3d32b173e6b425ed7972",
            "publicKey": "0x66933bd1f37070ef87bd1198af3dacceb095237f803f3d32b173e6b425ed7972",
            "secretPhrase": "{}",
            "ss58Address": "{}"}}"#,
        ABANDON, ABANDON_SS58
    );

    let kp = parse_keyfile(data.as_bytes(), None).unwrap();
    assert_eq!(kp.ss58_address(), ABANDON_SS58);
    assert_eq!(
        hex::encode(kp.public_key()),
        "66933bd1f37070ef87bd1198af3dacceb095237f803f3d32b173e6b425ed7972"
    );
}

#[test]
fn test_wallet_open_from_sdk_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = hotkey_path(dir.path(), "miner", "hk0");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, format!(r#"{{"secretPhrase": "{}"}}"#, ABANDON)).unwrap();

    let wallet = Wallet::open("miner", "hk0", Some(dir.path().to_str().unwrap()), None).unwrap();
    assert_eq!(wallet.hotkey_ss58(), ABANDON_SS58);
    assert_eq!(
        wallet.to_string(),
        format!(
            "Wallet (Name: 'miner', Hotkey: 'hk0', Path: '{}')",
            dir.path().display()
        )
    );
}

#[test]
fn test_wallet_missing_hotkey_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    match Wallet::open("miner", "absent", Some(dir.path().to_str().unwrap()), None) {
        Err(WalletError::HotkeyNotFound(path)) => {
            assert_eq!(path, hotkey_path(dir.path(), "miner", "absent"));
        }
        other => panic!("unexpected result: {:?}", other.map(|w| w.hotkey_ss58().to_string())),
    }
}

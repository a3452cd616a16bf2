use nova_miner::cli::Cli;
use nova_miner::config::{self, env, loader, ConfigOverrides, FileParams, MinerConfig};
use proptest::prelude::*;
use std::collections::HashMap;

use clap::Parser;

fn env_from(vars: HashMap<String, String>) -> ConfigOverrides {
    ConfigOverrides::from_lookup(move |key| vars.get(key).cloned()).unwrap()
}

#[test]
fn test_cli_env_file_layering() {
    let cli = Cli::try_parse_from([
        "miner",
        "--wallet.name",
        "cli-wallet",
        "--commitment.repo",
        "cli-repo",
    ])
    .unwrap();

    let env = env_from(HashMap::from([
        (env::WALLET_NAME.to_string(), "env-wallet".to_string()),
        (env::WALLET_HOTKEY.to_string(), "env-hotkey".to_string()),
        (env::NETWORK.to_string(), "test".to_string()),
    ]));

    let file = loader::parse(
        r#"
        sample_size = 12
        wallet = "file-wallet"

        [commitment]
        owner = "file-owner"
        repo = "file-repo"
        netuid = 68
        "#,
    )
    .unwrap();

    let config = MinerConfig::build(cli.overrides().or(env), file);

    assert_eq!(config.wallet.name, "cli-wallet");
    assert_eq!(config.wallet.hotkey, "env-hotkey");
    assert_eq!(config.network, "test");
    assert_eq!(config.subtensor.network, "test");
    assert_eq!(config.commitment.owner, "file-owner");
    assert_eq!(config.commitment.repo, "cli-repo");
    assert_eq!(config.commitment.payload(), "file-owner/cli-repo@master");
    assert_eq!(config.extra["sample_size"], serde_json::json!(12));
    assert_eq!(config.ignored_file_keys, vec!["wallet".to_string()]);
    assert!(config
        .full_path
        .ends_with("cli-wallet/env-hotkey/netuid68/miner"));
}

#[test]
fn test_load_creates_log_dir() {
    let dir = tempfile::tempdir().unwrap();
    let params = dir.path().join("params.toml");
    std::fs::write(&params, "num_molecules = 3\n").unwrap();

    let cli = ConfigOverrides {
        config_file: Some(params.clone()),
        logging_dir: Some(dir.path().join("logs").to_str().unwrap().to_string()),
        wallet_name: Some("w".to_string()),
        wallet_hotkey: Some("h".to_string()),
        netuid: Some(68),
        ..Default::default()
    };

    let config = MinerConfig::load(cli).unwrap();
    assert!(config.full_path.is_dir());
    assert_eq!(config.full_path, dir.path().join("logs/w/h/netuid68/miner"));
    assert_eq!(config.config_file.as_deref(), Some(params.as_path()));
    assert_eq!(config.extra["num_molecules"], serde_json::json!(3));
}

#[test]
fn test_load_missing_explicit_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let cli = ConfigOverrides {
        config_file: Some(dir.path().join("missing.toml")),
        logging_dir: Some(dir.path().to_str().unwrap().to_string()),
        ..Default::default()
    };
    assert!(MinerConfig::load(cli).is_err());
}

fn name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

proptest! {
    #[test]
    fn prop_disjoint_sources_union(
        wallet in name(),
        hotkey in name(),
        param in "[a-z]{3,10}_param",
        value in any::<i32>(),
        netuid in any::<u16>(),
    ) {
        let cli = ConfigOverrides {
            wallet_name: Some(wallet.clone()),
            netuid: Some(netuid),
            ..Default::default()
        };
        let env = env_from(HashMap::from([(env::WALLET_HOTKEY.to_string(), hotkey.clone())]));
        let mut file = FileParams::default();
        file.extra.insert(param.clone(), serde_json::json!(value));

        let config = MinerConfig::build(cli.or(env), file);

        prop_assert_eq!(&config.wallet.name, &wallet);
        prop_assert_eq!(&config.wallet.hotkey, &hotkey);
        prop_assert_eq!(config.netuid, netuid);
        prop_assert_eq!(&config.extra[&param], &serde_json::json!(value));
        prop_assert_eq!(
            config.full_path,
            config::full_path(config::DEFAULT_LOGGING_DIR, &wallet, &hotkey, netuid)
        );
    }

    #[test]
    fn prop_cli_beats_env(cli_name in name(), env_name in name()) {
        let cli = ConfigOverrides {
            wallet_name: Some(cli_name.clone()),
            ..Default::default()
        };
        let env = env_from(HashMap::from([(env::WALLET_NAME.to_string(), env_name)]));

        let config = MinerConfig::build(cli.or(env), FileParams::default());
        prop_assert_eq!(config.wallet.name, cli_name);
    }
}

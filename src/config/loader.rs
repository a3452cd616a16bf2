//! File-based miner parameters.
//!
//! The parameter file is TOML. A `[commitment]` table may set the commitment
//! identity; every other top-level key is carried opaquely into
//! [`MinerConfig::extra`](super::MinerConfig) (protein selection parameters
//! and the like).
//!
//! ```toml
//! num_molecules = 100
//! antitarget_weight = 0.9
//!
//! [commitment]
//! owner = "my-org"
//! repo = "nova-miner"
//! branch = "main"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::ConfigError;

/// Parameter file used when none is named explicitly
pub const DEFAULT_CONFIG_FILE: &str = "config/config.toml";

/// Commitment fields a parameter file may supply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileCommitment {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub netuid: Option<u16>,
}

/// Parameters loaded from the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileParams {
    /// Path the parameters were read from, if a file was found
    pub source: Option<PathBuf>,
    pub commitment: FileCommitment,
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Load the parameter file.
///
/// With `path = None` the default file is tried and a missing file yields
/// empty parameters. An explicitly named file must exist.
pub fn load(path: Option<&Path>) -> Result<FileParams, ConfigError> {
    let (path, required) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    if !path.exists() {
        if required {
            return Err(ConfigError::with_path(
                "parameter file not found",
                path.display().to_string(),
            ));
        }
        return Ok(FileParams::default());
    }

    let raw = std::fs::read_to_string(&path).map_err(|e| {
        ConfigError::with_path(format!("failed to read: {}", e), path.display().to_string())
    })?;
    let mut params = parse(&raw).map_err(|e| ConfigError {
        path: Some(path.display().to_string()),
        ..e
    })?;
    params.source = Some(path);
    Ok(params)
}

/// Parse parameter file contents.
pub fn parse(raw: &str) -> Result<FileParams, ConfigError> {
    let mut table: toml::Table =
        toml::from_str(raw).map_err(|e| ConfigError::new(format!("invalid TOML: {}", e)))?;

    let commitment = match table.remove("commitment") {
        Some(value) => value
            .try_into::<FileCommitment>()
            .map_err(|e| ConfigError::new(format!("invalid [commitment] table: {}", e)))?,
        None => FileCommitment::default(),
    };

    let mut extra = BTreeMap::new();
    for (key, value) in table {
        let json = serde_json::to_value(value)
            .map_err(|e| ConfigError::new(format!("unsupported value for '{}': {}", key, e)))?;
        extra.insert(key, json);
    }

    Ok(FileParams {
        source: None,
        commitment,
        extra,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_extra_and_commitment() {
        let params = parse(
            r#"
            num_molecules = 100
            antitarget_weight = 0.9
            targets = ["P21554", "O15399"]

            [commitment]
            owner = "acme"
            branch = "dev"
            "#,
        )
        .unwrap();

        assert_eq!(params.extra["num_molecules"], serde_json::json!(100));
        assert_eq!(params.extra["antitarget_weight"], serde_json::json!(0.9));
        assert_eq!(
            params.extra["targets"],
            serde_json::json!(["P21554", "O15399"])
        );
        assert!(!params.extra.contains_key("commitment"));
        assert_eq!(params.commitment.owner.as_deref(), Some("acme"));
        assert_eq!(params.commitment.repo, None);
        assert_eq!(params.commitment.branch.as_deref(), Some("dev"));
    }

    #[test]
    fn test_parse_rejects_unknown_commitment_field() {
        assert!(parse("[commitment]\nrepository = \"x\"").is_err());
        assert!(parse("not toml at all = = =").is_err());
    }

    #[test]
    fn test_missing_default_file_is_empty() {
        let params = load(None);
        // The default file is relative to the working directory and may exist
        // in a checkout; either way loading must not fail on absence.
        assert!(params.is_ok());
    }

    #[test]
    fn test_missing_explicit_file_errors() {
        let dir = tempdir().unwrap();
        let err = load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.path.is_some());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("miner.toml");
        std::fs::write(&path, "sample_size = 8\n").unwrap();

        let params = load(Some(&path)).unwrap();
        assert_eq!(params.source.as_deref(), Some(path.as_path()));
        assert_eq!(params.extra["sample_size"], serde_json::json!(8));
    }
}

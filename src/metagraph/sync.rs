use crate::chain::SubtensorClient;
use crate::errors::{ChainQueryError, MinerResult};
use crate::metagraph::Metagraph;
use crate::wallet::ss58_encode;
use subxt::dynamic::{DecodedValueThunk, Value};
use tracing::debug;

pub const SUBTENSOR_MODULE: &str = "SubtensorModule";

/// Whether a subnet has been added to the chain
pub async fn subnet_exists(client: &SubtensorClient, netuid: u16) -> MinerResult<bool> {
    let value = client
        .storage(
            SUBTENSOR_MODULE,
            "NetworksAdded",
            vec![Value::u128(netuid as u128)],
        )
        .await?;
    Ok(match value {
        Some(thunk) => thunk.encoded().first().copied().unwrap_or(0) != 0,
        None => false,
    })
}

/// Synchronize metagraph data from the chain
///
/// Reads the block number, the subnet size and the `Keys` map
/// (uid -> hotkey) for `metagraph.netuid`.
pub async fn sync_metagraph(
    client: &SubtensorClient,
    metagraph: &mut Metagraph,
) -> MinerResult<()> {
    let netuid = metagraph.netuid;
    metagraph.block = client.block_number().await?;

    let n = match client
        .storage(
            SUBTENSOR_MODULE,
            "SubnetworkN",
            vec![Value::u128(netuid as u128)],
        )
        .await?
    {
        Some(thunk) => decode_u16(&thunk).ok_or_else(|| {
            ChainQueryError::with_storage(
                "Failed to decode subnet size",
                SUBTENSOR_MODULE,
                "SubnetworkN",
            )
        })?,
        None => 0,
    };

    let keys_query = subxt::dynamic::storage(
        SUBTENSOR_MODULE,
        "Keys",
        vec![Value::u128(netuid as u128)],
    );
    let query_error =
        |e: subxt::Error| ChainQueryError::with_storage(e.to_string(), SUBTENSOR_MODULE, "Keys");
    let mut keys_iter = client
        .api()
        .storage()
        .at_latest()
        .await
        .map_err(query_error)?
        .iter(keys_query)
        .await
        .map_err(query_error)?;

    let mut entries = Vec::new();
    while let Some(kv) = keys_iter.next().await {
        let kv = kv.map_err(query_error)?;
        if let (Some(uid), Some(account)) =
            (uid_from_key(&kv.key_bytes), decode_account(&kv.value))
        {
            entries.push((uid, account));
        }
    }

    metagraph.set_hotkeys(hotkeys_by_uid(n, entries));
    debug!(netuid, n, block = metagraph.block, "Metagraph synced");
    Ok(())
}

/// Extract UID from storage key
fn uid_from_key(key: &[u8]) -> Option<u16> {
    if key.len() >= 2 {
        let uid_bytes = &key[key.len() - 2..];
        Some(u16::from_le_bytes([uid_bytes[0], uid_bytes[1]]))
    } else {
        None
    }
}

/// AccountId32 values are the raw 32 public key bytes
fn decode_account(value: &DecodedValueThunk) -> Option<[u8; 32]> {
    value.encoded().try_into().ok()
}

fn decode_u16(value: &DecodedValueThunk) -> Option<u16> {
    let bytes: [u8; 2] = value.encoded().try_into().ok()?;
    Some(u16::from_le_bytes(bytes))
}

/// Lay `(uid, public key)` pairs out by UID. UIDs at or beyond `n` are
/// ignored; gaps stay empty strings.
fn hotkeys_by_uid(n: u16, entries: Vec<(u16, [u8; 32])>) -> Vec<String> {
    let mut hotkeys = vec![String::new(); n as usize];
    for (uid, account) in entries {
        if let Some(slot) = hotkeys.get_mut(uid as usize) {
            *slot = ss58_encode(&account);
        }
    }
    hotkeys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::Keypair;

    #[test]
    fn test_uid_from_key() {
        let mut key = vec![0xAAu8; 40];
        key.extend_from_slice(&7u16.to_le_bytes());
        assert_eq!(uid_from_key(&key), Some(7));
        assert_eq!(uid_from_key(&[1]), None);
    }

    #[test]
    fn test_hotkeys_by_uid() {
        let alice = Keypair::from_uri("//Alice").unwrap();
        let bob = Keypair::from_uri("//Bob").unwrap();

        let hotkeys = hotkeys_by_uid(
            3,
            vec![
                (2, *alice.public_key()),
                (0, *bob.public_key()),
                (9, *alice.public_key()),
            ],
        );

        assert_eq!(hotkeys.len(), 3);
        assert_eq!(hotkeys[0], bob.ss58_address());
        assert_eq!(hotkeys[1], "");
        assert_eq!(hotkeys[2], alice.ss58_address());
    }
}

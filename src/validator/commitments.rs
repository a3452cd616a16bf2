use crate::chain::{PairSigner, SubtensorClient};
use crate::errors::{MetadataError, MinerResult};
use subxt::dynamic::Value;

const COMMITMENTS_MODULE: &str = "Commitments";

/// Largest payload a single `RawN` commitment field can hold
pub const MAX_COMMITMENT_BYTES: usize = 128;

/// Set a commitment on-chain for a given subnet.
///
/// Commitments pallet dispatch: `set_commitment(netuid, info)` where `info`
/// carries one `RawN` data field.
///
/// # Arguments
/// * `client` - The subtensor client.
/// * `signer` - The hotkey signer.
/// * `netuid` - The subnet ID.
/// * `data` - The commitment bytes, at most 128.
pub async fn set_commitment(
    client: &SubtensorClient,
    signer: &PairSigner,
    netuid: u16,
    data: &[u8],
) -> MinerResult<bool> {
    let args = vec![Value::from(netuid), commitment_info(data)?];

    client
        .submit_extrinsic(COMMITMENTS_MODULE, "set_commitment", args, signer)
        .await
}

/// `CommitmentInfo { fields: [Raw<len>(data)] }`
pub fn commitment_info(data: &[u8]) -> Result<Value, MetadataError> {
    Ok(Value::named_composite([(
        "fields",
        Value::unnamed_composite(vec![raw_field(data)?]),
    )]))
}

/// The `Data::RawN` variant sized to the payload.
pub fn raw_field(data: &[u8]) -> Result<Value, MetadataError> {
    if data.len() > MAX_COMMITMENT_BYTES {
        return Err(MetadataError::new(format!(
            "Commitment is {} bytes, at most {} fit in one field",
            data.len(),
            MAX_COMMITMENT_BYTES
        )));
    }
    Ok(Value::unnamed_variant(
        format!("Raw{}", data.len()),
        [Value::from_bytes(data)],
    ))
}

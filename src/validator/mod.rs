pub mod commitments;

pub use commitments::{commitment_info, set_commitment, MAX_COMMITMENT_BYTES};

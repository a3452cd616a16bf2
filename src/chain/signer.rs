use sp_core::{sr25519, Pair};
use sp_runtime::{
    traits::{IdentifyAccount, Verify},
    MultiSignature as SpMultiSignature,
};
use subxt::{
    config::substrate::{AccountId32, MultiSignature},
    tx::Signer,
    Config, PolkadotConfig,
};

use crate::wallet::Wallet;

/// sr25519 signer for subxt 0.44 extrinsics
#[derive(Clone)]
pub struct PairSigner {
    account_id: <PolkadotConfig as Config>::AccountId,
    signer: sr25519::Pair,
}

impl PairSigner {
    /// Creates a new PairSigner from an sr25519::Pair
    pub fn new(signer: sr25519::Pair) -> Self {
        let account_id =
            <SpMultiSignature as Verify>::Signer::from(Pair::public(&signer)).into_account();
        Self {
            // sp_core::AccountId32 -> subxt::config::substrate::AccountId32
            account_id: AccountId32(account_id.into()),
            signer,
        }
    }

    /// Signer for a wallet's hotkey
    pub fn from_wallet(wallet: &Wallet) -> Self {
        Self::new(wallet.hotkey().pair().clone())
    }

    /// Return the account ID
    pub fn account_id(&self) -> &AccountId32 {
        &self.account_id
    }
}

impl Signer<PolkadotConfig> for PairSigner {
    fn account_id(&self) -> <PolkadotConfig as Config>::AccountId {
        self.account_id.clone()
    }

    fn sign(&self, signer_payload: &[u8]) -> <PolkadotConfig as Config>::Signature {
        let signature = Pair::sign(&self.signer, signer_payload);
        MultiSignature::Sr25519(signature.0)
    }
}

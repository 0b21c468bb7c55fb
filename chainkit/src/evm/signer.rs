//! EVM transaction signing

use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;
use ethers::utils::keccak256;

use crate::chain::ChainFamily;
use crate::crypto::keys::PrivateKey;
use crate::crypto::signing::ensure_family;
use crate::error::{Error, Result};
use super::types::{EvmUnsignedTransaction, SignedEvmTransaction};

/// Signs legacy (EIP-155) transactions with a local key
pub struct EvmSigner {
    wallet: LocalWallet,
}

impl EvmSigner {
    pub fn new(key: &PrivateKey, chain_id: u64) -> Result<Self> {
        ensure_family(key, ChainFamily::Evm)?;
        let wallet = LocalWallet::from_bytes(key.as_bytes())
            .map_err(|e| Error::Signing(format!("Invalid signing key: {}", e)))?
            .with_chain_id(chain_id);
        Ok(Self { wallet })
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    /// Sign a fully populated transaction
    pub fn sign(&self, tx: &EvmUnsignedTransaction) -> Result<SignedEvmTransaction> {
        if !tx.is_complete() {
            return Err(Error::MissingTemplateInput("nonce, gasLimit and gasPrice".to_string()));
        }
        if tx.chain_id != self.wallet.chain_id() {
            return Err(Error::ChainMismatch {
                expected: self.wallet.chain_id().to_string(),
                actual: tx.chain_id.to_string(),
            });
        }

        let typed = tx.to_typed(Some(self.address()));
        let signature = self
            .wallet
            .sign_transaction_sync(&typed)
            .map_err(|e| Error::Signing(format!("Failed to sign transaction: {}", e)))?;
        let raw = typed.rlp_signed(&signature);
        let hash = keccak256(&raw).into();

        Ok(SignedEvmTransaction { raw, hash })
    }
}

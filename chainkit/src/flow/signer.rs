//! Flow transaction signers

use std::sync::Arc;

use async_trait::async_trait;

use crate::chain::ChainFamily;
use crate::crypto::keys::PrivateKey;
use crate::crypto::{ensure_family, sign_sha3_256};
use crate::error::Result;
use super::address::FlowAddress;

/// Signs Flow messages on behalf of one account key
#[async_trait]
pub trait FlowSigner: Send + Sync {
    fn address(&self) -> FlowAddress;

    fn key_index(&self) -> u32;

    /// Signature over `message`, `r || s`
    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>>;
}

/// Signer backed by a private key held in memory
#[derive(Debug)]
pub struct LocalKeySigner {
    address: FlowAddress,
    key_index: u32,
    key: PrivateKey,
}

impl LocalKeySigner {
    pub fn new(address: FlowAddress, key_index: u32, key: PrivateKey) -> Result<Self> {
        ensure_family(&key, ChainFamily::Flow)?;
        Ok(Self {
            address,
            key_index,
            key,
        })
    }
}

#[async_trait]
impl FlowSigner for LocalKeySigner {
    fn address(&self) -> FlowAddress {
        self.address
    }

    fn key_index(&self) -> u32 {
        self.key_index
    }

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        Ok(sign_sha3_256(&self.key, message)?.to_vec())
    }
}

/// Signers filling the proposer, payer and authorizer roles
#[derive(Clone)]
pub struct FlowRoles {
    pub proposer: Arc<dyn FlowSigner>,
    pub payer: Arc<dyn FlowSigner>,
    pub authorizers: Vec<Arc<dyn FlowSigner>>,
}

impl FlowRoles {
    /// One account acting in every role
    pub fn single(signer: Arc<dyn FlowSigner>) -> Self {
        Self {
            proposer: signer.clone(),
            payer: signer.clone(),
            authorizers: vec![signer],
        }
    }

    /// Distinct keys that sign the payload: every non-payer account key
    pub(crate) fn payload_signers(&self) -> Vec<Arc<dyn FlowSigner>> {
        let payer = self.payer.address();
        let mut signers: Vec<Arc<dyn FlowSigner>> = Vec::new();
        for signer in std::iter::once(&self.proposer).chain(self.authorizers.iter()) {
            if signer.address() != payer && !contains(&signers, signer.as_ref()) {
                signers.push(signer.clone());
            }
        }
        signers
    }

    /// Distinct keys that sign the envelope: every key of the payer account
    pub(crate) fn envelope_signers(&self) -> Vec<Arc<dyn FlowSigner>> {
        let payer = self.payer.address();
        let mut signers: Vec<Arc<dyn FlowSigner>> = vec![self.payer.clone()];
        for signer in std::iter::once(&self.proposer).chain(self.authorizers.iter()) {
            if signer.address() == payer && !contains(&signers, signer.as_ref()) {
                signers.push(signer.clone());
            }
        }
        signers
    }
}

fn contains(signers: &[Arc<dyn FlowSigner>], candidate: &dyn FlowSigner) -> bool {
    signers
        .iter()
        .any(|s| s.address() == candidate.address() && s.key_index() == candidate.key_index())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::derive_private_key_from_mnemonic;
    use crate::crypto::verify_sha3_256;
    use crate::error::Error;

    const MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn signer(address: u64, key_index: u32) -> Arc<dyn FlowSigner> {
        let key = derive_private_key_from_mnemonic(MNEMONIC, key_index, ChainFamily::Flow).unwrap();
        Arc::new(LocalKeySigner::new(FlowAddress::from_u64(address), key_index, key).unwrap())
    }

    #[tokio::test]
    async fn test_local_signer_verifies() {
        let key = derive_private_key_from_mnemonic(MNEMONIC, 0, ChainFamily::Flow).unwrap();
        let public_key = key.public_key().unwrap();
        let signer = LocalKeySigner::new(FlowAddress::from_u64(1), 0, key).unwrap();

        let signature = signer.sign(b"message").await.unwrap();
        assert_eq!(signature.len(), 64);
        assert!(verify_sha3_256(&public_key, b"message", &signature).unwrap());
    }

    #[test]
    fn test_rejects_evm_key() {
        let key = derive_private_key_from_mnemonic(MNEMONIC, 0, ChainFamily::Evm).unwrap();
        assert!(matches!(
            LocalKeySigner::new(FlowAddress::from_u64(1), 0, key),
            Err(Error::ChainMismatch { .. })
        ));
    }

    #[test]
    fn test_single_account_only_signs_envelope() {
        let roles = FlowRoles::single(signer(1, 0));
        assert!(roles.payload_signers().is_empty());
        assert_eq!(roles.envelope_signers().len(), 1);
    }

    #[test]
    fn test_sponsored_transaction_roles() {
        let roles = FlowRoles {
            proposer: signer(1, 0),
            payer: signer(2, 0),
            authorizers: vec![signer(1, 0)],
        };
        let payload = roles.payload_signers();
        assert_eq!(payload.len(), 1);
        assert_eq!(payload[0].address(), FlowAddress::from_u64(1));
        assert_eq!(roles.envelope_signers().len(), 1);
    }
}

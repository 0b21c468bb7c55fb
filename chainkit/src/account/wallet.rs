//! Mnemonic backed wallets

use std::fmt;

use zeroize::Zeroizing;

use crate::chain::ChainFamily;
use crate::crypto::keys::{derive_private_key_from_mnemonic, ethereum, flow, PrivateKey};
use crate::crypto::mnemonic::{generate_mnemonic, validate_mnemonic, MnemonicStrength};
use crate::error::Result;

/// A BIP-39 mnemonic bound to a chain family
pub struct Wallet {
    mnemonic: Zeroizing<String>,
    family: ChainFamily,
}

impl Wallet {
    /// Generate a wallet with a fresh mnemonic
    pub fn generate(family: ChainFamily, strength: MnemonicStrength) -> Result<Self> {
        Ok(Self {
            mnemonic: generate_mnemonic(strength)?,
            family,
        })
    }

    /// Restore a wallet from an existing mnemonic
    pub fn from_mnemonic(mnemonic: &str, family: ChainFamily) -> Result<Self> {
        validate_mnemonic(mnemonic)?;
        Ok(Self {
            mnemonic: Zeroizing::new(mnemonic.trim().to_string()),
            family,
        })
    }

    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    pub fn family(&self) -> ChainFamily {
        self.family
    }

    /// Private key at `index` along the family's derivation path
    pub fn private_key(&self, index: u32) -> Result<PrivateKey> {
        derive_private_key_from_mnemonic(&self.mnemonic, index, self.family)
    }

    /// Address (EVM) or account public key (Flow) at `index`
    pub fn address(&self, index: u32) -> Result<String> {
        address_from_private_key(&self.private_key(index)?)
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("mnemonic", &"<redacted>")
            .field("family", &self.family)
            .finish()
    }
}

/// Address for a private key.
///
/// Flow addresses are assigned on chain when an account is created, so Flow keys
/// yield the hex public key that account creation expects.
pub fn address_from_private_key(key: &PrivateKey) -> Result<String> {
    let public_key = key.public_key()?;
    match key.family() {
        ChainFamily::Evm => ethereum::public_key_to_address(&public_key),
        ChainFamily::Flow => flow::public_key_to_hex(&public_key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MNEMONIC: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_generated_wallet_derives_addresses() {
        let wallet = Wallet::generate(ChainFamily::Evm, MnemonicStrength::Words24).unwrap();
        assert_eq!(wallet.mnemonic().split_whitespace().count(), 24);
        assert!(wallet.address(0).unwrap().starts_with("0x"));
        assert_ne!(wallet.address(0).unwrap(), wallet.address(1).unwrap());
    }

    #[test]
    fn test_restored_evm_address() {
        let wallet = Wallet::from_mnemonic(MNEMONIC, ChainFamily::Evm).unwrap();
        assert_eq!(wallet.address(0).unwrap(), "0x9858effd232b4033e47d90003d41ec34ecaeda94");
    }

    #[test]
    fn test_flow_address_is_public_key() {
        let wallet = Wallet::from_mnemonic(MNEMONIC, ChainFamily::Flow).unwrap();
        let public_key = wallet.address(0).unwrap();
        assert_eq!(public_key.len(), 128);
        assert!(!format!("{:?}", wallet).contains("abandon"));
    }

    #[test]
    fn test_invalid_mnemonic_is_rejected() {
        assert!(Wallet::from_mnemonic("not a mnemonic", ChainFamily::Flow).is_err());
    }
}

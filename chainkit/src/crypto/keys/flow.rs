//! Flow key helpers
//!
//! Flow addresses are assigned by the chain on account creation, so the only
//! thing derived locally is the public key registered on the account.

use crate::chain::ChainFamily;
use crate::error::{Error, Result};
use super::derivation::PublicKey;

/// Hex encoded 64-byte public key (uncompressed, without the `0x04` prefix)
pub fn public_key_to_hex(public_key: &PublicKey) -> Result<String> {
    if public_key.family() != ChainFamily::Flow {
        return Err(Error::KeyDerivation("Not a Flow public key".to_string()));
    }

    let bytes = public_key.as_bytes();
    if bytes.len() != 65 {
        return Err(Error::KeyDerivation("Invalid Flow public key length".to_string()));
    }

    Ok(hex::encode(&bytes[1..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::derive_private_key_from_mnemonic;

    #[test]
    fn test_public_key_hex_length() {
        let mnemonic = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        let key = derive_private_key_from_mnemonic(mnemonic, 0, ChainFamily::Flow).unwrap();
        let hex_key = public_key_to_hex(&key.public_key().unwrap()).unwrap();
        assert_eq!(hex_key.len(), 128);
    }

    #[test]
    fn test_rejects_other_family() {
        let mnemonic = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        let key = derive_private_key_from_mnemonic(mnemonic, 0, ChainFamily::Evm).unwrap();
        assert!(public_key_to_hex(&key.public_key().unwrap()).is_err());
    }
}

//! Ethereum address helpers

use sha3::{Digest, Keccak256};

use crate::chain::ChainFamily;
use crate::error::{Error, Result};
use super::derivation::PublicKey;

/// Get the EVM address (lowercase hex, `0x` prefixed) from a public key
pub fn public_key_to_address(public_key: &PublicKey) -> Result<String> {
    if public_key.family() != ChainFamily::Evm {
        return Err(Error::KeyDerivation("Not an EVM public key".to_string()));
    }

    let public_key = public_key.as_bytes();
    if public_key.len() != 65 {
        return Err(Error::KeyDerivation("Invalid EVM public key length".to_string()));
    }

    // Skip the 0x04 prefix and keep the last 20 bytes of the hash
    let key_hash = keccak256(&public_key[1..]);
    Ok(format!("0x{}", hex::encode(&key_hash[12..])))
}

fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

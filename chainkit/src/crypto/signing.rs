//! ECDSA message signing
//!
//! Flow signatures are secp256k1 ECDSA over a SHA3-256 digest, encoded as the
//! 32-byte big-endian `r` followed by the 32-byte big-endian `s`.

use secp256k1::{ecdsa::Signature, Message, PublicKey as Secp256k1PublicKey, Secp256k1};
use sha3::{Digest, Sha3_256};

use crate::chain::ChainFamily;
use crate::error::{Error, Result};
use super::keys::{PrivateKey, PublicKey};

/// SHA3-256 digest
pub fn sha3_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Fail with `ChainMismatch` if `key` belongs to a different family
pub fn ensure_family(key: &PrivateKey, expected: ChainFamily) -> Result<()> {
    if key.family() != expected {
        return Err(Error::ChainMismatch {
            expected: expected.to_string(),
            actual: key.family().to_string(),
        });
    }
    Ok(())
}

/// Sign `message` with SHA3-256 + secp256k1, returning `r || s`
pub fn sign_sha3_256(key: &PrivateKey, message: &[u8]) -> Result<[u8; 64]> {
    let secp = Secp256k1::signing_only();
    let digest = Message::from_digest(sha3_256(message));
    let signature = secp.sign_ecdsa(&digest, &key.secret_key()?);
    Ok(signature.serialize_compact())
}

/// Hex form of [`sign_sha3_256`]
pub fn sign_hex(key: &PrivateKey, message: &[u8]) -> Result<String> {
    Ok(hex::encode(sign_sha3_256(key, message)?))
}

/// Verify an `r || s` signature produced by [`sign_sha3_256`]
pub fn verify_sha3_256(public_key: &PublicKey, message: &[u8], signature: &[u8]) -> Result<bool> {
    let secp = Secp256k1::verification_only();
    let public_key = Secp256k1PublicKey::from_slice(public_key.as_bytes())
        .map_err(|e| Error::Signing(format!("Invalid public key: {}", e)))?;
    let signature = Signature::from_compact(signature)
        .map_err(|e| Error::Signing(format!("Invalid signature: {}", e)))?;
    let digest = Message::from_digest(sha3_256(message));
    Ok(secp.verify_ecdsa(&digest, &signature, &public_key).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::derive_private_key_from_mnemonic;

    fn flow_key() -> PrivateKey {
        let mnemonic = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        derive_private_key_from_mnemonic(mnemonic, 0, ChainFamily::Flow).unwrap()
    }

    #[test]
    fn test_signature_is_fixed_width() {
        let key = flow_key();
        let signature = sign_hex(&key, b"hello flow").unwrap();
        assert_eq!(signature.len(), 128);
    }

    #[test]
    fn test_sign_and_verify() {
        let key = flow_key();
        let signature = sign_sha3_256(&key, b"payload").unwrap();
        let public_key = key.public_key().unwrap();
        assert!(verify_sha3_256(&public_key, b"payload", &signature).unwrap());
        assert!(!verify_sha3_256(&public_key, b"other", &signature).unwrap());
    }

    #[test]
    fn test_signing_is_deterministic() {
        // RFC 6979 nonces
        let key = flow_key();
        assert_eq!(sign_hex(&key, b"x").unwrap(), sign_hex(&key, b"x").unwrap());
    }

    #[test]
    fn test_ensure_family() {
        let key = flow_key();
        assert!(ensure_family(&key, ChainFamily::Flow).is_ok());
        assert!(matches!(
            ensure_family(&key, ChainFamily::Evm),
            Err(Error::ChainMismatch { .. })
        ));
    }
}

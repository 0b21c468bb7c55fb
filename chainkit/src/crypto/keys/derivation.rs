//! Common key derivation functionality

use std::fmt;

use coins_bip32::path::DerivationPath;
use coins_bip32::prelude::*;
use ethers_core::k256::ecdsa::SigningKey;
use secp256k1::{PublicKey as Secp256k1PublicKey, Secp256k1, SecretKey};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::chain::ChainFamily;
use crate::crypto::mnemonic::mnemonic_to_seed;
use crate::error::{Error, Result};

/// A secp256k1 private key bound to a chain family.
///
/// The key bytes are wiped when the value is dropped and never appear in `Debug` output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    bytes: [u8; 32],
    #[zeroize(skip)]
    family: ChainFamily,
}

impl PrivateKey {
    /// Create a private key from raw bytes, checking it is a valid scalar
    pub fn from_bytes(bytes: [u8; 32], family: ChainFamily) -> Result<Self> {
        SecretKey::from_slice(&bytes)
            .map_err(|e| Error::KeyDerivation(format!("Invalid private key: {}", e)))?;
        Ok(Self { bytes, family })
    }

    /// Parse a hex encoded private key, with or without `0x`
    pub fn from_hex(hex_key: &str, family: ChainFamily) -> Result<Self> {
        let trimmed = hex_key.trim();
        let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let decoded = Zeroizing::new(
            hex::decode(stripped)
                .map_err(|_| Error::KeyDerivation("Private key is not valid hex".to_string()))?,
        );
        if decoded.len() != 32 {
            return Err(Error::KeyDerivation(format!(
                "Private key must be 32 bytes, got {}",
                decoded.len()
            )));
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&decoded);
        let key = Self::from_bytes(bytes, family);
        bytes.zeroize();
        key
    }

    /// Get the raw private key bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Get the chain family
    pub fn family(&self) -> ChainFamily {
        self.family
    }

    /// Hex encoding without prefix
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.bytes))
    }

    pub(crate) fn secret_key(&self) -> Result<SecretKey> {
        SecretKey::from_slice(&self.bytes)
            .map_err(|e| Error::KeyDerivation(format!("Invalid private key: {}", e)))
    }

    /// Derive the matching public key
    pub fn public_key(&self) -> Result<PublicKey> {
        let secp = Secp256k1::signing_only();
        let public_key = Secp256k1PublicKey::from_secret_key(&secp, &self.secret_key()?);
        Ok(PublicKey::new(
            public_key.serialize_uncompressed().to_vec(),
            self.family,
        ))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}

/// An uncompressed secp256k1 public key for a chain family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    /// 65 bytes, `0x04` prefixed
    bytes: Vec<u8>,
    family: ChainFamily,
}

impl PublicKey {
    pub fn new(bytes: Vec<u8>, family: ChainFamily) -> Self {
        Self { bytes, family }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn family(&self) -> ChainFamily {
        self.family
    }
}

/// A key pair for a specific chain family
#[derive(Debug, Clone)]
pub struct KeyPair {
    private_key: PrivateKey,
    public_key: PublicKey,
}

impl KeyPair {
    /// Create a new key pair
    pub fn new(private_key: PrivateKey, public_key: PublicKey) -> Result<Self> {
        if private_key.family() != public_key.family() {
            return Err(Error::KeyDerivation("Key family mismatch".to_string()));
        }
        Ok(Self {
            private_key,
            public_key,
        })
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn family(&self) -> ChainFamily {
        self.private_key.family()
    }
}

/// Derive a key pair from a seed along a BIP-32 path
pub fn derive_key_pair(seed: &[u8], family: ChainFamily, path: &str) -> Result<KeyPair> {
    let private_key = derive_private_key(seed, family, path)?;
    let public_key = private_key.public_key()?;
    KeyPair::new(private_key, public_key)
}

/// Derive a private key from a seed along a BIP-32 path
pub fn derive_private_key(seed: &[u8], family: ChainFamily, path: &str) -> Result<PrivateKey> {
    let path = path
        .parse::<DerivationPath>()
        .map_err(|e| Error::KeyDerivation(format!("Invalid derivation path {}: {}", path, e)))?;

    let derived = XPriv::root_from_seed(seed, None)
        .map_err(|e| Error::KeyDerivation(format!("Failed to derive master key: {}", e)))?
        .derive_path(&path)
        .map_err(|e| Error::KeyDerivation(format!("Failed to derive child key: {}", e)))?;

    let signing_key: &SigningKey = derived.as_ref();
    let mut secret_key = [0u8; 32];
    secret_key.copy_from_slice(&signing_key.to_bytes());

    let key = PrivateKey::from_bytes(secret_key, family);
    secret_key.zeroize();
    key
}

/// Derive the private key at `index` on the family's default path
pub fn derive_private_key_from_mnemonic(
    mnemonic: &str,
    index: u32,
    family: ChainFamily,
) -> Result<PrivateKey> {
    let seed = Zeroizing::new(mnemonic_to_seed(mnemonic, None)?);
    derive_private_key(&seed, family, &family.derivation_path(index))
}

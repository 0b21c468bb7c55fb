//! Signing material resolution
//!
//! A body may carry a private key, a mnemonic with an index, a signature id, or any
//! mix of them. Resolution picks exactly one, in that order of precedence.

use tracing::debug;
use zeroize::Zeroizing;

use crate::chain::ChainFamily;
use crate::crypto::keys::{derive_private_key_from_mnemonic, PrivateKey};
use crate::error::{Error, MissingKey, Result};
use super::types::{present, SignerFields};

/// The signing material a body resolved to
#[derive(Clone)]
pub enum SigningMaterial {
    /// Hex encoded private key
    RawPrivateKey(Zeroizing<String>),
    /// Mnemonic plus derivation index
    MnemonicDerivation {
        mnemonic: Zeroizing<String>,
        index: u32,
    },
    /// Key held by an external signer
    RemoteSignatureRequest {
        signature_id: String,
        index: Option<u32>,
    },
}

impl std::fmt::Debug for SigningMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RawPrivateKey(_) => f.write_str("RawPrivateKey(<redacted>)"),
            Self::MnemonicDerivation { index, .. } => f
                .debug_struct("MnemonicDerivation")
                .field("index", index)
                .finish_non_exhaustive(),
            Self::RemoteSignatureRequest {
                signature_id,
                index,
            } => f
                .debug_struct("RemoteSignatureRequest")
                .field("signature_id", signature_id)
                .field("index", index)
                .finish(),
        }
    }
}

impl SigningMaterial {
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteSignatureRequest { .. })
    }

    /// Turn local material into a private key for `family`
    pub fn into_private_key(self, family: ChainFamily) -> Result<PrivateKey> {
        match self {
            Self::RawPrivateKey(hex_key) => PrivateKey::from_hex(&hex_key, family),
            Self::MnemonicDerivation { mnemonic, index } => {
                derive_private_key_from_mnemonic(&mnemonic, index, family)
            }
            Self::RemoteSignatureRequest { .. } => Err(Error::UnsupportedCombination(
                "signature id material must be routed to the external signer".to_string(),
            )),
        }
    }
}

/// Pick the signing material a body carries.
///
/// Private key wins over mnemonic, mnemonic over signature id. A mnemonic without an
/// index is skipped; if nothing else is present the error names the missing index.
pub fn resolve(fields: &SignerFields) -> Result<SigningMaterial> {
    if let Some(private_key) = present(&fields.private_key) {
        debug!(material = "private_key", "resolved signing material");
        return Ok(SigningMaterial::RawPrivateKey(Zeroizing::new(
            private_key.to_string(),
        )));
    }

    let mnemonic = present(&fields.mnemonic);
    if let (Some(mnemonic), Some(index)) = (mnemonic, fields.index) {
        debug!(material = "mnemonic", index, "resolved signing material");
        return Ok(SigningMaterial::MnemonicDerivation {
            mnemonic: Zeroizing::new(mnemonic.to_string()),
            index,
        });
    }

    if let Some(signature_id) = fields.remote_signature_id() {
        debug!(material = "signature_id", signature_id, "resolved signing material");
        return Ok(SigningMaterial::RemoteSignatureRequest {
            signature_id: signature_id.to_string(),
            index: fields.index,
        });
    }

    if mnemonic.is_some() {
        Err(Error::MissingKeyMaterial(MissingKey::MnemonicIndex))
    } else {
        Err(Error::MissingKeyMaterial(MissingKey::PrivateKey))
    }
}

/// A key ready to sign with, or a pointer to an external signer
#[derive(Debug, Clone)]
pub enum ResolvedKey {
    Local(PrivateKey),
    Remote {
        signature_id: String,
        index: Option<u32>,
    },
}

/// Resolve `fields` and materialise local keys for `family`
pub fn resolve_key(fields: &SignerFields, family: ChainFamily) -> Result<ResolvedKey> {
    match resolve(fields)? {
        SigningMaterial::RemoteSignatureRequest {
            signature_id,
            index,
        } => Ok(ResolvedKey::Remote {
            signature_id,
            index,
        }),
        local => Ok(ResolvedKey::Local(local.into_private_key(family)?)),
    }
}

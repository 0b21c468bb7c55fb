//! Error types for chainkit

use std::fmt;

use thiserror::Error;

use crate::chain::Chain;
use crate::transaction::TransactionState;

/// Which piece of signing material was missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingKey {
    /// Neither a private key, a mnemonic nor a signature id was supplied
    PrivateKey,
    /// A mnemonic was supplied without a derivation index
    MnemonicIndex,
}

impl fmt::Display for MissingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrivateKey => f.write_str("no private key, mnemonic or signature id supplied"),
            Self::MnemonicIndex => f.write_str("mnemonic supplied without derivation index"),
        }
    }
}

/// Error taxonomy callers can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingKeyMaterial,
    ChainMismatch,
    UpstreamApiFailure,
    ChainSubmissionFailure,
    ChainConfirmationFailure,
    UnsupportedOperationCombination,
    InvalidInput,
    Crypto,
    Transport,
    Cancelled,
    Config,
}

/// Custom error type for chainkit operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing key material: {0}")]
    MissingKeyMaterial(MissingKey),

    #[error("Chain mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: String, actual: String },

    #[error("Hosted API error ({status}): {message}")]
    Api {
        status: u16,
        error_code: Option<String>,
        message: String,
    },

    #[error("Unable to generate custodial wallet address")]
    CustodialWalletGeneration,

    #[error("Submission to {chain} failed: {message}")]
    Submission { chain: Chain, message: String },

    #[error("Transaction {id} failed on {chain}: {message}")]
    Confirmation {
        chain: Chain,
        id: String,
        message: String,
    },

    #[error("Unsupported operation combination: {0}")]
    UnsupportedCombination(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Missing template input: {0}")]
    MissingTemplateInput(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Decimals lookup failed for {token}: {message}")]
    DecimalsLookup { token: String, message: String },

    #[error("Mnemonic error: {0}")]
    Mnemonic(String),

    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Invalid transaction state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: TransactionState,
        to: TransactionState,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    /// Coarse error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingKeyMaterial(_) => ErrorKind::MissingKeyMaterial,
            Self::ChainMismatch { .. } => ErrorKind::ChainMismatch,
            Self::Api { .. } | Self::CustodialWalletGeneration => ErrorKind::UpstreamApiFailure,
            Self::Submission { .. } => ErrorKind::ChainSubmissionFailure,
            Self::Confirmation { .. } => ErrorKind::ChainConfirmationFailure,
            Self::UnsupportedCombination(_) => ErrorKind::UnsupportedOperationCombination,
            Self::InvalidAmount(_)
            | Self::InvalidAddress(_)
            | Self::MissingTemplateInput(_)
            | Self::InvalidArgument(_)
            | Self::DecimalsLookup { .. }
            | Self::InvalidTransition { .. } => ErrorKind::InvalidInput,
            Self::Mnemonic(_) | Self::KeyDerivation(_) | Self::Signing(_) | Self::Encoding(_) => {
                ErrorKind::Crypto
            }
            Self::Network(_) | Self::Serialization(_) => ErrorKind::Transport,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Stable machine readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingKeyMaterial(MissingKey::PrivateKey) => "key.missing.private_key",
            Self::MissingKeyMaterial(MissingKey::MnemonicIndex) => "key.missing.mnemonic_index",
            Self::ChainMismatch { .. } => "chain.mismatch",
            Self::Api { .. } => "api.failure",
            Self::CustodialWalletGeneration => "custodial.wallet.generation",
            Self::Submission { .. } => "tx.submission.failed",
            Self::Confirmation { .. } => "tx.confirmation.failed",
            Self::UnsupportedCombination(_) => "operation.unsupported",
            Self::InvalidAmount(_) => "input.amount.invalid",
            Self::InvalidAddress(_) => "input.address.invalid",
            Self::MissingTemplateInput(_) => "input.template.missing",
            Self::InvalidArgument(_) => "input.argument.invalid",
            Self::DecimalsLookup { .. } => "token.decimals.failed",
            Self::Mnemonic(_) => "crypto.mnemonic",
            Self::KeyDerivation(_) => "crypto.derivation",
            Self::Signing(_) => "crypto.signing",
            Self::Encoding(_) => "crypto.encoding",
            Self::InvalidTransition { .. } => "tx.state.invalid",
            Self::Network(_) => "transport.network",
            Self::Serialization(_) => "transport.serialization",
            Self::Config(_) => "config.invalid",
            Self::Cancelled => "operation.cancelled",
        }
    }
}

/// Result type for chainkit operations
pub type Result<T> = std::result::Result<T, Error>;

//! Common transaction types

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;
use uuid::Uuid;
use zeroize::Zeroize;

use crate::error::{Error, Result};

/// Signing inputs shared by every transaction body.
///
/// Secrets never leave the process: `private_key` and `mnemonic` are skipped when a
/// body is serialized for the hosted API, and redacted from `Debug` output.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerFields {
    /// Hex encoded private key
    #[serde(default, skip_serializing, alias = "fromPrivateKey")]
    pub private_key: Option<String>,
    /// BIP-39 mnemonic
    #[serde(default, skip_serializing)]
    pub mnemonic: Option<String>,
    /// Derivation index used with `mnemonic` or `signature_id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    /// Identifier of a key held by an external signer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_id: Option<String>,
}

impl SignerFields {
    /// Sign locally with a raw private key
    pub fn with_private_key(private_key: impl Into<String>) -> Self {
        Self {
            private_key: Some(private_key.into()),
            mnemonic: None,
            index: None,
            signature_id: None,
        }
    }

    /// Sign locally with the key derived from `mnemonic` at `index`
    pub fn with_mnemonic(mnemonic: impl Into<String>, index: u32) -> Self {
        Self {
            private_key: None,
            mnemonic: Some(mnemonic.into()),
            index: Some(index),
            signature_id: None,
        }
    }

    /// Defer signing to the external signer holding `signature_id`
    pub fn with_signature_id(signature_id: impl Into<String>) -> Self {
        Self {
            private_key: None,
            mnemonic: None,
            index: None,
            signature_id: Some(signature_id.into()),
        }
    }

    /// Non-empty signature id, if any
    pub fn remote_signature_id(&self) -> Option<&str> {
        present(&self.signature_id)
    }
}

pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl fmt::Debug for SignerFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerFields")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("mnemonic", &self.mnemonic.as_ref().map(|_| "<redacted>"))
            .field("index", &self.index)
            .field("signature_id", &self.signature_id)
            .finish()
    }
}

impl Drop for SignerFields {
    fn drop(&mut self) {
        self.private_key.zeroize();
        self.mnemonic.zeroize();
    }
}

/// Event emitted by a sealed transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEvent {
    /// Fully qualified event type
    #[serde(rename = "type")]
    pub event_type: String,
    /// Decoded event payload
    pub data: Value,
}

/// Outcome of a transaction that reached finality
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResult {
    /// Chain transaction id
    pub transaction_id: String,
    /// Events emitted while executing
    #[serde(default)]
    pub events: Vec<TransactionEvent>,
}

impl TransactionResult {
    pub fn new(transaction_id: impl Into<String>) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            events: Vec::new(),
        }
    }
}

/// Outcome of a `send` operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SendResult {
    /// Signed locally and broadcast
    Broadcast(TransactionResult),
    /// Queued for an external signer
    #[serde(rename_all = "camelCase")]
    Kms { signature_id: String },
}

impl SendResult {
    pub fn transaction_id(&self) -> Option<&str> {
        match self {
            Self::Broadcast(result) => Some(&result.transaction_id),
            Self::Kms { .. } => None,
        }
    }

    pub fn signature_id(&self) -> Option<&str> {
        match self {
            Self::Broadcast(_) => None,
            Self::Kms { signature_id } => Some(signature_id),
        }
    }
}

/// Outcome of a `prepare` operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreparedTransaction<S> {
    /// Signed and ready to broadcast
    Signed(S),
    /// Serialized for an external signer
    #[serde(rename_all = "camelCase")]
    Unsigned { payload: Value, signature_id: String },
}

impl<S> PreparedTransaction<S> {
    pub fn signed(&self) -> Option<&S> {
        match self {
            Self::Signed(signed) => Some(signed),
            Self::Unsigned { .. } => None,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, Self::Signed(_))
    }
}

/// Lifecycle of a transaction moving through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionState {
    /// Template and arguments assembled
    Built,
    /// Every required role has signed
    Signed,
    /// Accepted by the chain or hosted API
    Submitted,
    /// Final and successful
    Sealed,
    /// Terminal failure at any stage
    Errored,
}

impl TransactionState {
    /// Move to `next`, rejecting transitions the pipeline never makes
    pub fn transition(self, next: TransactionState) -> Result<TransactionState> {
        use TransactionState::*;

        let allowed = matches!(
            (self, next),
            (Built, Signed) | (Signed, Submitted) | (Submitted, Sealed)
        ) || (next == Errored && !self.is_terminal());

        if allowed {
            Ok(next)
        } else {
            Err(Error::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Sealed | Self::Errored)
    }
}

/// Per-call context carried through every pipeline stage.
///
/// Holds the correlation id used in log records and an optional cancellation signal
/// observed between network round trips.
#[derive(Debug, Clone)]
pub struct CallContext {
    correlation_id: Uuid,
    cancel: Option<watch::Receiver<bool>>,
}

impl Default for CallContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CallContext {
    /// Fresh context without cancellation
    pub fn new() -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            cancel: None,
        }
    }

    /// Reuse an existing correlation id
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = correlation_id;
        self
    }

    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map(|rx| *rx.borrow()).unwrap_or(false)
    }

    /// Fail with `Error::Cancelled` once cancellation was requested
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Resolves when cancellation is requested, never if the context cannot be cancelled
    pub async fn cancelled(&self) {
        let Some(rx) = self.cancel.as_ref() else {
            return std::future::pending().await;
        };

        let mut rx = rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // handle dropped without cancelling
                return std::future::pending().await;
            }
        }
    }
}

/// Handle that cancels every context created from it
#[derive(Debug)]
pub struct Cancellation {
    tx: watch::Sender<bool>,
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::new()
    }
}

impl Cancellation {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// New call context observing this handle
    pub fn context(&self) -> CallContext {
        CallContext {
            correlation_id: Uuid::new_v4(),
            cancel: Some(self.tx.subscribe()),
        }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

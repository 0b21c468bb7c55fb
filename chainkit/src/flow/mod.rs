//! Flow blockchain support
//!
//! Intents become Cadence templates ([`builder`]), are encoded and signed per the
//! Flow transaction format ([`encoding`], [`signer`]) and submitted through an
//! access node ([`access`]) by the [`broadcaster`].

pub mod access;
pub mod address;
pub mod args;
pub mod broadcaster;
pub mod builder;
pub mod constants;
pub mod encoding;
pub mod events;
mod sdk;
pub mod signer;
pub mod templates;
pub mod types;

pub use access::{AccountKey, FlowAccess, FlowRestClient, FlowTransactionResult, FlowTransactionStatus};
pub use address::FlowAddress;
pub use args::FlowArgument;
pub use broadcaster::FlowBroadcaster;
pub use builder::{FlowTemplateBuilder, FlowTransactionTemplate};
pub use constants::{FlowContracts, FlowCurrency};
pub use encoding::{FlowSignature, FlowTransaction, ProposalKey, SignedFlowTransaction};
pub use sdk::{FlowPrepare, FlowSdk, FlowSend};
pub use signer::{FlowRoles, FlowSigner, LocalKeySigner};
pub use types::*;

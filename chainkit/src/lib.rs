//! chainkit - multi-chain transaction SDK
//!
//! Builds, signs and broadcasts Flow transactions and custodial wallet calls on
//! EVM chains. Signing material is resolved per request from a private key, a
//! mnemonic and derivation index, or a signature id handled by an external KMS.
//!
//! ```no_run
//! use chainkit::{ChainKit, SdkConfig};
//! use chainkit::flow::{FlowCurrency, FlowSender, FlowTransferBody};
//! use chainkit::transaction::SignerFields;
//!
//! # async fn run() -> chainkit::Result<()> {
//! let kit = ChainKit::new(SdkConfig::new("api-key").with_testnet(true))?;
//! let body = FlowTransferBody {
//!     to: "0xf8d6e0586b0a20c7".to_string(),
//!     amount: "1.5".to_string(),
//!     currency: FlowCurrency::Flow,
//!     sender: FlowSender::new("0x955cd3f17b2fd8ad", SignerFields::with_signature_id("kms-id")),
//! };
//! let result = kit.flow().send().transfer(&body).await?;
//! println!("{:?}", result.signature_id());
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod amount;
pub mod api;
pub mod chain;
pub mod config;
pub mod crypto;
pub mod error;
pub mod evm;
pub mod flow;
mod sdk;
pub mod transaction;

pub use chain::{Chain, ChainFamily, Network};
pub use config::{ApiUrl, FlowConfig, SdkConfig};
pub use error::{Error, ErrorKind, MissingKey, Result};
pub use sdk::ChainKit;
pub use transaction::{
    CallContext, Cancellation, PreparedTransaction, SendResult, SignerFields, TransactionIntent,
    TransactionResult,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

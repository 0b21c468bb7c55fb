//! EVM custodial wallet support
//!
//! Custodial wallet calls are ABI encoded by the [`builder`] against the
//! bindings in [`contracts`], signed locally with an ethers wallet ([`signer`])
//! and broadcast through the hosted API, or handed to the external signer.

pub mod builder;
pub mod client;
pub mod contracts;
mod sdk;
pub mod signer;
pub mod types;

pub use builder::CustodialBuilder;
pub use client::{EthersChainClient, EvmChainClient};
pub use sdk::{CustodialPrepare, CustodialSdk, CustodialSend};
pub use signer::EvmSigner;
pub use types::*;

//! Wallet management
//!
//! Mnemonic backed wallets and per-family address derivation.

mod wallet;

pub use wallet::*;

//! Cryptographic primitives and operations
//!
//! This module provides functionality for mnemonic generation, key derivation
//! and message signing.

pub mod mnemonic;
pub mod keys;
pub mod signing;

pub use mnemonic::*;
pub use keys::*;
pub use signing::*;

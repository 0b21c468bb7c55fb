//! Key derivation and management
//!
//! This module provides functionality for deriving and managing secp256k1 keys
//! for the supported chain families.

pub mod ethereum;
pub mod flow;
mod derivation;

pub use derivation::*;

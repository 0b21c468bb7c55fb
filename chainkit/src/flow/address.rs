//! Flow account addresses

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// An 8-byte Flow account address
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlowAddress([u8; 8]);

impl FlowAddress {
    pub const fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    pub const fn from_u64(value: u64) -> Self {
        Self(value.to_be_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    /// Hex without the `0x` prefix, as used in event type identifiers
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for FlowAddress {
    type Err = Error;

    /// Accepts up to 16 hex digits with an optional `0x`; short forms are left padded
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if digits.is_empty() || digits.len() > 16 {
            return Err(Error::InvalidAddress(format!("'{}' is not a Flow address", trimmed)));
        }

        let padded = format!("{:0>16}", digits);
        let decoded = hex::decode(&padded)
            .map_err(|_| Error::InvalidAddress(format!("'{}' is not a Flow address", trimmed)))?;

        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }
}

impl fmt::Display for FlowAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for FlowAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FlowAddress({})", self)
    }
}

impl Serialize for FlowAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FlowAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

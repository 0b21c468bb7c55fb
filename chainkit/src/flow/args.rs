//! Typed Cadence arguments and their JSON-Cadence encoding

use std::convert::TryFrom;

use ethers_core::types::U256;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::amount::{format_fixed, scale_amount};
use crate::error::{Error, Result};
use super::address::FlowAddress;

const UFIX64_PLACES: u32 = 8;

/// A Cadence transaction argument.
///
/// Serializes to the JSON-Cadence interchange format, e.g.
/// `{"type":"UFix64","value":"1.00000000"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawArgument", into = "RawArgument")]
pub enum FlowArgument {
    Address(FlowAddress),
    String(String),
    UInt64(u64),
    /// Fixed point value, always carrying exactly 8 fractional digits
    UFix64(String),
    Array(Vec<FlowArgument>),
}

impl FlowArgument {
    /// Build a `UFix64` argument from a decimal amount
    pub fn ufix64(amount: &str) -> Result<Self> {
        let formatted = format_fixed(amount, UFIX64_PLACES)?;
        if scale_amount(&formatted, UFIX64_PLACES)? > U256::from(u64::MAX) {
            return Err(Error::InvalidAmount(format!("'{}' exceeds UFix64", amount.trim())));
        }
        Ok(Self::UFix64(formatted))
    }

    pub fn address(address: &str) -> Result<Self> {
        Ok(Self::Address(address.parse()?))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn uint64(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        trimmed
            .parse::<u64>()
            .map(Self::UInt64)
            .map_err(|_| Error::InvalidArgument(format!("'{}' is not a UInt64", trimmed)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Address(_) => "Address",
            Self::String(_) => "String",
            Self::UInt64(_) => "UInt64",
            Self::UFix64(_) => "UFix64",
            Self::Array(_) => "Array",
        }
    }

    /// JSON-Cadence value
    pub fn to_cdc(&self) -> Value {
        let value = match self {
            Self::Address(address) => Value::String(address.to_string()),
            Self::String(value) | Self::UFix64(value) => Value::String(value.clone()),
            Self::UInt64(value) => Value::String(value.to_string()),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_cdc).collect()),
        };
        json!({ "type": self.type_name(), "value": value })
    }

    /// JSON-Cadence bytes as submitted to the access node
    pub fn encode(&self) -> Vec<u8> {
        self.to_cdc().to_string().into_bytes()
    }
}

#[derive(Serialize, Deserialize)]
struct RawArgument {
    #[serde(rename = "type")]
    kind: String,
    value: Value,
}

impl From<FlowArgument> for RawArgument {
    fn from(argument: FlowArgument) -> Self {
        let mut cdc = argument.to_cdc();
        Self {
            kind: argument.type_name().to_string(),
            value: cdc["value"].take(),
        }
    }
}

impl TryFrom<RawArgument> for FlowArgument {
    type Error = Error;

    fn try_from(raw: RawArgument) -> Result<Self> {
        let scalar = |value: &Value| -> Result<String> {
            match value {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                other => Err(Error::InvalidArgument(format!(
                    "expected a {} value, got {}",
                    raw.kind, other
                ))),
            }
        };

        match raw.kind.as_str() {
            "Address" => Self::address(&scalar(&raw.value)?),
            "String" => Ok(Self::String(scalar(&raw.value)?)),
            "UInt64" => Self::uint64(&scalar(&raw.value)?),
            "UFix64" => Self::ufix64(&scalar(&raw.value)?),
            "Array" => match raw.value {
                Value::Array(items) => items
                    .into_iter()
                    .map(|item| {
                        serde_json::from_value::<FlowArgument>(item)
                            .map_err(|e| Error::InvalidArgument(e.to_string()))
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(Self::Array),
                other => Err(Error::InvalidArgument(format!(
                    "expected an array value, got {}",
                    other
                ))),
            },
            other => Err(Error::InvalidArgument(format!(
                "unsupported argument type '{}'",
                other
            ))),
        }
    }
}

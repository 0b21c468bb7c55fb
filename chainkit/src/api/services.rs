//! Typed helpers over the hosted API

use std::sync::Arc;

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::chain::Chain;
use crate::error::{Error, Result};
use super::client::HostedApi;
use super::endpoints;

pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| Error::Serialization(format!("Unexpected hosted API response: {}", e)))
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("expected string or number, got {}", other))),
    }
}

/// Result of a broadcast call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BroadcastResponse {
    /// Accepted by the chain
    Submitted {
        #[serde(rename = "txId")]
        tx_id: String,
    },
    /// Queued for the external signer
    Queued {
        #[serde(rename = "signatureId")]
        signature_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub value: String,
    pub base_pair: String,
    #[serde(default)]
    pub timestamp: Option<u64>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiVersion {
    pub version: String,
    #[serde(default)]
    pub testnet: Option<bool>,
    #[serde(default)]
    pub plan_name: Option<String>,
    #[serde(default)]
    pub credit_limit: Option<u64>,
    #[serde(default)]
    pub usage: Option<u64>,
}

/// Credits consumed on one day
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreditUsage {
    pub day: String,
    pub usage: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GasEstimateRequest {
    pub from: String,
    pub to: String,
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasEstimate {
    #[serde(deserialize_with = "string_or_number")]
    pub gas_limit: String,
    #[serde(deserialize_with = "string_or_number")]
    pub gas_price: String,
}

/// Hosted API utilities used alongside the transaction pipelines
#[derive(Clone)]
pub struct ApiServices {
    api: Arc<dyn HostedApi>,
}

impl ApiServices {
    pub fn new(api: Arc<dyn HostedApi>) -> Self {
        Self { api }
    }

    /// Broadcast signed transaction data, or queue unsigned data when `signature_id` is set
    #[instrument(skip_all, fields(chain = %chain, kms = signature_id.is_some()))]
    pub async fn broadcast(
        &self,
        chain: Chain,
        tx_data: &str,
        signature_id: Option<&str>,
        index: Option<u32>,
    ) -> Result<BroadcastResponse> {
        let mut body = json!({ "txData": tx_data });
        if let Some(signature_id) = signature_id {
            body["signatureId"] = json!(signature_id);
        }
        if let Some(index) = index {
            body["index"] = json!(index);
        }

        let response = self.api.call(&endpoints::broadcast(chain), Some(&body)).await?;
        let response: BroadcastResponse = decode(response)?;
        debug!(?response, "broadcast accepted");
        Ok(response)
    }

    pub async fn exchange_rate(&self, currency: &str, base_pair: &str) -> Result<ExchangeRate> {
        decode(self.api.call(&endpoints::exchange_rate(currency, base_pair), None).await?)
    }

    pub async fn version(&self) -> Result<ApiVersion> {
        decode(self.api.call(&endpoints::version(), None).await?)
    }

    pub async fn credit_usage(&self) -> Result<Vec<CreditUsage>> {
        decode(self.api.call(&endpoints::credit_usage(), None).await?)
    }

    pub async fn estimate_gas(&self, chain: Chain, request: &GasEstimateRequest) -> Result<GasEstimate> {
        let body = serde_json::to_value(request)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        decode(self.api.call(&endpoints::estimate_gas(chain), Some(&body)).await?)
    }

    /// Custodial wallet addresses created by a batch generation transaction
    pub async fn custodial_addresses(&self, chain: Chain, tx_id: &str) -> Result<Vec<String>> {
        decode(self.api.call(&endpoints::custodial_addresses(chain, tx_id), None).await?)
    }
}

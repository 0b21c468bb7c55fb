//! Pending signature queue of the external key management signer

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use crate::chain::Chain;
use crate::error::{Error, Result};
use super::client::HostedApi;
use super::endpoints::{self, ApiOperation};
use super::services::decode;

/// A transaction waiting for the external signer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSignature {
    pub id: String,
    pub chain: Chain,
    /// Unsigned transaction data as queued
    pub serialized_transaction: String,
    #[serde(default)]
    pub hashes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withdrawal_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureIdResponse {
    signature_id: String,
}

/// Client for the hosted KMS queue
#[derive(Clone)]
pub struct KmsClient {
    api: Arc<dyn HostedApi>,
}

impl KmsClient {
    pub fn new(api: Arc<dyn HostedApi>) -> Self {
        Self { api }
    }

    /// Queue `body` on `operation`, returning the signature id it was filed under
    #[instrument(skip_all, fields(path = %operation.path))]
    pub async fn enqueue(&self, operation: &ApiOperation, body: &Value) -> Result<String> {
        let response = self.api.call(operation, Some(body)).await?;
        let queued: SignatureIdResponse = decode(response).map_err(|_| {
            Error::Serialization("Hosted API did not return a signature id".to_string())
        })?;
        info!(signature_id = %queued.signature_id, "queued for external signer");
        Ok(queued.signature_id)
    }

    pub async fn get(&self, id: &str) -> Result<PendingSignature> {
        decode(self.api.call(&endpoints::kms_get(id), None).await?)
    }

    /// Transactions of `chain` still waiting for a signature
    pub async fn pending(&self, chain: Chain) -> Result<Vec<PendingSignature>> {
        decode(self.api.call(&endpoints::kms_pending(chain), None).await?)
    }

    /// Mark `id` as signed and broadcast under `tx_id`
    pub async fn complete(&self, id: &str, tx_id: &str) -> Result<()> {
        self.api.call(&endpoints::kms_complete(id, tx_id), None).await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.api.call(&endpoints::kms_delete(id), None).await?;
        Ok(())
    }
}

//! Flow access layer
//!
//! [`FlowAccess`] is the seam between the broadcaster and a Flow access node.
//! [`FlowRestClient`] talks to the node's REST API.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::chain::{Chain, Network};
use crate::error::{Error, Result};
use crate::transaction::TransactionEvent;
use super::address::FlowAddress;
use super::constants::access_node;
use super::encoding::{FlowSignature, SignedFlowTransaction};

/// Account key as reported by the access node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountKey {
    pub index: u32,
    pub sequence_number: u64,
    pub revoked: bool,
}

/// Execution status of a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowTransactionStatus {
    Unknown,
    Pending,
    Finalized,
    Executed,
    Sealed,
    Expired,
}

/// Transaction result as reported by the access node
#[derive(Debug, Clone, PartialEq)]
pub struct FlowTransactionResult {
    pub status: FlowTransactionStatus,
    pub status_code: u32,
    pub error_message: String,
    pub events: Vec<TransactionEvent>,
}

impl FlowTransactionResult {
    /// Failure reason, if the transaction failed or expired
    pub fn error(&self) -> Option<String> {
        if self.status_code != 0 || !self.error_message.is_empty() {
            let message = if self.error_message.is_empty() {
                format!("execution failed with status code {}", self.status_code)
            } else {
                self.error_message.clone()
            };
            return Some(message);
        }
        if self.status == FlowTransactionStatus::Expired {
            return Some("transaction expired before being sealed".to_string());
        }
        None
    }

    pub fn is_sealed(&self) -> bool {
        self.status == FlowTransactionStatus::Sealed
    }
}

/// Operations the Flow pipeline needs from an access node
#[async_trait]
pub trait FlowAccess: Send + Sync {
    /// Id of the latest sealed block, used as the transaction reference block
    async fn latest_sealed_block_id(&self) -> Result<[u8; 32]>;

    /// Key `key_index` of `address`, with its current sequence number
    async fn account_key(&self, address: &FlowAddress, key_index: u32) -> Result<AccountKey>;

    /// Submit a signed transaction, returning its id
    async fn send_transaction(&self, transaction: &SignedFlowTransaction) -> Result<String>;

    async fn transaction_result(&self, id: &str) -> Result<FlowTransactionResult>;
}

/// REST client for a Flow access node
pub struct FlowRestClient {
    client: reqwest::Client,
    base_url: String,
}

impl FlowRestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Client for the public access node of `network`
    pub fn for_network(network: Network) -> Self {
        Self::new(access_node(network))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "flow access request");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to reach access node: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Network(format!(
                "Access node returned {}: {}",
                status,
                error_message(&body)
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Serialization(format!("Failed to parse access node response: {}", e)))
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

fn parse_u64(field: &str, value: &str) -> Result<u64> {
    value
        .parse()
        .map_err(|_| Error::Serialization(format!("Invalid {} '{}' in access node response", field, value)))
}

#[derive(Deserialize)]
struct BlockResponse {
    header: BlockHeader,
}

#[derive(Deserialize)]
struct BlockHeader {
    id: String,
}

#[derive(Deserialize)]
struct AccountResponse {
    #[serde(default)]
    keys: Vec<AccountKeyResponse>,
}

#[derive(Deserialize)]
struct AccountKeyResponse {
    index: String,
    sequence_number: String,
    #[serde(default)]
    revoked: bool,
}

#[derive(Serialize)]
struct ProposalKeyRequest {
    address: String,
    key_index: String,
    sequence_number: String,
}

#[derive(Serialize)]
struct SignatureRequest {
    address: String,
    key_index: String,
    signature: String,
}

impl From<&FlowSignature> for SignatureRequest {
    fn from(signature: &FlowSignature) -> Self {
        Self {
            address: signature.address.to_hex(),
            key_index: signature.key_index.to_string(),
            signature: STANDARD.encode(&signature.signature),
        }
    }
}

#[derive(Serialize)]
struct TransactionRequest {
    script: String,
    arguments: Vec<String>,
    reference_block_id: String,
    gas_limit: String,
    payer: String,
    proposal_key: ProposalKeyRequest,
    authorizers: Vec<String>,
    payload_signatures: Vec<SignatureRequest>,
    envelope_signatures: Vec<SignatureRequest>,
}

impl From<&SignedFlowTransaction> for TransactionRequest {
    fn from(signed: &SignedFlowTransaction) -> Self {
        let tx = &signed.transaction;
        Self {
            script: STANDARD.encode(tx.script.as_bytes()),
            arguments: tx.arguments.iter().map(|a| STANDARD.encode(a.encode())).collect(),
            reference_block_id: hex::encode(tx.reference_block_id),
            gas_limit: tx.gas_limit.to_string(),
            payer: tx.payer.to_hex(),
            proposal_key: ProposalKeyRequest {
                address: tx.proposal_key.address.to_hex(),
                key_index: tx.proposal_key.key_index.to_string(),
                sequence_number: tx.proposal_key.sequence_number.to_string(),
            },
            authorizers: tx.authorizers.iter().map(FlowAddress::to_hex).collect(),
            payload_signatures: signed.payload_signatures.iter().map(Into::into).collect(),
            envelope_signatures: signed.envelope_signatures.iter().map(Into::into).collect(),
        }
    }
}

#[derive(Deserialize)]
struct TransactionResponse {
    id: String,
}

#[derive(Deserialize)]
struct TransactionResultResponse {
    status: FlowTransactionStatus,
    #[serde(default)]
    status_code: u32,
    #[serde(default)]
    error_message: String,
    #[serde(default)]
    events: Vec<EventResponse>,
}

#[derive(Deserialize)]
struct EventResponse {
    #[serde(rename = "type")]
    event_type: String,
    payload: String,
}

impl EventResponse {
    fn decode(self) -> Result<TransactionEvent> {
        let bytes = STANDARD
            .decode(&self.payload)
            .map_err(|e| Error::Serialization(format!("Invalid event payload encoding: {}", e)))?;
        let data = serde_json::from_slice(&bytes)
            .map_err(|e| Error::Serialization(format!("Invalid event payload: {}", e)))?;
        Ok(TransactionEvent {
            event_type: self.event_type,
            data,
        })
    }
}

#[async_trait]
impl FlowAccess for FlowRestClient {
    async fn latest_sealed_block_id(&self) -> Result<[u8; 32]> {
        let blocks: Vec<BlockResponse> = self.get("/blocks?height=sealed").await?;
        let block = blocks
            .into_iter()
            .next()
            .ok_or_else(|| Error::Serialization("Access node returned no sealed block".to_string()))?;

        let bytes = hex::decode(&block.header.id)
            .map_err(|e| Error::Serialization(format!("Invalid block id: {}", e)))?;
        bytes
            .try_into()
            .map_err(|_| Error::Serialization("Block id must be 32 bytes".to_string()))
    }

    async fn account_key(&self, address: &FlowAddress, key_index: u32) -> Result<AccountKey> {
        let account: AccountResponse = self
            .get(&format!("/accounts/{}?expand=keys", address.to_hex()))
            .await?;

        for key in account.keys {
            let index = parse_u64("key index", &key.index)?;
            if index == u64::from(key_index) {
                return Ok(AccountKey {
                    index: key_index,
                    sequence_number: parse_u64("sequence number", &key.sequence_number)?,
                    revoked: key.revoked,
                });
            }
        }

        Err(Error::InvalidArgument(format!(
            "Account {} has no key with index {}",
            address, key_index
        )))
    }

    async fn send_transaction(&self, transaction: &SignedFlowTransaction) -> Result<String> {
        let url = format!("{}/transactions", self.base_url);
        let request = TransactionRequest::from(transaction);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Submission {
                chain: Chain::Flow,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Submission {
                chain: Chain::Flow,
                message: format!("{}: {}", status, error_message(&body)),
            });
        }

        let accepted: TransactionResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(format!("Failed to parse submission response: {}", e)))?;
        Ok(accepted.id)
    }

    async fn transaction_result(&self, id: &str) -> Result<FlowTransactionResult> {
        let result: TransactionResultResponse =
            self.get(&format!("/transaction_results/{}", id)).await?;

        let events = result
            .events
            .into_iter()
            .map(EventResponse::decode)
            .collect::<Result<Vec<_>>>()?;

        Ok(FlowTransactionResult {
            status: result.status,
            status_code: result.status_code,
            error_message: result.error_message,
            events,
        })
    }
}

//! Request bodies for Flow operations

use serde::{Deserialize, Serialize};

use crate::transaction::SignerFields;
use super::args::FlowArgument;
use super::constants::FlowCurrency;

/// The account sending a transaction and the material it signs with
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSender {
    /// Sender address, proposer, payer and sole authorizer
    pub account: String,
    /// Index of the account key used to sign
    #[serde(default, skip_serializing_if = "is_zero")]
    pub key_index: u32,
    #[serde(flatten)]
    pub signer: SignerFields,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl FlowSender {
    pub fn new(account: impl Into<String>, signer: SignerFields) -> Self {
        Self {
            account: account.into(),
            key_index: 0,
            signer,
        }
    }
}

/// Fungible token transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowTransferBody {
    pub to: String,
    /// Decimal amount, at most 8 fractional digits
    pub amount: String,
    pub currency: FlowCurrency,
    #[serde(flatten)]
    pub sender: FlowSender,
}

/// Mint one NFT
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowMintNftBody {
    pub to: String,
    /// Metadata URL
    pub url: String,
    /// NFT type, the token collection inside the multi-token contract
    pub contract_address: String,
    #[serde(flatten)]
    pub sender: FlowSender,
}

/// Mint several NFTs of one type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowMintMultipleNftBody {
    pub to: Vec<String>,
    pub url: Vec<String>,
    pub contract_address: String,
    #[serde(flatten)]
    pub sender: FlowSender,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowBurnNftBody {
    pub token_id: String,
    pub contract_address: String,
    #[serde(flatten)]
    pub sender: FlowSender,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowTransferNftBody {
    pub to: String,
    pub token_id: String,
    pub contract_address: String,
    #[serde(flatten)]
    pub sender: FlowSender,
}

/// Arbitrary Cadence transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowCustomTransactionBody {
    /// Cadence source
    pub transaction: String,
    #[serde(default)]
    pub args: Vec<FlowArgument>,
    #[serde(flatten)]
    pub sender: FlowSender,
}

/// Create an account controlled by `public_key`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowCreateAccountBody {
    /// Uncompressed secp256k1 public key, 64 bytes hex without the `04` prefix
    pub public_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    #[serde(flatten)]
    pub sender: FlowSender,
}

/// Add `public_key` to the sender account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowAddPublicKeyBody {
    pub public_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    #[serde(flatten)]
    pub sender: FlowSender,
}

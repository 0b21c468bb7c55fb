//! Custodial wallet request bodies and EVM transaction types

use std::convert::TryFrom;

use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, TransactionRequest, H256, U256};
use serde::{Deserialize, Serialize};

use crate::chain::Chain;
use crate::error::{Error, Result};
use crate::transaction::types::present;
use crate::transaction::SignerFields;

/// Asset category handled by a custodial wallet call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ContractType {
    /// ERC-20
    Fungible = 0,
    /// ERC-721
    NonFungible = 1,
    /// ERC-1155
    MultiToken = 2,
    /// The chain's native coin
    Native = 3,
}

impl ContractType {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for ContractType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Fungible),
            1 => Ok(Self::NonFungible),
            2 => Ok(Self::MultiToken),
            3 => Ok(Self::Native),
            other => Err(Error::InvalidArgument(format!("unknown contract type {}", other))),
        }
    }
}

impl From<ContractType> for u8 {
    fn from(value: ContractType) -> Self {
        value.code()
    }
}

/// Caller supplied fee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fee {
    pub gas_limit: String,
    /// Gas price in gwei
    pub gas_price: String,
}

/// Move one asset out of a custodial wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustodialTransferBody {
    pub chain: Chain,
    pub custodial_address: String,
    pub recipient: String,
    pub contract_type: ContractType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<Fee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
    #[serde(flatten)]
    pub signer: SignerFields,
}

/// Move several assets out of a custodial wallet; every array has one entry per transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustodialBatchTransferBody {
    pub chain: Chain,
    pub custodial_address: String,
    pub recipient: Vec<String>,
    pub contract_type: Vec<ContractType>,
    pub token_address: Vec<String>,
    pub amount: Vec<String>,
    pub token_id: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<Fee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
    #[serde(flatten)]
    pub signer: SignerFields,
}

/// Allow `spender` to move an asset held by a custodial wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustodialApproveBody {
    pub chain: Chain,
    pub custodial_address: String,
    pub spender: String,
    pub contract_type: ContractType,
    pub token_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<Fee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
    #[serde(flatten)]
    pub signer: SignerFields,
}

/// Create `batch_count` custodial wallets owned by `owner`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCustodialBatchBody {
    pub chain: Chain,
    pub owner: String,
    pub batch_count: u32,
    /// Let the hosted API pay for and perform the deployment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees_covered: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<Fee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
    #[serde(flatten)]
    pub signer: SignerFields,
}

/// How a custodial batch generation is carried out, decided once from the body.
///
/// Precedence: fee-covered, then external signer, then local key.
#[derive(Debug, Clone)]
pub enum CustodialBatchRequest {
    FeesCovered {
        chain: Chain,
        owner: String,
        batch_count: u32,
    },
    KmsDeferred {
        chain: Chain,
        owner: String,
        batch_count: u32,
        signature_id: String,
        index: Option<u32>,
        fee: Option<Fee>,
        nonce: Option<u64>,
    },
    LocalBuild {
        chain: Chain,
        owner: String,
        batch_count: u32,
        fee: Option<Fee>,
        nonce: Option<u64>,
        signer: SignerFields,
    },
}

impl CustodialBatchRequest {
    pub fn chain(&self) -> Chain {
        match self {
            Self::FeesCovered { chain, .. }
            | Self::KmsDeferred { chain, .. }
            | Self::LocalBuild { chain, .. } => *chain,
        }
    }
}

impl TryFrom<&GenerateCustodialBatchBody> for CustodialBatchRequest {
    type Error = Error;

    fn try_from(body: &GenerateCustodialBatchBody) -> Result<Self> {
        if body.fees_covered == Some(true) {
            return Ok(Self::FeesCovered {
                chain: body.chain,
                owner: body.owner.clone(),
                batch_count: body.batch_count,
            });
        }

        if let Some(signature_id) = body.signer.remote_signature_id() {
            return Ok(Self::KmsDeferred {
                chain: body.chain,
                owner: body.owner.clone(),
                batch_count: body.batch_count,
                signature_id: signature_id.to_string(),
                index: body.signer.index,
                fee: body.fee.clone(),
                nonce: body.nonce,
            });
        }

        if present(&body.signer.private_key).is_some() || present(&body.signer.mnemonic).is_some() {
            return Ok(Self::LocalBuild {
                chain: body.chain,
                owner: body.owner.clone(),
                batch_count: body.batch_count,
                fee: body.fee.clone(),
                nonce: body.nonce,
                signer: body.signer.clone(),
            });
        }

        Err(Error::UnsupportedCombination(
            "custodial batch generation needs feesCovered, a signature id or a signing key".to_string(),
        ))
    }
}

/// An unsigned legacy EVM transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvmUnsignedTransaction {
    pub chain_id: u64,
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
}

impl EvmUnsignedTransaction {
    pub fn new(chain_id: u64, to: Address, data: Bytes) -> Self {
        Self {
            chain_id,
            to,
            data,
            value: U256::zero(),
            nonce: None,
            gas_limit: None,
            gas_price: None,
        }
    }

    /// ethers transaction request, optionally with a sender
    pub fn to_typed(&self, from: Option<Address>) -> TypedTransaction {
        let mut request = TransactionRequest::new()
            .to(self.to)
            .data(self.data.clone())
            .value(self.value)
            .chain_id(self.chain_id);
        if let Some(from) = from {
            request = request.from(from);
        }
        if let Some(nonce) = self.nonce {
            request = request.nonce(nonce);
        }
        if let Some(gas_limit) = self.gas_limit {
            request = request.gas(gas_limit);
        }
        if let Some(gas_price) = self.gas_price {
            request = request.gas_price(gas_price);
        }
        request.into()
    }

    /// JSON form handed to the external signer
    pub fn tx_data(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    pub fn is_complete(&self) -> bool {
        self.nonce.is_some() && self.gas_limit.is_some() && self.gas_price.is_some()
    }
}

/// A signed, RLP encoded EVM transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedEvmTransaction {
    pub raw: Bytes,
    pub hash: H256,
}

impl SignedEvmTransaction {
    /// `0x` prefixed raw transaction, as accepted by broadcast endpoints
    pub fn raw_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw))
    }
}

//! High level transaction intents

use serde::{Deserialize, Serialize};

use crate::chain::Chain;
use crate::evm::{
    CustodialApproveBody, CustodialBatchTransferBody, CustodialTransferBody, GenerateCustodialBatchBody,
};
use crate::flow::{
    FlowAddPublicKeyBody, FlowBurnNftBody, FlowCreateAccountBody, FlowCustomTransactionBody,
    FlowMintMultipleNftBody, FlowMintNftBody, FlowTransferBody, FlowTransferNftBody,
};
use super::types::SignerFields;

/// What the caller wants done, with the body for that operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "operation", content = "body", rename_all = "camelCase")]
pub enum TransactionIntent {
    Transfer(FlowTransferBody),
    MintNft(FlowMintNftBody),
    MintMultipleNft(FlowMintMultipleNftBody),
    BurnNft(FlowBurnNftBody),
    TransferNft(FlowTransferNftBody),
    CustomTransaction(FlowCustomTransactionBody),
    CreateAccount(FlowCreateAccountBody),
    AddPublicKey(FlowAddPublicKeyBody),
    CustodialTransfer(CustodialTransferBody),
    CustodialBatchTransfer(CustodialBatchTransferBody),
    CustodialApprove(CustodialApproveBody),
    CustodialWalletBatchGenerate(GenerateCustodialBatchBody),
}

impl TransactionIntent {
    /// Chain the intent executes on
    pub fn chain(&self) -> Chain {
        match self {
            Self::Transfer(_)
            | Self::MintNft(_)
            | Self::MintMultipleNft(_)
            | Self::BurnNft(_)
            | Self::TransferNft(_)
            | Self::CustomTransaction(_)
            | Self::CreateAccount(_)
            | Self::AddPublicKey(_) => Chain::Flow,
            Self::CustodialTransfer(body) => body.chain,
            Self::CustodialBatchTransfer(body) => body.chain,
            Self::CustodialApprove(body) => body.chain,
            Self::CustodialWalletBatchGenerate(body) => body.chain,
        }
    }

    /// Operation name, as used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transfer(_) => "transfer",
            Self::MintNft(_) => "mint_nft",
            Self::MintMultipleNft(_) => "mint_multiple_nft",
            Self::BurnNft(_) => "burn_nft",
            Self::TransferNft(_) => "transfer_nft",
            Self::CustomTransaction(_) => "custom_transaction",
            Self::CreateAccount(_) => "create_account",
            Self::AddPublicKey(_) => "add_public_key",
            Self::CustodialTransfer(_) => "custodial_transfer",
            Self::CustodialBatchTransfer(_) => "custodial_transfer_batch",
            Self::CustodialApprove(_) => "custodial_approve",
            Self::CustodialWalletBatchGenerate(_) => "custodial_generate_batch",
        }
    }

    /// Signing fields carried by the body
    pub fn signer(&self) -> &SignerFields {
        match self {
            Self::Transfer(body) => &body.sender.signer,
            Self::MintNft(body) => &body.sender.signer,
            Self::MintMultipleNft(body) => &body.sender.signer,
            Self::BurnNft(body) => &body.sender.signer,
            Self::TransferNft(body) => &body.sender.signer,
            Self::CustomTransaction(body) => &body.sender.signer,
            Self::CreateAccount(body) => &body.sender.signer,
            Self::AddPublicKey(body) => &body.sender.signer,
            Self::CustodialTransfer(body) => &body.signer,
            Self::CustodialBatchTransfer(body) => &body.signer,
            Self::CustodialApprove(body) => &body.signer,
            Self::CustodialWalletBatchGenerate(body) => &body.signer,
        }
    }
}

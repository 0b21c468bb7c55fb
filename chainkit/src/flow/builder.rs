//! Maps Flow intents to Cadence templates and typed arguments

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::transaction::TransactionIntent;
use super::args::FlowArgument;
use super::constants::{FlowContracts, DEFAULT_KEY_WEIGHT};
use super::encoding::encode_account_key;
use super::templates;
use super::types::*;

/// An unsigned Flow transaction: script plus arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowTransactionTemplate {
    pub script: String,
    pub arguments: Vec<FlowArgument>,
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::MissingTemplateInput(format!("{} is required", field)));
    }
    Ok(trimmed)
}

/// Builds templates against one network's contracts
#[derive(Debug, Clone)]
pub struct FlowTemplateBuilder {
    contracts: FlowContracts,
}

impl FlowTemplateBuilder {
    pub fn new(contracts: FlowContracts) -> Self {
        Self { contracts }
    }

    pub fn contracts(&self) -> &FlowContracts {
        &self.contracts
    }

    pub fn transfer(&self, body: &FlowTransferBody) -> Result<FlowTransactionTemplate> {
        let token = self.contracts.token(body.currency);
        Ok(FlowTransactionTemplate {
            script: templates::transfer(&self.contracts, &token),
            arguments: vec![
                FlowArgument::ufix64(&body.amount)?,
                FlowArgument::address(required("to", &body.to)?)?,
            ],
        })
    }

    pub fn mint_nft(&self, body: &FlowMintNftBody) -> Result<FlowTransactionTemplate> {
        Ok(FlowTransactionTemplate {
            script: templates::mint_nft(&self.contracts),
            arguments: vec![
                FlowArgument::address(required("to", &body.to)?)?,
                FlowArgument::string(required("url", &body.url)?),
                FlowArgument::string(required("contractAddress", &body.contract_address)?),
            ],
        })
    }

    pub fn mint_multiple_nft(&self, body: &FlowMintMultipleNftBody) -> Result<FlowTransactionTemplate> {
        if body.to.is_empty() {
            return Err(Error::MissingTemplateInput("to must not be empty".to_string()));
        }
        if body.to.len() != body.url.len() {
            return Err(Error::MissingTemplateInput(format!(
                "to and url must have the same length, got {} and {}",
                body.to.len(),
                body.url.len()
            )));
        }

        let recipients = body
            .to
            .iter()
            .map(|to| FlowArgument::address(required("to", to)?))
            .collect::<Result<Vec<_>>>()?;
        let urls = body
            .url
            .iter()
            .map(|url| Ok(FlowArgument::string(required("url", url)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(FlowTransactionTemplate {
            script: templates::mint_multiple_nft(&self.contracts),
            arguments: vec![
                FlowArgument::Array(recipients),
                FlowArgument::Array(urls),
                FlowArgument::string(required("contractAddress", &body.contract_address)?),
            ],
        })
    }

    pub fn burn_nft(&self, body: &FlowBurnNftBody) -> Result<FlowTransactionTemplate> {
        Ok(FlowTransactionTemplate {
            script: templates::burn_nft(&self.contracts),
            arguments: vec![
                FlowArgument::uint64(required("tokenId", &body.token_id)?)?,
                FlowArgument::string(required("contractAddress", &body.contract_address)?),
            ],
        })
    }

    pub fn transfer_nft(&self, body: &FlowTransferNftBody) -> Result<FlowTransactionTemplate> {
        required("contractAddress", &body.contract_address)?;
        Ok(FlowTransactionTemplate {
            script: templates::transfer_nft(&self.contracts),
            arguments: vec![
                FlowArgument::address(required("to", &body.to)?)?,
                FlowArgument::uint64(required("tokenId", &body.token_id)?)?,
            ],
        })
    }

    pub fn custom(&self, body: &FlowCustomTransactionBody) -> Result<FlowTransactionTemplate> {
        Ok(FlowTransactionTemplate {
            script: required("transaction", &body.transaction)?.to_string(),
            arguments: body.args.clone(),
        })
    }

    pub fn create_account(&self, body: &FlowCreateAccountBody) -> Result<FlowTransactionTemplate> {
        let key = encode_account_key(
            required("publicKey", &body.public_key)?,
            body.weight.unwrap_or(DEFAULT_KEY_WEIGHT),
        )?;
        Ok(FlowTransactionTemplate {
            script: templates::create_account(),
            arguments: vec![FlowArgument::Array(vec![FlowArgument::String(key)])],
        })
    }

    pub fn add_public_key(&self, body: &FlowAddPublicKeyBody) -> Result<FlowTransactionTemplate> {
        let key = encode_account_key(
            required("publicKey", &body.public_key)?,
            body.weight.unwrap_or(DEFAULT_KEY_WEIGHT),
        )?;
        Ok(FlowTransactionTemplate {
            script: templates::add_public_key(),
            arguments: vec![FlowArgument::String(key)],
        })
    }

    /// Build the template for any Flow intent
    pub fn build(&self, intent: &TransactionIntent) -> Result<FlowTransactionTemplate> {
        match intent {
            TransactionIntent::Transfer(body) => self.transfer(body),
            TransactionIntent::MintNft(body) => self.mint_nft(body),
            TransactionIntent::MintMultipleNft(body) => self.mint_multiple_nft(body),
            TransactionIntent::BurnNft(body) => self.burn_nft(body),
            TransactionIntent::TransferNft(body) => self.transfer_nft(body),
            TransactionIntent::CustomTransaction(body) => self.custom(body),
            TransactionIntent::CreateAccount(body) => self.create_account(body),
            TransactionIntent::AddPublicKey(body) => self.add_public_key(body),
            other => Err(Error::ChainMismatch {
                expected: "FLOW".to_string(),
                actual: other.chain().to_string(),
            }),
        }
    }
}

//! Custodial wallet transaction builder

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use ethers::abi::AbiEncode;
use ethers::types::{Address, Bytes, U256};
use tracing::debug;

use crate::amount::{parse_integer, scale_amount};
use crate::chain::{Chain, ChainFamily, Network};
use crate::error::{Error, Result};
use super::client::EvmChainClient;
use super::contracts::{ApproveCall, CloneNewWalletCall, TransferBatchCall, TransferCall};
use super::types::*;

const GWEI_DECIMALS: u32 = 9;

/// Builds unsigned custodial wallet calls for one EVM chain
pub struct CustodialBuilder {
    chain: Chain,
    chain_id: u64,
    client: Arc<dyn EvmChainClient>,
    factory: Option<Address>,
}

impl CustodialBuilder {
    pub fn new(
        chain: Chain,
        network: Network,
        client: Arc<dyn EvmChainClient>,
        factory: Option<&str>,
    ) -> Result<Self> {
        if chain.family() != ChainFamily::Evm {
            return Err(Error::ChainMismatch {
                expected: "EVM chain".to_string(),
                actual: chain.to_string(),
            });
        }
        let chain_id = chain
            .chain_id(network)
            .ok_or_else(|| Error::Config(format!("No chain id for {}", chain)))?;
        let factory = factory.map(|f| parse_address("factory", f)).transpose()?;

        Ok(Self {
            chain,
            chain_id,
            client,
            factory,
        })
    }

    pub fn chain(&self) -> Chain {
        self.chain
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// `transfer` on the custodial wallet
    pub async fn transfer(&self, body: &CustodialTransferBody) -> Result<EvmUnsignedTransaction> {
        self.ensure_chain(body.chain)?;
        let wallet = parse_address("custodialAddress", &body.custodial_address)?;
        let recipient = parse_address("recipient", &body.recipient)?;

        let (token_address, amount, token_id) = match body.contract_type {
            ContractType::Native => {
                let amount = required("amount", &body.amount)?;
                (Address::zero(), scale_amount(amount, self.chain.native_decimals())?, U256::zero())
            }
            ContractType::Fungible => {
                let token = parse_address("tokenAddress", required("tokenAddress", &body.token_address)?)?;
                let decimals = self.token_decimals(token).await?;
                (token, scale_amount(required("amount", &body.amount)?, decimals)?, U256::zero())
            }
            ContractType::NonFungible => {
                let token = parse_address("tokenAddress", required("tokenAddress", &body.token_address)?)?;
                (token, U256::zero(), parse_integer(required("tokenId", &body.token_id)?)?)
            }
            ContractType::MultiToken => {
                let token = parse_address("tokenAddress", required("tokenAddress", &body.token_address)?)?;
                (
                    token,
                    scale_amount(required("amount", &body.amount)?, 0)?,
                    parse_integer(required("tokenId", &body.token_id)?)?,
                )
            }
        };

        let call = TransferCall {
            token_address,
            contract_type: U256::from(body.contract_type.code()),
            recipient,
            amount,
            token_id,
        };
        debug!(chain = %self.chain, contract_type = body.contract_type.code(), "built custodial transfer");

        let mut tx = EvmUnsignedTransaction::new(self.chain_id, wallet, Bytes::from(call.encode()));
        apply_fee(&mut tx, body.fee.as_ref(), body.nonce)?;
        Ok(tx)
    }

    /// `transferBatch` on the custodial wallet
    pub async fn transfer_batch(&self, body: &CustodialBatchTransferBody) -> Result<EvmUnsignedTransaction> {
        self.ensure_chain(body.chain)?;
        let wallet = parse_address("custodialAddress", &body.custodial_address)?;

        let len = body.recipient.len();
        if len == 0 {
            return Err(Error::MissingTemplateInput("recipient".to_string()));
        }
        let lengths = [
            body.contract_type.len(),
            body.token_address.len(),
            body.amount.len(),
            body.token_id.len(),
        ];
        if lengths.iter().any(|l| *l != len) {
            return Err(Error::InvalidArgument(
                "recipient, contractType, tokenAddress, amount and tokenId must have the same length".to_string(),
            ));
        }

        let mut decimals_cache: HashMap<Address, u32> = HashMap::new();
        let mut call = TransferBatchCall {
            token_address: Vec::with_capacity(len),
            contract_type: Vec::with_capacity(len),
            recipient: Vec::with_capacity(len),
            amount: Vec::with_capacity(len),
            token_id: Vec::with_capacity(len),
        };

        for i in 0..len {
            let contract_type = body.contract_type[i];
            let (token, amount, token_id) = match contract_type {
                ContractType::Native => (
                    Address::zero(),
                    scale_amount(&body.amount[i], self.chain.native_decimals())?,
                    U256::zero(),
                ),
                ContractType::Fungible => {
                    let token = parse_address("tokenAddress", &body.token_address[i])?;
                    let decimals = match decimals_cache.get(&token) {
                        Some(decimals) => *decimals,
                        None => {
                            let decimals = self.token_decimals(token).await?;
                            decimals_cache.insert(token, decimals);
                            decimals
                        }
                    };
                    (token, scale_amount(&body.amount[i], decimals)?, U256::zero())
                }
                ContractType::NonFungible => (
                    parse_address("tokenAddress", &body.token_address[i])?,
                    U256::zero(),
                    parse_integer(&body.token_id[i])?,
                ),
                ContractType::MultiToken => (
                    parse_address("tokenAddress", &body.token_address[i])?,
                    scale_amount(&body.amount[i], 0)?,
                    parse_integer(&body.token_id[i])?,
                ),
            };

            call.token_address.push(token);
            call.contract_type.push(U256::from(contract_type.code()));
            call.recipient.push(parse_address("recipient", &body.recipient[i])?);
            call.amount.push(amount);
            call.token_id.push(token_id);
        }
        debug!(chain = %self.chain, transfers = len, "built custodial batch transfer");

        let mut tx = EvmUnsignedTransaction::new(self.chain_id, wallet, Bytes::from(call.encode()));
        apply_fee(&mut tx, body.fee.as_ref(), body.nonce)?;
        Ok(tx)
    }

    /// `approve` on the custodial wallet; amounts are scaled for fungible tokens only
    pub async fn approve(&self, body: &CustodialApproveBody) -> Result<EvmUnsignedTransaction> {
        self.ensure_chain(body.chain)?;
        let wallet = parse_address("custodialAddress", &body.custodial_address)?;
        let spender = parse_address("spender", &body.spender)?;
        let token = parse_address("tokenAddress", &body.token_address)?;

        let (amount, token_id) = match body.contract_type {
            ContractType::Native => {
                return Err(Error::UnsupportedCombination(
                    "native assets cannot be approved".to_string(),
                ))
            }
            ContractType::Fungible => {
                let decimals = self.token_decimals(token).await?;
                (scale_amount(required("amount", &body.amount)?, decimals)?, U256::zero())
            }
            ContractType::NonFungible | ContractType::MultiToken => {
                let amount = match body.amount.as_deref() {
                    Some(amount) => scale_amount(amount, 0)?,
                    None => U256::zero(),
                };
                (amount, parse_integer(required("tokenId", &body.token_id)?)?)
            }
        };

        let call = ApproveCall {
            token_address: token,
            contract_type: U256::from(body.contract_type.code()),
            spender,
            amount,
            token_id,
        };
        debug!(chain = %self.chain, contract_type = body.contract_type.code(), "built custodial approve");

        let mut tx = EvmUnsignedTransaction::new(self.chain_id, wallet, Bytes::from(call.encode()));
        apply_fee(&mut tx, body.fee.as_ref(), body.nonce)?;
        Ok(tx)
    }

    /// `cloneNewWallet` on the configured factory
    pub fn generate_batch(
        &self,
        owner: &str,
        batch_count: u32,
        fee: Option<&Fee>,
        nonce: Option<u64>,
    ) -> Result<EvmUnsignedTransaction> {
        let factory = self.factory.ok_or_else(|| {
            Error::MissingTemplateInput(format!("custodial factory address for {}", self.chain))
        })?;
        if batch_count == 0 {
            return Err(Error::InvalidArgument("batchCount must be positive".to_string()));
        }

        let call = CloneNewWalletCall {
            owner: parse_address("owner", owner)?,
            count: U256::from(batch_count),
        };

        let mut tx = EvmUnsignedTransaction::new(self.chain_id, factory, Bytes::from(call.encode()));
        apply_fee(&mut tx, fee, nonce)?;
        Ok(tx)
    }

    fn ensure_chain(&self, chain: Chain) -> Result<()> {
        if chain != self.chain {
            return Err(Error::ChainMismatch {
                expected: self.chain.to_string(),
                actual: chain.to_string(),
            });
        }
        Ok(())
    }

    async fn token_decimals(&self, token: Address) -> Result<u32> {
        let decimals = self.client.decimals(token).await?;
        Ok(u32::from(decimals))
    }
}

pub(crate) fn parse_address(field: &str, value: &str) -> Result<Address> {
    Address::from_str(value.trim()).map_err(|_| Error::InvalidAddress(format!("{}: '{}'", field, value)))
}

fn required<'a>(field: &str, value: &'a Option<String>) -> Result<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::MissingTemplateInput(field.to_string()))
}

fn apply_fee(tx: &mut EvmUnsignedTransaction, fee: Option<&Fee>, nonce: Option<u64>) -> Result<()> {
    if let Some(fee) = fee {
        tx.gas_limit = Some(parse_integer(&fee.gas_limit)?);
        tx.gas_price = Some(scale_amount(&fee.gas_price, GWEI_DECIMALS)?);
    }
    if let Some(nonce) = nonce {
        tx.nonce = Some(U256::from(nonce));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ethers::abi::AbiDecode;
    use ethers::types::transaction::eip2718::TypedTransaction;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::transaction::SignerFields;

    const WALLET: &str = "0x4b812a77b109a150c2fc89ed3a1bf6e4b5e1f0a5";
    const TOKEN: &str = "0x2d7882bedcbfddce29ba99965dd3cdf7fcb10a1e";
    const RECIPIENT: &str = "0x8cb76aed9c5e336ef961265c6079c14e9cd3d2ea";

    struct FixedDecimals {
        decimals: u8,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl EvmChainClient for FixedDecimals {
        async fn decimals(&self, _token: Address) -> Result<u8> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.decimals)
        }

        async fn transaction_count(&self, _address: Address) -> Result<U256> {
            Ok(U256::zero())
        }

        async fn gas_price(&self) -> Result<U256> {
            Ok(U256::one())
        }

        async fn estimate_gas(&self, _tx: &TypedTransaction) -> Result<U256> {
            Ok(U256::from(21000u64))
        }
    }

    fn builder(decimals: u8) -> (CustodialBuilder, Arc<FixedDecimals>) {
        let client = Arc::new(FixedDecimals {
            decimals,
            lookups: AtomicUsize::new(0),
        });
        let builder = CustodialBuilder::new(Chain::Polygon, Network::Testnet, client.clone(), Some(WALLET)).unwrap();
        (builder, client)
    }

    fn transfer_body(contract_type: ContractType) -> CustodialTransferBody {
        CustodialTransferBody {
            chain: Chain::Polygon,
            custodial_address: WALLET.to_string(),
            recipient: RECIPIENT.to_string(),
            contract_type,
            token_address: Some(TOKEN.to_string()),
            amount: Some("1.5".to_string()),
            token_id: Some("7".to_string()),
            fee: None,
            nonce: None,
            signer: SignerFields::with_private_key("0x01"),
        }
    }

    #[tokio::test]
    async fn test_fungible_transfer_uses_token_decimals() {
        let (builder, client) = builder(6);
        let tx = builder.transfer(&transfer_body(ContractType::Fungible)).await.unwrap();
        let call = TransferCall::decode(&tx.data).unwrap();

        assert_eq!(call.amount, U256::from(1_500_000u64));
        assert_eq!(call.contract_type, U256::zero());
        assert_eq!(call.token_id, U256::zero());
        assert_eq!(tx.to, parse_address("w", WALLET).unwrap());
        assert_eq!(tx.chain_id, 80002);
        assert_eq!(client.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_oversized_token_decimals_is_an_error() {
        let (builder, client) = builder(80);
        let result = builder.transfer(&transfer_body(ContractType::Fungible)).await;

        assert!(matches!(result, Err(Error::InvalidAmount(_))));
        assert_eq!(client.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_native_transfer_skips_lookup() {
        let (builder, client) = builder(6);
        let tx = builder.transfer(&transfer_body(ContractType::Native)).await.unwrap();
        let call = TransferCall::decode(&tx.data).unwrap();

        assert_eq!(call.amount, U256::from(1_500_000_000_000_000_000u64));
        assert_eq!(call.token_address, Address::zero());
        assert_eq!(client.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_nft_transfer_carries_token_id() {
        let (builder, _) = builder(6);
        let tx = builder.transfer(&transfer_body(ContractType::NonFungible)).await.unwrap();
        let call = TransferCall::decode(&tx.data).unwrap();

        assert_eq!(call.token_id, U256::from(7u64));
        assert_eq!(call.amount, U256::zero());
    }

    #[tokio::test]
    async fn test_chain_mismatch() {
        let (builder, _) = builder(6);
        let mut body = transfer_body(ContractType::Native);
        body.chain = Chain::Bsc;
        assert!(matches!(builder.transfer(&body).await, Err(Error::ChainMismatch { .. })));
    }

    #[tokio::test]
    async fn test_batch_rejects_uneven_arrays_and_caches_decimals() {
        let (builder, client) = builder(18);
        let mut body = CustodialBatchTransferBody {
            chain: Chain::Polygon,
            custodial_address: WALLET.to_string(),
            recipient: vec![RECIPIENT.to_string(), RECIPIENT.to_string()],
            contract_type: vec![ContractType::Fungible, ContractType::Fungible],
            token_address: vec![TOKEN.to_string(), TOKEN.to_string()],
            amount: vec!["1".to_string(), "2".to_string()],
            token_id: vec!["0".to_string(), "0".to_string()],
            fee: Some(Fee {
                gas_limit: "100000".to_string(),
                gas_price: "20".to_string(),
            }),
            nonce: Some(4),
            signer: SignerFields::with_signature_id("sig"),
        };

        let tx = builder.transfer_batch(&body).await.unwrap();
        let call = TransferBatchCall::decode(&tx.data).unwrap();
        assert_eq!(call.amount.len(), 2);
        assert_eq!(client.lookups.load(Ordering::SeqCst), 1);
        assert_eq!(tx.gas_price, Some(U256::from(20_000_000_000u64)));
        assert_eq!(tx.gas_limit, Some(U256::from(100_000u64)));
        assert_eq!(tx.nonce, Some(U256::from(4u64)));

        body.amount.pop();
        assert!(matches!(builder.transfer_batch(&body).await, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_approve_native_is_unsupported() {
        let (builder, _) = builder(6);
        let body = CustodialApproveBody {
            chain: Chain::Polygon,
            custodial_address: WALLET.to_string(),
            spender: RECIPIENT.to_string(),
            contract_type: ContractType::Native,
            token_address: TOKEN.to_string(),
            amount: Some("1".to_string()),
            token_id: None,
            fee: None,
            nonce: None,
            signer: SignerFields::default(),
        };
        assert!(matches!(builder.approve(&body).await, Err(Error::UnsupportedCombination(_))));
    }

    #[test]
    fn test_generate_batch_needs_factory() {
        let client = Arc::new(FixedDecimals {
            decimals: 18,
            lookups: AtomicUsize::new(0),
        });
        let without = CustodialBuilder::new(Chain::Polygon, Network::Testnet, client, None).unwrap();
        assert!(matches!(
            without.generate_batch(RECIPIENT, 2, None, None),
            Err(Error::MissingTemplateInput(_))
        ));

        let (with, _) = builder(18);
        let tx = with.generate_batch(RECIPIENT, 2, None, None).unwrap();
        let call = CloneNewWalletCall::decode(&tx.data).unwrap();
        assert_eq!(call.count, U256::from(2u64));
        assert_eq!(call.owner, parse_address("owner", RECIPIENT).unwrap());
    }

    #[test]
    fn test_flow_is_not_an_evm_chain() {
        let client = Arc::new(FixedDecimals {
            decimals: 18,
            lookups: AtomicUsize::new(0),
        });
        assert!(matches!(
            CustodialBuilder::new(Chain::Flow, Network::Mainnet, client, None),
            Err(Error::ChainMismatch { .. })
        ));
    }
}

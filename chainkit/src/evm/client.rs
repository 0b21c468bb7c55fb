//! Read access to EVM chains

use std::sync::Arc;

use async_trait::async_trait;
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, U256};
use tracing::debug;

use crate::chain::{Chain, Network};
use crate::error::{Error, Result};
use super::contracts::Erc20Metadata;

/// Chain reads the custodial pipeline depends on
#[async_trait]
pub trait EvmChainClient: Send + Sync {
    /// ERC-20 `decimals()` of `token`
    async fn decimals(&self, token: Address) -> Result<u8>;

    /// Pending nonce of `address`
    async fn transaction_count(&self, address: Address) -> Result<U256>;

    async fn gas_price(&self) -> Result<U256>;

    async fn estimate_gas(&self, tx: &TypedTransaction) -> Result<U256>;
}

/// `EvmChainClient` over an ethers HTTP provider
pub struct EthersChainClient {
    provider: Arc<Provider<Http>>,
}

impl EthersChainClient {
    pub fn new(url: &str) -> Result<Self> {
        let provider = Provider::<Http>::try_from(url)
            .map_err(|e| Error::Config(format!("Failed to create provider: {}", e)))?;

        Ok(Self {
            provider: Arc::new(provider),
        })
    }

    /// Client for `chain`, using `provider` when given and the chain's public RPC otherwise
    pub fn for_chain(chain: Chain, network: Network, provider: Option<&str>) -> Result<Self> {
        let url = match provider {
            Some(url) => url,
            None => chain
                .default_rpc_url(network)
                .ok_or_else(|| Error::Config(format!("No RPC endpoint for {}", chain)))?,
        };
        debug!(%chain, ?network, url, "creating EVM chain client");
        Self::new(url)
    }

    pub fn url(&self) -> &str {
        self.provider.url().as_str()
    }
}

#[async_trait]
impl EvmChainClient for EthersChainClient {
    async fn decimals(&self, token: Address) -> Result<u8> {
        Erc20Metadata::new(token, self.provider.clone())
            .decimals()
            .call()
            .await
            .map_err(|e| Error::DecimalsLookup {
                token: format!("{:?}", token),
                message: e.to_string(),
            })
    }

    async fn transaction_count(&self, address: Address) -> Result<U256> {
        self.provider
            .get_transaction_count(address, None)
            .await
            .map_err(|e| Error::Network(format!("Failed to get transaction count: {}", e)))
    }

    async fn gas_price(&self) -> Result<U256> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| Error::Network(format!("Failed to get gas price: {}", e)))
    }

    async fn estimate_gas(&self, tx: &TypedTransaction) -> Result<U256> {
        self.provider
            .estimate_gas(tx, None)
            .await
            .map_err(|e| Error::Network(format!("Failed to estimate gas: {}", e)))
    }
}

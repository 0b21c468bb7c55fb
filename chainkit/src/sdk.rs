//! SDK entry point

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::api::{ApiServices, HostedApi, HttpHostedApi, KmsClient};
use crate::chain::{Chain, ChainFamily, Network};
use crate::config::SdkConfig;
use crate::error::{Error, Result};
use crate::evm::{CustodialSdk, EthersChainClient, EvmChainClient};
use crate::flow::{FlowAccess, FlowRestClient, FlowSdk};
use crate::transaction::{CallContext, SendResult, TransactionIntent};

/// Composition root: one hosted API client shared by every chain pipeline
pub struct ChainKit {
    config: SdkConfig,
    api: Arc<dyn HostedApi>,
    flow: FlowSdk,
}

impl ChainKit {
    /// Connect to the hosted API and the configured network
    pub fn new(config: SdkConfig) -> Result<Self> {
        let api = Arc::new(HttpHostedApi::new(&config)?);
        Self::with_api(config, api)
    }

    /// Use a caller supplied hosted API client
    pub fn with_api(config: SdkConfig, api: Arc<dyn HostedApi>) -> Result<Self> {
        let network = config.network();
        let access = Arc::new(flow_access(network, config.provider(Chain::Flow)));
        let flow = FlowSdk::new(api.clone(), access, network, &config.flow)?;
        debug!(?network, url = %config.url, "chainkit initialised");

        Ok(Self { config, api, flow })
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    pub fn network(&self) -> Network {
        self.config.network()
    }

    pub fn api(&self) -> ApiServices {
        ApiServices::new(self.api.clone())
    }

    pub fn kms(&self) -> KmsClient {
        KmsClient::new(self.api.clone())
    }

    /// Flow pipeline on the configured network
    pub fn flow(&self) -> &FlowSdk {
        &self.flow
    }

    /// Flow pipeline on another network or access node
    pub fn flow_on(&self, network: Network, provider: Option<&str>) -> Result<FlowSdk> {
        let access = Arc::new(flow_access(network, provider));
        FlowSdk::new(self.api.clone(), access, network, &self.config.flow)
    }

    pub fn flow_with_access(&self, network: Network, access: Arc<dyn FlowAccess>) -> Result<FlowSdk> {
        FlowSdk::new(self.api.clone(), access, network, &self.config.flow)
    }

    /// Custodial pipeline for `chain` on the configured network
    pub fn custodial(&self, chain: Chain) -> Result<CustodialSdk> {
        self.custodial_on(chain, self.network(), self.config.provider(chain))
    }

    /// Custodial pipeline on another network or RPC endpoint
    pub fn custodial_on(&self, chain: Chain, network: Network, provider: Option<&str>) -> Result<CustodialSdk> {
        ensure_evm(chain)?;
        let client = Arc::new(EthersChainClient::for_chain(chain, network, provider)?);
        self.custodial_with_client(chain, network, client)
    }

    pub fn custodial_with_client(
        &self,
        chain: Chain,
        network: Network,
        client: Arc<dyn EvmChainClient>,
    ) -> Result<CustodialSdk> {
        ensure_evm(chain)?;
        let factory = self.config.custodial_factories.get(&chain).map(String::as_str);
        CustodialSdk::new(chain, network, self.api.clone(), client, factory)
    }

    /// Send any intent on the chain it names
    pub async fn send(&self, intent: &TransactionIntent) -> Result<SendResult> {
        self.send_with(intent, CallContext::new()).await
    }

    #[instrument(skip_all, fields(correlation_id = %ctx.correlation_id(), chain = %intent.chain(), operation = intent.kind()))]
    pub async fn send_with(&self, intent: &TransactionIntent, ctx: CallContext) -> Result<SendResult> {
        match intent.chain().family() {
            ChainFamily::Flow => self.flow.send_with(ctx).intent(intent).await,
            ChainFamily::Evm => self.custodial(intent.chain())?.send_with(ctx).intent(intent).await,
        }
    }
}

fn flow_access(network: Network, provider: Option<&str>) -> FlowRestClient {
    match provider {
        Some(url) => FlowRestClient::new(url),
        None => FlowRestClient::for_network(network),
    }
}

fn ensure_evm(chain: Chain) -> Result<()> {
    if chain.family() != ChainFamily::Evm {
        return Err(Error::ChainMismatch {
            expected: "EVM chain".to_string(),
            actual: chain.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLOW_NODE: &str = "http://flow-node.local:8888";
    const POLYGON_RPC: &str = "http://polygon-rpc.local:8545/";

    #[test]
    fn test_providers_are_keyed_by_chain() {
        let config = SdkConfig::new("key")
            .with_testnet(true)
            .with_provider(Chain::Flow, FLOW_NODE)
            .with_provider(Chain::Polygon, POLYGON_RPC);

        let access = flow_access(config.network(), config.provider(Chain::Flow));
        assert_eq!(access.base_url(), FLOW_NODE);

        let polygon = EthersChainClient::for_chain(Chain::Polygon, config.network(), config.provider(Chain::Polygon)).unwrap();
        assert_eq!(polygon.url(), POLYGON_RPC);

        let ethereum = EthersChainClient::for_chain(Chain::Ethereum, config.network(), config.provider(Chain::Ethereum)).unwrap();
        assert_ne!(ethereum.url(), FLOW_NODE);
        assert_ne!(ethereum.url(), POLYGON_RPC);
    }

    #[test]
    fn test_flow_provider_does_not_reach_evm_chains() {
        let config = SdkConfig::new("key").with_provider(Chain::Flow, FLOW_NODE);
        assert_eq!(config.provider(Chain::Polygon), None);
        assert_eq!(
            flow_access(Network::Mainnet, config.provider(Chain::Flow)).base_url(),
            FLOW_NODE
        );
    }
}

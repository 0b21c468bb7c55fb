//! SDK configuration

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;

use crate::chain::{Chain, Network};
use crate::error::{Error, Result};
use crate::flow::constants::DEFAULT_GAS_LIMIT;

pub const ENV_API_KEY: &str = "CHAINKIT_API_KEY";
pub const ENV_API_URL: &str = "CHAINKIT_API_URL";
/// Prefix of the per chain endpoint overrides, e.g. `CHAINKIT_PROVIDER_MATIC`
pub const ENV_PROVIDER_PREFIX: &str = "CHAINKIT_PROVIDER_";
pub const ENV_TESTNET: &str = "CHAINKIT_TESTNET";

/// Hosted API base URL
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ApiUrl {
    /// Global endpoint
    #[default]
    Default,
    /// European region
    Eu,
    /// US region
    Us,
    /// Any other deployment
    Custom(String),
}

impl ApiUrl {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Default => "https://api.tatum.io",
            Self::Eu => "https://api-eu1.tatum.io",
            Self::Us => "https://api-us-west1.tatum.io",
            Self::Custom(url) => url,
        }
    }

    /// Recognise the regional endpoints, anything else is custom
    pub fn parse(url: &str) -> Self {
        let trimmed = url.trim().trim_end_matches('/');
        [Self::Default, Self::Eu, Self::Us]
            .into_iter()
            .find(|known| known.as_str() == trimmed)
            .unwrap_or_else(|| Self::Custom(trimmed.to_string()))
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flow pipeline settings
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Computation limit attached to every transaction
    pub gas_limit: u64,
    /// Delay between transaction result polls
    pub poll_interval: Duration,
    /// NFT contract address replacing the network default
    pub nft_contract: Option<String>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            gas_limit: DEFAULT_GAS_LIMIT,
            poll_interval: Duration::from_secs(1),
            nft_contract: None,
        }
    }
}

/// Top level SDK configuration
#[derive(Clone, Default)]
pub struct SdkConfig {
    /// Hosted API key, sent as `x-api-key`
    pub api_key: String,
    pub url: ApiUrl,
    /// Node endpoint per chain replacing the public default: a Flow access node or an EVM JSON-RPC url
    pub providers: HashMap<Chain, String>,
    pub testnet: bool,
    /// Request timeout in seconds
    pub timeout: Option<u64>,
    pub flow: FlowConfig,
    /// Custodial wallet factory contract per chain
    pub custodial_factories: HashMap<Chain, String>,
}

impl fmt::Debug for SdkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdkConfig")
            .field("url", &self.url)
            .field("providers", &self.providers)
            .field("testnet", &self.testnet)
            .field("timeout", &self.timeout)
            .field("flow", &self.flow)
            .field("custodial_factories", &self.custodial_factories)
            .finish_non_exhaustive()
    }
}

impl SdkConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Read `CHAINKIT_*` variables from the environment
    pub fn from_env() -> Result<Self> {
        let api_key = env::var(ENV_API_KEY)
            .map_err(|_| Error::Config(format!("{} is not set", ENV_API_KEY)))?;

        let mut config = Self::new(api_key);
        if let Ok(url) = env::var(ENV_API_URL) {
            config.url = ApiUrl::parse(&url);
        }
        for chain in Chain::ALL {
            if let Ok(provider) = env::var(format!("{}{}", ENV_PROVIDER_PREFIX, chain.code())) {
                if !provider.trim().is_empty() {
                    config.providers.insert(chain, provider.trim().to_string());
                }
            }
        }
        if let Ok(testnet) = env::var(ENV_TESTNET) {
            config.testnet = parse_flag(&testnet)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_url(mut self, url: ApiUrl) -> Self {
        self.url = url;
        self
    }

    pub fn with_provider(mut self, chain: Chain, provider: impl Into<String>) -> Self {
        self.providers.insert(chain, provider.into());
        self
    }

    /// Endpoint override for `chain`, if any
    pub fn provider(&self, chain: Chain) -> Option<&str> {
        self.providers.get(&chain).map(String::as_str)
    }

    pub fn with_testnet(mut self, testnet: bool) -> Self {
        self.testnet = testnet;
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    pub fn with_flow(mut self, flow: FlowConfig) -> Self {
        self.flow = flow;
        self
    }

    pub fn with_custodial_factory(mut self, chain: Chain, address: impl Into<String>) -> Self {
        self.custodial_factories.insert(chain, address.into());
        self
    }

    pub fn network(&self) -> Network {
        Network::from_testnet_flag(self.testnet)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Config("API key must not be empty".to_string()));
        }
        if let ApiUrl::Custom(url) = &self.url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(Error::Config(format!("Invalid API URL: {}", url)));
            }
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        other => Err(Error::Config(format!("Invalid boolean '{}'", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_parse() {
        assert_eq!(ApiUrl::parse("https://api.tatum.io/"), ApiUrl::Default);
        assert_eq!(ApiUrl::parse("https://api-eu1.tatum.io"), ApiUrl::Eu);
        assert_eq!(
            ApiUrl::parse("http://localhost:8080"),
            ApiUrl::Custom("http://localhost:8080".to_string())
        );
    }

    #[test]
    fn test_builder_and_network() {
        let config = SdkConfig::new("key")
            .with_testnet(true)
            .with_provider(Chain::Polygon, "https://node.example")
            .with_custodial_factory(Chain::Polygon, "0xabc");
        assert_eq!(config.network(), Network::Testnet);
        assert_eq!(config.provider(Chain::Polygon), Some("https://node.example"));
        assert_eq!(config.provider(Chain::Flow), None);
        assert_eq!(config.provider(Chain::Ethereum), None);
        assert_eq!(config.custodial_factories.get(&Chain::Polygon).map(String::as_str), Some("0xabc"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        assert!(matches!(SdkConfig::new(" ").validate(), Err(Error::Config(_))));
        let config = SdkConfig::new("key").with_url(ApiUrl::Custom("ftp://x".to_string()));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = SdkConfig::new("super-secret");
        assert!(!format!("{:?}", config).contains("super-secret"));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE").unwrap());
        assert!(!parse_flag("0").unwrap());
        assert!(parse_flag("maybe").is_err());
    }
}

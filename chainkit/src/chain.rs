//! Supported chains, chain families and networks

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Chain family sharing a key scheme and a transaction pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainFamily {
    /// Flow
    Flow,
    /// Ethereum and EVM compatible chains
    Evm,
}

impl ChainFamily {
    /// BIP-44 coin type used for mnemonic derivation
    pub fn coin_type(&self) -> u32 {
        match self {
            Self::Flow => 539,
            Self::Evm => 60,
        }
    }

    /// Derivation path for the given account index
    pub fn derivation_path(&self, index: u32) -> String {
        format!("m/44'/{}'/0'/0/{}", self.coin_type(), index)
    }
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flow => f.write_str("flow"),
            Self::Evm => f.write_str("evm"),
        }
    }
}

/// Network selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    pub fn from_testnet_flag(testnet: bool) -> Self {
        if testnet {
            Self::Testnet
        } else {
            Self::Mainnet
        }
    }

    pub fn is_testnet(&self) -> bool {
        matches!(self, Self::Testnet)
    }
}

/// Blockchain identifier as used by the hosted API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chain {
    #[serde(rename = "FLOW")]
    Flow,
    #[serde(rename = "ETH")]
    Ethereum,
    #[serde(rename = "MATIC")]
    Polygon,
    #[serde(rename = "BSC")]
    Bsc,
    #[serde(rename = "CELO")]
    Celo,
    #[serde(rename = "ONE")]
    Harmony,
    #[serde(rename = "KLAY")]
    Klaytn,
}

impl Chain {
    pub const ALL: [Chain; 7] = [
        Self::Flow,
        Self::Ethereum,
        Self::Polygon,
        Self::Bsc,
        Self::Celo,
        Self::Harmony,
        Self::Klaytn,
    ];

    pub fn family(&self) -> ChainFamily {
        match self {
            Self::Flow => ChainFamily::Flow,
            _ => ChainFamily::Evm,
        }
    }

    /// Ticker used on the wire
    pub fn code(&self) -> &'static str {
        match self {
            Self::Flow => "FLOW",
            Self::Ethereum => "ETH",
            Self::Polygon => "MATIC",
            Self::Bsc => "BSC",
            Self::Celo => "CELO",
            Self::Harmony => "ONE",
            Self::Klaytn => "KLAY",
        }
    }

    /// Path segment of the chain's hosted API routes
    pub fn api_path(&self) -> &'static str {
        match self {
            Self::Flow => "flow",
            Self::Ethereum => "ethereum",
            Self::Polygon => "polygon",
            Self::Bsc => "bsc",
            Self::Celo => "celo",
            Self::Harmony => "one",
            Self::Klaytn => "klaytn",
        }
    }

    /// EIP-155 chain id, `None` for non-EVM chains
    pub fn chain_id(&self, network: Network) -> Option<u64> {
        let id = match (self, network) {
            (Self::Flow, _) => return None,
            (Self::Ethereum, Network::Mainnet) => 1,
            (Self::Ethereum, Network::Testnet) => 11155111, // Sepolia
            (Self::Polygon, Network::Mainnet) => 137,
            (Self::Polygon, Network::Testnet) => 80002, // Amoy
            (Self::Bsc, Network::Mainnet) => 56,
            (Self::Bsc, Network::Testnet) => 97,
            (Self::Celo, Network::Mainnet) => 42220,
            (Self::Celo, Network::Testnet) => 44787, // Alfajores
            (Self::Harmony, Network::Mainnet) => 1666600000,
            (Self::Harmony, Network::Testnet) => 1666700000,
            (Self::Klaytn, Network::Mainnet) => 8217,
            (Self::Klaytn, Network::Testnet) => 1001, // Baobab
        };
        Some(id)
    }

    /// Decimals of the chain's native coin
    pub fn native_decimals(&self) -> u32 {
        match self {
            Self::Flow => 8,
            _ => 18,
        }
    }

    /// Public JSON-RPC endpoint used when no provider override is configured
    pub fn default_rpc_url(&self, network: Network) -> Option<&'static str> {
        let url = match (self, network) {
            (Self::Flow, _) => return None,
            (Self::Ethereum, Network::Mainnet) => "https://ethereum-rpc.publicnode.com",
            (Self::Ethereum, Network::Testnet) => "https://ethereum-sepolia-rpc.publicnode.com",
            (Self::Polygon, Network::Mainnet) => "https://polygon-bor-rpc.publicnode.com",
            (Self::Polygon, Network::Testnet) => "https://polygon-amoy-bor-rpc.publicnode.com",
            (Self::Bsc, Network::Mainnet) => "https://bsc-dataseed.bnbchain.org",
            (Self::Bsc, Network::Testnet) => "https://data-seed-prebsc-1-s1.bnbchain.org:8545",
            (Self::Celo, Network::Mainnet) => "https://forno.celo.org",
            (Self::Celo, Network::Testnet) => "https://alfajores-forno.celo-testnet.org",
            (Self::Harmony, Network::Mainnet) => "https://api.harmony.one",
            (Self::Harmony, Network::Testnet) => "https://api.s0.b.hmny.io",
            (Self::Klaytn, Network::Mainnet) => "https://public-en-cypress.klaytn.net",
            (Self::Klaytn, Network::Testnet) => "https://public-en-baobab.klaytn.net",
        };
        Some(url)
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Chain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "FLOW" => Ok(Self::Flow),
            "ETH" => Ok(Self::Ethereum),
            "MATIC" => Ok(Self::Polygon),
            "BSC" => Ok(Self::Bsc),
            "CELO" => Ok(Self::Celo),
            "ONE" => Ok(Self::Harmony),
            "KLAY" => Ok(Self::Klaytn),
            other => Err(Error::Config(format!("Unsupported chain: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_family() {
        assert_eq!(Chain::Flow.family(), ChainFamily::Flow);
        assert_eq!(Chain::Celo.family(), ChainFamily::Evm);
    }

    #[test]
    fn test_chain_serde_uses_tickers() {
        assert_eq!(serde_json::to_string(&Chain::Polygon).unwrap(), "\"MATIC\"");
        let chain: Chain = serde_json::from_str("\"KLAY\"").unwrap();
        assert_eq!(chain, Chain::Klaytn);
        assert_eq!("bsc".parse::<Chain>().unwrap(), Chain::Bsc);
    }

    #[test]
    fn test_derivation_path() {
        assert_eq!(ChainFamily::Flow.derivation_path(3), "m/44'/539'/0'/0/3");
        assert_eq!(ChainFamily::Evm.derivation_path(0), "m/44'/60'/0'/0/0");
    }

    #[test]
    fn test_chain_ids() {
        assert_eq!(Chain::Ethereum.chain_id(Network::Mainnet), Some(1));
        assert_eq!(Chain::Bsc.chain_id(Network::Testnet), Some(97));
        assert_eq!(Chain::Flow.chain_id(Network::Mainnet), None);
    }
}

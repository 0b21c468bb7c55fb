//! Flow network constants: contract addresses, storage paths and access nodes

use serde::{Deserialize, Serialize};

use crate::chain::Network;
use super::address::FlowAddress;

pub const MAINNET_ACCESS_NODE: &str = "https://rest-mainnet.onflow.org/v1";
pub const TESTNET_ACCESS_NODE: &str = "https://rest-testnet.onflow.org/v1";

/// Name of the deployed multi-token NFT contract
pub const NFT_CONTRACT_NAME: &str = "TatumMultiNFT";

/// Event emitted by the service account when a new account is created
pub const ACCOUNT_CREATED_EVENT: &str = "flow.AccountCreated";

pub const DEFAULT_GAS_LIMIT: u64 = 1000;
pub const DEFAULT_KEY_WEIGHT: u32 = 1000;

pub fn access_node(network: Network) -> &'static str {
    match network {
        Network::Mainnet => MAINNET_ACCESS_NODE,
        Network::Testnet => TESTNET_ACCESS_NODE,
    }
}

/// Fungible tokens supported by the transfer template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FlowCurrency {
    Flow,
    Fusd,
}

/// Contract and storage paths backing a fungible token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenInfo {
    /// Cadence contract name
    pub name: &'static str,
    pub address: FlowAddress,
    pub vault_path: &'static str,
    pub receiver_path: &'static str,
}

/// Core contract addresses for one network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowContracts {
    pub fungible_token: FlowAddress,
    pub flow_token: FlowAddress,
    pub fusd: FlowAddress,
    pub nft: FlowAddress,
}

impl FlowContracts {
    pub const MAINNET: Self = Self {
        fungible_token: FlowAddress::from_u64(0xf233dcee88fe0abe),
        flow_token: FlowAddress::from_u64(0x1654653399040a61),
        fusd: FlowAddress::from_u64(0x3c5959b568896393),
        nft: FlowAddress::from_u64(0x354e6721564ccd2c),
    };

    pub const TESTNET: Self = Self {
        fungible_token: FlowAddress::from_u64(0x9a0766d93b6608b7),
        flow_token: FlowAddress::from_u64(0x7e60df042a9c0868),
        fusd: FlowAddress::from_u64(0xe223d8a629e49c68),
        nft: FlowAddress::from_u64(0x87fe4ebd0cddde06),
    };

    pub fn for_network(network: Network) -> Self {
        match network {
            Network::Mainnet => Self::MAINNET,
            Network::Testnet => Self::TESTNET,
        }
    }

    /// Replace the NFT contract address
    pub fn with_nft(mut self, nft: FlowAddress) -> Self {
        self.nft = nft;
        self
    }

    pub fn token(&self, currency: FlowCurrency) -> TokenInfo {
        match currency {
            FlowCurrency::Flow => TokenInfo {
                name: "FlowToken",
                address: self.flow_token,
                vault_path: "flowTokenVault",
                receiver_path: "flowTokenReceiver",
            },
            FlowCurrency::Fusd => TokenInfo {
                name: "FUSD",
                address: self.fusd,
                vault_path: "fusdVault",
                receiver_path: "fusdReceiver",
            },
        }
    }

    /// Fully qualified type of the NFT contract's `Minted` event
    pub fn minted_event(&self) -> String {
        format!("A.{}.{}.Minted", self.nft.to_hex(), NFT_CONTRACT_NAME)
    }
}

//! Hosted API routes

use reqwest::Method;

use crate::chain::Chain;

/// A hosted API route: method plus path relative to the base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiOperation {
    pub method: Method,
    pub path: String,
}

impl ApiOperation {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }
}

// Flow

pub fn flow_transfer() -> ApiOperation {
    ApiOperation::post("/v3/flow/transaction")
}

pub fn flow_create_account() -> ApiOperation {
    ApiOperation::post("/v3/flow/account")
}

pub fn flow_add_public_key() -> ApiOperation {
    ApiOperation::put("/v3/flow/account/key")
}

pub fn nft_mint() -> ApiOperation {
    ApiOperation::post("/v3/nft/mint")
}

pub fn nft_mint_batch() -> ApiOperation {
    ApiOperation::post("/v3/nft/mint/batch")
}

pub fn nft_burn() -> ApiOperation {
    ApiOperation::post("/v3/nft/burn")
}

pub fn nft_transfer() -> ApiOperation {
    ApiOperation::post("/v3/nft/transaction")
}

/// Broadcast a signed transaction, or queue an unsigned one for the external signer
pub fn broadcast(chain: Chain) -> ApiOperation {
    ApiOperation::post(format!("/v3/{}/broadcast", chain.api_path()))
}

pub fn estimate_gas(chain: Chain) -> ApiOperation {
    ApiOperation::post(format!("/v3/{}/gas", chain.api_path()))
}

// Custodial wallets

/// Fee-covered custodial wallet batch generation
pub fn custodial_batch() -> ApiOperation {
    ApiOperation::post("/v3/blockchain/sc/custodial/batch")
}

pub fn custodial_addresses(chain: Chain, tx_id: &str) -> ApiOperation {
    ApiOperation::get(format!("/v3/blockchain/sc/custodial/{}/{}", chain.code(), tx_id))
}

// KMS

pub fn kms_get(id: &str) -> ApiOperation {
    ApiOperation::get(format!("/v3/kms/{}", id))
}

pub fn kms_pending(chain: Chain) -> ApiOperation {
    ApiOperation::get(format!("/v3/kms/pending/{}", chain.code()))
}

pub fn kms_complete(id: &str, tx_id: &str) -> ApiOperation {
    ApiOperation::put(format!("/v3/kms/{}/{}", id, tx_id))
}

pub fn kms_delete(id: &str) -> ApiOperation {
    ApiOperation::delete(format!("/v3/kms/{}", id))
}

// Utilities

pub fn exchange_rate(currency: &str, base_pair: &str) -> ApiOperation {
    ApiOperation::get(format!("/v3/tatum/rate/{}?basePair={}", currency, base_pair))
}

pub fn version() -> ApiOperation {
    ApiOperation::get("/v3/tatum/version")
}

pub fn credit_usage() -> ApiOperation {
    ApiOperation::get("/v3/tatum/usage")
}

//! Flow SDK: `prepare` and `send` for every Flow operation

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::api::{endpoints, ApiOperation, HostedApi, KmsClient};
use crate::chain::{Chain, ChainFamily, Network};
use crate::config::FlowConfig;
use crate::error::{Error, Result};
use crate::transaction::{
    resolve_key, CallContext, PreparedTransaction, ResolvedKey, SendResult, TransactionIntent,
    TransactionResult,
};
use super::access::FlowAccess;
use super::address::FlowAddress;
use super::broadcaster::FlowBroadcaster;
use super::builder::{FlowTemplateBuilder, FlowTransactionTemplate};
use super::constants::FlowContracts;
use super::encoding::SignedFlowTransaction;
use super::events;
use super::signer::{FlowRoles, LocalKeySigner};
use super::types::*;

/// Where a Flow request is routed once its signing material is resolved
enum Route {
    Local(FlowRoles),
    Kms { signature_id: String },
}

/// Hosted endpoint a request is queued on when signed externally
struct KmsTarget {
    operation: ApiOperation,
    body: Value,
}

impl KmsTarget {
    fn new<B: Serialize>(operation: ApiOperation, body: &B) -> Result<Self> {
        let body = serde_json::to_value(body)
            .map_err(|e| Error::Serialization(format!("Failed to serialize request: {}", e)))?;
        Ok(Self { operation, body })
    }

    /// NFT endpoints are shared across chains and need the chain in the body
    fn nft<B: Serialize>(operation: ApiOperation, body: &B) -> Result<Self> {
        let mut target = Self::new(operation, body)?;
        if let Some(map) = target.body.as_object_mut() {
            map.insert("chain".to_string(), json!(Chain::Flow));
        }
        Ok(target)
    }
}

/// Flow pipeline bound to one network
pub struct FlowSdk {
    kms: KmsClient,
    network: Network,
    builder: FlowTemplateBuilder,
    broadcaster: FlowBroadcaster,
}

impl FlowSdk {
    pub fn new(
        api: Arc<dyn HostedApi>,
        access: Arc<dyn FlowAccess>,
        network: Network,
        config: &FlowConfig,
    ) -> Result<Self> {
        let mut contracts = FlowContracts::for_network(network);
        if let Some(nft) = &config.nft_contract {
            contracts = contracts.with_nft(nft.parse()?);
        }

        Ok(Self {
            kms: KmsClient::new(api),
            network,
            builder: FlowTemplateBuilder::new(contracts),
            broadcaster: FlowBroadcaster::new(access, config.gas_limit, config.poll_interval),
        })
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn contracts(&self) -> &FlowContracts {
        self.builder.contracts()
    }

    pub fn builder(&self) -> &FlowTemplateBuilder {
        &self.builder
    }

    /// Build and sign without broadcasting
    pub fn prepare(&self) -> FlowPrepare<'_> {
        self.prepare_with(CallContext::new())
    }

    pub fn prepare_with(&self, ctx: CallContext) -> FlowPrepare<'_> {
        FlowPrepare { sdk: self, ctx }
    }

    /// Build, sign and broadcast, or queue for the external signer
    pub fn send(&self) -> FlowSend<'_> {
        self.send_with(CallContext::new())
    }

    pub fn send_with(&self, ctx: CallContext) -> FlowSend<'_> {
        FlowSend { sdk: self, ctx }
    }

    /// Token ids minted by a sealed mint transaction
    pub fn minted_token_ids(&self, result: &TransactionResult) -> Vec<String> {
        events::minted_token_ids(result, self.contracts())
    }

    /// Address created by a sealed account creation transaction
    pub fn created_account_address(&self, result: &TransactionResult) -> Option<String> {
        events::created_account_address(result)
    }

    fn route(&self, sender: &FlowSender) -> Result<Route> {
        let address: FlowAddress = sender.account.parse()?;
        match resolve_key(&sender.signer, ChainFamily::Flow)? {
            ResolvedKey::Local(key) => {
                let signer = LocalKeySigner::new(address, sender.key_index, key)?;
                Ok(Route::Local(FlowRoles::single(Arc::new(signer))))
            }
            ResolvedKey::Remote { signature_id, .. } => Ok(Route::Kms { signature_id }),
        }
    }

    async fn prepare_template(
        &self,
        template: FlowTransactionTemplate,
        sender: &FlowSender,
        ctx: &CallContext,
    ) -> Result<PreparedTransaction<SignedFlowTransaction>> {
        match self.route(sender)? {
            Route::Local(roles) => Ok(PreparedTransaction::Signed(
                self.broadcaster.sign(&template, &roles, ctx).await?,
            )),
            Route::Kms { signature_id } => Ok(PreparedTransaction::Unsigned {
                payload: json!({
                    "account": sender.account,
                    "script": template.script,
                    "arguments": template.arguments,
                }),
                signature_id,
            }),
        }
    }

    #[instrument(skip_all, fields(correlation_id = %ctx.correlation_id(), operation = operation))]
    async fn send_template(
        &self,
        operation: &'static str,
        template: FlowTransactionTemplate,
        sender: &FlowSender,
        kms: impl FnOnce() -> Result<KmsTarget>,
        ctx: &CallContext,
    ) -> Result<SendResult> {
        match self.route(sender)? {
            Route::Local(roles) => {
                info!(route = "local", "sending flow transaction");
                let result = self.broadcaster.send(&template, &roles, ctx).await?;
                Ok(SendResult::Broadcast(result))
            }
            Route::Kms { .. } => {
                info!(route = "kms", "queueing flow transaction");
                let target = kms()?;
                let signature_id = self.kms.enqueue(&target.operation, &target.body).await?;
                Ok(SendResult::Kms { signature_id })
            }
        }
    }
}

fn custom_kms_target(body: &FlowCustomTransactionBody, template: &FlowTransactionTemplate) -> Result<KmsTarget> {
    let tx_data = json!({
        "account": body.sender.account,
        "script": template.script,
        "arguments": template.arguments,
    });
    let mut request = json!({ "txData": tx_data.to_string() });
    if let Some(signature_id) = body.sender.signer.remote_signature_id() {
        request["signatureId"] = json!(signature_id);
    }
    if let Some(index) = body.sender.signer.index {
        request["index"] = json!(index);
    }
    Ok(KmsTarget {
        operation: endpoints::broadcast(Chain::Flow),
        body: request,
    })
}

/// `prepare` operations
pub struct FlowPrepare<'a> {
    sdk: &'a FlowSdk,
    ctx: CallContext,
}

type Prepared = Result<PreparedTransaction<SignedFlowTransaction>>;

impl FlowPrepare<'_> {
    pub async fn transfer(&self, body: &FlowTransferBody) -> Prepared {
        let template = self.sdk.builder.transfer(body)?;
        self.sdk.prepare_template(template, &body.sender, &self.ctx).await
    }

    pub async fn mint_nft(&self, body: &FlowMintNftBody) -> Prepared {
        let template = self.sdk.builder.mint_nft(body)?;
        self.sdk.prepare_template(template, &body.sender, &self.ctx).await
    }

    pub async fn mint_multiple_nft(&self, body: &FlowMintMultipleNftBody) -> Prepared {
        let template = self.sdk.builder.mint_multiple_nft(body)?;
        self.sdk.prepare_template(template, &body.sender, &self.ctx).await
    }

    pub async fn burn_nft(&self, body: &FlowBurnNftBody) -> Prepared {
        let template = self.sdk.builder.burn_nft(body)?;
        self.sdk.prepare_template(template, &body.sender, &self.ctx).await
    }

    pub async fn transfer_nft(&self, body: &FlowTransferNftBody) -> Prepared {
        let template = self.sdk.builder.transfer_nft(body)?;
        self.sdk.prepare_template(template, &body.sender, &self.ctx).await
    }

    pub async fn custom_transaction(&self, body: &FlowCustomTransactionBody) -> Prepared {
        let template = self.sdk.builder.custom(body)?;
        self.sdk.prepare_template(template, &body.sender, &self.ctx).await
    }

    pub async fn create_account(&self, body: &FlowCreateAccountBody) -> Prepared {
        let template = self.sdk.builder.create_account(body)?;
        self.sdk.prepare_template(template, &body.sender, &self.ctx).await
    }

    pub async fn add_public_key(&self, body: &FlowAddPublicKeyBody) -> Prepared {
        let template = self.sdk.builder.add_public_key(body)?;
        self.sdk.prepare_template(template, &body.sender, &self.ctx).await
    }
}

/// `send` operations
pub struct FlowSend<'a> {
    sdk: &'a FlowSdk,
    ctx: CallContext,
}

impl FlowSend<'_> {
    pub async fn transfer(&self, body: &FlowTransferBody) -> Result<SendResult> {
        let template = self.sdk.builder.transfer(body)?;
        let kms = || KmsTarget::new(endpoints::flow_transfer(), body);
        self.sdk
            .send_template("transfer", template, &body.sender, kms, &self.ctx)
            .await
    }

    pub async fn mint_nft(&self, body: &FlowMintNftBody) -> Result<SendResult> {
        let template = self.sdk.builder.mint_nft(body)?;
        let kms = || KmsTarget::nft(endpoints::nft_mint(), body);
        self.sdk
            .send_template("mint_nft", template, &body.sender, kms, &self.ctx)
            .await
    }

    pub async fn mint_multiple_nft(&self, body: &FlowMintMultipleNftBody) -> Result<SendResult> {
        let template = self.sdk.builder.mint_multiple_nft(body)?;
        let kms = || KmsTarget::nft(endpoints::nft_mint_batch(), body);
        self.sdk
            .send_template("mint_multiple_nft", template, &body.sender, kms, &self.ctx)
            .await
    }

    pub async fn burn_nft(&self, body: &FlowBurnNftBody) -> Result<SendResult> {
        let template = self.sdk.builder.burn_nft(body)?;
        let kms = || KmsTarget::nft(endpoints::nft_burn(), body);
        self.sdk
            .send_template("burn_nft", template, &body.sender, kms, &self.ctx)
            .await
    }

    pub async fn transfer_nft(&self, body: &FlowTransferNftBody) -> Result<SendResult> {
        let template = self.sdk.builder.transfer_nft(body)?;
        let kms = || KmsTarget::nft(endpoints::nft_transfer(), body);
        self.sdk
            .send_template("transfer_nft", template, &body.sender, kms, &self.ctx)
            .await
    }

    pub async fn custom_transaction(&self, body: &FlowCustomTransactionBody) -> Result<SendResult> {
        let template = self.sdk.builder.custom(body)?;
        let target = custom_kms_target(body, &template);
        self.sdk
            .send_template("custom_transaction", template, &body.sender, || target, &self.ctx)
            .await
    }

    pub async fn create_account(&self, body: &FlowCreateAccountBody) -> Result<SendResult> {
        let template = self.sdk.builder.create_account(body)?;
        let kms = || KmsTarget::new(endpoints::flow_create_account(), body);
        self.sdk
            .send_template("create_account", template, &body.sender, kms, &self.ctx)
            .await
    }

    pub async fn add_public_key(&self, body: &FlowAddPublicKeyBody) -> Result<SendResult> {
        let template = self.sdk.builder.add_public_key(body)?;
        let kms = || KmsTarget::new(endpoints::flow_add_public_key(), body);
        self.sdk
            .send_template("add_public_key", template, &body.sender, kms, &self.ctx)
            .await
    }

    /// Send any Flow intent
    pub async fn intent(&self, intent: &TransactionIntent) -> Result<SendResult> {
        match intent {
            TransactionIntent::Transfer(body) => self.transfer(body).await,
            TransactionIntent::MintNft(body) => self.mint_nft(body).await,
            TransactionIntent::MintMultipleNft(body) => self.mint_multiple_nft(body).await,
            TransactionIntent::BurnNft(body) => self.burn_nft(body).await,
            TransactionIntent::TransferNft(body) => self.transfer_nft(body).await,
            TransactionIntent::CustomTransaction(body) => self.custom_transaction(body).await,
            TransactionIntent::CreateAccount(body) => self.create_account(body).await,
            TransactionIntent::AddPublicKey(body) => self.add_public_key(body).await,
            other => Err(Error::ChainMismatch {
                expected: Chain::Flow.to_string(),
                actual: other.chain().to_string(),
            }),
        }
    }
}

//! Custodial wallet SDK: `prepare` and `send` for one EVM chain

use std::convert::TryFrom;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use crate::api::{endpoints, ApiServices, BroadcastResponse, HostedApi};
use crate::chain::{Chain, ChainFamily, Network};
use crate::crypto::keys::PrivateKey;
use crate::error::{Error, Result};
use crate::transaction::{
    resolve_key, CallContext, PreparedTransaction, ResolvedKey, SendResult, SignerFields,
    TransactionIntent, TransactionResult, TransactionState,
};
use super::builder::CustodialBuilder;
use super::client::EvmChainClient;
use super::signer::EvmSigner;
use super::types::*;

/// Custodial pipeline bound to one EVM chain and network
pub struct CustodialSdk {
    network: Network,
    api: Arc<dyn HostedApi>,
    services: ApiServices,
    client: Arc<dyn EvmChainClient>,
    builder: CustodialBuilder,
}

impl CustodialSdk {
    pub fn new(
        chain: Chain,
        network: Network,
        api: Arc<dyn HostedApi>,
        client: Arc<dyn EvmChainClient>,
        factory: Option<&str>,
    ) -> Result<Self> {
        let builder = CustodialBuilder::new(chain, network, client.clone(), factory)?;
        Ok(Self {
            network,
            services: ApiServices::new(api.clone()),
            api,
            client,
            builder,
        })
    }

    pub fn chain(&self) -> Chain {
        self.builder.chain()
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn builder(&self) -> &CustodialBuilder {
        &self.builder
    }

    /// Build and sign without broadcasting
    pub fn prepare(&self) -> CustodialPrepare<'_> {
        self.prepare_with(CallContext::new())
    }

    pub fn prepare_with(&self, ctx: CallContext) -> CustodialPrepare<'_> {
        CustodialPrepare { sdk: self, ctx }
    }

    /// Build, sign and broadcast, or queue for the external signer
    pub fn send(&self) -> CustodialSend<'_> {
        self.send_with(CallContext::new())
    }

    pub fn send_with(&self, ctx: CallContext) -> CustodialSend<'_> {
        CustodialSend { sdk: self, ctx }
    }

    /// Custodial wallet addresses created by a batch generation transaction
    pub async fn addresses_from_transaction(&self, tx_id: &str) -> Result<Vec<String>> {
        self.services.custodial_addresses(self.chain(), tx_id).await
    }

    /// Fill nonce, gas price and gas limit from the chain where missing, then sign
    async fn sign_local(
        &self,
        mut tx: EvmUnsignedTransaction,
        key: &PrivateKey,
        ctx: &CallContext,
    ) -> Result<SignedEvmTransaction> {
        let signer = EvmSigner::new(key, tx.chain_id)?;
        let from = signer.address();

        ctx.check()?;
        if tx.nonce.is_none() {
            tx.nonce = Some(self.client.transaction_count(from).await?);
        }
        if tx.gas_price.is_none() {
            tx.gas_price = Some(self.client.gas_price().await?);
        }
        if tx.gas_limit.is_none() {
            tx.gas_limit = Some(self.client.estimate_gas(&tx.to_typed(Some(from))).await?);
        }
        ctx.check()?;

        signer.sign(&tx)
    }

    async fn prepare_tx(
        &self,
        tx: EvmUnsignedTransaction,
        key: ResolvedKey,
        ctx: &CallContext,
    ) -> Result<PreparedTransaction<SignedEvmTransaction>> {
        match key {
            ResolvedKey::Local(key) => Ok(PreparedTransaction::Signed(self.sign_local(tx, &key, ctx).await?)),
            ResolvedKey::Remote { signature_id, .. } => Ok(PreparedTransaction::Unsigned {
                payload: serde_json::to_value(&tx).map_err(|e| Error::Serialization(e.to_string()))?,
                signature_id,
            }),
        }
    }

    #[instrument(skip_all, fields(correlation_id = %ctx.correlation_id(), chain = %self.chain(), operation = operation))]
    async fn send_tx(
        &self,
        operation: &'static str,
        tx: EvmUnsignedTransaction,
        key: ResolvedKey,
        ctx: &CallContext,
    ) -> Result<SendResult> {
        match key {
            ResolvedKey::Local(key) => {
                info!(route = "local", "sending custodial transaction");
                let mut state = TransactionState::Built;
                let outcome = self.sign_and_broadcast(tx, &key, ctx, &mut state).await;
                if outcome.is_err() {
                    state = state.transition(TransactionState::Errored)?;
                }
                debug!(?state, "custodial pipeline finished");
                outcome
            }
            ResolvedKey::Remote { signature_id, index } => {
                info!(route = "kms", "queueing custodial transaction");
                let response = self
                    .services
                    .broadcast(self.chain(), &tx.tx_data()?, Some(&signature_id), index)
                    .await?;
                Ok(into_send_result(response))
            }
        }
    }

    async fn sign_and_broadcast(
        &self,
        tx: EvmUnsignedTransaction,
        key: &PrivateKey,
        ctx: &CallContext,
        state: &mut TransactionState,
    ) -> Result<SendResult> {
        let signed = self.sign_local(tx, key, ctx).await?;
        *state = state.transition(TransactionState::Signed)?;

        ctx.check()?;
        let response = self
            .services
            .broadcast(self.chain(), &signed.raw_hex(), None, None)
            .await
            .map_err(|e| match e {
                Error::Api { message, .. } => Error::Submission {
                    chain: self.chain(),
                    message,
                },
                other => other,
            })?;
        *state = state.transition(TransactionState::Submitted)?;
        Ok(into_send_result(response))
    }

    /// The hosted API pays for and deploys the wallets
    async fn generate_fees_covered(&self, owner: &str, batch_count: u32, ctx: &CallContext) -> Result<SendResult> {
        info!(correlation_id = %ctx.correlation_id(), route = "fees_covered", "requesting custodial wallets");
        let body = json!({
            "chain": self.chain(),
            "feesCovered": true,
            "batchCount": batch_count,
            "owner": owner,
        });
        let response = self.api.call(&endpoints::custodial_batch(), Some(&body)).await?;
        match response.get("txId").and_then(Value::as_str).filter(|id| !id.is_empty()) {
            Some(tx_id) => Ok(SendResult::Broadcast(TransactionResult::new(tx_id))),
            None => Err(Error::CustodialWalletGeneration),
        }
    }

    fn key(&self, signer: &SignerFields) -> Result<ResolvedKey> {
        resolve_key(signer, ChainFamily::Evm)
    }
}

fn into_send_result(response: BroadcastResponse) -> SendResult {
    match response {
        BroadcastResponse::Submitted { tx_id } => SendResult::Broadcast(TransactionResult::new(tx_id)),
        BroadcastResponse::Queued { signature_id } => SendResult::Kms { signature_id },
    }
}

/// Unsigned factory call and signing route for a non fee-covered batch generation
fn batch_parts(
    builder: &CustodialBuilder,
    request: CustodialBatchRequest,
) -> Result<(EvmUnsignedTransaction, ResolvedKey)> {
    match request {
        CustodialBatchRequest::FeesCovered { .. } => Err(Error::UnsupportedCombination(
            "fee-covered custodial wallets are created by the hosted API and cannot be prepared locally".to_string(),
        )),
        CustodialBatchRequest::KmsDeferred {
            owner,
            batch_count,
            signature_id,
            index,
            fee,
            nonce,
            ..
        } => {
            let tx = builder.generate_batch(&owner, batch_count, fee.as_ref(), nonce)?;
            Ok((tx, ResolvedKey::Remote { signature_id, index }))
        }
        CustodialBatchRequest::LocalBuild {
            owner,
            batch_count,
            fee,
            nonce,
            signer,
            ..
        } => {
            let tx = builder.generate_batch(&owner, batch_count, fee.as_ref(), nonce)?;
            Ok((tx, resolve_key(&signer, ChainFamily::Evm)?))
        }
    }
}

fn ensure_chain(expected: Chain, actual: Chain) -> Result<()> {
    if expected != actual {
        return Err(Error::ChainMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }
    Ok(())
}

/// `prepare` operations
pub struct CustodialPrepare<'a> {
    sdk: &'a CustodialSdk,
    ctx: CallContext,
}

type Prepared = Result<PreparedTransaction<SignedEvmTransaction>>;

impl CustodialPrepare<'_> {
    pub async fn transfer(&self, body: &CustodialTransferBody) -> Prepared {
        let key = self.sdk.key(&body.signer)?;
        let tx = self.sdk.builder.transfer(body).await?;
        self.sdk.prepare_tx(tx, key, &self.ctx).await
    }

    pub async fn transfer_batch(&self, body: &CustodialBatchTransferBody) -> Prepared {
        let key = self.sdk.key(&body.signer)?;
        let tx = self.sdk.builder.transfer_batch(body).await?;
        self.sdk.prepare_tx(tx, key, &self.ctx).await
    }

    pub async fn approve(&self, body: &CustodialApproveBody) -> Prepared {
        let key = self.sdk.key(&body.signer)?;
        let tx = self.sdk.builder.approve(body).await?;
        self.sdk.prepare_tx(tx, key, &self.ctx).await
    }

    pub async fn generate_batch(&self, body: &GenerateCustodialBatchBody) -> Prepared {
        ensure_chain(self.sdk.chain(), body.chain)?;
        let (tx, key) = batch_parts(&self.sdk.builder, CustodialBatchRequest::try_from(body)?)?;
        self.sdk.prepare_tx(tx, key, &self.ctx).await
    }
}

/// `send` operations
pub struct CustodialSend<'a> {
    sdk: &'a CustodialSdk,
    ctx: CallContext,
}

impl CustodialSend<'_> {
    pub async fn transfer(&self, body: &CustodialTransferBody) -> Result<SendResult> {
        let key = self.sdk.key(&body.signer)?;
        let tx = self.sdk.builder.transfer(body).await?;
        self.sdk.send_tx("custodial_transfer", tx, key, &self.ctx).await
    }

    pub async fn transfer_batch(&self, body: &CustodialBatchTransferBody) -> Result<SendResult> {
        let key = self.sdk.key(&body.signer)?;
        let tx = self.sdk.builder.transfer_batch(body).await?;
        self.sdk.send_tx("custodial_transfer_batch", tx, key, &self.ctx).await
    }

    pub async fn approve(&self, body: &CustodialApproveBody) -> Result<SendResult> {
        let key = self.sdk.key(&body.signer)?;
        let tx = self.sdk.builder.approve(body).await?;
        self.sdk.send_tx("custodial_approve", tx, key, &self.ctx).await
    }

    /// Create custodial wallets: fee-covered, via the external signer, or signed locally
    pub async fn generate_batch(&self, body: &GenerateCustodialBatchBody) -> Result<SendResult> {
        ensure_chain(self.sdk.chain(), body.chain)?;
        match CustodialBatchRequest::try_from(body)? {
            CustodialBatchRequest::FeesCovered {
                owner, batch_count, ..
            } => self.sdk.generate_fees_covered(&owner, batch_count, &self.ctx).await,
            request => {
                let (tx, key) = batch_parts(&self.sdk.builder, request)?;
                self.sdk.send_tx("custodial_generate_batch", tx, key, &self.ctx).await
            }
        }
    }

    /// Send any custodial intent for this chain
    pub async fn intent(&self, intent: &TransactionIntent) -> Result<SendResult> {
        match intent {
            TransactionIntent::CustodialTransfer(body) => self.transfer(body).await,
            TransactionIntent::CustodialBatchTransfer(body) => self.transfer_batch(body).await,
            TransactionIntent::CustodialApprove(body) => self.approve(body).await,
            TransactionIntent::CustodialWalletBatchGenerate(body) => self.generate_batch(body).await,
            other => Err(Error::ChainMismatch {
                expected: self.sdk.chain().to_string(),
                actual: other.chain().to_string(),
            }),
        }
    }
}

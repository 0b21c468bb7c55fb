//! Signs, submits and confirms Flow transactions

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::chain::Chain;
use crate::error::{Error, Result};
use crate::transaction::{CallContext, TransactionResult, TransactionState};
use super::access::FlowAccess;
use super::builder::FlowTransactionTemplate;
use super::encoding::{sort_signatures, FlowSignature, FlowTransaction, ProposalKey, SignedFlowTransaction};
use super::signer::{FlowRoles, FlowSigner};

/// Drives a template through signing, submission and sealing
pub struct FlowBroadcaster {
    access: Arc<dyn FlowAccess>,
    gas_limit: u64,
    poll_interval: Duration,
}

impl FlowBroadcaster {
    pub fn new(access: Arc<dyn FlowAccess>, gas_limit: u64, poll_interval: Duration) -> Self {
        Self {
            access,
            gas_limit,
            poll_interval,
        }
    }

    /// Assemble the transaction and collect payload and envelope signatures
    #[instrument(skip_all, fields(correlation_id = %ctx.correlation_id()))]
    pub async fn sign(
        &self,
        template: &FlowTransactionTemplate,
        roles: &FlowRoles,
        ctx: &CallContext,
    ) -> Result<SignedFlowTransaction> {
        ctx.check()?;
        let reference_block_id = self.access.latest_sealed_block_id().await?;

        ctx.check()?;
        let proposer = &roles.proposer;
        let proposal = self
            .access
            .account_key(&proposer.address(), proposer.key_index())
            .await?;
        if proposal.revoked {
            return Err(Error::InvalidArgument(format!(
                "key {} of {} is revoked",
                proposal.index,
                proposer.address()
            )));
        }

        let transaction = FlowTransaction {
            script: template.script.clone(),
            arguments: template.arguments.clone(),
            reference_block_id,
            gas_limit: self.gas_limit,
            proposal_key: ProposalKey {
                address: proposer.address(),
                key_index: proposer.key_index(),
                sequence_number: proposal.sequence_number,
            },
            payer: roles.payer.address(),
            authorizers: roles.authorizers.iter().map(|a| a.address()).collect(),
        };

        let payload_message = transaction.payload_message();
        let mut payload_signatures = Vec::new();
        for signer in roles.payload_signers() {
            payload_signatures.push(signature(signer.as_ref(), &payload_message).await?);
        }
        sort_signatures(&transaction, &mut payload_signatures);

        let envelope_message = transaction.envelope_message(&payload_signatures)?;
        let mut envelope_signatures = Vec::new();
        for signer in roles.envelope_signers() {
            envelope_signatures.push(signature(signer.as_ref(), &envelope_message).await?);
        }
        sort_signatures(&transaction, &mut envelope_signatures);

        debug!(
            sequence_number = proposal.sequence_number,
            payload_signatures = payload_signatures.len(),
            envelope_signatures = envelope_signatures.len(),
            "flow transaction signed"
        );

        Ok(SignedFlowTransaction {
            transaction,
            payload_signatures,
            envelope_signatures,
        })
    }

    /// Submit a signed transaction, returning its id
    #[instrument(skip_all, fields(correlation_id = %ctx.correlation_id()))]
    pub async fn submit(&self, signed: &SignedFlowTransaction, ctx: &CallContext) -> Result<String> {
        ctx.check()?;
        let id = self.access.send_transaction(signed).await?;
        info!(transaction_id = %id, "flow transaction submitted");
        Ok(id)
    }

    /// Poll until the transaction is sealed or fails
    #[instrument(skip_all, fields(correlation_id = %ctx.correlation_id(), transaction_id = %id))]
    pub async fn wait_for_seal(&self, id: &str, ctx: &CallContext) -> Result<TransactionResult> {
        loop {
            let result = tokio::select! {
                result = self.access.transaction_result(id) => result?,
                _ = ctx.cancelled() => return Err(Error::Cancelled),
            };

            if let Some(message) = result.error() {
                warn!(status = ?result.status, %message, "flow transaction failed");
                return Err(Error::Confirmation {
                    chain: Chain::Flow,
                    id: id.to_string(),
                    message,
                });
            }

            if result.is_sealed() {
                info!(events = result.events.len(), "flow transaction sealed");
                return Ok(TransactionResult {
                    transaction_id: id.to_string(),
                    events: result.events,
                });
            }

            debug!(status = ?result.status, "waiting for seal");
            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = ctx.cancelled() => return Err(Error::Cancelled),
            }
        }
    }

    /// Sign, submit and wait for the seal
    pub async fn send(
        &self,
        template: &FlowTransactionTemplate,
        roles: &FlowRoles,
        ctx: &CallContext,
    ) -> Result<TransactionResult> {
        let mut state = TransactionState::Built;
        let outcome = self.drive(template, roles, ctx, &mut state).await;
        if outcome.is_err() {
            state = state.transition(TransactionState::Errored)?;
        }
        debug!(correlation_id = %ctx.correlation_id(), ?state, "flow pipeline finished");
        outcome
    }

    async fn drive(
        &self,
        template: &FlowTransactionTemplate,
        roles: &FlowRoles,
        ctx: &CallContext,
        state: &mut TransactionState,
    ) -> Result<TransactionResult> {
        let signed = self.sign(template, roles, ctx).await?;
        *state = state.transition(TransactionState::Signed)?;

        let id = self.submit(&signed, ctx).await?;
        *state = state.transition(TransactionState::Submitted)?;

        let result = self.wait_for_seal(&id, ctx).await?;
        *state = state.transition(TransactionState::Sealed)?;
        Ok(result)
    }
}

async fn signature(signer: &dyn FlowSigner, message: &[u8]) -> Result<FlowSignature> {
    Ok(FlowSignature {
        address: signer.address(),
        key_index: signer.key_index(),
        signature: signer.sign(message).await?,
    })
}

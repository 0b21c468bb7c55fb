//! Shared mocks for integration tests

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chainkit::api::{ApiOperation, HostedApi};
use chainkit::evm::EvmChainClient;
use chainkit::flow::{
    AccountKey, FlowAccess, FlowAddress, FlowTransactionResult, FlowTransactionStatus, SignedFlowTransaction,
};
use chainkit::transaction::TransactionEvent;
use chainkit::{Chain, Error, Result};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, U256};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

pub const MNEMONIC: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    pub path: String,
    pub body: Option<Value>,
}

/// Hosted API answering from canned responses keyed by path
#[derive(Default)]
pub struct RecordingApi {
    responses: Mutex<HashMap<String, Value>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, path: &str, response: Value) -> Self {
        self.responses.lock().unwrap().insert(path.to_string(), response);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HostedApi for RecordingApi {
    async fn call(&self, operation: &ApiOperation, body: Option<&Value>) -> Result<Value> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: operation.method.to_string(),
            path: operation.path.clone(),
            body: body.cloned(),
        });

        match self.responses.lock().unwrap().get(&operation.path) {
            Some(response) => Ok(response.clone()),
            None => Err(Error::Api {
                status: 404,
                error_code: None,
                message: format!("no response for {}", operation.path),
            }),
        }
    }
}

/// Flow access node returning scripted transaction results
pub struct MockFlowAccess {
    pub transaction_id: String,
    pub fail_submission: bool,
    results: Mutex<VecDeque<FlowTransactionResult>>,
    submitted: Mutex<Vec<SignedFlowTransaction>>,
    pub calls: AtomicUsize,
}

impl MockFlowAccess {
    pub fn sealing(transaction_id: &str, events: Vec<TransactionEvent>) -> Self {
        let pending = FlowTransactionResult {
            status: FlowTransactionStatus::Pending,
            status_code: 0,
            error_message: String::new(),
            events: Vec::new(),
        };
        let sealed = FlowTransactionResult {
            status: FlowTransactionStatus::Sealed,
            status_code: 0,
            error_message: String::new(),
            events,
        };
        Self {
            transaction_id: transaction_id.to_string(),
            fail_submission: false,
            results: Mutex::new(VecDeque::from(vec![pending, sealed])),
            submitted: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_submission() -> Self {
        let mut access = Self::sealing("unused", Vec::new());
        access.fail_submission = true;
        access
    }

    pub fn with_results(transaction_id: &str, results: Vec<FlowTransactionResult>) -> Self {
        let access = Self::sealing(transaction_id, Vec::new());
        *access.results.lock().unwrap() = VecDeque::from(results);
        access
    }

    pub fn submitted(&self) -> Vec<SignedFlowTransaction> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FlowAccess for MockFlowAccess {
    async fn latest_sealed_block_id(&self) -> Result<[u8; 32]> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok([7u8; 32])
    }

    async fn account_key(&self, _address: &FlowAddress, key_index: u32) -> Result<AccountKey> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AccountKey {
            index: key_index,
            sequence_number: 42,
            revoked: false,
        })
    }

    async fn send_transaction(&self, transaction: &SignedFlowTransaction) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_submission {
            return Err(Error::Submission {
                chain: Chain::Flow,
                message: "access node unavailable".to_string(),
            });
        }
        self.submitted.lock().unwrap().push(transaction.clone());
        Ok(self.transaction_id.clone())
    }

    async fn transaction_result(&self, _id: &str) -> Result<FlowTransactionResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut results = self.results.lock().unwrap();
        match results.len() {
            0 => Err(Error::Network("no scripted result".to_string())),
            1 => Ok(results[0].clone()),
            _ => Ok(results.pop_front().unwrap()),
        }
    }
}

/// EVM chain reads with fixed answers
pub struct MockEvmClient {
    pub decimals: u8,
    pub decimals_lookups: AtomicUsize,
    pub calls: AtomicUsize,
}

impl MockEvmClient {
    pub fn new(decimals: u8) -> Self {
        Self {
            decimals,
            decimals_lookups: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.decimals_lookups.load(Ordering::SeqCst)
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EvmChainClient for MockEvmClient {
    async fn decimals(&self, _token: Address) -> Result<u8> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.decimals_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.decimals)
    }

    async fn transaction_count(&self, _address: Address) -> Result<U256> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(U256::from(9u64))
    }

    async fn gas_price(&self) -> Result<U256> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(U256::from(30_000_000_000u64))
    }

    async fn estimate_gas(&self, _tx: &TypedTransaction) -> Result<U256> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(U256::from(120_000u64))
    }
}

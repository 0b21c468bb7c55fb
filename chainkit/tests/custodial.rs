//! Tests for custodial wallet operations on EVM chains

mod common;

use std::sync::Arc;

use chainkit::amount::to_hex;
use chainkit::evm::contracts::{ApproveCall, CloneNewWalletCall, TransferCall};
use chainkit::flow::{FlowCurrency, FlowSender, FlowTransferBody};
use chainkit::evm::{
    ContractType, CustodialApproveBody, CustodialSdk, CustodialTransferBody, EvmUnsignedTransaction, Fee,
    GenerateCustodialBatchBody,
};
use chainkit::{Chain, ChainKit, Error, ErrorKind, Network, PreparedTransaction, SdkConfig, SendResult, SignerFields, TransactionIntent};
use common::{init_tracing, MockEvmClient, RecordingApi, RecordedCall};
use ethers::abi::AbiDecode;
use ethers::types::{Address, Transaction, U256};
use serde_json::json;

const PRIVATE_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
const WALLET: &str = "0x4b812a77b109a150c2fc89ed3a1bf6e4b5e1f0a5";
const TOKEN: &str = "0x2d7882bedcbfddce29ba99965dd3cdf7fcb10a1e";
const SPENDER: &str = "0x8cb76aed9c5e336ef961265c6079c14e9cd3d2ea";
const FACTORY: &str = "0x1cc2e7ab0d5e5b3e8e1c0b0e7f7ff2d6b3c1f9a2";
const BROADCAST: &str = "/v3/polygon/broadcast";
const CUSTODIAL_BATCH: &str = "/v3/blockchain/sc/custodial/batch";

fn kit(api: Arc<RecordingApi>) -> ChainKit {
    let config = SdkConfig::new("test-key")
        .with_testnet(true)
        .with_custodial_factory(Chain::Polygon, FACTORY);
    ChainKit::with_api(config, api).unwrap()
}

fn custodial(api: Arc<RecordingApi>, client: Arc<MockEvmClient>) -> CustodialSdk {
    kit(api)
        .custodial_with_client(Chain::Polygon, Network::Testnet, client)
        .unwrap()
}

fn address(value: &str) -> Address {
    value.parse().unwrap()
}

/// Unsigned transaction handed to the external signer in a broadcast call
fn queued_transaction(call: &RecordedCall) -> EvmUnsignedTransaction {
    let body = call.body.as_ref().unwrap();
    serde_json::from_str(body["txData"].as_str().unwrap()).unwrap()
}

fn approve_body(contract_type: ContractType, amount: &str, signer: SignerFields) -> CustodialApproveBody {
    CustodialApproveBody {
        chain: Chain::Polygon,
        custodial_address: WALLET.to_string(),
        spender: SPENDER.to_string(),
        contract_type,
        token_address: TOKEN.to_string(),
        amount: Some(amount.to_string()),
        token_id: Some("12".to_string()),
        fee: None,
        nonce: None,
        signer,
    }
}

fn generate_body(fees_covered: Option<bool>, signer: SignerFields) -> GenerateCustodialBatchBody {
    GenerateCustodialBatchBody {
        chain: Chain::Polygon,
        owner: SPENDER.to_string(),
        batch_count: 3,
        fees_covered,
        fee: None,
        nonce: None,
        signer,
    }
}

#[tokio::test]
async fn test_fungible_approve_scales_by_token_decimals() {
    init_tracing();
    let api = Arc::new(RecordingApi::new().respond(BROADCAST, json!({ "signatureId": "approve-1" })));
    let client = Arc::new(MockEvmClient::new(6));
    let sdk = custodial(api.clone(), client.clone());

    let result = sdk
        .send()
        .approve(&approve_body(ContractType::Fungible, "1.5", SignerFields::with_signature_id("kms-key")))
        .await
        .unwrap();
    assert_eq!(result.signature_id(), Some("approve-1"));

    let calls = api.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].path, BROADCAST);
    assert_eq!(calls[0].body.as_ref().unwrap()["signatureId"], "kms-key");

    let tx = queued_transaction(&calls[0]);
    let call = ApproveCall::decode(&tx.data).unwrap();
    assert_eq!(to_hex(call.amount), "0x16e360");
    assert_eq!(call.spender, address(SPENDER));
    assert_eq!(call.token_id, U256::zero());
    assert_eq!(tx.to, address(WALLET));
    assert_eq!(client.lookups(), 1);
}

#[tokio::test]
async fn test_nft_approve_is_not_scaled() {
    let api = Arc::new(RecordingApi::new().respond(BROADCAST, json!({ "signatureId": "approve-2" })));
    let client = Arc::new(MockEvmClient::new(6));
    let sdk = custodial(api.clone(), client.clone());

    sdk.send()
        .approve(&approve_body(ContractType::NonFungible, "3", SignerFields::with_signature_id("kms-key")))
        .await
        .unwrap();

    let call = ApproveCall::decode(&queued_transaction(&api.calls()[0]).data).unwrap();
    assert_eq!(call.amount, U256::from(3u64));
    assert_eq!(call.token_id, U256::from(12u64));
    assert_eq!(call.contract_type, U256::one());
    assert_eq!(client.lookups(), 0);
}

#[tokio::test]
async fn test_local_transfer_fills_gas_and_broadcasts_raw() {
    init_tracing();
    let api = Arc::new(RecordingApi::new().respond(BROADCAST, json!({ "txId": "0xfeed" })));
    let client = Arc::new(MockEvmClient::new(18));
    let sdk = custodial(api.clone(), client.clone());

    let body = CustodialTransferBody {
        chain: Chain::Polygon,
        custodial_address: WALLET.to_string(),
        recipient: SPENDER.to_string(),
        contract_type: ContractType::Native,
        token_address: None,
        amount: Some("0.25".to_string()),
        token_id: None,
        fee: None,
        nonce: None,
        signer: SignerFields::with_private_key(PRIVATE_KEY),
    };
    let result = sdk.send().transfer(&body).await.unwrap();
    assert_eq!(result.transaction_id(), Some("0xfeed"));

    let calls = api.calls();
    assert_eq!(calls.len(), 1);
    let body = calls[0].body.as_ref().unwrap();
    assert!(body.get("signatureId").is_none());

    let raw = hex::decode(body["txData"].as_str().unwrap().trim_start_matches("0x")).unwrap();
    let signed: Transaction = ethers::utils::rlp::decode(&raw).unwrap();
    assert_eq!(signed.nonce, U256::from(9u64));
    assert_eq!(signed.gas, U256::from(120_000u64));
    assert_eq!(signed.gas_price, Some(U256::from(30_000_000_000u64)));
    assert_eq!(signed.to, Some(address(WALLET)));

    let call = TransferCall::decode(&signed.input).unwrap();
    assert_eq!(call.amount, U256::from(250_000_000_000_000_000u64));
    assert_eq!(client.lookups(), 0);
}

#[tokio::test]
async fn test_caller_fee_skips_chain_lookups() {
    let client = Arc::new(MockEvmClient::new(18));
    let sdk = custodial(Arc::new(RecordingApi::new()), client.clone());

    let mut body = approve_body(ContractType::MultiToken, "4", SignerFields::with_private_key(PRIVATE_KEY));
    body.fee = Some(Fee {
        gas_limit: "90000".to_string(),
        gas_price: "2.5".to_string(),
    });
    body.nonce = Some(1);

    let prepared = sdk.prepare().approve(&body).await.unwrap();
    assert!(prepared.is_signed());
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_batch_generation_fee_covered_wins() {
    init_tracing();
    let api = Arc::new(RecordingApi::new().respond(CUSTODIAL_BATCH, json!({ "txId": "0xc0ffee" })));
    let client = Arc::new(MockEvmClient::new(18));
    let sdk = custodial(api.clone(), client.clone());

    let mut signer = SignerFields::with_private_key(PRIVATE_KEY);
    signer.signature_id = Some("kms-key".to_string());
    let result = sdk.send().generate_batch(&generate_body(Some(true), signer)).await.unwrap();

    assert_eq!(result.transaction_id(), Some("0xc0ffee"));
    let calls = api.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].path, CUSTODIAL_BATCH);
    let body = calls[0].body.as_ref().unwrap();
    assert_eq!(body["feesCovered"], true);
    assert_eq!(body["batchCount"], 3);
    assert_eq!(body["chain"], "MATIC");
    assert!(body.get("privateKey").is_none());
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_batch_generation_without_tx_id_fails() {
    for response in [json!({}), json!({ "txId": "" }), json!({ "txId": null })] {
        let api = Arc::new(RecordingApi::new().respond(CUSTODIAL_BATCH, response));
        let sdk = custodial(api, Arc::new(MockEvmClient::new(18)));

        let err = sdk
            .send()
            .generate_batch(&generate_body(Some(true), SignerFields::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CustodialWalletGeneration));
        assert_eq!(err.to_string(), "Unable to generate custodial wallet address");
    }
}

#[tokio::test]
async fn test_batch_generation_kms_over_local_key() {
    let api = Arc::new(RecordingApi::new().respond(BROADCAST, json!({ "signatureId": "gen-1" })));
    let client = Arc::new(MockEvmClient::new(18));
    let sdk = custodial(api.clone(), client.clone());

    let mut signer = SignerFields::with_private_key(PRIVATE_KEY);
    signer.signature_id = Some("kms-key".to_string());
    signer.index = Some(4);
    let result = sdk.send().generate_batch(&generate_body(Some(false), signer)).await.unwrap();

    assert_eq!(result, SendResult::Kms { signature_id: "gen-1".to_string() });
    let calls = api.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].path, BROADCAST);
    assert_eq!(calls[0].body.as_ref().unwrap()["index"], 4);

    let tx = queued_transaction(&calls[0]);
    assert_eq!(tx.to, address(FACTORY));
    let call = CloneNewWalletCall::decode(&tx.data).unwrap();
    assert_eq!(call.owner, address(SPENDER));
    assert_eq!(call.count, U256::from(3u64));
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_batch_generation_local_signs() {
    let api = Arc::new(RecordingApi::new().respond(BROADCAST, json!({ "txId": "0xbeef" })));
    let client = Arc::new(MockEvmClient::new(18));
    let sdk = custodial(api.clone(), client.clone());

    let result = sdk
        .send()
        .generate_batch(&generate_body(None, SignerFields::with_private_key(PRIVATE_KEY)))
        .await
        .unwrap();

    assert_eq!(result.transaction_id(), Some("0xbeef"));
    assert_eq!(api.calls().len(), 1);
    assert_eq!(client.call_count(), 3);
}

#[tokio::test]
async fn test_batch_generation_needs_a_mode() {
    let api = Arc::new(RecordingApi::new());
    let sdk = custodial(api.clone(), Arc::new(MockEvmClient::new(18)));

    let err = sdk
        .send()
        .generate_batch(&generate_body(None, SignerFields::default()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnsupportedOperationCombination);
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_fee_covered_cannot_be_prepared() {
    let sdk = custodial(Arc::new(RecordingApi::new()), Arc::new(MockEvmClient::new(18)));
    let err = sdk
        .prepare()
        .generate_batch(&generate_body(Some(true), SignerFields::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedCombination(_)));
}

#[tokio::test]
async fn test_kms_prepare_returns_unsigned_call() {
    let sdk = custodial(Arc::new(RecordingApi::new()), Arc::new(MockEvmClient::new(6)));
    let prepared = sdk
        .prepare()
        .approve(&approve_body(ContractType::Fungible, "2", SignerFields::with_signature_id("kms-key")))
        .await
        .unwrap();

    match prepared {
        PreparedTransaction::Unsigned { payload, signature_id } => {
            assert_eq!(signature_id, "kms-key");
            assert_eq!(payload["chainId"], 80002);
        }
        other => panic!("expected unsigned call, got {:?}", other),
    }
}

#[tokio::test]
async fn test_facade_routes_custodial_intent() {
    let api = Arc::new(RecordingApi::new().respond(BROADCAST, json!({ "signatureId": "facade-1" })));
    let kit = kit(api.clone());

    let intent = TransactionIntent::CustodialTransfer(CustodialTransferBody {
        chain: Chain::Polygon,
        custodial_address: WALLET.to_string(),
        recipient: SPENDER.to_string(),
        contract_type: ContractType::Native,
        token_address: None,
        amount: Some("1".to_string()),
        token_id: None,
        fee: None,
        nonce: None,
        signer: SignerFields::with_signature_id("kms-key"),
    });

    let result = kit.send(&intent).await.unwrap();
    assert_eq!(result.signature_id(), Some("facade-1"));
    assert_eq!(api.calls()[0].path, BROADCAST);
}

#[tokio::test]
async fn test_facade_keeps_providers_per_chain() {
    let api = Arc::new(
        RecordingApi::new()
            .respond(BROADCAST, json!({ "signatureId": "evm-1" }))
            .respond("/v3/flow/transaction", json!({ "signatureId": "flow-1" })),
    );
    let config = SdkConfig::new("test-key")
        .with_testnet(true)
        .with_provider(Chain::Flow, "http://flow-node.local:8888")
        .with_provider(Chain::Polygon, "http://polygon-rpc.local:8545")
        .with_custodial_factory(Chain::Polygon, FACTORY);
    let kit = ChainKit::with_api(config, api.clone()).unwrap();

    let flow = TransactionIntent::Transfer(FlowTransferBody {
        to: "0xf8d6e0586b0a20c7".to_string(),
        amount: "1".to_string(),
        currency: FlowCurrency::Flow,
        sender: FlowSender::new("0x955cd3f17b2fd8ad", SignerFields::with_signature_id("kms-flow")),
    });
    let evm = TransactionIntent::CustodialTransfer(CustodialTransferBody {
        chain: Chain::Polygon,
        custodial_address: WALLET.to_string(),
        recipient: SPENDER.to_string(),
        contract_type: ContractType::Native,
        token_address: None,
        amount: Some("1".to_string()),
        token_id: None,
        fee: None,
        nonce: None,
        signer: SignerFields::with_signature_id("kms-evm"),
    });

    assert_eq!(kit.send(&flow).await.unwrap().signature_id(), Some("flow-1"));
    assert_eq!(kit.send(&evm).await.unwrap().signature_id(), Some("evm-1"));

    let paths: Vec<String> = api.calls().into_iter().map(|call| call.path).collect();
    assert_eq!(paths, vec!["/v3/flow/transaction".to_string(), BROADCAST.to_string()]);
    assert_eq!(kit.config().provider(Chain::Flow), Some("http://flow-node.local:8888"));
    assert_eq!(kit.config().provider(Chain::Polygon), Some("http://polygon-rpc.local:8545"));
    assert_eq!(kit.config().provider(Chain::Ethereum), None);
}

#[tokio::test]
async fn test_custodial_rejects_flow() {
    let kit = kit(Arc::new(RecordingApi::new()));
    assert!(matches!(kit.custodial(Chain::Flow), Err(Error::ChainMismatch { .. })));
}

//! Flow transaction RLP encoding, signing messages and transaction ids

use rlp::RlpStream;
use serde::{Deserialize, Serialize};

use crate::crypto::sha3_256;
use crate::error::{Error, Result};
use super::address::FlowAddress;
use super::args::FlowArgument;

/// Domain separation tag prepended to transaction signing messages
pub const TRANSACTION_DOMAIN_TAG: [u8; 32] = domain_tag(b"FLOW-V0.0-transaction");

const fn domain_tag(tag: &[u8]) -> [u8; 32] {
    let mut padded = [0u8; 32];
    let mut i = 0;
    while i < tag.len() {
        padded[i] = tag[i];
        i += 1;
    }
    padded
}

/// ECDSA secp256k1
pub const SIGNATURE_ALGORITHM_SECP256K1: u64 = 2;
/// SHA3-256
pub const HASH_ALGORITHM_SHA3_256: u64 = 3;

/// Account key providing the proposal sequence number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalKey {
    pub address: FlowAddress,
    pub key_index: u32,
    pub sequence_number: u64,
}

/// An unsigned Flow transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowTransaction {
    pub script: String,
    pub arguments: Vec<FlowArgument>,
    #[serde(with = "hex_block_id")]
    pub reference_block_id: [u8; 32],
    pub gas_limit: u64,
    pub proposal_key: ProposalKey,
    pub payer: FlowAddress,
    pub authorizers: Vec<FlowAddress>,
}

/// A signature from one account key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSignature {
    pub address: FlowAddress,
    pub key_index: u32,
    #[serde(with = "hex::serde")]
    pub signature: Vec<u8>,
}

/// A fully signed Flow transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedFlowTransaction {
    pub transaction: FlowTransaction,
    pub payload_signatures: Vec<FlowSignature>,
    pub envelope_signatures: Vec<FlowSignature>,
}

impl FlowTransaction {
    /// Accounts that must sign, proposer first, then payer, then authorizers, without duplicates
    pub fn signers(&self) -> Vec<FlowAddress> {
        let mut signers = Vec::with_capacity(2 + self.authorizers.len());
        let candidates = std::iter::once(self.proposal_key.address)
            .chain(std::iter::once(self.payer))
            .chain(self.authorizers.iter().copied());
        for address in candidates {
            if !signers.contains(&address) {
                signers.push(address);
            }
        }
        signers
    }

    fn append_payload(&self, stream: &mut RlpStream) {
        stream.begin_list(9);
        stream.append(&self.script.as_bytes().to_vec());
        stream.begin_list(self.arguments.len());
        for argument in &self.arguments {
            stream.append(&argument.encode());
        }
        stream.append(&self.reference_block_id.to_vec());
        stream.append(&self.gas_limit);
        stream.append(&self.proposal_key.address.as_bytes().to_vec());
        stream.append(&u64::from(self.proposal_key.key_index));
        stream.append(&self.proposal_key.sequence_number);
        stream.append(&self.payer.as_bytes().to_vec());
        stream.begin_list(self.authorizers.len());
        for authorizer in &self.authorizers {
            stream.append(&authorizer.as_bytes().to_vec());
        }
    }

    fn append_signatures(&self, stream: &mut RlpStream, signatures: &[FlowSignature]) -> Result<()> {
        let signers = self.signers();
        stream.begin_list(signatures.len());
        for signature in signatures {
            let signer_index = signers
                .iter()
                .position(|address| *address == signature.address)
                .ok_or_else(|| {
                    Error::Encoding(format!("{} is not a signer of this transaction", signature.address))
                })?;
            stream.begin_list(3);
            stream.append(&(signer_index as u64));
            stream.append(&u64::from(signature.key_index));
            stream.append(&signature.signature);
        }
        Ok(())
    }

    /// RLP encoded payload
    pub fn payload(&self) -> Vec<u8> {
        let mut stream = RlpStream::new();
        self.append_payload(&mut stream);
        stream.out().to_vec()
    }

    /// Message signed by proposer and authorizers
    pub fn payload_message(&self) -> Vec<u8> {
        let mut message = TRANSACTION_DOMAIN_TAG.to_vec();
        message.extend_from_slice(&self.payload());
        message
    }

    /// Message signed by the payer, covering the payload signatures
    pub fn envelope_message(&self, payload_signatures: &[FlowSignature]) -> Result<Vec<u8>> {
        let mut stream = RlpStream::new_list(2);
        self.append_payload(&mut stream);
        self.append_signatures(&mut stream, payload_signatures)?;

        let mut message = TRANSACTION_DOMAIN_TAG.to_vec();
        message.extend_from_slice(&stream.out());
        Ok(message)
    }
}

impl SignedFlowTransaction {
    /// Transaction id as computed by the network
    pub fn transaction_id(&self) -> Result<String> {
        let mut stream = RlpStream::new_list(3);
        self.transaction.append_payload(&mut stream);
        self.transaction
            .append_signatures(&mut stream, &self.payload_signatures)?;
        self.transaction
            .append_signatures(&mut stream, &self.envelope_signatures)?;
        Ok(hex::encode(sha3_256(&stream.out())))
    }
}

/// Sort signatures by signer position then key index, the order access nodes expect
pub fn sort_signatures(transaction: &FlowTransaction, signatures: &mut [FlowSignature]) {
    let signers = transaction.signers();
    signatures.sort_by_key(|signature| {
        (
            signers.iter().position(|a| *a == signature.address),
            signature.key_index,
        )
    });
}

/// RLP encoded account key, hex, for account creation and key addition
pub fn encode_account_key(public_key: &str, weight: u32) -> Result<String> {
    let trimmed = public_key.trim();
    let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let mut bytes = hex::decode(stripped)
        .map_err(|_| Error::InvalidArgument("public key is not valid hex".to_string()))?;
    if bytes.len() == 65 && bytes[0] == 0x04 {
        bytes.remove(0);
    }
    if bytes.len() != 64 {
        return Err(Error::InvalidArgument(format!(
            "public key must be 64 bytes, got {}",
            bytes.len()
        )));
    }

    let mut stream = RlpStream::new_list(4);
    stream.append(&bytes);
    stream.append(&SIGNATURE_ALGORITHM_SECP256K1);
    stream.append(&HASH_ALGORITHM_SHA3_256);
    stream.append(&u64::from(weight));
    Ok(hex::encode(stream.out()))
}

mod hex_block_id {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(id: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(id))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let raw = String::deserialize(deserializer)?;
        let bytes = hex::decode(raw).map_err(de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| de::Error::custom("block id must be 32 bytes"))
    }
}

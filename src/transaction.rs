//! Transactions and their wire format
//!
//! The same JSON object is used for signing and for broadcasting. Signing
//! covers the object without `signature`; the gateway receives it with the
//! hex signature appended. Field order is fixed by the struct below.

use crate::wallet::Address;
use crate::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Serialize, Serializer};

/// Unsigned transaction fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionArgs {
    pub nonce: u64,
    /// Value in the smallest denomination
    pub value: u128,
    pub receiver: Address,
    pub sender: Address,
    pub gas_price: u64,
    pub gas_limit: u64,
    pub data: Vec<u8>,
    pub chain_id: String,
    pub version: u32,
    pub options: u32,
}

impl TransactionArgs {
    /// Bytes the sender signs
    pub fn signing_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&WireTransaction::new(self, None))?)
    }

    /// Data field as text, for logs
    pub fn data_lossy(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

/// A signed transaction ready for broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    args: TransactionArgs,
    signature: Vec<u8>,
}

impl Transaction {
    pub fn new(args: TransactionArgs, signature: Vec<u8>) -> Self {
        Self { args, signature }
    }

    pub fn args(&self) -> &TransactionArgs {
        &self.args
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn signature_hex(&self) -> String {
        hex::encode(&self.signature)
    }
}

impl Serialize for Transaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let signature = self.signature_hex();
        WireTransaction::new(&self.args, Some(signature)).serialize(serializer)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireTransaction<'a> {
    nonce: u64,
    value: String,
    receiver: &'a Address,
    sender: &'a Address,
    gas_price: u64,
    gas_limit: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<String>,
    #[serde(rename = "chainID")]
    chain_id: &'a str,
    version: u32,
    #[serde(skip_serializing_if = "is_zero")]
    options: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    signature: Option<String>,
}

impl<'a> WireTransaction<'a> {
    fn new(args: &'a TransactionArgs, signature: Option<String>) -> Self {
        Self {
            nonce: args.nonce,
            value: args.value.to_string(),
            receiver: &args.receiver,
            sender: &args.sender,
            gas_price: args.gas_price,
            gas_limit: args.gas_limit,
            data: (!args.data.is_empty()).then(|| STANDARD.encode(&args.data)),
            chain_id: &args.chain_id,
            version: args.version,
            options: args.options,
            signature,
        }
    }
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

/// Parse a decimal amount in the smallest denomination
pub fn parse_amount(s: &str) -> Result<u128> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidArgument(format!(
            "amount must be a decimal integer, got {:?}",
            s
        )));
    }
    s.parse::<u128>()
        .map_err(|e| Error::InvalidArgument(format!("amount {:?}: {}", s, e)))
}

/// Encode an amount as a smart contract call argument
///
/// Upper-case hex with an even number of digits, e.g. 1 EGLD becomes
/// `0DE0B6B3A7640000`.
pub fn encode_call_argument(value: u128) -> String {
    let hex = format!("{:X}", value);
    if hex.len() % 2 == 1 {
        format!("0{}", hex)
    } else {
        hex
    }
}

//! Ledger collaborators
//!
//! The campaign pipeline talks to the chain through two traits:
//! - [`AccountProvider`] for account nonces and network parameters
//! - [`BatchSubmitter`] for broadcasting signed transactions
//!
//! [`ProxyClient`] implements both against the HTTP gateway. Tests plug in
//! in-memory implementations.

mod batch;
mod proxy;

use crate::transaction::{Transaction, TransactionArgs};
use crate::wallet::Address;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use batch::submit_in_batches;
pub use proxy::ProxyClient;

/// Account state as reported by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: String,
    pub nonce: u64,
    #[serde(default)]
    pub balance: String,
}

/// Network parameters that bound what a transaction may carry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(rename = "erd_chain_id")]
    pub chain_id: String,
    #[serde(rename = "erd_min_gas_price")]
    pub min_gas_price: u64,
    #[serde(rename = "erd_min_gas_limit")]
    pub min_gas_limit: u64,
    #[serde(rename = "erd_gas_per_data_byte")]
    pub gas_per_data_byte: u64,
    #[serde(rename = "erd_min_transaction_version")]
    pub min_transaction_version: u32,
}

impl NetworkConfig {
    /// Minimum gas limit for a transaction carrying `data_len` bytes of data
    pub fn min_gas_limit_for(&self, data_len: usize) -> u64 {
        self.min_gas_limit
            .saturating_add(self.gas_per_data_byte.saturating_mul(data_len as u64))
    }

    /// Reject transactions the network would refuse outright
    pub fn check(&self, args: &TransactionArgs) -> Result<()> {
        if args.chain_id != self.chain_id {
            return Err(Error::InvalidTransaction(format!(
                "chain ID {} does not match network chain ID {}",
                args.chain_id, self.chain_id
            )));
        }
        if args.gas_price < self.min_gas_price {
            return Err(Error::InvalidTransaction(format!(
                "gas price {} below network minimum {}",
                args.gas_price, self.min_gas_price
            )));
        }
        let min_gas_limit = self.min_gas_limit_for(args.data.len());
        if args.gas_limit < min_gas_limit {
            return Err(Error::InvalidTransaction(format!(
                "gas limit {} below {} required for {} data bytes",
                args.gas_limit,
                min_gas_limit,
                args.data.len()
            )));
        }
        if args.version < self.min_transaction_version {
            return Err(Error::InvalidTransaction(format!(
                "version {} below network minimum {}",
                args.version, self.min_transaction_version
            )));
        }
        Ok(())
    }
}

/// Result of broadcasting one batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReceipt {
    /// Transactions the gateway accepted
    pub sent: usize,
    /// Hashes of accepted transactions, in batch order
    pub hashes: Vec<String>,
}

/// Source of account and network state
#[async_trait]
pub trait AccountProvider: Send + Sync {
    /// Fetch an account; fails for unknown addresses or unreachable gateways
    async fn account(&self, address: &Address) -> Result<Account>;

    /// Fetch the network's transaction parameters
    async fn network_config(&self) -> Result<NetworkConfig>;
}

/// Broadcasts signed transactions
#[async_trait]
pub trait BatchSubmitter: Send + Sync {
    async fn send_batch(&self, transactions: &[Transaction]) -> Result<BatchReceipt>;

    /// Name for logs
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network() -> NetworkConfig {
        NetworkConfig {
            chain_id: "T".to_string(),
            min_gas_price: 1_000_000_000,
            min_gas_limit: 50_000,
            gas_per_data_byte: 1_500,
            min_transaction_version: 1,
        }
    }

    fn args(data: &[u8], gas_limit: u64) -> TransactionArgs {
        TransactionArgs {
            nonce: 0,
            value: 0,
            receiver: Address::from_bytes([1u8; 32]),
            sender: Address::from_bytes([2u8; 32]),
            gas_price: 1_000_000_000,
            gas_limit,
            data: data.to_vec(),
            chain_id: "T".to_string(),
            version: 1,
            options: 0,
        }
    }

    #[test]
    fn test_plain_transfer_passes() {
        assert!(network().check(&args(b"", 50_000)).is_ok());
    }

    #[test]
    fn test_data_raises_gas_floor() {
        let data = b"unDelegate@0DE0B6B3A7640000";
        assert_eq!(network().min_gas_limit_for(data.len()), 50_000 + 1_500 * 27);
        assert!(network().check(&args(data, 50_000)).is_err());
        assert!(network().check(&args(data, 12_000_000)).is_ok());
    }

    #[test]
    fn test_chain_and_price_checks() {
        let mut tx = args(b"", 50_000);
        tx.chain_id = "1".to_string();
        assert!(network().check(&tx).is_err());

        let mut tx = args(b"", 50_000);
        tx.gas_price = 1;
        assert!(network().check(&tx).is_err());

        let mut tx = args(b"", 50_000);
        tx.version = 0;
        assert!(network().check(&tx).is_err());
    }

    #[test]
    fn test_network_config_field_names() {
        let value = serde_json::json!({
            "erd_chain_id": "D",
            "erd_min_gas_price": 1000000000u64,
            "erd_min_gas_limit": 50000,
            "erd_gas_per_data_byte": 1500,
            "erd_min_transaction_version": 1,
            "erd_round_duration": 6000
        });
        let parsed: NetworkConfig = serde_json::from_value(value).expect("parse network config");
        assert_eq!(parsed.chain_id, "D");
        assert_eq!(parsed.gas_per_data_byte, 1500);
    }
}

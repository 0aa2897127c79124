//! HTTP gateway client
//!
//! Every gateway response is wrapped in the same envelope:
//!
//! ```json
//! { "data": { ... }, "error": "", "code": "successful" }
//! ```
//!
//! A non-`successful` code, a missing `data` object or an unparseable body
//! all surface as [`Error::Gateway`].

use crate::ledger::{Account, AccountProvider, BatchReceipt, BatchSubmitter, NetworkConfig};
use crate::transaction::Transaction;
use crate::wallet::Address;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

const SUCCESS_CODE: &str = "successful";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    error: String,
    #[serde(default)]
    code: String,
}

#[derive(Debug, Deserialize)]
struct AccountData {
    account: Account,
}

#[derive(Debug, Deserialize)]
struct NetworkConfigData {
    config: NetworkConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendMultipleData {
    num_of_sent_txs: usize,
    #[serde(default)]
    txs_hashes: HashMap<String, String>,
}

/// Gateway client implementing both ledger traits
pub struct ProxyClient {
    client: Client,
    base_url: Url,
}

impl ProxyClient {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path);
        tracing::debug!(url = %url, "Gateway GET");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        decode_envelope(status, &body)
    }
}

#[async_trait]
impl AccountProvider for ProxyClient {
    async fn account(&self, address: &Address) -> Result<Account> {
        let data: AccountData = self.get(&format!("address/{}", address)).await?;
        Ok(data.account)
    }

    async fn network_config(&self) -> Result<NetworkConfig> {
        let data: NetworkConfigData = self.get("network/config").await?;
        Ok(data.config)
    }
}

#[async_trait]
impl BatchSubmitter for ProxyClient {
    async fn send_batch(&self, transactions: &[Transaction]) -> Result<BatchReceipt> {
        let url = self.endpoint("transaction/send-multiple");
        tracing::debug!(url = %url, count = transactions.len(), "Gateway POST");

        let response = self.client.post(&url).json(transactions).send().await?;
        let status = response.status();
        let body = response.text().await?;
        let data: SendMultipleData = decode_envelope(status, &body)?;

        Ok(receipt_from(data))
    }

    fn name(&self) -> &'static str {
        "gateway"
    }
}

/// Unwrap a gateway envelope, mapping failures to [`Error::Gateway`]
fn decode_envelope<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T> {
    let envelope: Envelope<T> = serde_json::from_str(body).map_err(|e| {
        if status.is_success() {
            Error::Gateway(format!("unexpected response body: {}", e))
        } else {
            Error::Gateway(format!("HTTP {}: {}", status, truncate(body, 200)))
        }
    })?;

    if envelope.code != SUCCESS_CODE || !envelope.error.is_empty() {
        let reason = if envelope.error.is_empty() {
            envelope.code
        } else {
            envelope.error
        };
        return Err(Error::Gateway(format!("HTTP {}: {}", status, reason)));
    }

    envelope
        .data
        .ok_or_else(|| Error::Gateway("response has no data".to_string()))
}

/// Hashes come keyed by their index in the batch
fn receipt_from(data: SendMultipleData) -> BatchReceipt {
    let mut indexed: Vec<(usize, String)> = data
        .txs_hashes
        .into_iter()
        .filter_map(|(index, hash)| index.parse().ok().map(|i| (i, hash)))
        .collect();
    indexed.sort_by_key(|(index, _)| *index);

    BatchReceipt {
        sent: data.num_of_sent_txs,
        hashes: indexed.into_iter().map(|(_, hash)| hash).collect(),
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_account() {
        let body = r#"{
            "data": {"account": {"address": "erd1qyu5wthldzr8wx5c9ucg8kjagg0jfs53s8nr3zpz3hypefsdd8ssycr6th", "nonce": 42, "balance": "1000", "username": ""}},
            "error": "",
            "code": "successful"
        }"#;

        let data: AccountData = decode_envelope(StatusCode::OK, body).unwrap();
        assert_eq!(data.account.nonce, 42);
        assert_eq!(data.account.balance, "1000");
    }

    #[test]
    fn test_decode_gateway_error() {
        let body = r#"{"data": null, "error": "cannot get account", "code": "internal_issue"}"#;

        let err = decode_envelope::<AccountData>(StatusCode::INTERNAL_SERVER_ERROR, body)
            .unwrap_err();
        assert!(err.to_string().contains("cannot get account"));
    }

    #[test]
    fn test_decode_non_json_failure() {
        let err = decode_envelope::<AccountData>(StatusCode::BAD_GATEWAY, "<html>502</html>")
            .unwrap_err();
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn test_decode_missing_data() {
        let body = r#"{"error": "", "code": "successful"}"#;
        assert!(decode_envelope::<AccountData>(StatusCode::OK, body).is_err());
    }

    #[test]
    fn test_send_multiple_receipt_orders_hashes() {
        let body = r#"{
            "data": {"numOfSentTxs": 3, "txsHashes": {"2": "ccc", "0": "aaa", "1": "bbb"}},
            "error": "",
            "code": "successful"
        }"#;

        let data: SendMultipleData = decode_envelope(StatusCode::OK, body).unwrap();
        let receipt = receipt_from(data);
        assert_eq!(receipt.sent, 3);
        assert_eq!(receipt.hashes, vec!["aaa", "bbb", "ccc"]);
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let client = ProxyClient::new(
            "https://testnet-gateway.multiversx.com/".parse().unwrap(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.endpoint("network/config"),
            "https://testnet-gateway.multiversx.com/network/config"
        );
    }
}

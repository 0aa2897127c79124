//! Configuration for batch campaigns
//!
//! One JSON file describes the network, the gateway and every scenario. The
//! scenario to run is chosen on the command line.

pub mod gateway;

use crate::campaign::TxSettings;
use crate::transaction::parse_amount;
use crate::wallet::Address;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use gateway::{GatewayConfig, GatewaySource};

/// Networks with a public gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
    Devnet,
}

impl Network {
    pub fn name(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
        }
    }
}

/// Campaign scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Send a fixed value from the minter to every wallet in a key file
    MintDistribution,
    /// Register validator keys with a delegation contract
    AddNodes,
    /// Undelegate a fixed amount from every wallet in a key file
    Undelegate,
}

impl Scenario {
    pub fn name(&self) -> &'static str {
        match self {
            Scenario::MintDistribution => "mint_distribution",
            Scenario::AddNodes => "add_nodes",
            Scenario::Undelegate => "undelegate",
        }
    }
}

/// Delegation contract used by the default configuration
pub const DEFAULT_DELEGATION_CONTRACT: &str =
    "erd1qqqqqqqqqqqqqqqpqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqhllllsajxzat";

/// Minter-to-wallets distribution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintDistributionConfig {
    /// Single-key PEM of the sending account
    pub minter_pem: PathBuf,
    /// Multi-key PEM whose identifiers are the receivers
    pub wallets_pem: PathBuf,
    /// Number of wallets to read
    pub wallet_count: usize,
    /// Value per transfer (decimal, smallest denomination)
    pub value: String,
    pub gas_limit: u64,
    pub batch_size: usize,
}

impl Default for MintDistributionConfig {
    fn default() -> Self {
        Self {
            minter_pem: PathBuf::from("keys/minter.pem"),
            wallets_pem: PathBuf::from("keys/wallets.pem"),
            wallet_count: 100_000,
            value: "5000000000000000000".to_string(), // 5 EGLD
            gas_limit: 55_000,
            batch_size: 50,
        }
    }
}

/// Validator registration on a delegation contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddNodesConfig {
    /// Single-key PEM of the contract owner
    pub owner_pem: PathBuf,
    /// Multi-key PEM of validator keys
    pub validators_pem: PathBuf,
    pub validator_count: usize,
    pub delegation_contract: String,
    /// Value attached to each call
    pub value: String,
    pub gas_limit: u64,
    pub batch_size: usize,
}

impl Default for AddNodesConfig {
    fn default() -> Self {
        Self {
            owner_pem: PathBuf::from("keys/owner.pem"),
            validators_pem: PathBuf::from("keys/validators.pem"),
            validator_count: 2831,
            delegation_contract: DEFAULT_DELEGATION_CONTRACT.to_string(),
            value: "2500000000000000000000".to_string(), // 2500 EGLD
            gas_limit: 50_000_000,
            batch_size: 100,
        }
    }
}

/// Undelegation from many wallets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndelegateConfig {
    /// Multi-key PEM of the delegating wallets
    pub wallets_pem: PathBuf,
    pub wallet_count: usize,
    pub delegation_contract: String,
    /// Amount to undelegate per wallet
    pub amount: String,
    pub gas_limit: u64,
    pub batch_size: usize,
}

impl Default for UndelegateConfig {
    fn default() -> Self {
        Self {
            wallets_pem: PathBuf::from("keys/wallets.pem"),
            wallet_count: 100_000,
            delegation_contract: DEFAULT_DELEGATION_CONTRACT.to_string(),
            amount: "1000000000000000000".to_string(), // 1 EGLD
            gas_limit: 12_000_000,
            batch_size: 50,
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Target network
    #[serde(default)]
    pub network: Network,
    /// Gateway URL (overridden by GATEWAY_URL)
    #[serde(default)]
    pub gateway_url: Option<String>,
    /// Chain ID; defaults to the gateway's advertised chain
    #[serde(default)]
    pub chain_id: Option<String>,
    pub gas_price: u64,
    pub tx_version: u32,
    #[serde(default)]
    pub tx_options: u32,
    /// Per-request gateway timeout (seconds)
    pub request_timeout_secs: u64,
    /// Path to audit log file
    pub audit_log_path: Option<String>,
    #[serde(default)]
    pub mint_distribution: MintDistributionConfig,
    #[serde(default)]
    pub add_nodes: AddNodesConfig,
    #[serde(default)]
    pub undelegate: UndelegateConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: Network::default(),
            gateway_url: None,
            chain_id: None,
            gas_price: 1_000_000_000,
            tx_version: 1,
            tx_options: 0,
            request_timeout_secs: 30,
            audit_log_path: Some("audit.jsonl".to_string()),
            mint_distribution: MintDistributionConfig::default(),
            add_nodes: AddNodesConfig::default(),
            undelegate: UndelegateConfig::default(),
        }
    }
}

impl Config {
    /// Load from a JSON file, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Check the parts every scenario relies on, plus the selected one
    pub fn validate(&self, scenario: Scenario) -> Result<()> {
        if self.gas_price == 0 {
            return Err(Error::Config("gas_price must be greater than zero".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if let Some(chain_id) = &self.chain_id {
            if chain_id.is_empty() {
                return Err(Error::Config("chain_id must not be empty".to_string()));
            }
        }

        match scenario {
            Scenario::MintDistribution => {
                let c = &self.mint_distribution;
                check_count("mint_distribution.wallet_count", c.wallet_count)?;
                check_count("mint_distribution.batch_size", c.batch_size)?;
                check_amount("mint_distribution.value", &c.value)?;
            }
            Scenario::AddNodes => {
                let c = &self.add_nodes;
                check_count("add_nodes.validator_count", c.validator_count)?;
                check_count("add_nodes.batch_size", c.batch_size)?;
                check_amount("add_nodes.value", &c.value)?;
                check_contract("add_nodes.delegation_contract", &c.delegation_contract)?;
            }
            Scenario::Undelegate => {
                let c = &self.undelegate;
                check_count("undelegate.wallet_count", c.wallet_count)?;
                check_count("undelegate.batch_size", c.batch_size)?;
                if check_amount("undelegate.amount", &c.amount)? == 0 {
                    return Err(Error::Config(
                        "undelegate.amount must be greater than zero".to_string(),
                    ));
                }
                check_contract("undelegate.delegation_contract", &c.delegation_contract)?;
            }
        }

        Ok(())
    }

    /// Transaction fields shared by every scenario
    pub fn tx_settings(&self) -> TxSettings {
        TxSettings {
            gas_price: self.gas_price,
            chain_id: self.chain_id.clone(),
            version: self.tx_version,
            options: self.tx_options,
        }
    }
}

fn check_count(field: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(Error::Config(format!("{} must be greater than zero", field)));
    }
    Ok(())
}

fn check_amount(field: &str, value: &str) -> Result<u128> {
    parse_amount(value).map_err(|e| Error::Config(format!("{}: {}", field, e)))
}

fn check_contract(field: &str, value: &str) -> Result<()> {
    let address = Address::from_bech32(value)
        .map_err(|e| Error::Config(format!("{}: {}", field, e)))?;
    if !address.is_smart_contract() {
        return Err(Error::Config(format!(
            "{}: {} is not a smart contract address",
            field, value
        )));
    }
    Ok(())
}

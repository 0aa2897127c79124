//! Batch transaction sender
//!
//! Reads keys from multi-key PEM files and drives one of three campaigns
//! against a gateway:
//! - Mint distribution: one transfer from a minter to each wallet
//! - Add nodes: register validator keys with a delegation contract
//! - Undelegate: one undelegation call from each wallet
//!
//! # Security Model
//!
//! - Private keys are held in zeroize-on-drop containers
//! - Keys are never logged, printed or serialized
//! - A key labelled with an address must derive that address before it signs

pub mod campaign;
pub mod config;
pub mod keys;
pub mod ledger;
pub mod transaction;
pub mod wallet;

mod error;

// Re-export commonly used types
pub use campaign::{build_scenario, Campaign, CampaignReport, TransactionBuilder, TxSettings};
pub use config::{Config, GatewayConfig, Network, Scenario};
pub use error::{Error, Result};
pub use keys::{read_keys, KeyFileError, KeySet};
pub use ledger::ProxyClient;

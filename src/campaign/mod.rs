//! Campaign pipeline
//!
//! A campaign turns key files into broadcast transactions:
//!
//! ```text
//! build drafts -> assign nonces -> check against network -> sign -> submit in batches
//! ```
//!
//! Each scenario supplies a [`TransactionBuilder`]; everything after the
//! drafts is shared.

mod audit;
mod scenarios;

use crate::config::Scenario;
use crate::ledger::{submit_in_batches, AccountProvider, BatchSubmitter, NetworkConfig};
use crate::transaction::{Transaction, TransactionArgs};
use crate::wallet::{Address, Wallet};
use crate::{Error, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

pub use audit::{campaign_submitter, AuditedSubmitter};
pub use scenarios::{build_scenario, AddNodes, MintDistribution, Undelegate};

/// A transaction before nonce assignment and signing
#[derive(Debug, Clone)]
pub struct Draft {
    pub sender: Arc<Wallet>,
    pub receiver: Address,
    pub value: u128,
    pub data: Vec<u8>,
    pub gas_limit: u64,
}

/// Produces the drafts of one scenario
pub trait TransactionBuilder: Send + Sync {
    fn scenario(&self) -> Scenario;

    /// Transactions per gateway request
    fn batch_size(&self) -> usize;

    /// Read key material and produce drafts in submission order
    fn build(&self) -> Result<Vec<Draft>>;
}

/// Transaction fields that do not vary per draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxSettings {
    pub gas_price: u64,
    /// Expected chain; `None` accepts whatever the gateway reports
    pub chain_id: Option<String>,
    pub version: u32,
    pub options: u32,
}

/// Outcome of a campaign run
#[derive(Debug, Clone, Serialize)]
pub struct CampaignReport {
    pub scenario: Scenario,
    pub transactions: usize,
    /// One line per batch
    pub messages: Vec<String>,
    pub dry_run: bool,
}

/// Runs scenarios against a ledger
pub struct Campaign {
    accounts: Arc<dyn AccountProvider>,
    submitter: Arc<dyn BatchSubmitter>,
    settings: TxSettings,
    dry_run: bool,
}

impl Campaign {
    pub fn new(
        accounts: Arc<dyn AccountProvider>,
        submitter: Arc<dyn BatchSubmitter>,
        settings: TxSettings,
    ) -> Self {
        Self {
            accounts,
            submitter,
            settings,
            dry_run: false,
        }
    }

    /// Build and sign everything but submit nothing
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run one scenario to completion
    ///
    /// Any error ends the campaign. Batches accepted before the error stay
    /// accepted.
    pub async fn run(&self, builder: &dyn TransactionBuilder) -> Result<CampaignReport> {
        let scenario = builder.scenario();
        info!(
            scenario = scenario.name(),
            submitter = self.submitter.name(),
            dry_run = self.dry_run,
            "Starting campaign"
        );

        match self.execute(builder).await {
            Ok(report) => {
                info!(
                    scenario = scenario.name(),
                    transactions = report.transactions,
                    batches = report.messages.len(),
                    "Campaign finished"
                );
                Ok(report)
            }
            Err(e) => {
                error!(scenario = scenario.name(), error = %e, "Campaign failed");
                Err(e)
            }
        }
    }

    async fn execute(&self, builder: &dyn TransactionBuilder) -> Result<CampaignReport> {
        let network = self.accounts.network_config().await?;
        let chain_id = self.resolve_chain_id(&network)?;
        debug!(chain_id = %chain_id, min_gas_price = network.min_gas_price, "Network parameters");

        let drafts = builder.build()?;
        info!(count = drafts.len(), "Drafts built");

        let transactions = self.sign_all(drafts, &network, &chain_id).await?;

        let messages = if self.dry_run {
            plan_batches(&transactions, builder.batch_size())?
        } else {
            submit_in_batches(self.submitter.as_ref(), &transactions, builder.batch_size()).await?
        };

        Ok(CampaignReport {
            scenario: builder.scenario(),
            transactions: transactions.len(),
            messages,
            dry_run: self.dry_run,
        })
    }

    fn resolve_chain_id(&self, network: &NetworkConfig) -> Result<String> {
        match &self.settings.chain_id {
            Some(expected) if *expected != network.chain_id => Err(Error::Config(format!(
                "configured chain ID {} but gateway reports {}",
                expected, network.chain_id
            ))),
            Some(expected) => Ok(expected.clone()),
            None => Ok(network.chain_id.clone()),
        }
    }

    /// Assign nonces, check and sign drafts in order
    ///
    /// Each sender's nonce is fetched once, then incremented per draft.
    async fn sign_all(
        &self,
        drafts: Vec<Draft>,
        network: &NetworkConfig,
        chain_id: &str,
    ) -> Result<Vec<Transaction>> {
        let mut nonces: HashMap<Address, u64> = HashMap::new();
        let mut transactions = Vec::with_capacity(drafts.len());

        for draft in drafts {
            let sender = draft.sender.address();
            let nonce = match nonces.get(&sender) {
                Some(next) => *next,
                None => {
                    let account = self.accounts.account(&sender).await?;
                    debug!(sender = %sender, nonce = account.nonce, "Fetched sender nonce");
                    account.nonce
                }
            };
            nonces.insert(sender, nonce + 1);

            let args = TransactionArgs {
                nonce,
                value: draft.value,
                receiver: draft.receiver,
                sender,
                gas_price: self.settings.gas_price,
                gas_limit: draft.gas_limit,
                data: draft.data,
                chain_id: chain_id.to_string(),
                version: self.settings.version,
                options: self.settings.options,
            };

            network.check(&args)?;
            transactions.push(draft.sender.sign_transaction(args)?);
        }

        info!(
            count = transactions.len(),
            senders = nonces.len(),
            "Transactions signed"
        );
        Ok(transactions)
    }
}

/// Status lines for a dry run, in the same shape as a real submission
fn plan_batches(transactions: &[Transaction], batch_size: usize) -> Result<Vec<String>> {
    if batch_size == 0 {
        return Err(Error::InvalidArgument(
            "batch size must be greater than zero".to_string(),
        ));
    }

    let total = transactions.len().div_ceil(batch_size);
    let messages = transactions
        .chunks(batch_size)
        .enumerate()
        .map(|(index, batch)| {
            for tx in batch {
                let args = tx.args();
                debug!(
                    nonce = args.nonce,
                    sender = %args.sender,
                    receiver = %args.receiver,
                    data = %args.data_lossy(),
                    "Planned transaction"
                );
            }
            let message = format!(
                "batch {}/{}: {} transactions planned (dry run)",
                index + 1,
                total,
                batch.len()
            );
            info!("{}", message);
            message
        })
        .collect();

    Ok(messages)
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    /// Builder returning fixed drafts
    struct FixedDrafts {
        drafts: Vec<Draft>,
        batch_size: usize,
    }

    impl TransactionBuilder for FixedDrafts {
        fn scenario(&self) -> Scenario {
            Scenario::MintDistribution
        }

        fn batch_size(&self) -> usize {
            self.batch_size
        }

        fn build(&self) -> Result<Vec<Draft>> {
            Ok(self.drafts.clone())
        }
    }

    fn transfer(sender: &Arc<Wallet>, receiver: Address) -> Draft {
        Draft {
            sender: Arc::clone(sender),
            receiver,
            value: 5_000_000_000_000_000_000,
            data: Vec::new(),
            gas_limit: 55_000,
        }
    }

    fn settings() -> TxSettings {
        TxSettings {
            gas_price: 1_000_000_000,
            chain_id: None,
            version: 1,
            options: 0,
        }
    }

    fn campaign(ledger: &Arc<MockLedger>) -> Campaign {
        Campaign::new(ledger.clone(), ledger.clone(), settings())
    }

    #[tokio::test]
    async fn test_single_sender_nonces_are_consecutive() {
        let minter = alice();
        let ledger = Arc::new(MockLedger::default().with_nonce(minter.address(), 7));
        let builder = FixedDrafts {
            drafts: (1..=5)
                .map(|i| transfer(&minter, Address::from_bytes([i; 32])))
                .collect(),
            batch_size: 2,
        };

        let report = campaign(&ledger).run(&builder).await.unwrap();

        assert_eq!(report.transactions, 5);
        assert_eq!(report.messages.len(), 3);
        assert!(!report.dry_run);

        let batches = ledger.batches.lock().unwrap();
        let nonces: Vec<u64> = batches.iter().flatten().map(|tx| tx.args().nonce).collect();
        assert_eq!(nonces, vec![7, 8, 9, 10, 11]);
        assert_eq!(batches[2].len(), 1);
        // Fetched once for the whole run
        assert_eq!(ledger.lookups.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_many_senders_use_their_own_nonces() {
        let first = wallet(1);
        let second = wallet(2);
        let contract = Address::from_bytes([0u8; 32]);
        let ledger = Arc::new(
            MockLedger::default()
                .with_nonce(first.address(), 3)
                .with_nonce(second.address(), 40),
        );
        let builder = FixedDrafts {
            drafts: vec![
                transfer(&first, contract),
                transfer(&second, contract),
                transfer(&first, contract),
            ],
            batch_size: 50,
        };

        campaign(&ledger).run(&builder).await.unwrap();

        let batches = ledger.batches.lock().unwrap();
        let sent: Vec<(Address, u64)> = batches[0]
            .iter()
            .map(|tx| (tx.args().sender, tx.args().nonce))
            .collect();
        assert_eq!(
            sent,
            vec![
                (first.address(), 3),
                (second.address(), 40),
                (first.address(), 4)
            ]
        );
        assert_eq!(ledger.lookups.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_dry_run_submits_nothing() {
        let minter = alice();
        let ledger = Arc::new(MockLedger::default().with_nonce(minter.address(), 0));
        let builder = FixedDrafts {
            drafts: (1..=3)
                .map(|i| transfer(&minter, Address::from_bytes([i; 32])))
                .collect(),
            batch_size: 2,
        };

        let report = campaign(&ledger)
            .with_dry_run(true)
            .run(&builder)
            .await
            .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.transactions, 3);
        assert_eq!(
            report.messages,
            vec![
                "batch 1/2: 2 transactions planned (dry run)",
                "batch 2/2: 1 transactions planned (dry run)"
            ]
        );
        assert!(ledger.batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_leaves_audit_log_empty() {
        let audit_file = tempfile::NamedTempFile::new().unwrap();
        let audit_path = audit_file.path().to_str().unwrap();
        let minter = alice();
        let ledger = Arc::new(MockLedger::default().with_nonce(minter.address(), 0));
        let builder = FixedDrafts {
            drafts: vec![transfer(&minter, Address::from_bytes([1; 32]))],
            batch_size: 1,
        };

        let submitter =
            campaign_submitter(ledger.clone(), Some(audit_path), Scenario::MintDistribution, true);
        let campaign = Campaign::new(ledger.clone(), submitter, settings()).with_dry_run(true);
        campaign.run(&builder).await.unwrap();

        let content = std::fs::read_to_string(audit_file.path()).unwrap();
        assert!(content.is_empty());
        assert!(ledger.batches.lock().unwrap().is_empty());

        let submitter =
            campaign_submitter(ledger.clone(), Some(audit_path), Scenario::MintDistribution, false);
        let campaign = Campaign::new(ledger.clone(), submitter, settings());
        campaign.run(&builder).await.unwrap();

        let content = std::fs::read_to_string(audit_file.path()).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[tokio::test]
    async fn test_chain_id_mismatch_fails_before_signing() {
        let minter = alice();
        let ledger = Arc::new(MockLedger::default().with_nonce(minter.address(), 0));
        let mut settings = settings();
        settings.chain_id = Some("1".to_string());
        let campaign = Campaign::new(ledger.clone(), ledger.clone(), settings);
        let builder = FixedDrafts {
            drafts: vec![transfer(&minter, Address::from_bytes([1; 32]))],
            batch_size: 1,
        };

        let err = campaign.run(&builder).await.unwrap_err();

        assert!(matches!(err, Error::Config(_)));
        assert!(ledger.lookups.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_gas_below_network_floor_fails() {
        let minter = alice();
        let ledger = Arc::new(MockLedger::default().with_nonce(minter.address(), 0));
        let mut draft = transfer(&minter, Address::from_bytes([1; 32]));
        draft.data = b"unDelegate@0DE0B6B3A7640000".to_vec();
        let builder = FixedDrafts {
            drafts: vec![draft],
            batch_size: 1,
        };

        let err = campaign(&ledger).run(&builder).await.unwrap_err();

        assert!(matches!(err, Error::InvalidTransaction(_)));
        assert!(ledger.batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_sender_stops_campaign() {
        let ledger = Arc::new(MockLedger::default());
        let builder = FixedDrafts {
            drafts: vec![transfer(&alice(), Address::from_bytes([1; 32]))],
            batch_size: 1,
        };

        let err = campaign(&ledger).run(&builder).await.unwrap_err();
        assert!(err.to_string().contains("unknown account"));
    }

    #[tokio::test]
    async fn test_failed_batch_stops_following_batches() {
        let minter = alice();
        let ledger = Arc::new(MockLedger {
            fail_batch: Some(1),
            ..MockLedger::default()
        }
        .with_nonce(minter.address(), 0));
        let builder = FixedDrafts {
            drafts: (1..=6)
                .map(|i| transfer(&minter, Address::from_bytes([i; 32])))
                .collect(),
            batch_size: 2,
        };

        let result = campaign(&ledger).run(&builder).await;

        assert!(matches!(result, Err(Error::Gateway(_))));
        assert_eq!(ledger.batches.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_signed_transactions_carry_settings() {
        let minter = alice();
        let ledger = Arc::new(MockLedger::default().with_nonce(minter.address(), 0));
        let mut settings = settings();
        settings.options = 1;
        settings.version = 2;
        let campaign = Campaign::new(ledger.clone(), ledger.clone(), settings);

        let txs = tokio_test::block_on(campaign.sign_all(
            vec![transfer(&minter, Address::from_bytes([1; 32]))],
            &network(),
            "T",
        ))
        .unwrap();

        let args = txs[0].args();
        assert_eq!(args.chain_id, "T");
        assert_eq!(args.version, 2);
        assert_eq!(args.options, 1);
        assert_eq!(args.gas_price, 1_000_000_000);
        assert_eq!(txs[0].signature().len(), 64);
    }
}

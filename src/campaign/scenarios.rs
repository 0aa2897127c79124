//! Scenario builders
//!
//! Each builder reads its key files when asked for drafts, so a failed key
//! file surfaces as a campaign error before anything is signed.

use crate::campaign::{Draft, TransactionBuilder};
use crate::config::{AddNodesConfig, Config, MintDistributionConfig, Scenario, UndelegateConfig};
use crate::keys::read_keys;
use crate::transaction::{encode_call_argument, parse_amount};
use crate::wallet::{Address, MessageSigner, Wallet};
use crate::Result;
use std::sync::Arc;
use tracing::info;

/// Build the builder for `scenario` from its configuration section
pub fn build_scenario(
    config: &Config,
    scenario: Scenario,
    signer: Arc<dyn MessageSigner>,
) -> Result<Box<dyn TransactionBuilder>> {
    let builder: Box<dyn TransactionBuilder> = match scenario {
        Scenario::MintDistribution => {
            Box::new(MintDistribution::new(config.mint_distribution.clone())?)
        }
        Scenario::AddNodes => Box::new(AddNodes::new(config.add_nodes.clone(), signer)?),
        Scenario::Undelegate => Box::new(Undelegate::new(config.undelegate.clone())?),
    };
    Ok(builder)
}

/// One transfer from the minter to each wallet of a key file
///
/// Only the wallet identifiers are used; they are the receiver addresses.
pub struct MintDistribution {
    config: MintDistributionConfig,
    value: u128,
}

impl MintDistribution {
    pub fn new(config: MintDistributionConfig) -> Result<Self> {
        let value = parse_amount(&config.value)?;
        Ok(Self { config, value })
    }
}

impl TransactionBuilder for MintDistribution {
    fn scenario(&self) -> Scenario {
        Scenario::MintDistribution
    }

    fn batch_size(&self) -> usize {
        self.config.batch_size
    }

    fn build(&self) -> Result<Vec<Draft>> {
        let minter = Arc::new(Wallet::from_pem_file(&self.config.minter_pem)?);
        let wallets = read_keys(&self.config.wallets_pem, self.config.wallet_count)?;
        info!(
            minter = %minter.address(),
            wallets = wallets.len(),
            "Loaded distribution keys"
        );

        wallets
            .public_ids()
            .iter()
            .map(|id| -> Result<Draft> {
                Ok(Draft {
                    sender: Arc::clone(&minter),
                    receiver: Address::from_bech32(id)?,
                    value: self.value,
                    data: Vec::new(),
                    gas_limit: self.config.gas_limit,
                })
            })
            .collect()
    }
}

/// One `addNodes` call per validator key
///
/// The call carries the node public key and a signature of the owner's
/// address made with the node key.
pub struct AddNodes {
    config: AddNodesConfig,
    contract: Address,
    value: u128,
    signer: Arc<dyn MessageSigner>,
}

impl AddNodes {
    pub fn new(config: AddNodesConfig, signer: Arc<dyn MessageSigner>) -> Result<Self> {
        let contract = Address::from_bech32(&config.delegation_contract)?;
        let value = parse_amount(&config.value)?;
        Ok(Self {
            config,
            contract,
            value,
            signer,
        })
    }
}

impl TransactionBuilder for AddNodes {
    fn scenario(&self) -> Scenario {
        Scenario::AddNodes
    }

    fn batch_size(&self) -> usize {
        self.config.batch_size
    }

    fn build(&self) -> Result<Vec<Draft>> {
        let owner = Arc::new(Wallet::from_pem_file(&self.config.owner_pem)?);
        let validators = read_keys(&self.config.validators_pem, self.config.validator_count)?;
        info!(
            owner = %owner.address(),
            validators = validators.len(),
            contract = %self.contract,
            "Loaded validator keys"
        );

        let owner_address = owner.address();
        validators
            .public_ids()
            .iter()
            .zip(validators.private_keys())
            .map(|(node_key, secret)| -> Result<Draft> {
                let proof = self.signer.sign_message(secret, owner_address.as_bytes())?;
                let data = format!("addNodes@{}@{}", node_key, hex::encode(proof));
                Ok(Draft {
                    sender: Arc::clone(&owner),
                    receiver: self.contract,
                    value: self.value,
                    data: data.into_bytes(),
                    gas_limit: self.config.gas_limit,
                })
            })
            .collect()
    }
}

/// One `unDelegate` call from each wallet of a key file
pub struct Undelegate {
    config: UndelegateConfig,
    contract: Address,
    call_data: String,
}

impl Undelegate {
    pub fn new(config: UndelegateConfig) -> Result<Self> {
        let contract = Address::from_bech32(&config.delegation_contract)?;
        let amount = parse_amount(&config.amount)?;
        Ok(Self {
            call_data: format!("unDelegate@{}", encode_call_argument(amount)),
            config,
            contract,
        })
    }
}

impl TransactionBuilder for Undelegate {
    fn scenario(&self) -> Scenario {
        Scenario::Undelegate
    }

    fn batch_size(&self) -> usize {
        self.config.batch_size
    }

    fn build(&self) -> Result<Vec<Draft>> {
        let wallets = read_keys(&self.config.wallets_pem, self.config.wallet_count)?;
        info!(
            wallets = wallets.len(),
            contract = %self.contract,
            call = %self.call_data,
            "Loaded delegator keys"
        );

        wallets
            .into_records()
            .map(|record| -> Result<Draft> {
                Ok(Draft {
                    sender: Arc::new(Wallet::from_record(&record)?),
                    receiver: self.contract,
                    value: 0,
                    data: self.call_data.clone().into_bytes(),
                    gas_limit: self.config.gas_limit,
                })
            })
            .collect()
    }
}

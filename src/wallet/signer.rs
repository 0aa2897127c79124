//! Wallet implementation
//!
//! SECURITY: key bytes only live inside `SigningKey` (zeroized on drop) and
//! the `SecretSlice` they were read into.
//! - Wallets have no Serialize impl
//! - Debug output redacts the key
//! - Keys are never logged

use crate::keys::{read_single_key, KeyRecord};
use crate::transaction::{Transaction, TransactionArgs};
use crate::wallet::address::{Address, ADDRESS_HRP};
use crate::{Error, Result};
use ed25519_dalek::{Signer, SigningKey};
use secrecy::{ExposeSecret, SecretSlice};
use std::path::Path;

const SEED_LEN: usize = 32;

/// Signs arbitrary messages with a raw secret key
///
/// The add-nodes scenario proves possession of every node key by signing
/// the owner's address with it.
pub trait MessageSigner: Send + Sync {
    fn sign_message(&self, secret: &SecretSlice<u8>, message: &[u8]) -> Result<Vec<u8>>;
}

/// ed25519 message signer over 32-byte seeds (or seed || public key)
#[derive(Debug, Default, Clone, Copy)]
pub struct Ed25519MessageSigner;

impl MessageSigner for Ed25519MessageSigner {
    fn sign_message(&self, secret: &SecretSlice<u8>, message: &[u8]) -> Result<Vec<u8>> {
        let wallet = Wallet::from_secret(secret.expose_secret())?;
        Ok(wallet.sign(message).to_vec())
    }
}

/// An account key able to sign transactions
pub struct Wallet {
    signing_key: SigningKey,
    address: Address,
}

impl Wallet {
    /// Create a wallet from raw key bytes
    ///
    /// Accepts a 32-byte seed, or the 64-byte `seed || public key` layout of
    /// wallet PEM files. In the latter case the public half must match the
    /// key derived from the seed.
    pub fn from_secret(secret: &[u8]) -> Result<Self> {
        let seed: [u8; SEED_LEN] = match secret.len() {
            32 | 64 => secret[..SEED_LEN]
                .try_into()
                .map_err(|_| Error::Wallet("invalid seed length".to_string()))?,
            n => {
                return Err(Error::Wallet(format!(
                    "expected 32 or 64 key bytes, got {}",
                    n
                )))
            }
        };

        let signing_key = SigningKey::from_bytes(&seed);
        let address = Address::from_bytes(signing_key.verifying_key().to_bytes());

        if secret.len() == 64 && secret[SEED_LEN..] != address.as_bytes()[..] {
            return Err(Error::Wallet(format!(
                "public key half does not match seed (derived {})",
                address
            )));
        }

        Ok(Self {
            signing_key,
            address,
        })
    }

    /// Create a wallet from a key file record
    ///
    /// When the record is labelled with an address, the derived address must
    /// be that address; signing for the wrong account is refused up front.
    pub fn from_record(record: &KeyRecord) -> Result<Self> {
        let wallet = Self::from_secret(record.private_key.expose_secret())?;

        if record.public_id.starts_with(ADDRESS_HRP) && record.public_id != wallet.address.to_bech32()
        {
            return Err(Error::Wallet(format!(
                "key labelled {} derives address {}",
                record.public_id, wallet.address
            )));
        }

        Ok(wallet)
    }

    /// Load the first key of a wallet PEM file
    pub fn from_pem_file(path: impl AsRef<Path>) -> Result<Self> {
        let record = read_single_key(path)?;
        Self::from_record(&record)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign raw bytes
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Sign a transaction sent from this wallet
    pub fn sign_transaction(&self, args: TransactionArgs) -> Result<Transaction> {
        if args.sender != self.address {
            return Err(Error::Wallet(format!(
                "transaction sender {} is not this wallet ({})",
                args.sender, self.address
            )));
        }

        let signature = self.sign(&args.signing_bytes()?);
        Ok(Transaction::new(args, signature.to_vec()))
    }
}

// Implement Debug manually to avoid exposing the signing key
impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .field("signing_key", &"[REDACTED]")
            .finish()
    }
}

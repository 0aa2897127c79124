//! Account keys, addresses and signing
//!
//! Private keys never leave this module once a `Wallet` is built.

mod address;
mod signer;

pub use address::{Address, ADDRESS_HRP, ADDRESS_LEN};
pub use signer::{Ed25519MessageSigner, MessageSigner, Wallet};

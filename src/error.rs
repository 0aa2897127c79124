//! Error types for the batch sender

use crate::keys::KeyFileError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Key file error: {0}")]
    KeyFile(#[from] KeyFileError),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Invalid address: {0}")]
    Address(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

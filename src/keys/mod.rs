//! Key material loading
//!
//! Keys arrive as multi-block PEM files. Every block carries one private key
//! and the public identifier it belongs to.

mod pem_file;

pub use pem_file::{
    encode_key_block, parse_keys, read_keys, read_single_key, KeyFileError, KeyRecord, KeySet,
    PRIVATE_KEY_LABEL_PREFIX,
};

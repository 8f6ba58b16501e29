//! Content addressing: a payload's identity is the hex SHA-256 of its bytes.

use sha2::{Digest, Sha256};

/// Length in characters of every content address.
pub const ADDRESS_LEN: usize = 64;

pub fn content_address(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

//! # Hashing
//!
//! Ethereum's keccak-256 (the original Keccak padding, not NIST SHA3-256).

use crate::entities::Hash;
use sha3::{Digest, Keccak256};

/// Keccak-256 over a single buffer.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Keccak-256 over the concatenation of several buffers, without
/// materialising the concatenated preimage.
pub fn keccak256_concat(parts: &[&[u8]]) -> Hash {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

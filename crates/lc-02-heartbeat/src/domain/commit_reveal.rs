//! # Commit-Reveal Hashing
//!
//! Byte-exact preimages for the vault contract's liveness proof.
//!
//! ## Commit
//!
//! ```text
//! commitHash = keccak256(owner[20] || nonceBytes)
//! ```
//!
//! which is Solidity's `keccak256(abi.encodePacked(msg.sender, nonce))` when
//! `nonceBytes` is the raw nonce.
//!
//! ## Reveal
//!
//! The contract takes the nonce as `bytes32`. Nonce bytes are left-aligned
//! into 32 bytes: truncated when longer, zero-filled when shorter. The
//! contract then recomputes `keccak256(msg.sender || nonce32)`, so a commit
//! over a nonce that is not exactly 32 bytes can never be revealed.
//!
//! ## Nonce Bytes
//!
//! A nonce string that is valid bare hex (even length, no `0x`) is decoded;
//! anything else is taken as its UTF-8 bytes. `"abcd"` therefore means two
//! bytes `[0xab, 0xcd]`, while `"xyz"` means three ASCII bytes.

use shared_types::{keccak256_concat, Address, Hash};

/// Width of the contract's reveal argument.
pub const REVEAL_NONCE_LEN: usize = 32;

/// Interpret a caller nonce as bytes (hex when it parses as bare hex, UTF-8 otherwise).
pub fn nonce_to_bytes(nonce: &str) -> Vec<u8> {
    hex::decode(nonce).unwrap_or_else(|_| nonce.as_bytes().to_vec())
}

/// Whether `nonce` will be interpreted as hex by [`nonce_to_bytes`].
pub fn is_hex_nonce(nonce: &str) -> bool {
    hex::decode(nonce).is_ok()
}

/// `keccak256(address || nonce_bytes)`.
pub fn compute_commit_hash(address: &Address, nonce_bytes: &[u8]) -> Hash {
    keccak256_concat(&[&address.as_bytes()[..], nonce_bytes])
}

/// Pack nonce bytes into the contract's `bytes32` reveal argument.
pub fn build_reveal_preimage(nonce_bytes: &[u8]) -> [u8; REVEAL_NONCE_LEN] {
    let mut out = [0u8; REVEAL_NONCE_LEN];
    let len = nonce_bytes.len().min(REVEAL_NONCE_LEN);
    out[..len].copy_from_slice(&nonce_bytes[..len]);
    out
}

/// The check the contract performs on reveal.
pub fn reveal_matches_commit(
    address: &Address,
    nonce32: &[u8; REVEAL_NONCE_LEN],
    commit_hash: &Hash,
) -> bool {
    compute_commit_hash(address, nonce32) == *commit_hash
}

//! # Error Types
//!
//! Parsing errors for the shared primitive types.

use thiserror::Error;

/// Errors raised while decoding shared primitives from their wire forms.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// Address string is not 20 bytes of hex.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Hex string without the mandatory `0x` prefix.
    #[error("Hex string without 0x prefix")]
    MissingHexPrefix,

    /// Hex digits could not be decoded.
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Byte sequence has the wrong length.
    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

//! # Authentication Errors
//!
//! Error types for nonce handling, signature verification and session issuance.
//!
//! Callers outside the service boundary should render these through
//! [`AuthError::public_message`], which collapses every authentication failure
//! to "unauthorized" so that responses do not reveal which nonces exist.

use thiserror::Error;

/// Failures of a backing store (nonce store, identity repository).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached or refused the command.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Errors that can occur while authenticating a wallet owner.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Request is missing fields or carries malformed values.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Signature timestamp is older than the allowed window.
    #[error("Signature expired: {age} seconds old (max: {max_age})")]
    Expired { age: i64, max_age: i64 },

    /// Signature timestamp lies beyond the clock-skew tolerance.
    #[error("Signature timestamp is in the future: {ahead} seconds ahead")]
    Future { ahead: i64 },

    /// Nonce was never issued, has expired, or was already consumed.
    #[error("Invalid or expired nonce")]
    Replay,

    /// Supplied message differs from the canonical challenge.
    #[error("Message mismatch")]
    MessageMismatch,

    /// Signature hex or length is malformed, or the recovery byte is out of range.
    #[error("Invalid signature format: {0}")]
    Format(String),

    /// Public key recovery failed for a structurally valid signature.
    #[error("Failed to recover public key: {0}")]
    Crypto(String),

    /// Signature is valid but was produced by a different address.
    #[error("Invalid signature: address mismatch")]
    AddressMismatch,

    /// Bearer credential is missing, malformed, forged, expired or carries
    /// an unexpected claim set.
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// No identity is registered for the address.
    #[error("Identity not found")]
    IdentityNotFound,

    /// Credential could not be minted.
    #[error("Credential issuance failed: {0}")]
    Issuance(String),

    /// Backing store failure.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl AuthError {
    /// Whether the failure is an authentication rejection (as opposed to an
    /// infrastructure fault or a missing identity).
    pub fn is_unauthorized(&self) -> bool {
        !matches!(
            self,
            AuthError::Storage(_) | AuthError::Issuance(_) | AuthError::IdentityNotFound
        )
    }

    /// Message safe to show to the caller.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::Storage(_) | AuthError::Issuance(_) => "internal error",
            AuthError::IdentityNotFound => "not found",
            _ => "unauthorized",
        }
    }
}

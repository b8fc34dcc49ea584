//! # Heartbeat Errors
//!
//! Unlike authentication failures, liveness failures keep their specific
//! kind all the way to the caller.

use super::entities::HeartbeatStatus;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the heartbeat subsystem.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HeartbeatError {
    /// Request is missing fields or carries malformed values.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The vault does not exist or is not owned by the caller.
    #[error("Vault not found or not owned by caller")]
    VaultNotFound,

    /// No committed, unclaimed heartbeat matches the vault and nonce.
    #[error("No matching committed heartbeat found")]
    CommitmentNotFound,

    /// The chain collaborator rejected or failed the call. Message verbatim.
    #[error("Chain error: {0}")]
    Chain(String),

    /// The caller's deadline passed before the chain call completed.
    #[error("Operation cancelled: deadline exceeded")]
    Cancelled,

    /// A terminal record was asked to change state.
    #[error("Invalid transition for commitment {id}: {from:?} -> {to:?}")]
    InvalidTransition {
        id: Uuid,
        from: HeartbeatStatus,
        to: HeartbeatStatus,
    },
}

impl HeartbeatError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            HeartbeatError::VaultNotFound | HeartbeatError::CommitmentNotFound
        )
    }
}

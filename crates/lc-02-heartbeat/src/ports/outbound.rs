//! # Outbound Ports (Driven Ports / SPI)
//!
//! The chain collaborator, the vault directory and commitment persistence.

use crate::domain::entities::HeartbeatCommitment;
use crate::domain::errors::HeartbeatError;
use async_trait::async_trait;
use shared_types::{Address, Hash, UnixSeconds};
use uuid::Uuid;

/// Gateway to the vault contract.
///
/// Errors are reported as [`HeartbeatError::Chain`] with the collaborator's
/// message verbatim.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Submit `commitHeartbeat(commitment)`; returns the transaction hash.
    async fn commit_heartbeat(&self, vault: Address, commitment: Hash) -> Result<String, HeartbeatError>;

    /// Submit `revealHeartbeat(nonce)`; returns the transaction hash.
    async fn reveal_heartbeat(&self, vault: Address, nonce: [u8; 32]) -> Result<String, HeartbeatError>;

    /// Timestamp of the last accepted heartbeat; `0` if none yet.
    async fn last_heartbeat(&self, vault: Address) -> Result<UnixSeconds, HeartbeatError>;
}

/// Ownership-scoped vault lookup.
#[async_trait]
pub trait VaultDirectory: Send + Sync {
    /// Contract address of vault `vault_id` if it is owned by `owner`.
    async fn resolve_vault(&self, vault_id: Uuid, owner: &Address) -> Result<Option<Address>, HeartbeatError>;
}

/// Persistence for heartbeat commitments.
#[async_trait]
pub trait CommitmentRepository: Send + Sync {
    async fn insert(&self, commitment: HeartbeatCommitment) -> Result<(), HeartbeatError>;

    /// Atomically claim the newest `Committed`, unclaimed record for
    /// `(vault_id, nonce)`, stamping `reveal_claimed_at = now`.
    ///
    /// When several reveals race, exactly one receives the record.
    async fn claim_for_reveal(
        &self,
        vault_id: Uuid,
        nonce: &str,
        now: UnixSeconds,
    ) -> Result<Option<HeartbeatCommitment>, HeartbeatError>;

    async fn record_commit_tx(&self, id: Uuid, tx_hash: &str) -> Result<(), HeartbeatError>;

    async fn mark_revealed(&self, id: Uuid, tx_hash: &str, at: UnixSeconds) -> Result<(), HeartbeatError>;

    async fn mark_failed(&self, id: Uuid) -> Result<(), HeartbeatError>;

    /// Most recently committed record of a vault.
    async fn latest(&self, vault_id: Uuid) -> Result<Option<HeartbeatCommitment>, HeartbeatError>;

    /// All records of a vault, newest first.
    async fn list(&self, vault_id: Uuid) -> Result<Vec<HeartbeatCommitment>, HeartbeatError>;
}

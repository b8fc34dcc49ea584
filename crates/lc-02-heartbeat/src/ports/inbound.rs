//! # Inbound Ports (Driving Ports / API)

use crate::domain::context::CallContext;
use crate::domain::entities::{CommitReceipt, HeartbeatCommitment, HeartbeatStatusReport, RevealReceipt};
use crate::domain::errors::HeartbeatError;
use async_trait::async_trait;
use shared_types::Address;
use uuid::Uuid;

/// Commit-reveal heartbeat API for vault owners.
#[async_trait]
pub trait HeartbeatApi: Send + Sync {
    /// Phase 1: commit `keccak256(owner || nonce)` to the vault contract.
    async fn commit(
        &self,
        ctx: CallContext,
        owner: &Address,
        vault_id: Uuid,
        nonce: &str,
    ) -> Result<CommitReceipt, HeartbeatError>;

    /// Phase 2: reveal the nonce of an earlier commit.
    async fn reveal(
        &self,
        ctx: CallContext,
        owner: &Address,
        vault_id: Uuid,
        nonce: &str,
    ) -> Result<RevealReceipt, HeartbeatError>;

    async fn status(&self, owner: &Address, vault_id: Uuid) -> Result<HeartbeatStatusReport, HeartbeatError>;

    /// Every commitment of the vault, newest first.
    async fn list(&self, owner: &Address, vault_id: Uuid) -> Result<Vec<HeartbeatCommitment>, HeartbeatError>;
}

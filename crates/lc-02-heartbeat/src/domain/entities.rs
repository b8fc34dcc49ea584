//! # Heartbeat Entities
//!
//! The commitment audit record and its state machine:
//!
//! ```text
//! Committed ──► Revealed   (terminal)
//!     │
//!     └──────► Failed     (terminal)
//! ```

use super::errors::HeartbeatError;
use serde::{Deserialize, Serialize};
use shared_types::{to_prefixed_hex, Hash, UnixSeconds};
use uuid::Uuid;

/// Lifecycle state of a heartbeat commitment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeartbeatStatus {
    Committed,
    Revealed,
    Failed,
}

impl HeartbeatStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, HeartbeatStatus::Committed)
    }
}

/// Audit record of one commit-reveal round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatCommitment {
    pub id: Uuid,
    pub vault_id: Uuid,
    #[serde(with = "hash_hex")]
    pub commit_hash: Hash,
    pub commit_tx_hash: Option<String>,
    pub reveal_tx_hash: Option<String>,
    /// The caller's nonce, kept so the reveal can be matched
    pub nonce: String,
    pub status: HeartbeatStatus,
    pub committed_at: UnixSeconds,
    pub revealed_at: Option<UnixSeconds>,
    /// Set when a reveal claims this record; at most one claim succeeds
    pub reveal_claimed_at: Option<UnixSeconds>,
}

impl HeartbeatCommitment {
    /// A fresh `Committed` record.
    pub fn new(vault_id: Uuid, commit_hash: Hash, nonce: String, committed_at: UnixSeconds) -> Self {
        Self {
            id: Uuid::new_v4(),
            vault_id,
            commit_hash,
            commit_tx_hash: None,
            reveal_tx_hash: None,
            nonce,
            status: HeartbeatStatus::Committed,
            committed_at,
            revealed_at: None,
            reveal_claimed_at: None,
        }
    }

    /// Commit hash as `0x`-hex.
    pub fn commit_hash_hex(&self) -> String {
        to_prefixed_hex(&self.commit_hash)
    }

    /// Whether a reveal may still claim this record.
    ///
    /// The commit transaction must have landed first; a reveal racing an
    /// in-flight commit finds nothing to claim.
    pub fn is_claimable(&self) -> bool {
        self.status == HeartbeatStatus::Committed
            && self.commit_tx_hash.is_some()
            && self.reveal_claimed_at.is_none()
    }

    /// Attach the commit transaction hash. Terminal records are left untouched.
    pub fn record_commit_tx(&mut self, tx_hash: String) -> Result<(), HeartbeatError> {
        if self.status.is_terminal() {
            return Err(HeartbeatError::InvalidTransition {
                id: self.id,
                from: self.status,
                to: HeartbeatStatus::Committed,
            });
        }
        self.commit_tx_hash = Some(tx_hash);
        Ok(())
    }

    /// `Committed -> Revealed`.
    pub fn mark_revealed(&mut self, tx_hash: String, at: UnixSeconds) -> Result<(), HeartbeatError> {
        self.transition(HeartbeatStatus::Revealed)?;
        self.reveal_tx_hash = Some(tx_hash);
        self.revealed_at = Some(at);
        Ok(())
    }

    /// `Committed -> Failed`.
    pub fn mark_failed(&mut self) -> Result<(), HeartbeatError> {
        self.transition(HeartbeatStatus::Failed)
    }

    fn transition(&mut self, to: HeartbeatStatus) -> Result<(), HeartbeatError> {
        if self.status.is_terminal() {
            return Err(HeartbeatError::InvalidTransition {
                id: self.id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}

/// Result of a successful commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitReceipt {
    pub commitment_id: Uuid,
    pub tx_hash: String,
    /// `0x`-hex commit hash
    pub commit_hash: String,
}

/// Result of a successful reveal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealReceipt {
    pub commitment_id: Uuid,
    pub tx_hash: String,
}

/// Local and on-chain heartbeat state of a vault.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatStatusReport {
    pub vault_id: Uuid,
    pub latest_commitment: Option<HeartbeatCommitment>,
    /// Last heartbeat recorded by the contract; `None` if the chain read failed
    pub last_heartbeat: Option<UnixSeconds>,
    pub on_chain_status: String,
}

mod hash_hex {
    use serde::{Deserialize, Deserializer, Serializer};
    use shared_types::{from_prefixed_hex, to_prefixed_hex, Hash};

    pub fn serialize<S: Serializer>(hash: &Hash, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_prefixed_hex(hash))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Hash, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = from_prefixed_hex(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 32-byte hash"))
    }
}

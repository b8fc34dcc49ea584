//! # Heartbeat Service
//!
//! Application service implementing [`HeartbeatApi`].
//!
//! ## Commit
//!
//! validate nonce → resolve vault → hash → persist `Committed` → deadline
//! check → chain commit (bounded by the deadline) → record tx hash.
//!
//! ## Reveal
//!
//! resolve vault → atomically claim the newest matching `Committed` record
//! whose commit tx has landed → pack nonce → deadline check → chain reveal →
//! `Revealed`.
//!
//! Whenever the chain call fails or the deadline passes after a record was
//! written, the record is moved to `Failed` before the error is returned.
//! Nothing is retried.
//!
//! The deadline bounds the wait for the gateway, not the transaction. A
//! submission abandoned at the deadline may already have been broadcast, so
//! a `Failed` record means "not confirmed by this service", and the contract
//! remains the source of truth (see [`HeartbeatApi::status`]).

use crate::domain::commit_reveal::{
    build_reveal_preimage, compute_commit_hash, is_hex_nonce, nonce_to_bytes,
    reveal_matches_commit, REVEAL_NONCE_LEN,
};
use crate::domain::context::CallContext;
use crate::domain::entities::{
    CommitReceipt, HeartbeatCommitment, HeartbeatStatusReport, RevealReceipt,
};
use crate::domain::errors::HeartbeatError;
use crate::ports::inbound::HeartbeatApi;
use crate::ports::outbound::{ChainGateway, CommitmentRepository, VaultDirectory};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat};
use shared_types::{Address, SystemTimeSource, TimeSource, UnixSeconds};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Heartbeat Service.
#[derive(Clone)]
pub struct HeartbeatService {
    chain: Arc<dyn ChainGateway>,
    vaults: Arc<dyn VaultDirectory>,
    commitments: Arc<dyn CommitmentRepository>,
    clock: Arc<dyn TimeSource>,
}

impl HeartbeatService {
    pub fn new(
        chain: Arc<dyn ChainGateway>,
        vaults: Arc<dyn VaultDirectory>,
        commitments: Arc<dyn CommitmentRepository>,
    ) -> Self {
        Self::with_clock(chain, vaults, commitments, Arc::new(SystemTimeSource))
    }

    pub fn with_clock(
        chain: Arc<dyn ChainGateway>,
        vaults: Arc<dyn VaultDirectory>,
        commitments: Arc<dyn CommitmentRepository>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            chain,
            vaults,
            commitments,
            clock,
        }
    }

    async fn resolve(&self, vault_id: Uuid, owner: &Address) -> Result<Address, HeartbeatError> {
        self.vaults
            .resolve_vault(vault_id, owner)
            .await?
            .ok_or(HeartbeatError::VaultNotFound)
    }

    /// Move `id` to `Failed`, logging rather than masking the original error.
    async fn reconcile_failed(&self, id: Uuid) {
        if let Err(e) = self.commitments.mark_failed(id).await {
            error!(commitment_id = %id, error = %e, "Failed to mark heartbeat commitment as failed");
        }
    }

    fn warn_if_unrevealable(owner: &Address, nonce: &str, nonce_bytes: &[u8]) {
        if nonce_bytes.len() == REVEAL_NONCE_LEN {
            return;
        }
        let commit = compute_commit_hash(owner, nonce_bytes);
        let packed = build_reveal_preimage(nonce_bytes);
        if !reveal_matches_commit(owner, &packed, &commit) {
            warn!(
                nonce_len = nonce_bytes.len(),
                hex_nonce = is_hex_nonce(nonce),
                "Heartbeat nonce is not 32 bytes; the contract will not accept its reveal"
            );
        }
    }
}

impl std::fmt::Debug for HeartbeatService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeartbeatService").finish_non_exhaustive()
    }
}

/// Human-readable on-chain status line.
pub fn describe_last_heartbeat(last: UnixSeconds) -> String {
    if last == 0 {
        return "No heartbeat recorded on-chain yet".to_string();
    }
    match DateTime::from_timestamp(last, 0) {
        Some(at) => format!(
            "Last heartbeat: {}",
            at.to_rfc3339_opts(SecondsFormat::Secs, true)
        ),
        None => format!("Last heartbeat: {last}"),
    }
}

#[async_trait]
impl HeartbeatApi for HeartbeatService {
    async fn commit(
        &self,
        ctx: CallContext,
        owner: &Address,
        vault_id: Uuid,
        nonce: &str,
    ) -> Result<CommitReceipt, HeartbeatError> {
        if nonce.is_empty() {
            return Err(HeartbeatError::Validation("nonce is required".into()));
        }

        let contract = self.resolve(vault_id, owner).await?;

        let nonce_bytes = nonce_to_bytes(nonce);
        Self::warn_if_unrevealable(owner, nonce, &nonce_bytes);
        let commit_hash = compute_commit_hash(owner, &nonce_bytes);

        let record = HeartbeatCommitment::new(vault_id, commit_hash, nonce.to_string(), self.clock.now());
        let id = record.id;
        let commit_hash_hex = record.commit_hash_hex();
        self.commitments.insert(record).await?;

        let submitted = match ctx.check() {
            Ok(()) => ctx.run(self.chain.commit_heartbeat(contract, commit_hash)).await,
            Err(e) => Err(e),
        };
        let tx_hash = match submitted {
            Ok(tx_hash) => tx_hash,
            Err(e) => {
                warn!(vault_id = %vault_id, commitment_id = %id, error = %e, "Heartbeat commit failed");
                self.reconcile_failed(id).await;
                return Err(e);
            }
        };

        if let Err(e) = self.commitments.record_commit_tx(id, &tx_hash).await {
            error!(vault_id = %vault_id, commitment_id = %id, tx_hash = %tx_hash, error = %e, "Failed to record heartbeat commit tx");
            return Err(e);
        }

        info!(vault_id = %vault_id, commitment_id = %id, tx_hash = %tx_hash, "Heartbeat committed");
        Ok(CommitReceipt {
            commitment_id: id,
            tx_hash,
            commit_hash: commit_hash_hex,
        })
    }

    async fn reveal(
        &self,
        ctx: CallContext,
        owner: &Address,
        vault_id: Uuid,
        nonce: &str,
    ) -> Result<RevealReceipt, HeartbeatError> {
        if nonce.is_empty() {
            return Err(HeartbeatError::Validation("nonce is required".into()));
        }

        let contract = self.resolve(vault_id, owner).await?;

        let record = self
            .commitments
            .claim_for_reveal(vault_id, nonce, self.clock.now())
            .await?
            .ok_or(HeartbeatError::CommitmentNotFound)?;

        let packed = build_reveal_preimage(&nonce_to_bytes(nonce));

        let submitted = match ctx.check() {
            Ok(()) => ctx.run(self.chain.reveal_heartbeat(contract, packed)).await,
            Err(e) => Err(e),
        };
        let tx_hash = match submitted {
            Ok(tx_hash) => tx_hash,
            Err(e) => {
                warn!(vault_id = %vault_id, commitment_id = %record.id, error = %e, "Heartbeat reveal failed");
                self.reconcile_failed(record.id).await;
                return Err(e);
            }
        };

        self.commitments
            .mark_revealed(record.id, &tx_hash, self.clock.now())
            .await?;

        info!(vault_id = %vault_id, commitment_id = %record.id, tx_hash = %tx_hash, "Heartbeat revealed");
        Ok(RevealReceipt {
            commitment_id: record.id,
            tx_hash,
        })
    }

    async fn status(&self, owner: &Address, vault_id: Uuid) -> Result<HeartbeatStatusReport, HeartbeatError> {
        let contract = self.resolve(vault_id, owner).await?;
        let latest_commitment = self.commitments.latest(vault_id).await?;

        let (last_heartbeat, on_chain_status) = match self.chain.last_heartbeat(contract).await {
            Ok(last) => (Some(last), describe_last_heartbeat(last)),
            Err(e) => {
                warn!(vault_id = %vault_id, error = %e, "Failed to read last heartbeat");
                let message = match e {
                    HeartbeatError::Chain(message) => message,
                    other => other.to_string(),
                };
                (None, format!("error: {message}"))
            }
        };

        Ok(HeartbeatStatusReport {
            vault_id,
            latest_commitment,
            last_heartbeat,
            on_chain_status,
        })
    }

    async fn list(&self, owner: &Address, vault_id: Uuid) -> Result<Vec<HeartbeatCommitment>, HeartbeatError> {
        self.resolve(vault_id, owner).await?;
        self.commitments.list(vault_id).await
    }
}

//! # In-Memory Adapters
//!
//! Process-local commitment repository and vault directory, plus a recording
//! chain gateway that stands in for the vault contract.

use crate::domain::entities::{HeartbeatCommitment, HeartbeatStatus};
use crate::domain::errors::HeartbeatError;
use crate::ports::outbound::{ChainGateway, CommitmentRepository, VaultDirectory};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared_types::{keccak256, to_prefixed_hex, Address, Hash, SystemTimeSource, TimeSource, UnixSeconds};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

// =============================================================================
// COMMITMENT REPOSITORY
// =============================================================================

/// Commitment repository backed by a mutex-guarded vector.
///
/// Records are kept in insertion order; "newest" means greatest
/// `committed_at`, ties broken by later insertion.
#[derive(Debug, Default)]
pub struct InMemoryCommitmentRepository {
    records: Mutex<Vec<HeartbeatCommitment>>,
}

impl InMemoryCommitmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a record by id.
    pub fn get(&self, id: Uuid) -> Option<HeartbeatCommitment> {
        self.records.lock().iter().find(|r| r.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn update<F>(&self, id: Uuid, apply: F) -> Result<(), HeartbeatError>
    where
        F: FnOnce(&mut HeartbeatCommitment) -> Result<(), HeartbeatError>,
    {
        let mut records = self.records.lock();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(HeartbeatError::CommitmentNotFound)?;
        apply(record)
    }
}

fn newest_first(records: &mut [HeartbeatCommitment]) {
    // Stable sort keeps later insertions ahead after the reverse
    records.reverse();
    records.sort_by(|a, b| b.committed_at.cmp(&a.committed_at));
}

#[async_trait]
impl CommitmentRepository for InMemoryCommitmentRepository {
    async fn insert(&self, commitment: HeartbeatCommitment) -> Result<(), HeartbeatError> {
        self.records.lock().push(commitment);
        Ok(())
    }

    async fn claim_for_reveal(
        &self,
        vault_id: Uuid,
        nonce: &str,
        now: UnixSeconds,
    ) -> Result<Option<HeartbeatCommitment>, HeartbeatError> {
        let mut records = self.records.lock();
        // max_by_key keeps the last maximum, i.e. the latest insertion on ties
        let candidate = records
            .iter_mut()
            .filter(|r| r.vault_id == vault_id && r.nonce == nonce && r.is_claimable())
            .max_by_key(|r| r.committed_at);

        Ok(candidate.map(|record| {
            record.reveal_claimed_at = Some(now);
            record.clone()
        }))
    }

    async fn record_commit_tx(&self, id: Uuid, tx_hash: &str) -> Result<(), HeartbeatError> {
        self.update(id, |r| r.record_commit_tx(tx_hash.to_string()))
    }

    async fn mark_revealed(&self, id: Uuid, tx_hash: &str, at: UnixSeconds) -> Result<(), HeartbeatError> {
        self.update(id, |r| r.mark_revealed(tx_hash.to_string(), at))
    }

    async fn mark_failed(&self, id: Uuid) -> Result<(), HeartbeatError> {
        self.update(id, |r| r.mark_failed())
    }

    async fn latest(&self, vault_id: Uuid) -> Result<Option<HeartbeatCommitment>, HeartbeatError> {
        Ok(self.list(vault_id).await?.into_iter().next())
    }

    async fn list(&self, vault_id: Uuid) -> Result<Vec<HeartbeatCommitment>, HeartbeatError> {
        let mut matching: Vec<_> = self
            .records
            .lock()
            .iter()
            .filter(|r| r.vault_id == vault_id)
            .cloned()
            .collect();
        newest_first(&mut matching);
        Ok(matching)
    }
}

// =============================================================================
// VAULT DIRECTORY
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct VaultEntry {
    owner: Address,
    contract: Address,
}

/// Vault directory backed by a read-write locked map.
#[derive(Debug, Default)]
pub struct InMemoryVaultDirectory {
    vaults: RwLock<HashMap<Uuid, VaultEntry>>,
}

impl InMemoryVaultDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register vault `vault_id`, owned by `owner`, deployed at `contract`.
    pub fn register(&self, vault_id: Uuid, owner: Address, contract: Address) {
        self.vaults
            .write()
            .insert(vault_id, VaultEntry { owner, contract });
    }
}

#[async_trait]
impl VaultDirectory for InMemoryVaultDirectory {
    async fn resolve_vault(&self, vault_id: Uuid, owner: &Address) -> Result<Option<Address>, HeartbeatError> {
        Ok(self
            .vaults
            .read()
            .get(&vault_id)
            .filter(|entry| entry.owner == *owner)
            .map(|entry| entry.contract))
    }
}

// =============================================================================
// RECORDING CHAIN GATEWAY
// =============================================================================

/// A chain call observed by [`RecordingChainGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainCall {
    Commit { vault: Address, commitment: Hash },
    Reveal { vault: Address, nonce: [u8; 32] },
}

#[derive(Debug, Default)]
struct GatewayState {
    calls: Vec<ChainCall>,
    last_heartbeat: HashMap<Address, UnixSeconds>,
    commit_failure: Option<String>,
    reveal_failure: Option<String>,
    read_failure: Option<String>,
    latency: Option<Duration>,
}

/// Chain gateway that records calls and returns synthetic transaction hashes.
///
/// Failures and latency can be injected per call kind.
pub struct RecordingChainGateway {
    state: Mutex<GatewayState>,
    clock: Arc<dyn TimeSource>,
}

impl RecordingChainGateway {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemTimeSource))
    }

    pub fn with_clock(clock: Arc<dyn TimeSource>) -> Self {
        Self {
            state: Mutex::new(GatewayState::default()),
            clock,
        }
    }

    /// Make commits fail with `message` (or succeed again with `None`).
    pub fn fail_commits(&self, message: Option<&str>) {
        self.state.lock().commit_failure = message.map(str::to_string);
    }

    pub fn fail_reveals(&self, message: Option<&str>) {
        self.state.lock().reveal_failure = message.map(str::to_string);
    }

    pub fn fail_reads(&self, message: Option<&str>) {
        self.state.lock().read_failure = message.map(str::to_string);
    }

    /// Delay every write by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.state.lock().latency = latency;
    }

    pub fn calls(&self) -> Vec<ChainCall> {
        self.state.lock().calls.clone()
    }

    pub fn reveal_count(&self) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, ChainCall::Reveal { .. }))
            .count()
    }

    async fn submit(&self, call: ChainCall) -> Result<String, HeartbeatError> {
        let latency = self.state.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state.lock();
        let failure = match &call {
            ChainCall::Commit { .. } => state.commit_failure.clone(),
            ChainCall::Reveal { .. } => state.reveal_failure.clone(),
        };
        if let Some(message) = failure {
            return Err(HeartbeatError::Chain(message));
        }

        if let ChainCall::Reveal { vault, .. } = &call {
            state.last_heartbeat.insert(*vault, self.clock.now());
        }

        let tx_hash = to_prefixed_hex(&keccak256(
            format!("{}:{:?}", state.calls.len(), call).as_bytes(),
        ));
        state.calls.push(call);
        Ok(tx_hash)
    }
}

impl Default for RecordingChainGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RecordingChainGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingChainGateway")
            .field("calls", &self.state.lock().calls.len())
            .finish()
    }
}

#[async_trait]
impl ChainGateway for RecordingChainGateway {
    async fn commit_heartbeat(&self, vault: Address, commitment: Hash) -> Result<String, HeartbeatError> {
        self.submit(ChainCall::Commit { vault, commitment }).await
    }

    async fn reveal_heartbeat(&self, vault: Address, nonce: [u8; 32]) -> Result<String, HeartbeatError> {
        self.submit(ChainCall::Reveal { vault, nonce }).await
    }

    async fn last_heartbeat(&self, vault: Address) -> Result<UnixSeconds, HeartbeatError> {
        let state = self.state.lock();
        if let Some(message) = &state.read_failure {
            return Err(HeartbeatError::Chain(message.clone()));
        }
        Ok(state.last_heartbeat.get(&vault).copied().unwrap_or(0))
    }
}

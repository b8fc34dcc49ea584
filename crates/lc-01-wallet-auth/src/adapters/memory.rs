//! # In-Memory Adapters
//!
//! Process-local implementations of the outbound ports, used for
//! single-node deployments and tests.
//!
//! Expiry is driven by the injected [`TimeSource`]: expired nonces are
//! invisible to readers immediately and are reclaimed by [`InMemoryNonceStore::sweep_expired`],
//! which [`spawn_sweeper`] runs on an interval.

use crate::domain::entities::Identity;
use crate::domain::errors::StoreError;
use crate::ports::outbound::{IdentityRepository, NonceStore};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared_types::{Address, SystemTimeSource, TimeSource, UnixSeconds};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: UnixSeconds,
}

/// Nonce store backed by a mutex-guarded map.
pub struct InMemoryNonceStore {
    entries: Mutex<HashMap<String, Entry>>,
    clock: Arc<dyn TimeSource>,
}

impl InMemoryNonceStore {
    /// Store using the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemTimeSource))
    }

    pub fn with_clock(clock: Arc<dyn TimeSource>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Remove every expired entry, returning how many were dropped.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    /// Read a live entry without consuming it.
    pub fn peek(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        self.entries
            .lock()
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value.clone())
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryNonceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryNonceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryNonceStore")
            .field("entries", &self.len())
            .finish()
    }
}

#[async_trait]
impl NonceStore for InMemoryNonceStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let expires_at = self.clock.now().saturating_add(ttl_secs);
        self.entries.lock().insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn exists_and_delete(&self, key: &str) -> Result<bool, StoreError> {
        let now = self.clock.now();
        // Removal and the liveness check happen under one lock acquisition
        let removed = self.entries.lock().remove(key);
        Ok(matches!(removed, Some(entry) if entry.expires_at > now))
    }
}

/// Spawn a task that sweeps `store` every `interval` until `shutdown` flips to `true`.
pub fn spawn_sweeper(
    store: Arc<InMemoryNonceStore>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = store.sweep_expired();
                    if removed > 0 {
                        debug!(removed, remaining = store.len(), "Swept expired nonces");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Nonce sweeper stopped");
                        break;
                    }
                }
            }
        }
    })
}

/// Identity repository backed by a read-write locked map.
#[derive(Debug, Default)]
pub struct InMemoryIdentityRepository {
    identities: RwLock<HashMap<Address, Identity>>,
}

impl InMemoryIdentityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.identities.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl IdentityRepository for InMemoryIdentityRepository {
    async fn find(&self, address: &Address) -> Result<Option<Identity>, StoreError> {
        Ok(self.identities.read().get(address).cloned())
    }

    async fn upsert(&self, address: &Address, now: UnixSeconds) -> Result<Identity, StoreError> {
        let mut identities = self.identities.write();
        let identity = identities.entry(*address).or_insert_with(|| Identity {
            address: *address,
            created_at: now,
        });
        Ok(identity.clone())
    }
}

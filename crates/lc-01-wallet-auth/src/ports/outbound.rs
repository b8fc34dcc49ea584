//! # Outbound Ports (Driven Ports / SPI)
//!
//! Storage this subsystem depends on.

use crate::domain::entities::Identity;
use crate::domain::errors::StoreError;
use async_trait::async_trait;
use shared_types::{Address, UnixSeconds};
use std::time::Duration;

/// Ephemeral key/value store with per-key expiry.
///
/// Backs single-use nonces. Implementations must make
/// [`NonceStore::exists_and_delete`] a single atomic step: when several
/// callers race on one key, exactly one may observe `true`.
#[async_trait]
pub trait NonceStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous entry, expiring after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Delete `key` and report whether a live entry was present.
    ///
    /// Absent, expired and already-deleted keys all yield `Ok(false)`.
    async fn exists_and_delete(&self, key: &str) -> Result<bool, StoreError>;
}

/// Persistence for wallet identities.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    async fn find(&self, address: &Address) -> Result<Option<Identity>, StoreError>;

    /// Return the identity for `address`, creating it with `created_at = now`
    /// when absent. Existing identities are returned untouched.
    async fn upsert(&self, address: &Address, now: UnixSeconds) -> Result<Identity, StoreError>;
}

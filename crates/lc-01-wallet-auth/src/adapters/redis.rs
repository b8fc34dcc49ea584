//! # Redis Nonce Store
//!
//! Shared nonce store for multi-instance deployments. Entries are written with
//! `SET key value EX ttl`; consumption is a single `DEL` whose reply count
//! answers "was it there", so two instances can never both consume one nonce.

use crate::domain::errors::StoreError;
use crate::ports::outbound::NonceStore;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;

/// `EX` seconds for `ttl`: whole seconds, at least 1 (Redis rejects `EX 0`).
fn expiry_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Nonce store backed by a multiplexed Redis connection.
#[derive(Clone)]
pub struct RedisNonceStore {
    connection: MultiplexedConnection,
}

impl RedisNonceStore {
    /// Open a connection to `url` (e.g. `redis://127.0.0.1:6379`).
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let connection = client.get_multiplexed_async_connection().await?;
        Ok(Self { connection })
    }

    pub fn from_connection(connection: MultiplexedConnection) -> Self {
        Self { connection }
    }
}

impl std::fmt::Debug for RedisNonceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisNonceStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl NonceStore for RedisNonceStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut con = self.connection.clone();
        con.set_ex::<_, _, ()>(key, value, expiry_secs(ttl)).await?;
        Ok(())
    }

    async fn exists_and_delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut con = self.connection.clone();
        let deleted: i64 = con.del(key).await?;
        Ok(deleted > 0)
    }
}

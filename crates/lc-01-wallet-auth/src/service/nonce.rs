//! Single-use login nonces on top of a [`NonceStore`].

use crate::domain::errors::AuthError;
use crate::ports::outbound::NonceStore;
use shared_types::{TimeSource, UnixSeconds};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Default nonce lifetime: 5 minutes.
pub const NONCE_TTL: Duration = Duration::from_secs(5 * 60);

const NONCE_KEY_PREFIX: &str = "nonce:";

fn nonce_key(nonce: &str) -> String {
    format!("{NONCE_KEY_PREFIX}{nonce}")
}

/// Issues and consumes login nonces.
#[derive(Clone)]
pub struct NonceManager {
    store: Arc<dyn NonceStore>,
    clock: Arc<dyn TimeSource>,
    ttl: Duration,
}

impl NonceManager {
    pub fn new(store: Arc<dyn NonceStore>, clock: Arc<dyn TimeSource>) -> Self {
        Self::with_ttl(store, clock, NONCE_TTL)
    }

    pub fn with_ttl(store: Arc<dyn NonceStore>, clock: Arc<dyn TimeSource>, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    /// Generate a fresh nonce and record it with the configured TTL.
    ///
    /// Returns the token and its issuance time.
    pub async fn generate_nonce(&self) -> Result<(String, UnixSeconds), AuthError> {
        let nonce = Uuid::new_v4().to_string();
        let issued_at = self.clock.now();

        self.store
            .set(&nonce_key(&nonce), &issued_at.to_string(), self.ttl)
            .await?;

        debug!(ttl_secs = self.ttl.as_secs(), "Issued login nonce");
        Ok((nonce, issued_at))
    }

    /// Consume `nonce`. `Ok(true)` exactly once per issued nonce.
    ///
    /// Unknown, expired and already-used nonces are indistinguishable: all
    /// return `Ok(false)`.
    pub async fn validate_nonce(&self, nonce: &str) -> Result<bool, AuthError> {
        if nonce.is_empty() {
            return Ok(false);
        }
        Ok(self.store.exists_and_delete(&nonce_key(nonce)).await?)
    }
}

impl std::fmt::Debug for NonceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonceManager")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

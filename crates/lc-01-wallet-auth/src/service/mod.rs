//! # Wallet Authentication Service
//!
//! Application service implementing [`WalletAuthApi`].
//!
//! ## Login pipeline
//!
//! 1. Request shape (all fields present, parseable address)
//! 2. Timestamp freshness
//! 3. Nonce consumption (exactly once)
//! 4. Message equals the canonical challenge
//! 5. EIP-191 signature recovers the claimed address
//! 6. Identity upsert and credential issuance
//!
//! The nonce is consumed before the signature is checked, so a rejected
//! attempt still burns its nonce and the caller must request a new one.

pub mod nonce;
pub mod session;

pub use nonce::{NonceManager, NONCE_TTL};
pub use session::SessionIssuer;

use crate::domain::eip191::SignatureVerifier;
use crate::domain::entities::{
    format_login_message, login_message_matches, Identity, LoginRequest, LoginResponse,
    NonceIssuance,
};
use crate::domain::errors::AuthError;
use crate::domain::session::{CredentialCodec, SessionClaims, DEFAULT_SESSION_TTL_SECS};
use crate::domain::timestamp::{TimestampGuard, MAX_CLOCK_SKEW_SECS, SIGNATURE_MAX_AGE_SECS};
use crate::ports::inbound::WalletAuthApi;
use crate::ports::outbound::{IdentityRepository, NonceStore};
use async_trait::async_trait;
use shared_types::{Address, SystemTimeSource, TimeSource};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use zeroize::Zeroizing;

/// Tunables for [`WalletAuthService`].
#[derive(Clone)]
pub struct AuthSettings {
    /// HMAC secret for session credentials
    pub jwt_secret: Zeroizing<Vec<u8>>,
    pub session_ttl_secs: i64,
    pub nonce_ttl: Duration,
    pub signature_max_age_secs: i64,
    pub clock_skew_secs: i64,
}

impl AuthSettings {
    /// Settings with default lifetimes and the given secret.
    pub fn new(jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            jwt_secret: Zeroizing::new(jwt_secret.into()),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            nonce_ttl: NONCE_TTL,
            signature_max_age_secs: SIGNATURE_MAX_AGE_SECS,
            clock_skew_secs: MAX_CLOCK_SKEW_SECS,
        }
    }
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &"[REDACTED]")
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("nonce_ttl", &self.nonce_ttl)
            .field("signature_max_age_secs", &self.signature_max_age_secs)
            .field("clock_skew_secs", &self.clock_skew_secs)
            .finish()
    }
}

/// Wallet Authentication Service.
///
/// Cheap to clone; all state lives behind the injected ports.
#[derive(Clone, Debug)]
pub struct WalletAuthService {
    nonces: NonceManager,
    timestamps: TimestampGuard,
    verifier: SignatureVerifier,
    sessions: SessionIssuer,
}

impl WalletAuthService {
    /// Wire the service with the system clock.
    pub fn new(
        nonce_store: Arc<dyn NonceStore>,
        identities: Arc<dyn IdentityRepository>,
        settings: &AuthSettings,
    ) -> Self {
        Self::with_clock(nonce_store, identities, settings, Arc::new(SystemTimeSource))
    }

    pub fn with_clock(
        nonce_store: Arc<dyn NonceStore>,
        identities: Arc<dyn IdentityRepository>,
        settings: &AuthSettings,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            nonces: NonceManager::with_ttl(nonce_store, clock.clone(), settings.nonce_ttl),
            timestamps: TimestampGuard::with_window(
                clock.clone(),
                settings.signature_max_age_secs,
                settings.clock_skew_secs,
            ),
            verifier: SignatureVerifier::new(),
            sessions: SessionIssuer::new(
                identities,
                CredentialCodec::new(&settings.jwt_secret),
                clock,
                settings.session_ttl_secs,
            ),
        }
    }

    async fn authenticate(&self, request: &LoginRequest) -> Result<Address, AuthError> {
        let address = request.validate()?;

        self.timestamps.validate_timestamp(request.timestamp)?;

        if !self.nonces.validate_nonce(&request.nonce).await? {
            return Err(AuthError::Replay);
        }

        if !login_message_matches(&request.message, &request.nonce, request.timestamp) {
            return Err(AuthError::MessageMismatch);
        }

        if !self
            .verifier
            .verify_signature(&address, &request.message, &request.signature)?
        {
            return Err(AuthError::AddressMismatch);
        }

        Ok(address)
    }
}

#[async_trait]
impl WalletAuthApi for WalletAuthService {
    async fn request_nonce(&self) -> Result<NonceIssuance, AuthError> {
        let (nonce, timestamp) = self.nonces.generate_nonce().await?;
        let message = format_login_message(&nonce, timestamp);
        Ok(NonceIssuance {
            nonce,
            message,
            timestamp,
        })
    }

    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        let address = match self.authenticate(&request).await {
            Ok(address) => address,
            Err(e) => {
                warn!(address = %request.address, error = %e, "Login rejected");
                return Err(e);
            }
        };

        let response = self.sessions.issue(&address).await?;
        info!(address = %address, "Login succeeded");
        Ok(response)
    }

    async fn current_identity(&self, address: &Address) -> Result<Identity, AuthError> {
        self.sessions
            .identities()
            .find(address)
            .await?
            .ok_or(AuthError::IdentityNotFound)
    }

    fn authenticate_bearer(&self, header: &str) -> Result<SessionClaims, AuthError> {
        self.sessions.authenticate_bearer(header)
    }
}

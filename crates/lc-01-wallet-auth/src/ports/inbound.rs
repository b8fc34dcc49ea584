//! # Inbound Ports (Driving Ports / API)
//!
//! The public API of the wallet authentication subsystem.

use crate::domain::entities::{Identity, LoginRequest, LoginResponse, NonceIssuance};
use crate::domain::errors::AuthError;
use crate::domain::session::SessionClaims;
use async_trait::async_trait;
use shared_types::Address;

/// Wallet authentication API.
///
/// Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait WalletAuthApi: Send + Sync {
    /// Issue a single-use nonce and the challenge message to sign.
    async fn request_nonce(&self) -> Result<NonceIssuance, AuthError>;

    /// Verify a signed challenge and mint a session credential.
    ///
    /// # Errors
    /// Every rejection renders as "unauthorized" through
    /// [`AuthError::public_message`]; store failures render as internal errors.
    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError>;

    /// Look up the identity registered for `address`.
    async fn current_identity(&self, address: &Address) -> Result<Identity, AuthError>;

    /// Verify an `Authorization` header value and return its claims.
    fn authenticate_bearer(&self, header: &str) -> Result<SessionClaims, AuthError>;
}

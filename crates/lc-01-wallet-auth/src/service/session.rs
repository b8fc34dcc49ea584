//! Session issuance: identity upsert followed by credential minting.

use crate::domain::entities::LoginResponse;
use crate::domain::errors::AuthError;
use crate::domain::session::{parse_bearer, CredentialCodec, SessionClaims};
use crate::ports::outbound::IdentityRepository;
use shared_types::{Address, TimeSource};
use std::sync::Arc;
use tracing::info;

/// Mints and verifies session credentials.
#[derive(Clone)]
pub struct SessionIssuer {
    identities: Arc<dyn IdentityRepository>,
    codec: CredentialCodec,
    clock: Arc<dyn TimeSource>,
    ttl_secs: i64,
}

impl SessionIssuer {
    pub fn new(
        identities: Arc<dyn IdentityRepository>,
        codec: CredentialCodec,
        clock: Arc<dyn TimeSource>,
        ttl_secs: i64,
    ) -> Self {
        Self {
            identities,
            codec,
            clock,
            ttl_secs,
        }
    }

    /// Ensure an identity exists for `address` and mint a credential for it.
    pub async fn issue(&self, address: &Address) -> Result<LoginResponse, AuthError> {
        let now = self.clock.now();
        let identity = self.identities.upsert(address, now).await?;

        let claims = SessionClaims::new(*address, now, self.ttl_secs);
        let token = self.codec.encode(&claims)?;

        info!(address = %address, expires_at = claims.expires_at, "Session issued");
        Ok(LoginResponse {
            token,
            identity,
            expires_at: claims.expires_at,
        })
    }

    /// Verify a raw token.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        self.codec.decode(token, self.clock.now())
    }

    /// Verify an `Authorization: Bearer <token>` header value.
    pub fn authenticate_bearer(&self, header: &str) -> Result<SessionClaims, AuthError> {
        self.verify(parse_bearer(header)?)
    }

    pub fn identities(&self) -> &Arc<dyn IdentityRepository> {
        &self.identities
    }
}

impl std::fmt::Debug for SessionIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionIssuer")
            .field("codec", &self.codec)
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryIdentityRepository;
    use shared_types::ManualTimeSource;

    const SECRET: &[u8] = b"test-secret-test-secret-test-sec";
    const NOW: i64 = 1_700_000_000;

    fn issuer() -> (Arc<ManualTimeSource>, Arc<InMemoryIdentityRepository>, SessionIssuer) {
        let clock = Arc::new(ManualTimeSource::new(NOW));
        let identities = Arc::new(InMemoryIdentityRepository::new());
        let issuer = SessionIssuer::new(
            identities.clone(),
            CredentialCodec::new(SECRET),
            clock.clone(),
            3_600,
        );
        (clock, identities, issuer)
    }

    #[tokio::test]
    async fn test_issue_upserts_identity_once() {
        let (clock, identities, issuer) = issuer();
        let address = Address::from_bytes([1u8; 20]);

        let first = issuer.issue(&address).await.unwrap();
        clock.advance(10);
        let second = issuer.issue(&address).await.unwrap();

        assert_eq!(first.identity, second.identity);
        assert_eq!(second.identity.created_at, NOW);
        assert_eq!(identities.len(), 1);

        let claims = issuer.verify(&second.token).unwrap();
        assert_eq!(claims.issued_at, NOW + 10);
        assert_eq!(claims.expires_at, NOW + 10 + 3_600);
        assert_eq!(second.expires_at, claims.expires_at);
    }

    #[tokio::test]
    async fn test_bearer_roundtrip_and_expiry() {
        let (clock, _, issuer) = issuer();
        let address = Address::from_bytes([2u8; 20]);
        let token = issuer.issue(&address).await.unwrap().token;

        let claims = issuer
            .authenticate_bearer(&format!("Bearer {token}"))
            .unwrap();
        assert_eq!(claims.address, address);

        clock.advance(3_600);
        assert!(matches!(
            issuer.verify(&token),
            Err(AuthError::InvalidCredential(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_header_rejected() {
        let (_, _, issuer) = issuer();
        assert!(matches!(
            issuer.authenticate_bearer("Basic Zm9vOmJhcg=="),
            Err(AuthError::InvalidCredential(_))
        ));
        assert!(matches!(
            issuer.authenticate_bearer("Bearer not-a-jwt"),
            Err(AuthError::InvalidCredential(_))
        ));
    }
}

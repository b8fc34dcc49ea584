//! # Session Credentials
//!
//! HS256 JWTs with a fixed claim set:
//!
//! ```json
//! {"address": "0x…", "iat": 1700000000, "exp": 1700086400}
//! ```
//!
//! Decoding rejects tokens with missing or additional claims, tokens signed
//! with another secret or algorithm, and tokens at or past `exp`.

use super::errors::AuthError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared_types::{Address, UnixSeconds};

/// Default session lifetime: 24 hours.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 24 * 60 * 60;

/// Claims carried by a session credential.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionClaims {
    pub address: Address,
    #[serde(rename = "iat")]
    pub issued_at: UnixSeconds,
    #[serde(rename = "exp")]
    pub expires_at: UnixSeconds,
}

impl SessionClaims {
    pub fn new(address: Address, issued_at: UnixSeconds, ttl_secs: i64) -> Self {
        Self {
            address,
            issued_at,
            expires_at: issued_at.saturating_add(ttl_secs),
        }
    }
}

/// Signs and verifies session credentials with a shared HMAC secret.
#[derive(Clone)]
pub struct CredentialCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl CredentialCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the injected clock in `decode`
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign `claims` into a compact JWT.
    pub fn encode(&self, claims: &SessionClaims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::Issuance(e.to_string()))
    }

    /// Verify `token` and return its claims if still valid at `now`.
    pub fn decode(&self, token: &str, now: UnixSeconds) -> Result<SessionClaims, AuthError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::InvalidCredential(e.to_string()))?;
        let claims = data.claims;

        if claims.issued_at > claims.expires_at {
            return Err(AuthError::InvalidCredential("issued after expiry".into()));
        }
        if now >= claims.expires_at {
            return Err(AuthError::InvalidCredential("token expired".into()));
        }

        Ok(claims)
    }
}

impl std::fmt::Debug for CredentialCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCodec")
            .field("algorithm", &"HS256")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Extract the token from an `Authorization` header value.
///
/// The value must be exactly `Bearer <token>`.
pub fn parse_bearer(header: &str) -> Result<&str, AuthError> {
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::InvalidCredential(
            "invalid authorization header format".into(),
        )),
    }
}

//! # Domain Entities
//!
//! Request/response shapes for the login challenge and the identity record
//! created on first login.

use super::errors::AuthError;
use serde::{Deserialize, Serialize};
use shared_types::{Address, UnixSeconds};

/// First line of every login challenge.
pub const LOGIN_MESSAGE_HEADER: &str = "Login to LegacyChain";

/// Build the canonical challenge a wallet is asked to sign.
///
/// ```text
/// Login to LegacyChain
/// Nonce: <nonce>
/// Timestamp: <unix seconds>
/// ```
pub fn format_login_message(nonce: &str, timestamp: UnixSeconds) -> String {
    format!("{LOGIN_MESSAGE_HEADER}\nNonce: {nonce}\nTimestamp: {timestamp}")
}

/// Compare a caller-supplied message to the canonical challenge.
///
/// Surrounding whitespace is ignored on both sides; everything else must match.
pub fn login_message_matches(supplied: &str, nonce: &str, timestamp: UnixSeconds) -> bool {
    supplied.trim() == format_login_message(nonce, timestamp).trim()
}

/// Response to a nonce request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceIssuance {
    pub nonce: String,
    pub message: String,
    pub timestamp: UnixSeconds,
}

/// A signed login attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Claimed wallet address (any case, optional `0x`)
    pub address: String,
    /// `0x`-prefixed 65-byte personal-sign signature
    pub signature: String,
    /// The challenge message the wallet signed
    pub message: String,
    /// Nonce from the challenge
    pub nonce: String,
    /// Timestamp from the challenge
    pub timestamp: UnixSeconds,
}

impl LoginRequest {
    /// Check that every field is present and parse the claimed address.
    pub fn validate(&self) -> Result<Address, AuthError> {
        if self.address.trim().is_empty() {
            return Err(AuthError::Validation("address is required".into()));
        }
        if self.signature.trim().is_empty() {
            return Err(AuthError::Validation("signature is required".into()));
        }
        if self.message.trim().is_empty() {
            return Err(AuthError::Validation("message is required".into()));
        }
        if self.nonce.trim().is_empty() {
            return Err(AuthError::Validation("nonce is required".into()));
        }
        if self.timestamp <= 0 {
            return Err(AuthError::Validation("timestamp is required".into()));
        }

        self.address
            .parse()
            .map_err(|e| AuthError::Validation(format!("invalid address: {e}")))
    }
}

/// A wallet owner known to the system.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub address: Address,
    pub created_at: UnixSeconds,
}

/// Successful login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer credential
    pub token: String,
    pub identity: Identity,
    pub expires_at: UnixSeconds,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> LoginRequest {
        LoginRequest {
            address: "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".into(),
            signature: format!("0x{}", "00".repeat(65)),
            message: format_login_message("n", 1_700_000_000),
            nonce: "n".into(),
            timestamp: 1_700_000_000,
        }
    }

    #[test]
    fn test_login_message_template() {
        assert_eq!(
            format_login_message("abc", 1_700_000_000),
            "Login to LegacyChain\nNonce: abc\nTimestamp: 1700000000"
        );
    }

    #[test]
    fn test_message_match_ignores_surrounding_whitespace() {
        let msg = format!("  {}\n\n", format_login_message("abc", 42));
        assert!(login_message_matches(&msg, "abc", 42));
        assert!(!login_message_matches(&msg, "abc", 43));
        assert!(!login_message_matches(
            "Login to LegacyChain\nNonce:  abc\nTimestamp: 42",
            "abc",
            42
        ));
    }

    #[test]
    fn test_validate_parses_address() {
        let address = request().validate().unwrap();
        assert_eq!(
            address.to_checksum(),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        let mut missing_sig = request();
        missing_sig.signature.clear();
        assert!(matches!(
            missing_sig.validate(),
            Err(AuthError::Validation(_))
        ));

        let mut missing_ts = request();
        missing_ts.timestamp = 0;
        assert!(matches!(missing_ts.validate(), Err(AuthError::Validation(_))));

        let mut bad_address = request();
        bad_address.address = "0x1234".into();
        assert!(matches!(
            bad_address.validate(),
            Err(AuthError::Validation(_))
        ));
    }

    #[test]
    fn test_nonce_issuance_json_shape() {
        let issuance = NonceIssuance {
            nonce: "n".into(),
            message: "m".into(),
            timestamp: 7,
        };
        let json = serde_json::to_value(&issuance).unwrap();
        assert_eq!(json, serde_json::json!({"nonce": "n", "message": "m", "timestamp": 7}));
    }
}

//! # EIP-191 Personal-Sign Verification (secp256k1)
//!
//! Pure domain logic for verifying wallet signatures produced by
//! `personal_sign` (MetaMask, WalletConnect, ethers, ...).
//!
//! ## Pipeline
//!
//! 1. Preimage: `"\x19Ethereum Signed Message:\n" || len(message) || message`
//! 2. Digest: keccak-256 of the preimage
//! 3. Signature: `0x`-prefixed hex, exactly 65 bytes `r || s || v`
//! 4. Recovery byte: `v` in {27, 28} is normalized to {0, 1}
//! 5. Public key recovery, then `address = keccak256(pubkey)[12..]`
//!
//! High-S signatures are folded to their low-S twin before recovery, so any
//! signature go-ethereum's `SigToPub` accepts is accepted here too.

use super::errors::AuthError;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use shared_types::{from_prefixed_hex, keccak256, to_prefixed_hex, Address, Hash};
use zeroize::Zeroizing;

/// Prefix mandated by EIP-191 version `0x45` (personal message).
pub const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Wire length of a recoverable signature: r (32) || s (32) || v (1).
pub const SIGNATURE_LEN: usize = 65;

/// Offset wallets add to the recovery id.
const LEGACY_V_OFFSET: u8 = 27;

// =============================================================================
// MESSAGE HASHING
// =============================================================================

/// Build the EIP-191 personal-sign preimage for `message`.
///
/// The length is the decimal byte length of the message, in ASCII digits
/// without padding.
pub fn personal_message_preimage(message: &[u8]) -> Vec<u8> {
    let length = message.len().to_string();
    let mut preimage =
        Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + length.len() + message.len());
    preimage.extend_from_slice(PERSONAL_MESSAGE_PREFIX.as_bytes());
    preimage.extend_from_slice(length.as_bytes());
    preimage.extend_from_slice(message);
    preimage
}

/// Keccak-256 digest of the personal-sign preimage.
pub fn hash_personal_message(message: &[u8]) -> Hash {
    keccak256(&personal_message_preimage(message))
}

/// The digest a wallet will sign for `message`, as `0x`-hex.
pub fn hash_message(message: &str) -> String {
    to_prefixed_hex(&hash_personal_message(message.as_bytes()))
}

// =============================================================================
// SIGNATURE WIRE FORMAT
// =============================================================================

/// A recoverable secp256k1 signature in personal-sign wire form.
///
/// The recovery id is always 0 or 1 once constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersonalSignature {
    r: [u8; 32],
    s: [u8; 32],
    recovery_id: u8,
}

impl PersonalSignature {
    /// Build from components. `recovery_id` must already be normalized to 0 or 1.
    pub fn new(r: [u8; 32], s: [u8; 32], recovery_id: u8) -> Result<Self, AuthError> {
        if recovery_id > 1 {
            return Err(AuthError::Format(format!("invalid recovery id: {recovery_id}")));
        }
        Ok(Self { r, s, recovery_id })
    }

    /// R component.
    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    /// S component.
    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// Recovery id (0 or 1).
    pub fn recovery_id(&self) -> u8 {
        self.recovery_id
    }

    /// Decode a `0x`-prefixed hex signature.
    pub fn from_hex(signature: &str) -> Result<Self, AuthError> {
        let bytes = from_prefixed_hex(signature.trim())
            .map_err(|e| AuthError::Format(format!("failed to decode signature: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Parse the raw 65-byte form, normalizing the recovery byte.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AuthError> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(AuthError::Format(format!(
                "invalid signature length: got {} bytes, expected {}",
                bytes.len(),
                SIGNATURE_LEN
            )));
        }

        let mut v = bytes[64];
        if v >= LEGACY_V_OFFSET {
            v -= LEGACY_V_OFFSET;
        }
        if v > 1 {
            return Err(AuthError::Format(format!("invalid recovery id: {}", bytes[64])));
        }

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);

        Self::new(r, s, v)
    }

    /// Raw wire bytes with `v` in the 27/28 convention wallets emit.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        let mut out = [0u8; SIGNATURE_LEN];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.recovery_id + LEGACY_V_OFFSET;
        out
    }

    /// `0x`-prefixed hex of [`Self::to_bytes`].
    pub fn to_hex(&self) -> String {
        to_prefixed_hex(&self.to_bytes())
    }
}

// =============================================================================
// SIGNATURE VERIFIER
// =============================================================================

/// Stateless EIP-191 signature verifier. Safe to share across tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureVerifier;

impl SignatureVerifier {
    /// Create a new verifier.
    pub fn new() -> Self {
        Self
    }

    /// Check that `signature` over `message` was produced by `address`.
    ///
    /// Returns `Ok(false)` (not an error) when the signature is well formed
    /// but recovers a different signer.
    pub fn verify_signature(
        &self,
        address: &Address,
        message: &str,
        signature: &str,
    ) -> Result<bool, AuthError> {
        verify_signature(address, message, signature)
    }

    /// Recover the signer of `message` without a claimed address.
    pub fn recover_address(&self, message: &str, signature: &str) -> Result<Address, AuthError> {
        recover_address(message, signature)
    }
}

/// See [`SignatureVerifier::verify_signature`].
pub fn verify_signature(
    address: &Address,
    message: &str,
    signature: &str,
) -> Result<bool, AuthError> {
    let recovered = recover_address(message, signature)?;
    Ok(recovered == *address)
}

/// See [`SignatureVerifier::recover_address`].
pub fn recover_address(message: &str, signature: &str) -> Result<Address, AuthError> {
    let digest = hash_personal_message(message.as_bytes());
    let signature = PersonalSignature::from_hex(signature)?;
    recover_from_prehash(&digest, &signature)
}

/// Recover the signing address from a 32-byte digest.
pub fn recover_from_prehash(
    digest: &Hash,
    signature: &PersonalSignature,
) -> Result<Address, AuthError> {
    let mut rs = [0u8; 64];
    rs[..32].copy_from_slice(&signature.r);
    rs[32..].copy_from_slice(&signature.s);

    let mut sig =
        Signature::from_slice(&rs).map_err(|e| AuthError::Crypto(format!("invalid r/s: {e}")))?;
    let mut recovery_id = RecoveryId::try_from(signature.recovery_id)
        .map_err(|_| AuthError::Format(format!("invalid recovery id: {}", signature.recovery_id)))?;

    // s' = n - s negates R's y coordinate, so the parity bit flips with it
    if let Some(low_s) = sig.normalize_s() {
        sig = low_s;
        recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
    }

    let key = VerifyingKey::recover_from_prehash(digest, &sig, recovery_id)
        .map_err(|e| AuthError::Crypto(e.to_string()))?;

    Ok(address_from_verifying_key(&key))
}

/// Derive the Ethereum address of a secp256k1 public key.
pub fn address_from_verifying_key(key: &VerifyingKey) -> Address {
    let encoded = key.to_encoded_point(false);
    // Skip the 0x04 SEC1 tag
    let hash = keccak256(&encoded.as_bytes()[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    Address::from_bytes(address)
}

// =============================================================================
// WALLET KEY
// =============================================================================

/// A secp256k1 wallet key able to produce personal-sign signatures.
///
/// Used by tooling and tests to stand in for a browser wallet.
pub struct WalletKey {
    signing_key: SigningKey,
}

impl WalletKey {
    /// Generate a random key.
    pub fn random() -> Self {
        Self {
            signing_key: SigningKey::random(&mut rand::thread_rng()),
        }
    }

    /// Load a key from 32 secret bytes.
    pub fn from_bytes(secret: &[u8]) -> Result<Self, AuthError> {
        let signing_key =
            SigningKey::from_slice(secret).map_err(|_| AuthError::Validation("invalid private key".into()))?;
        Ok(Self { signing_key })
    }

    /// Load a key from hex, with or without `0x`.
    pub fn from_hex(secret: &str) -> Result<Self, AuthError> {
        let digits = secret.trim().trim_start_matches("0x");
        let bytes = Zeroizing::new(
            hex::decode(digits).map_err(|_| AuthError::Validation("invalid private key hex".into()))?,
        );
        Self::from_bytes(&bytes)
    }

    /// Address controlled by this key.
    pub fn address(&self) -> Address {
        address_from_verifying_key(self.signing_key.verifying_key())
    }

    /// Sign `message` the way `personal_sign` does.
    pub fn sign_personal(&self, message: &str) -> Result<PersonalSignature, AuthError> {
        let digest = hash_personal_message(message.as_bytes());
        let (sig, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| AuthError::Crypto(e.to_string()))?;

        let bytes = sig.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);

        PersonalSignature::new(r, s, recovery_id.to_byte())
    }
}

impl std::fmt::Debug for WalletKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletKey")
            .field("address", &self.address())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================

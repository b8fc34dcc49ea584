//! Fuzz target for EIP-191 signature parsing and recovery.
//!
//! ## Running
//!
//! ```bash
//! cd crates/lc-01-wallet-auth
//! cargo +nightly fuzz run fuzz_personal_sign
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use lc_01_wallet_auth::{Address, PersonalSignature, SignatureVerifier};

/// Fuzz input for personal-sign verification.
#[derive(Debug, arbitrary::Arbitrary)]
struct FuzzInput {
    /// Message the wallet supposedly signed
    message: String,
    /// Raw signature bytes (any length)
    signature: Vec<u8>,
    /// Claimed signer
    address: [u8; 20],
}

fuzz_target!(|input: FuzzInput| {
    let verifier = SignatureVerifier::new();
    let address = Address::from(input.address);
    let signature_hex = format!("0x{}", hex::encode(&input.signature));

    // Must never panic, regardless of input
    let result = verifier.verify_signature(&address, &input.message, &signature_hex);

    // Deterministic
    let again = verifier.verify_signature(&address, &input.message, &signature_hex);
    assert_eq!(result, again);

    // Anything but 65 bytes is a format error
    if input.signature.len() != 65 {
        assert!(result.is_err());
    }

    // A parsed signature re-encodes to the same r and s
    if let Ok(parsed) = PersonalSignature::from_bytes(&input.signature) {
        assert_eq!(&parsed.to_bytes()[..64], &input.signature[..64]);
    }
});

//! # Wallet Authentication Subsystem (LC-01)
//!
//! Password-less login for vault owners: the server hands out a single-use
//! nonce, the wallet signs a challenge containing it with `personal_sign`,
//! and a verified signature is exchanged for a time-boxed session credential.
//!
//! ## Architecture
//!
//! This subsystem follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): EIP-191 hashing and recovery, freshness window, claims
//! - **Ports Layer** (`ports/`): `WalletAuthApi` inbound; `NonceStore`, `IdentityRepository` outbound
//! - **Adapters Layer** (`adapters/`): in-memory and Redis stores
//! - **Service Layer** (`service/`): wires domain logic to ports
//!
//! ## Security Notes
//!
//! - **Single use**: a nonce is consumed by one atomic check-and-delete
//! - **Freshness**: challenges older than 300s or more than 60s ahead are rejected
//! - **Opaque failures**: every rejection renders publicly as "unauthorized"

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::memory::{spawn_sweeper, InMemoryIdentityRepository, InMemoryNonceStore};
pub use adapters::redis::RedisNonceStore;
pub use domain::eip191::{
    hash_message, hash_personal_message, recover_address, verify_signature, PersonalSignature,
    SignatureVerifier, WalletKey,
};
pub use domain::entities::{
    format_login_message, Identity, LoginRequest, LoginResponse, NonceIssuance,
};
pub use domain::errors::{AuthError, StoreError};
pub use domain::session::{parse_bearer, CredentialCodec, SessionClaims};
pub use domain::timestamp::TimestampGuard;
pub use ports::inbound::WalletAuthApi;
pub use ports::outbound::{IdentityRepository, NonceStore};
pub use service::{AuthSettings, NonceManager, SessionIssuer, WalletAuthService};
pub use shared_types::Address;

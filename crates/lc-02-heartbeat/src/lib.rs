//! # Liveness Heartbeat Subsystem (LC-02)
//!
//! Vault owners prove they are alive with a two-phase commit-reveal round
//! against their vault contract:
//!
//! 1. **Commit**: `keccak256(owner || nonce)` is sent on-chain; the nonce stays secret
//! 2. **Reveal**: the nonce is sent, packed into `bytes32`; the contract
//!    recomputes the hash and records the heartbeat
//!
//! Every round is kept as a [`HeartbeatCommitment`] audit record whose state
//! moves `Committed → Revealed` or `Committed → Failed`, never back.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): preimage construction, state machine, deadlines
//! - **Ports Layer** (`ports/`): `HeartbeatApi` inbound; chain, vault directory and repository outbound
//! - **Adapters Layer** (`adapters/`): in-memory implementations
//! - **Service Layer** (`service.rs`): orchestration

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::memory::{
    ChainCall, InMemoryCommitmentRepository, InMemoryVaultDirectory, RecordingChainGateway,
};
pub use domain::commit_reveal::{
    build_reveal_preimage, compute_commit_hash, nonce_to_bytes, reveal_matches_commit,
};
pub use domain::context::CallContext;
pub use domain::entities::{
    CommitReceipt, HeartbeatCommitment, HeartbeatStatus, HeartbeatStatusReport, RevealReceipt,
};
pub use domain::errors::HeartbeatError;
pub use ports::inbound::HeartbeatApi;
pub use ports::outbound::{ChainGateway, CommitmentRepository, VaultDirectory};
pub use service::HeartbeatService;

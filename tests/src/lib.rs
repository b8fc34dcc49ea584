//! # LegacyChain Test Suite
//!
//! Cross-subsystem flows wired through the node runtime container.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── login_flow.rs       # nonce -> signed login -> bearer session
//!     └── heartbeat_flow.rs   # authenticated owner -> commit -> reveal -> status
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lc-tests
//! cargo test -p lc-tests integration::heartbeat_flow
//! ```

pub mod integration;

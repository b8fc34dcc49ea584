//! # Shared Types Crate
//!
//! Primitive types shared by the LegacyChain subsystems:
//!
//! - **Entities**: `Address`, `Hash`, `UnixSeconds`, hex helpers
//! - **Hashing**: keccak-256 as used by Ethereum tooling
//! - **Time**: the `TimeSource` port and its system/manual implementations
//!
//! Nothing here performs I/O; every subsystem can depend on it freely.

pub mod entities;
pub mod errors;
pub mod hashing;
pub mod time;

pub use entities::*;
pub use errors::*;
pub use hashing::*;
pub use time::*;

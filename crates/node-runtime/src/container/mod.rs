//! # Subsystem Container
//!
//! Configuration and dependency wiring for the wallet authentication
//! (lc-01) and heartbeat (lc-02) subsystems.

pub mod config;
pub mod subsystems;

pub use config::{AuthConfig, ConfigError, HeartbeatConfig, NodeConfig, NonceStoreConfig};
pub use subsystems::{NonceBackend, SubsystemContainer};

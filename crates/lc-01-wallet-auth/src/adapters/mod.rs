//! # Adapters Module
//!
//! Infrastructure adapters implementing the outbound ports.

pub mod memory;
pub mod redis;

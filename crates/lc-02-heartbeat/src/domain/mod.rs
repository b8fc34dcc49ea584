//! # Domain Layer
//!
//! Commit-reveal hashing and the commitment state machine. No I/O.

pub mod commit_reveal;
pub mod context;
pub mod entities;
pub mod errors;

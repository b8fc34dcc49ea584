//! # Domain Layer
//!
//! Pure authentication logic with no I/O dependencies.
//! This is the inner layer of the hexagonal architecture.

pub mod eip191;
pub mod entities;
pub mod errors;
pub mod session;
pub mod timestamp;

//! # Signature Freshness Window
//!
//! A signed login message carries the timestamp it was issued with. The
//! signature is only accepted while
//!
//! ```text
//! now - MAX_AGE <= timestamp <= now + MAX_CLOCK_SKEW
//! ```
//!
//! Both bounds are inclusive.

use super::errors::AuthError;
use shared_types::{TimeSource, UnixSeconds};
use std::sync::Arc;

/// Maximum age of a signature timestamp (seconds).
pub const SIGNATURE_MAX_AGE_SECS: i64 = 300;

/// Maximum allowed clock skew for future timestamps (seconds).
pub const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Check `timestamp` against `now` using the given window.
pub fn check_timestamp(
    timestamp: UnixSeconds,
    now: UnixSeconds,
    max_age: i64,
    max_skew: i64,
) -> Result<(), AuthError> {
    let age = now.saturating_sub(timestamp);

    if age > max_age {
        return Err(AuthError::Expired { age, max_age });
    }

    if age < -max_skew {
        return Err(AuthError::Future { ahead: age.saturating_neg() });
    }

    Ok(())
}

/// Validates signature timestamps against an injected clock.
#[derive(Clone)]
pub struct TimestampGuard {
    clock: Arc<dyn TimeSource>,
    max_age: i64,
    max_skew: i64,
}

impl TimestampGuard {
    /// Guard with the default window (300s age, 60s skew).
    pub fn new(clock: Arc<dyn TimeSource>) -> Self {
        Self::with_window(clock, SIGNATURE_MAX_AGE_SECS, MAX_CLOCK_SKEW_SECS)
    }

    /// Guard with a custom window.
    pub fn with_window(clock: Arc<dyn TimeSource>, max_age: i64, max_skew: i64) -> Self {
        Self {
            clock,
            max_age,
            max_skew,
        }
    }

    /// Validate `timestamp` against the guard's clock.
    pub fn validate_timestamp(&self, timestamp: UnixSeconds) -> Result<(), AuthError> {
        check_timestamp(timestamp, self.clock.now(), self.max_age, self.max_skew)
    }
}

impl std::fmt::Debug for TimestampGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimestampGuard")
            .field("max_age", &self.max_age)
            .field("max_skew", &self.max_skew)
            .finish()
    }
}

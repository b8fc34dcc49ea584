//! Caller deadlines for chain-facing operations.

use super::errors::HeartbeatError;
use std::future::Future;
use std::time::{Duration, Instant};

/// Per-call context carrying an optional deadline.
#[derive(Clone, Copy, Debug, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
}

impl CallContext {
    /// No deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Deadline `timeout` from now. A timeout too large to represent means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(timeout),
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Fail with [`HeartbeatError::Cancelled`] if the deadline has passed.
    pub fn check(&self) -> Result<(), HeartbeatError> {
        if self.is_expired() {
            Err(HeartbeatError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Run `fut`, failing with `Cancelled` if the deadline passes first.
    ///
    /// `fut` is dropped at the deadline; work it already handed off
    /// elsewhere is not recalled.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, HeartbeatError>
    where
        F: Future<Output = Result<T, HeartbeatError>>,
    {
        match self.deadline {
            None => fut.await,
            Some(deadline) => {
                tokio::time::timeout_at(deadline.into(), fut)
                    .await
                    .map_err(|_| HeartbeatError::Cancelled)?
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_never_expires() {
        assert!(CallContext::background().check().is_ok());
    }

    #[test]
    fn test_past_deadline_is_cancelled() {
        let ctx = CallContext::with_timeout(Duration::ZERO);
        assert_eq!(ctx.check(), Err(HeartbeatError::Cancelled));
    }

    #[test]
    fn test_unrepresentable_timeout_has_no_deadline() {
        let ctx = CallContext::with_timeout(Duration::from_secs(u64::MAX));
        assert_eq!(ctx.deadline(), None);
        assert!(ctx.check().is_ok());
    }

    #[tokio::test]
    async fn test_run_times_out() {
        let ctx = CallContext::with_timeout(Duration::from_millis(10));
        let result: Result<(), _> = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;
        assert_eq!(result, Err(HeartbeatError::Cancelled));
    }

    #[tokio::test]
    async fn test_run_passes_through() {
        let ctx = CallContext::with_timeout(Duration::from_secs(5));
        assert_eq!(ctx.run(async { Ok(7) }).await, Ok(7));
    }
}

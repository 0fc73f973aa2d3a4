//! Minimum spacing between outbound requests.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{self, Instant};
use tracing::trace;

/// Default delay between requests in milliseconds.
pub const DEFAULT_RATE_LIMIT_DELAY_MS: u64 = 100;

/// Serializes dispatches so that two consecutive ones are never closer
/// than `delay`.
///
/// The lock is held while waiting, so concurrent callers queue behind each
/// other and every wait is measured from the latest dispatch.
#[derive(Debug)]
pub struct RateLimiter {
    delay: Duration,
    last_dispatch: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter with the given minimum spacing.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_dispatch: Mutex::new(None),
        }
    }

    /// The configured minimum spacing.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait until a request may be dispatched, then record the dispatch.
    ///
    /// Returns the recorded dispatch instant.
    pub async fn acquire(&self) -> Instant {
        let mut last = self.last_dispatch.lock().await;

        if let Some(previous) = *last {
            let ready_at = previous + self.delay;
            if Instant::now() < ready_at {
                trace!(wait_ms = (ready_at - Instant::now()).as_millis() as u64, "Rate limit wait");
                time::sleep_until(ready_at).await;
            }
        }

        let now = Instant::now();
        *last = Some(now);
        now
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_RATE_LIMIT_DELAY_MS))
    }
}

//! Request pacing shared by every outbound call.
//!
//! All requests go through one queue: a caller waits until the minimum
//! interval since the previous dispatch has elapsed, then records its own
//! dispatch time before releasing the queue.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Minimum-interval rate limiter
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum gap between two dispatches
    min_interval: Duration,
    /// Last dispatch timestamp; the lock is held across the wait so two
    /// callers can never both observe the same stale value
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Wait until a request can be made and return its dispatch time
    pub async fn acquire(&self) -> Instant {
        let mut last = self.last_request.lock().await;

        if let Some(previous) = *last {
            let ready_at = previous + self.min_interval;
            let now = Instant::now();
            if ready_at > now {
                tracing::debug!(
                    wait_ms = (ready_at - now).as_millis() as u64,
                    "Rate limit: waiting for minimum interval"
                );
                sleep_until(ready_at).await;
            }
        }

        let dispatched_at = Instant::now();
        *last = Some(dispatched_at);
        dispatched_at
    }

    /// Configured minimum interval
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Timestamp of the most recent dispatch, if any
    pub async fn last_dispatch(&self) -> Option<Instant> {
        *self.last_request.lock().await
    }
}

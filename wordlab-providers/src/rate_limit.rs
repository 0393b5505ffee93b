//! Per-provider request pacing.
//!
//! Every provider gets one [`RateLimiter`] shared by all experiments. It
//! enforces a minimum interval between the *starts* of consecutive requests.
//! Waiters are served in submission order because `tokio::sync::Mutex` is a
//! fair FIFO lock.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Default budget of one request per second.
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 60;

#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_start: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter allowing `requests_per_minute` request starts.
    ///
    /// A budget of zero is treated as one request per minute.
    pub fn per_minute(requests_per_minute: u32) -> Self {
        let rpm = u64::from(requests_per_minute.max(1));
        Self::with_interval(Duration::from_millis(60_000 / rpm))
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            last_start: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for this caller's turn, then record the new start instant.
    ///
    /// The lock is held across the sleep so later callers queue behind the
    /// current one instead of racing for the same slot.
    pub async fn acquire(&self) {
        let mut last_start = self.last_start.lock().await;

        if let Some(previous) = *last_start {
            let ready_at = previous + self.interval;
            if ready_at > Instant::now() {
                tracing::trace!(wait_ms = (ready_at - Instant::now()).as_millis() as u64, "Rate limited");
                sleep_until(ready_at).await;
            }
        }

        *last_start = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::per_minute(DEFAULT_REQUESTS_PER_MINUTE)
    }
}

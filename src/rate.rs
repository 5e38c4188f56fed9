//! Sliding-window rate limiter for outbound remote calls.
//!
//! Keeps the timestamps of the most recent N admissions. Once the window is
//! full, a caller waits out the remainder of the period measured from the
//! oldest entry before the oldest is evicted and the caller is admitted.
//! This bounds admissions to N per trailing period; it does not smooth
//! bursts inside the window.
//!
//! A single limiter is shared by every remote call in a run. Admission is
//! serialized through one mutex, so the global-rate contract holds even if
//! callers ever run concurrently.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::info;

use crate::config::RateLimitConfig;

#[derive(Clone)]
pub struct RateLimiter {
    window: Arc<Mutex<VecDeque<Instant>>>,
    limit: usize,
    period: Duration,
}

impl RateLimiter {
    pub fn new(limit: usize, period: Duration) -> Self {
        Self {
            window: Arc::new(Mutex::new(VecDeque::with_capacity(limit))),
            limit: limit.max(1),
            period,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(
            config.max_requests,
            Duration::from_secs(config.period_secs),
        )
    }

    /// Blocks until the caller may perform one outbound call.
    pub async fn admit(&self) {
        let mut window = self.window.lock().await;
        if window.len() >= self.limit {
            if let Some(oldest) = window.front() {
                let elapsed = oldest.elapsed();
                if elapsed < self.period {
                    let wait = self.period - elapsed;
                    info!(
                        "rate limit reached, sleeping for {:.2} seconds",
                        wait.as_secs_f64()
                    );
                    tokio::time::sleep(wait).await;
                }
            }
            window.pop_front();
        }
        window.push_back(Instant::now());
    }
}

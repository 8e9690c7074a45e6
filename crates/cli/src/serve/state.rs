//! Application state and rate limiting.

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Instant;

use contractly_lifecycle::LifecycleEngine;
use contractly_storage::MemoryStorage;
use tokio::sync::Mutex;

use super::RATE_LIMIT_WINDOW_SECS;

/// Per-IP request tracker: (request count, window start time).
type IpTracker = HashMap<IpAddr, (u64, Instant)>;

/// In-memory fixed-window rate limiter keyed by client IP.
pub(crate) struct RateLimiter {
    tracker: Mutex<IpTracker>,
    max_requests: u64,
}

impl RateLimiter {
    pub(crate) fn new(max_requests: u64) -> Self {
        Self {
            tracker: Mutex::new(HashMap::new()),
            max_requests,
        }
    }

    /// `Err(retry_after_secs)` once `ip` has used up its window.
    pub(crate) async fn check(&self, ip: IpAddr) -> Result<(), u64> {
        let mut tracker = self.tracker.lock().await;
        let now = Instant::now();
        let (count, window_start) = tracker.entry(ip).or_insert((0, now));

        let elapsed = now.duration_since(*window_start).as_secs();
        if elapsed >= RATE_LIMIT_WINDOW_SECS {
            *count = 0;
            *window_start = now;
        }

        *count += 1;
        if *count > self.max_requests {
            Err(RATE_LIMIT_WINDOW_SECS.saturating_sub(elapsed))
        } else {
            Ok(())
        }
    }
}

pub(crate) struct AppState {
    pub(crate) engine: LifecycleEngine<MemoryStorage>,
    pub(crate) rate_limiter: RateLimiter,
    /// `None` disables authentication.
    pub(crate) api_key: Option<String>,
}

//! Token-bucket rate limiter keyed by IP address.
//!
//! Used to throttle login form submissions.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Bucket count above which stale entries are swept on the next check.
const SWEEP_THRESHOLD: usize = 1024;

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// A simple in-process token-bucket rate limiter keyed by client IP.
pub struct RateLimiter {
    max_tokens: u32,
    window_secs: u64,
    buckets: Mutex<HashMap<IpAddr, Bucket>>,
}

impl RateLimiter {
    /// Create a new rate limiter.
    ///
    /// * `max_tokens`: maximum requests allowed per window.
    /// * `window_secs`: refill window in seconds.
    pub fn new(max_tokens: u32, window_secs: u64) -> Self {
        Self {
            max_tokens: max_tokens.max(1),
            window_secs: window_secs.max(1),
            buckets: Mutex::new(HashMap::new()),
        }
    }

    fn buckets(&self) -> MutexGuard<'_, HashMap<IpAddr, Bucket>> {
        // A poisoned map still holds valid buckets
        self.buckets.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Check whether `ip` is within its rate limit.
    ///
    /// Returns `Ok(remaining)` on success or `Err(retry_after_secs)` when the
    /// bucket is empty.
    pub fn check(&self, ip: IpAddr) -> Result<u32, u64> {
        let mut buckets = self.buckets();
        let now = Instant::now();

        if buckets.len() > SWEEP_THRESHOLD {
            let window = Duration::from_secs(self.window_secs * 2);
            buckets.retain(|_, bucket| now.duration_since(bucket.last_refill) < window);
        }

        let bucket = buckets.entry(ip).or_insert(Bucket {
            tokens: self.max_tokens as f64,
            last_refill: now,
        });

        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        let refill_rate = self.max_tokens as f64 / self.window_secs as f64;
        bucket.tokens = (bucket.tokens + elapsed * refill_rate).min(self.max_tokens as f64);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Ok(bucket.tokens as u32)
        } else {
            let deficit = 1.0 - bucket.tokens;
            let retry_after = (deficit / refill_rate).ceil() as u64;
            Err(retry_after.max(1))
        }
    }
}

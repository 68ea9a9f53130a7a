//! Process-wide limiter for text-provider calls.
//!
//! At most `max_per_minute` calls in flight. Call starts are handed out from a
//! shared schedule spaced `60 / max_per_minute` seconds apart, and every call is
//! followed by the same throttle sleep (success or failure) before its permit
//! is released.

use std::future::Future;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use tokio::time::Instant;
use tracing::debug;

/// Default provider quota (requests per minute).
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 30;

pub struct RateLimiter {
    semaphore: Semaphore,
    interval: Duration,
    /// Earliest start time of the next call.
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// `max_per_minute` of 0 is treated as 1.
    pub fn new(max_per_minute: u32) -> Self {
        let permits = max_per_minute.max(1);
        Self {
            semaphore: Semaphore::new(permits as usize),
            interval: Duration::from_secs(60) / permits,
            next_slot: Mutex::new(None),
        }
    }

    /// Throttle interval between successive calls.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Claim the next start slot and wait for it.
    async fn wait_for_slot(&self) {
        let slot = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next {
                Some(t) if t > now => t,
                _ => now,
            };
            *next = Some(slot + self.interval);
            slot
        };
        tokio::time::sleep_until(slot).await;
    }

    /// Run `call` while holding a permit in its scheduled slot, then sleep the throttle interval.
    pub async fn run<F, T>(&self, call: F) -> T
    where
        F: Future<Output = T>,
    {
        // The semaphore is owned by self and never closed.
        let _permit = self.semaphore.acquire().await.ok();
        self.wait_for_slot().await;
        let out = call.await;
        debug!(interval_ms = self.interval.as_millis() as u64, "throttling after call");
        tokio::time::sleep(self.interval).await;
        out
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_REQUESTS_PER_MINUTE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_interval_from_quota() {
        assert_eq!(RateLimiter::new(30).interval(), Duration::from_secs(2));
        assert_eq!(RateLimiter::new(60).interval(), Duration::from_secs(1));
        assert_eq!(RateLimiter::new(0).interval(), Duration::from_secs(60));
        assert_eq!(
            RateLimiter::new(u32::MAX).interval(),
            Duration::from_secs(60) / u32::MAX
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_calls_are_spaced() {
        let limiter = RateLimiter::new(30);
        let calls = 5u32;
        let start = Instant::now();
        for i in 0..calls {
            let v = limiter.run(async move { i * 2 }).await;
            assert_eq!(v, i * 2);
        }
        assert!(start.elapsed() >= limiter.interval() * (calls - 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_applies_to_failures() {
        let limiter = RateLimiter::new(30);
        let start = Instant::now();
        let r: Result<(), &str> = limiter.run(async { Err("boom") }).await;
        assert!(r.is_err());
        assert!(start.elapsed() >= limiter.interval());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_bounded_by_permits() {
        let limiter = Arc::new(RateLimiter::new(2));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let calls = 6u32;

        let start = Instant::now();
        let mut handles = Vec::new();
        for _ in 0..calls {
            let limiter = Arc::clone(&limiter);
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            handles.push(tokio::spawn(async move {
                limiter
                    .run(async {
                        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                    })
                    .await;
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert!(start.elapsed() >= limiter.interval() * (calls - 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_quota_holds_for_burst_above_limit() {
        let limiter = Arc::new(RateLimiter::new(30));
        let calls = 31u32;

        let start = Instant::now();
        let handles: Vec<_> = (0..calls)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move { limiter.run(async {}).await })
            })
            .collect();
        for h in handles {
            h.await.unwrap();
        }
        // 31 calls at 30/min cannot finish inside one minute.
        assert!(start.elapsed() >= Duration::from_secs(60));
        assert!(start.elapsed() >= limiter.interval() * (calls - 1));
    }
}

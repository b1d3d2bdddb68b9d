//! Per-client request rate limiting.
//!
//! Fixed-window counting per client address: the first request from an
//! identity opens a window, every request inside it increments the count, and
//! requests past the cap are rejected until the window expires. The
//! check-and-increment runs atomically under one lock so two concurrent
//! requests can never both slip past the cap on a stale count.
//!
//! The limiter guards every route uniformly, the streaming route included. A
//! seeking video player issues many sub-requests per session, so the cap is
//! sized per deployment rather than hardcoded beyond its default.

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::config::RateLimitConfig;

/// Identities tracked before an eviction sweep of expired windows runs.
const EVICTION_THRESHOLD: usize = 1024;

/// Counting state for one client identity.
#[derive(Debug, Clone)]
struct RateWindow {
    started_at: Instant,
    count: u32,
}

/// Errors from rate limiting.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Too many requests, please try again later.")]
    Limited {
        /// Seconds until the client's window resets
        retry_after: u64,
    },
}

/// Fixed-window request limiter keyed by client address.
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    windows: Mutex<HashMap<IpAddr, RateWindow>>,
}

impl RateLimiter {
    /// Creates a limiter from configuration.
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            window: config.window,
            max_requests: config.max_requests,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Records one request from `identity` and decides whether it may proceed.
    ///
    /// # Errors
    ///
    /// - `RateLimitError::Limited` - the identity exhausted its window cap
    pub fn check(&self, identity: IpAddr) -> Result<(), RateLimitError> {
        let now = Instant::now();
        let mut windows = self.windows.lock();

        if windows.len() > EVICTION_THRESHOLD {
            windows.retain(|_, w| now.duration_since(w.started_at) < self.window);
        }

        let window = windows.entry(identity).or_insert(RateWindow {
            started_at: now,
            count: 0,
        });

        if now.duration_since(window.started_at) >= self.window {
            window.started_at = now;
            window.count = 0;
        }

        if window.count >= self.max_requests {
            let elapsed = now.duration_since(window.started_at);
            let retry_after = self.window.saturating_sub(elapsed).as_secs().max(1);
            return Err(RateLimitError::Limited { retry_after });
        }

        window.count += 1;
        Ok(())
    }

    /// Number of identities currently tracked.
    pub fn tracked_identities(&self) -> usize {
        self.windows.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;
    use std::sync::Arc;

    use super::*;

    fn limiter(window: Duration, max_requests: u32) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            window,
            max_requests,
        })
    }

    fn ip(last_octet: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last_octet))
    }

    #[test]
    fn test_cap_allows_exactly_max_requests() {
        let limiter = limiter(Duration::from_secs(900), 100);
        let client = ip(1);

        for i in 0..100 {
            assert!(limiter.check(client).is_ok(), "request {} should pass", i + 1);
        }
        let result = limiter.check(client);
        assert!(matches!(result, Err(RateLimitError::Limited { .. })));
    }

    #[test]
    fn test_identities_counted_independently() {
        let limiter = limiter(Duration::from_secs(900), 2);

        assert!(limiter.check(ip(1)).is_ok());
        assert!(limiter.check(ip(1)).is_ok());
        assert!(limiter.check(ip(1)).is_err());
        assert!(limiter.check(ip(2)).is_ok());
    }

    #[test]
    fn test_window_expiry_resets_count() {
        let limiter = limiter(Duration::from_millis(10), 1);
        let client = ip(1);

        assert!(limiter.check(client).is_ok());
        assert!(limiter.check(client).is_err());

        std::thread::sleep(Duration::from_millis(20));
        assert!(limiter.check(client).is_ok());
    }

    #[test]
    fn test_retry_after_reported_in_seconds() {
        let limiter = limiter(Duration::from_secs(900), 1);
        let client = ip(1);

        assert!(limiter.check(client).is_ok());
        match limiter.check(client) {
            Err(RateLimitError::Limited { retry_after }) => {
                assert!(retry_after >= 1 && retry_after <= 900);
            }
            other => panic!("expected Limited, got {other:?}"),
        }
    }

    #[test]
    fn test_expired_windows_evicted_past_threshold() {
        let limiter = limiter(Duration::from_millis(1), 100);

        for i in 0..=EVICTION_THRESHOLD {
            let addr = IpAddr::V4(Ipv4Addr::from((i as u32).to_be_bytes()));
            limiter.check(addr).unwrap();
        }
        assert!(limiter.tracked_identities() > EVICTION_THRESHOLD);

        std::thread::sleep(Duration::from_millis(5));
        limiter.check(ip(1)).unwrap();
        assert!(limiter.tracked_identities() <= 2);
    }

    #[test]
    fn test_concurrent_checks_never_exceed_cap() {
        let limiter = Arc::new(limiter(Duration::from_secs(900), 100));
        let client = ip(1);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || {
                    (0..50).filter(|_| limiter.check(client).is_ok()).count()
                })
            })
            .collect();

        let allowed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(allowed, 100);
    }
}

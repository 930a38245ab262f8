//! Rate limiter built on governor and a Tokio semaphore.
//!
//! Governor's GCRA limiters enforce the per-minute and per-day quotas; the
//! semaphore bounds the number of requests in flight.

use crate::RateLimitConfig;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, instrument, warn};

type DirectRateLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

const SECONDS_PER_DAY: u64 = 86_400;

/// Rate limiter that enforces every quota in a [`RateLimitConfig`].
///
/// # Example
///
/// ```rust,ignore
/// use sahayak_rate_limit::{RateLimiter, RateLimitTier};
///
/// let limiter = RateLimiter::new(&RateLimitTier::Free.config());
/// let guard = limiter.acquire(1_000).await;
/// let response = driver.generate(&request).await?;
/// drop(guard);
/// ```
pub struct RateLimiter {
    config: RateLimitConfig,
    rpm_limiter: Option<Arc<DirectRateLimiter>>,
    tpm_limiter: Option<Arc<DirectRateLimiter>>,
    rpd_limiter: Option<Arc<DirectRateLimiter>>,
    concurrent_semaphore: Arc<Semaphore>,
}

impl RateLimiter {
    /// Build limiters for every non-`None`, non-zero quota.
    pub fn new(config: &RateLimitConfig) -> Self {
        let rpm_limiter = (*config.requests_per_minute())
            .and_then(NonZeroU32::new)
            .map(|n| Arc::new(GovernorRateLimiter::direct(Quota::per_minute(n))));

        // Governor counts in u32; larger token quotas are capped.
        let tpm_limiter = (*config.tokens_per_minute())
            .and_then(|tpm| NonZeroU32::new(tpm.min(u32::MAX as u64) as u32))
            .map(|n| Arc::new(GovernorRateLimiter::direct(Quota::per_minute(n))));

        // The whole daily allowance is available as a burst and refills
        // evenly across the day.
        let rpd_limiter = (*config.requests_per_day()).and_then(NonZeroU32::new).and_then(|n| {
            Quota::with_period(Duration::from_secs(SECONDS_PER_DAY) / n.get())
                .map(|quota| Arc::new(GovernorRateLimiter::direct(quota.allow_burst(n))))
        });

        let max_concurrent = (*config.max_concurrent())
            .filter(|n| *n > 0)
            .map(|n| n as usize)
            .unwrap_or(Semaphore::MAX_PERMITS);

        Self {
            config: *config,
            rpm_limiter,
            tpm_limiter,
            rpd_limiter,
            concurrent_semaphore: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    /// The quotas this limiter enforces.
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Wait until every quota admits one request of `estimated_tokens`.
    ///
    /// The concurrency slot is taken last so a request never holds it while
    /// waiting on a time-based quota.
    #[instrument(skip(self))]
    pub async fn acquire(&self, estimated_tokens: u64) -> RateLimiterGuard {
        if let Some(limiter) = &self.rpm_limiter {
            limiter.until_ready().await;
        }

        if let Some(limiter) = &self.tpm_limiter {
            let cells = self.token_cells(estimated_tokens);
            if let Err(e) = limiter.until_n_ready(cells).await {
                warn!(error = %e, "Token estimate exceeds per-minute capacity");
            }
        }

        if let Some(limiter) = &self.rpd_limiter {
            limiter.until_ready().await;
        }

        let permit = match self.concurrent_semaphore.clone().acquire_owned().await {
            Ok(permit) => Some(permit),
            Err(e) => {
                warn!(error = %e, "Concurrency semaphore closed");
                None
            }
        };

        debug!(
            available_slots = self.concurrent_semaphore.available_permits(),
            "Rate limit permission acquired"
        );
        RateLimiterGuard { _permit: permit }
    }

    /// Try to acquire without waiting; `None` if any quota would block.
    pub fn try_acquire(&self, estimated_tokens: u64) -> Option<RateLimiterGuard> {
        if let Some(limiter) = &self.rpm_limiter {
            limiter.check().ok()?;
        }

        if let Some(limiter) = &self.tpm_limiter {
            let cells = self.token_cells(estimated_tokens);
            limiter.check_n(cells).ok()?.ok()?;
        }

        if let Some(limiter) = &self.rpd_limiter {
            limiter.check().ok()?;
        }

        let permit = self.concurrent_semaphore.clone().try_acquire_owned().ok()?;
        Some(RateLimiterGuard {
            _permit: Some(permit),
        })
    }

    /// Token cost clamped to `[1, tokens_per_minute]` so a single large
    /// request waits for a full window instead of failing.
    fn token_cells(&self, estimated_tokens: u64) -> NonZeroU32 {
        let cap = (*self.config.tokens_per_minute())
            .unwrap_or(u32::MAX as u64)
            .min(u32::MAX as u64);
        let cells = estimated_tokens.clamp(1, cap.max(1)) as u32;
        NonZeroU32::new(cells).unwrap_or(NonZeroU32::MIN)
    }
}

/// Releases the concurrency slot when dropped.
#[derive(Debug)]
pub struct RateLimiterGuard {
    _permit: Option<OwnedSemaphorePermit>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RateLimitTier;

    fn config(
        rpm: Option<u32>,
        tpm: Option<u64>,
        rpd: Option<u32>,
        max_concurrent: Option<u32>,
    ) -> RateLimitConfig {
        RateLimitConfig::unlimited()
            .with_requests_per_minute(rpm)
            .with_tokens_per_minute(tpm)
            .with_requests_per_day(rpd)
            .with_max_concurrent(max_concurrent)
    }

    #[test]
    fn builds_only_configured_limiters() {
        let limiter = RateLimiter::new(&config(Some(10), Some(1000), None, Some(5)));
        assert!(limiter.rpm_limiter.is_some());
        assert!(limiter.tpm_limiter.is_some());
        assert!(limiter.rpd_limiter.is_none());
    }

    #[tokio::test]
    async fn guard_releases_concurrency_slot() {
        let limiter = RateLimiter::new(&config(Some(100), Some(10_000), None, Some(1)));

        let first = limiter.acquire(1).await;
        assert!(limiter.try_acquire(1).is_none());

        drop(first);
        assert!(limiter.try_acquire(1).is_some());
    }

    #[test]
    fn requests_per_minute_are_enforced() {
        let limiter = RateLimiter::new(&config(Some(2), None, None, Some(10)));

        let _a = limiter.try_acquire(1).expect("first request");
        let _b = limiter.try_acquire(1).expect("second request");
        assert!(limiter.try_acquire(1).is_none());
    }

    #[test]
    fn tokens_per_minute_are_enforced() {
        let limiter = RateLimiter::new(&config(None, Some(10), None, Some(10)));

        let _a = limiter.try_acquire(5).expect("first request");
        let _b = limiter.try_acquire(5).expect("second request");
        assert!(limiter.try_acquire(1).is_none());
    }

    #[test]
    fn requests_per_day_allow_full_burst() {
        let limiter = RateLimiter::new(&config(None, None, Some(3), None));

        for _ in 0..3 {
            assert!(limiter.try_acquire(1).is_some());
        }
        assert!(limiter.try_acquire(1).is_none());
    }

    #[test]
    fn unlimited_tier_never_blocks() {
        let limiter = RateLimiter::new(&RateLimitTier::Unlimited.config());
        for _ in 0..100 {
            assert!(limiter.try_acquire(1).is_some());
        }
    }

    #[test]
    fn oversized_estimate_is_clamped() {
        let limiter = RateLimiter::new(&config(None, Some(10), None, None));
        assert_eq!(limiter.token_cells(1_000_000).get(), 10);
        assert_eq!(limiter.token_cells(0).get(), 1);
    }
}

//! Adaptive request rate limiting
//!
//! A single token bucket (burst of one) gates every fetch. The permitted rate
//! halves whenever a server answers 429 and climbs back by half again once a
//! cooldown window has passed without throttling, never exceeding the ceiling.

use crate::Cancelled;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Multiplier applied to the rate on each ramp-up
pub const RAMP_FACTOR: f64 = 1.5;

/// Longest gap between requests the bucket is built with
///
/// Repeated halving drives the rate towards zero; past this point the bucket
/// simply waits an hour per request.
const MAX_PERIOD: Duration = Duration::from_secs(3600);

/// Token bucket whose rate reacts to throttling signals
pub struct AdaptiveLimiter {
    /// Bucket enforcing the current rate
    bucket: DefaultDirectRateLimiter,

    /// Current permitted rate (requests per second)
    rate: f64,

    /// Ceiling the rate never exceeds when ramping up
    max_rate: f64,

    /// Quiet period required before ramping up
    cooldown: Duration,

    /// When the rate was last halved or ramped
    last_adjusted: Instant,
}

impl AdaptiveLimiter {
    /// Creates a limiter running at its ceiling
    ///
    /// # Arguments
    ///
    /// * `max_rate` - Ceiling in requests per second
    /// * `cooldown` - Quiet period before each ramp-up
    pub fn new(max_rate: f64, cooldown: Duration) -> Self {
        Self {
            bucket: build_bucket(max_rate),
            rate: max_rate,
            max_rate,
            cooldown,
            last_adjusted: Instant::now(),
        }
    }

    /// Returns the current rate (requests per second)
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Returns the ceiling (requests per second)
    pub fn max_rate(&self) -> f64 {
        self.max_rate
    }

    /// Overrides the current rate without touching the adjustment timestamp
    pub fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
        self.bucket = build_bucket(rate);
        // The request that triggered the change already spent its token
        let _ = self.bucket.check();
    }

    /// Overrides the ceiling; the current rate is clamped to it
    pub fn set_max_rate(&mut self, max_rate: f64) {
        self.max_rate = max_rate;
        if self.rate > max_rate {
            self.set_rate(max_rate);
        }
    }

    /// Halves the rate in response to a throttling signal
    ///
    /// Returns the new rate.
    pub fn throttle(&mut self) -> f64 {
        self.throttle_at(Instant::now())
    }

    /// Halves the rate, recording `now` as the adjustment time
    pub fn throttle_at(&mut self, now: Instant) -> f64 {
        self.set_rate(self.rate / 2.0);
        self.last_adjusted = now;
        self.rate
    }

    /// Ramps the rate up if the cooldown window has passed
    ///
    /// Returns the new rate if it changed.
    pub fn ramp_up(&mut self) -> Option<f64> {
        self.ramp_up_at(Instant::now())
    }

    /// Ramps the rate up as of `now`
    ///
    /// The rate grows by [`RAMP_FACTOR`], clamped to the ceiling, at most once
    /// per cooldown window.
    pub fn ramp_up_at(&mut self, now: Instant) -> Option<f64> {
        if self.rate >= self.max_rate {
            return None;
        }

        if now.saturating_duration_since(self.last_adjusted) < self.cooldown {
            return None;
        }

        let next = (self.rate * RAMP_FACTOR).min(self.max_rate);
        self.set_rate(next);
        self.last_adjusted = now;
        Some(next)
    }

    /// Waits until the bucket allows the next request
    ///
    /// # Returns
    ///
    /// * `Ok(())` - A request may be sent now
    /// * `Err(Cancelled)` - The token fired before a permit was available
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<(), Cancelled> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Cancelled),
            _ = self.bucket.until_ready() => Ok(()),
        }
    }
}

/// Builds a burst-of-one bucket emitting `rate` tokens per second
fn build_bucket(rate: f64) -> DefaultDirectRateLimiter {
    let period = if rate.is_finite() && rate > 0.0 {
        Duration::try_from_secs_f64(1.0 / rate)
            .unwrap_or(MAX_PERIOD)
            .min(MAX_PERIOD)
    } else if rate.is_infinite() && rate > 0.0 {
        Duration::ZERO
    } else {
        MAX_PERIOD
    };

    let quota = Quota::with_period(period.max(Duration::from_nanos(1)))
        .unwrap_or_else(|| Quota::per_hour(NonZeroU32::MIN))
        .allow_burst(NonZeroU32::MIN);

    RateLimiter::direct(quota)
}

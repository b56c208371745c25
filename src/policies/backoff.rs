//! # Backoff policy for HTTP retries.
//!
//! The delay before retry `n` (0-indexed) is `first × factor^n`, clamped to `max`, then
//! jittered. The base is derived from the attempt number alone, so jitter output never
//! feeds into later delays.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use gathervisor::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy::exponential(Duration::from_millis(800), 2.0);
//!
//! assert_eq!(backoff.next(0), Duration::from_millis(800));
//! assert_eq!(backoff.next(1), Duration::from_millis(1600));
//! // 800ms × 2^10 is far past the cap
//! assert_eq!(backoff.next(10), backoff.max);
//! assert_eq!(backoff.jitter, JitterPolicy::None);
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Retry backoff policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay before the first retry.
    pub first: Duration,
    /// Upper bound for any single delay.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` expected).
    pub factor: f64,
    /// Randomization applied to the clamped base.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::exponential(Duration::from_millis(800), 2.0)
    }
}

impl BackoffPolicy {
    /// Exponential backoff capped at 10s, without jitter.
    #[must_use]
    pub fn exponential(first: Duration, factor: f64) -> Self {
        Self {
            first,
            max: Duration::from_secs(10),
            factor,
            jitter: JitterPolicy::None,
        }
    }

    /// Same policy with a different jitter.
    #[must_use]
    pub fn with_jitter(mut self, jitter: JitterPolicy) -> Self {
        self.jitter = jitter;
        self
    }

    /// Same policy with a different cap.
    #[must_use]
    pub fn with_max(mut self, max: Duration) -> Self {
        self.max = max;
        self
    }

    /// Computes the delay before retry `attempt` (0-indexed).
    pub fn next(&self, attempt: u32) -> Duration {
        let exp = attempt.min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if !secs.is_finite() || secs < 0.0 || secs > self.max.as_secs_f64() {
            self.max
        } else {
            Duration::from_secs_f64(secs)
        };

        match self.jitter {
            JitterPolicy::Decorrelated => {
                self.jitter
                    .apply_decorrelated(self.first.min(self.max), base, self.max)
            }
            other => other.apply(base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_source_retries() {
        let p = BackoffPolicy::default();
        assert_eq!(p.next(0), Duration::from_millis(800));
        assert_eq!(p.next(1), Duration::from_millis(1600));
        assert_eq!(p.next(2), Duration::from_millis(3200));
    }

    #[test]
    fn constant_factor_stays_flat() {
        let p = BackoffPolicy::exponential(Duration::from_millis(500), 1.0);
        for attempt in 0..10 {
            assert_eq!(p.next(attempt), Duration::from_millis(500), "attempt {attempt}");
        }
    }

    #[test]
    fn clamps_to_max() {
        let p = BackoffPolicy::exponential(Duration::from_millis(100), 2.0)
            .with_max(Duration::from_secs(1));
        assert_eq!(p.next(10), Duration::from_secs(1));
        assert_eq!(p.next(u32::MAX), Duration::from_secs(1));

        let oversized = BackoffPolicy::exponential(Duration::from_secs(10), 2.0)
            .with_max(Duration::from_secs(5));
        assert_eq!(oversized.next(0), Duration::from_secs(5));
    }

    #[test]
    fn equal_jitter_keeps_at_least_half() {
        let p = BackoffPolicy::exponential(Duration::from_millis(100), 2.0)
            .with_jitter(JitterPolicy::Equal);
        for attempt in 0..12 {
            let base_ms = (100.0 * 2.0f64.powi(attempt as i32)).min(10_000.0);
            let delay = p.next(attempt);
            assert!(delay >= Duration::from_millis((base_ms / 2.0) as u64));
            assert!(delay <= Duration::from_millis(base_ms as u64));
        }
    }

    #[test]
    fn decorrelated_never_drops_below_first() {
        let p = BackoffPolicy::exponential(Duration::from_millis(100), 2.0)
            .with_jitter(JitterPolicy::Decorrelated);
        for _ in 0..50 {
            let d = p.next(6);
            assert!(d >= Duration::from_millis(100) && d <= p.max);
        }
    }
}

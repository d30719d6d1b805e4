//! Retry pacing for the waiting acquisition loops.

use std::time::Duration;

use rand::Rng;

use crate::error::{LockError, LockResult};

/// Longest single delay a backoff may be configured with.
pub const MAX_BACKOFF: Duration = Duration::from_secs(3600);

/// Exponential backoff settings used between acquisition attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffOptions {
    /// Delay after the first failed attempt.
    pub initial: Duration,
    /// Upper bound for a single delay (before jitter).
    pub max: Duration,
    /// Factor applied to the delay after each failed attempt.
    pub multiplier: u32,
    /// Fraction of the delay added or removed at random, in `[0.0, 1.0]`.
    pub jitter: f64,
}

impl Default for BackoffOptions {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(10),
            max: Duration::from_secs(1),
            multiplier: 2,
            jitter: 0.25,
        }
    }
}

impl BackoffOptions {
    pub(crate) fn validate(&self) -> LockResult<()> {
        if self.initial.is_zero() {
            return Err(LockError::InvalidArgument(
                "initial backoff must be greater than zero".to_string(),
            ));
        }
        if self.max < self.initial {
            return Err(LockError::InvalidArgument(format!(
                "max backoff {:?} is shorter than initial backoff {:?}",
                self.max, self.initial
            )));
        }
        if self.max > MAX_BACKOFF {
            return Err(LockError::InvalidArgument(format!(
                "max backoff {:?} exceeds {MAX_BACKOFF:?}",
                self.max
            )));
        }
        if self.multiplier == 0 {
            return Err(LockError::InvalidArgument(
                "backoff multiplier must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(LockError::InvalidArgument(format!(
                "backoff jitter {} is outside [0, 1]",
                self.jitter
            )));
        }
        Ok(())
    }
}

/// Stateful delay sequence for one waiting call.
#[derive(Debug)]
pub struct Backoff {
    options: BackoffOptions,
    current: Duration,
}

impl Backoff {
    pub fn new(options: &BackoffOptions) -> Self {
        Self {
            options: options.clone(),
            current: options.initial,
        }
    }

    /// Returns the next delay (with jitter) and grows the base delay.
    pub fn next_delay(&mut self) -> Duration {
        let base = self.current;
        self.current = base
            .checked_mul(self.options.multiplier)
            .unwrap_or(self.options.max)
            .min(self.options.max);
        with_jitter(base, self.options.jitter)
    }
}

/// Spreads `delay` uniformly over `delay ± delay * fraction`.
fn with_jitter(delay: Duration, fraction: f64) -> Duration {
    let spread = delay.as_secs_f64() * fraction;
    if spread <= 0.0 {
        return delay;
    }
    let offset = rand::thread_rng().gen_range(-spread..=spread);
    Duration::try_from_secs_f64((delay.as_secs_f64() + offset).max(0.0)).unwrap_or(delay)
}

/// A uniformly random pause in `[0, max)`, or zero when `max` is zero.
pub(crate) fn random_pause(max: Duration) -> Duration {
    if max.is_zero() {
        return Duration::ZERO;
    }
    let millis = max.as_millis().min(u64::MAX as u128) as u64;
    if millis == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..millis))
}

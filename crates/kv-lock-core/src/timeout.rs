//! Wait budget helpers.

use std::time::Duration;

/// How long a waiting acquisition may keep retrying.
///
/// - `Some(duration)`: retry until `duration` has elapsed
/// - `None`: retry indefinitely
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutValue {
    budget: Option<Duration>,
}

impl TimeoutValue {
    pub const INFINITE: Self = Self { budget: None };

    pub fn as_duration(&self) -> Option<Duration> {
        self.budget
    }

    /// Whether a loop that has run for `elapsed` has used up the budget.
    pub fn is_exhausted(&self, elapsed: Duration) -> bool {
        match self.budget {
            None => false,
            Some(budget) => elapsed >= budget,
        }
    }

    /// Clamps a backoff delay so it never sleeps past the deadline.
    pub fn clamp_delay(&self, delay: Duration, elapsed: Duration) -> Duration {
        match self.budget {
            None => delay,
            Some(budget) => delay.min(budget.saturating_sub(elapsed)),
        }
    }
}

impl From<Option<Duration>> for TimeoutValue {
    fn from(timeout: Option<Duration>) -> Self {
        Self { budget: timeout }
    }
}

impl From<Duration> for TimeoutValue {
    fn from(timeout: Duration) -> Self {
        Self {
            budget: Some(timeout),
        }
    }
}

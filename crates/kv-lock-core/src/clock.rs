//! Wall-clock sources used to compute and check token expiry.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of the current time in whole seconds since the Unix epoch.
///
/// Every process contending for the same key must read roughly the same
/// clock; expiry checks compare a token written by one process against the
/// clock of another.
pub trait Clock: Send + Sync + 'static {
    fn now_epoch_secs(&self) -> i64;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_secs(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }
}

/// A manually driven clock.
///
/// Clones share the same instant, so a test can hand one clone to several
/// providers and move them all forward at once.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    /// Creates a clock frozen at `epoch_secs`.
    pub fn new(epoch_secs: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(epoch_secs)),
        }
    }

    /// Creates a clock frozen at the current system time.
    pub fn starting_now() -> Self {
        Self::new(SystemClock.now_epoch_secs())
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(by.as_secs() as i64, Ordering::SeqCst);
    }

    /// Jumps the clock to `epoch_secs`.
    pub fn set(&self, epoch_secs: i64) {
        self.now.store(epoch_secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_epoch_secs(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new(1_000);
        let other = clock.clone();
        clock.advance(Duration::from_secs(5));
        assert_eq!(other.now_epoch_secs(), 1_005);
        other.set(42);
        assert_eq!(clock.now_epoch_secs(), 42);
    }

    #[test]
    fn test_system_clock_is_after_2020() {
        assert!(SystemClock.now_epoch_secs() > 1_577_836_800);
    }
}

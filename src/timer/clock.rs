//! Time sources for countdowns.

use std::cell::Cell;

use chrono::Utc;

/// Reads the current wall-clock time as fractional seconds since the Unix epoch.
pub trait Clock {
    fn now_seconds(&self) -> f64;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_seconds(&self) -> f64 {
        Utc::now().timestamp_millis() as f64 / 1000.0
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(now_seconds: f64) -> Self {
        Self {
            now: Cell::new(now_seconds),
        }
    }

    pub fn set(&self, now_seconds: f64) {
        self.now.set(now_seconds);
    }

    pub fn advance(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds);
    }
}

impl Clock for ManualClock {
    fn now_seconds(&self) -> f64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(100.0);
        assert_eq!(clock.now_seconds(), 100.0);
        clock.advance(2.5);
        assert_eq!(clock.now_seconds(), 102.5);
        clock.set(10.0);
        assert_eq!(clock.now_seconds(), 10.0);
    }

    #[test]
    fn test_system_clock_is_after_2020() {
        assert!(SystemClock.now_seconds() > 1_577_836_800.0);
    }
}

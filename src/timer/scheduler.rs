//! Single-threaded run loop for recurring tick callbacks.
//!
//! Timers live in an arena of slots. Each slot carries a generation that is
//! bumped whenever its timer is cancelled, so a [`TickHandle`] issued for an
//! earlier timer never matches a later one that reuses the same slot.

use std::time::Duration;

/// Identifies one scheduled recurring timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle {
    slot: usize,
    generation: u64,
}

impl TickHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Schedules and cancels recurring callbacks on the owning thread.
pub trait Scheduler {
    /// Start a recurring timer whose first tick is due one `interval` after `now`.
    fn schedule_repeating(&mut self, interval: Duration, now: f64) -> TickHandle;

    /// Cancel a timer. No tick for `handle` is delivered after this returns.
    /// Unknown or already-cancelled handles are ignored.
    fn cancel(&mut self, handle: TickHandle);

    /// Whether `handle` still refers to a live timer.
    fn is_scheduled(&self, handle: TickHandle) -> bool;
}

#[derive(Debug)]
struct Repeating {
    interval: f64,
    next_fire: f64,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    timer: Option<Repeating>,
}

/// Arena-backed [`Scheduler`] driven by explicit [`fire_due`](RunLoop::fire_due) calls.
#[derive(Debug, Default)]
pub struct RunLoop {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

/// Shortest interval accepted, so a zero interval cannot spin.
const MIN_INTERVAL_SECS: f64 = 0.001;

impl RunLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live timers.
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.timer.is_some()).count()
    }

    /// Collect every timer due at `now`.
    ///
    /// Each due timer is reported once even if several intervals elapsed
    /// since its last tick; its next deadline moves past `now`.
    pub fn fire_due(&mut self, now: f64) -> Vec<TickHandle> {
        let mut fired = Vec::new();
        for (slot, entry) in self.slots.iter_mut().enumerate() {
            let Some(timer) = entry.timer.as_mut() else {
                continue;
            };
            if timer.next_fire > now {
                continue;
            }
            let missed = ((now - timer.next_fire) / timer.interval).floor() + 1.0;
            timer.next_fire += missed * timer.interval;
            while timer.next_fire <= now {
                timer.next_fire += timer.interval;
            }
            fired.push(TickHandle {
                slot,
                generation: entry.generation,
            });
        }
        fired
    }

    /// Earliest pending deadline, if any timer is live.
    pub fn next_deadline(&self) -> Option<f64> {
        self.slots
            .iter()
            .filter_map(|s| s.timer.as_ref().map(|t| t.next_fire))
            .min_by(|a, b| a.total_cmp(b))
    }
}

impl Scheduler for RunLoop {
    fn schedule_repeating(&mut self, interval: Duration, now: f64) -> TickHandle {
        let interval = interval.as_secs_f64().max(MIN_INTERVAL_SECS);
        let timer = Repeating {
            interval,
            next_fire: now + interval,
        };
        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                self.slots.push(Slot::default());
                self.slots.len() - 1
            }
        };
        let entry = &mut self.slots[slot];
        entry.timer = Some(timer);
        TickHandle {
            slot,
            generation: entry.generation,
        }
    }

    fn cancel(&mut self, handle: TickHandle) {
        if !self.is_scheduled(handle) {
            tracing::trace!(slot = handle.slot, "Ignoring cancel of inactive timer");
            return;
        }
        let entry = &mut self.slots[handle.slot];
        entry.timer = None;
        entry.generation += 1;
        self.free.push(handle.slot);
    }

    fn is_scheduled(&self, handle: TickHandle) -> bool {
        self.slots
            .get(handle.slot)
            .is_some_and(|s| s.generation == handle.generation && s.timer.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn test_fires_after_interval() {
        let mut rl = RunLoop::new();
        let h = rl.schedule_repeating(SECOND, 0.0);
        assert!(rl.fire_due(0.5).is_empty());
        assert_eq!(rl.fire_due(1.0), vec![h]);
        assert!(rl.fire_due(1.5).is_empty());
        assert_eq!(rl.fire_due(2.0), vec![h]);
    }

    #[test]
    fn test_missed_intervals_coalesce() {
        let mut rl = RunLoop::new();
        let h = rl.schedule_repeating(SECOND, 0.0);
        assert_eq!(rl.fire_due(5.5), vec![h]);
        assert_eq!(rl.next_deadline(), Some(6.0));
    }

    #[test]
    fn test_cancelled_handle_never_fires() {
        let mut rl = RunLoop::new();
        let h = rl.schedule_repeating(SECOND, 0.0);
        rl.cancel(h);
        assert!(!rl.is_scheduled(h));
        assert!(rl.fire_due(100.0).is_empty());
        assert_eq!(rl.active_count(), 0);
    }

    #[test]
    fn test_reused_slot_gets_new_generation() {
        let mut rl = RunLoop::new();
        let old = rl.schedule_repeating(SECOND, 0.0);
        rl.cancel(old);
        let new = rl.schedule_repeating(SECOND, 0.0);
        assert_ne!(old, new);
        assert!(new.generation() > old.generation());
        assert!(!rl.is_scheduled(old));

        // Cancelling the stale handle must not touch the new timer.
        rl.cancel(old);
        assert!(rl.is_scheduled(new));
        assert_eq!(rl.fire_due(1.0), vec![new]);
    }

    #[test]
    fn test_double_cancel_is_noop() {
        let mut rl = RunLoop::new();
        let h = rl.schedule_repeating(SECOND, 0.0);
        rl.cancel(h);
        rl.cancel(h);
        let other = rl.schedule_repeating(SECOND, 0.0);
        let third = rl.schedule_repeating(SECOND, 0.0);
        assert_ne!(other, third);
        assert_eq!(rl.active_count(), 2);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let mut rl = RunLoop::new();
        let h = rl.schedule_repeating(Duration::ZERO, 0.0);
        assert_eq!(rl.fire_due(0.01), vec![h]);
        assert!(rl.next_deadline().unwrap() > 0.01);
    }
}

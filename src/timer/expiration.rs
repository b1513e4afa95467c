//! Countdown for disappearing messages.
//!
//! A controller is either idle or running one countdown. While running it
//! holds a [`TickHandle`] for a recurring tick; each tick recomputes the
//! remaining fraction and pushes it to the [`ExpirationTimerView`]. The
//! countdown ends on [`stop`](ExpirationTimerController::stop) or once the
//! clock reaches the expiry time, whichever comes first.

use std::time::Duration;

use tracing::{debug, trace};

use super::scheduler::{Scheduler, TickHandle};

/// Default refresh cadence of a running countdown.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Absolute expiry time and total span of one countdown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpirationState {
    expires_at_seconds: f64,
    initial_duration_seconds: u32,
}

impl ExpirationState {
    pub fn new(expires_at_seconds: f64, initial_duration_seconds: u32) -> Self {
        Self {
            expires_at_seconds,
            initial_duration_seconds,
        }
    }

    pub fn expires_at_seconds(&self) -> f64 {
        self.expires_at_seconds
    }

    pub fn initial_duration_seconds(&self) -> u32 {
        self.initial_duration_seconds
    }

    /// A zero duration or an unusable expiry time counts as already expired.
    pub fn is_expired(&self, now: f64) -> bool {
        self.initial_duration_seconds == 0
            || !self.expires_at_seconds.is_finite()
            || now >= self.expires_at_seconds
    }

    pub fn remaining_seconds(&self, now: f64) -> f64 {
        if self.is_expired(now) {
            0.0
        } else {
            self.expires_at_seconds - now
        }
    }

    /// Share of the countdown left at `now`, in `[0.0, 1.0]`.
    pub fn remaining_fraction(&self, now: f64) -> f64 {
        if self.is_expired(now) {
            return 0.0;
        }
        let fraction = self.remaining_seconds(now) / f64::from(self.initial_duration_seconds);
        fraction.clamp(0.0, 1.0)
    }
}

/// The visual a countdown draws into.
#[derive(Debug, Clone, Default)]
pub struct ExpirationTimerView {
    fraction: Option<f64>,
    updates: u64,
}

impl ExpirationTimerView {
    /// Last rendered fraction, `None` when nothing is shown.
    pub fn fraction(&self) -> Option<f64> {
        self.fraction
    }

    /// Number of renders since creation.
    pub fn update_count(&self) -> u64 {
        self.updates
    }

    pub fn is_visible(&self) -> bool {
        self.fraction.is_some()
    }

    /// Cells to fill in a bar `width` cells wide. Any time left shows at least one cell.
    pub fn filled_width(&self, width: u16) -> u16 {
        match self.fraction {
            Some(f) if f > 0.0 => ((f * f64::from(width)).ceil() as u16).min(width),
            _ => 0,
        }
    }

    fn render(&mut self, fraction: f64) {
        self.fraction = Some(fraction);
        self.updates += 1;
    }

    fn clear(&mut self) {
        self.fraction = None;
    }
}

/// What a delivered tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The tick belonged to a countdown that is no longer current.
    Stale,
    /// The visual was refreshed with this fraction.
    Updated(f64),
    /// The countdown reached zero and released its tick.
    Expired,
}

/// Drives the countdown of one displayed message.
#[derive(Debug)]
pub struct ExpirationTimerController {
    tick_interval: Duration,
    countdown: Option<ExpirationState>,
    handle: Option<TickHandle>,
    view: ExpirationTimerView,
}

impl Default for ExpirationTimerController {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

impl ExpirationTimerController {
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            tick_interval,
            countdown: None,
            handle: None,
            view: ExpirationTimerView::default(),
        }
    }

    /// True while a tick is scheduled: between `start` and either `stop` or
    /// the tick that observes expiry. Use [`is_running_at`](Self::is_running_at)
    /// to also account for an expiry no tick has seen yet.
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// True while a tick is scheduled and `now` is before the expiry.
    pub fn is_running_at(&self, now: f64) -> bool {
        self.is_running() && self.countdown.is_some_and(|state| !state.is_expired(now))
    }

    /// The countdown on display, running or already expired.
    pub fn countdown(&self) -> Option<&ExpirationState> {
        self.countdown.as_ref()
    }

    pub fn handle(&self) -> Option<TickHandle> {
        self.handle
    }

    pub fn view(&self) -> &ExpirationTimerView {
        &self.view
    }

    /// Begin a countdown, replacing any countdown already running.
    ///
    /// The current fraction is rendered right away, so a message that is
    /// already past its expiry shows an empty timer instead of a full one.
    /// Such a countdown never schedules a tick.
    pub fn start(
        &mut self,
        scheduler: &mut dyn Scheduler,
        expires_at_seconds: f64,
        initial_duration_seconds: u32,
        now: f64,
    ) {
        self.stop(scheduler);

        let state = ExpirationState::new(expires_at_seconds, initial_duration_seconds);
        self.countdown = Some(state);
        self.view.render(state.remaining_fraction(now));

        if state.is_expired(now) {
            debug!(
                expires_at = expires_at_seconds,
                duration = initial_duration_seconds,
                "Countdown already expired at start"
            );
            return;
        }

        let handle = scheduler.schedule_repeating(self.tick_interval, now);
        self.handle = Some(handle);
        debug!(
            expires_at = expires_at_seconds,
            duration = initial_duration_seconds,
            generation = handle.generation(),
            "Started expiration countdown"
        );
    }

    /// Cancel the countdown and hide the visual. Safe to call when idle.
    pub fn stop(&mut self, scheduler: &mut dyn Scheduler) {
        if let Some(handle) = self.handle.take() {
            scheduler.cancel(handle);
            debug!(generation = handle.generation(), "Stopped expiration countdown");
        }
        self.countdown = None;
        self.view.clear();
    }

    /// Handle a tick delivered by the run loop.
    pub fn on_tick(
        &mut self,
        scheduler: &mut dyn Scheduler,
        handle: TickHandle,
        now: f64,
    ) -> TickOutcome {
        let (Some(current), Some(state)) = (self.handle, self.countdown) else {
            trace!("Dropping tick for idle countdown");
            return TickOutcome::Stale;
        };
        if current != handle {
            trace!(
                current = current.generation(),
                received = handle.generation(),
                "Dropping stale tick"
            );
            return TickOutcome::Stale;
        }

        let fraction = state.remaining_fraction(now);
        self.view.render(fraction);

        if state.is_expired(now) {
            scheduler.cancel(current);
            self.handle = None;
            debug!(expires_at = state.expires_at_seconds(), "Countdown expired");
            TickOutcome::Expired
        } else {
            TickOutcome::Updated(fraction)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::scheduler::RunLoop;

    const NOW: f64 = 1_700_000_000.0;
    const TICK: Duration = Duration::from_secs(1);

    /// Deliver every due tick at `now` to `controller`.
    fn pump(
        rl: &mut RunLoop,
        controller: &mut ExpirationTimerController,
        now: f64,
    ) -> Vec<TickOutcome> {
        rl.fire_due(now)
            .into_iter()
            .map(|h| controller.on_tick(&mut *rl, h, now))
            .collect()
    }

    #[test]
    fn test_fraction_bounds_and_monotonic() {
        let state = ExpirationState::new(NOW + 60.0, 60);
        assert_eq!(state.remaining_fraction(NOW), 1.0);
        assert_eq!(state.remaining_fraction(NOW + 60.0), 0.0);
        assert_eq!(state.remaining_fraction(NOW + 600.0), 0.0);

        let mut last = f64::INFINITY;
        for step in 0..=120 {
            let f = state.remaining_fraction(NOW + step as f64 * 0.5);
            assert!(f <= last, "fraction increased at step {step}");
            assert!((0.0..=1.0).contains(&f));
            last = f;
        }
    }

    #[test]
    fn test_fraction_clamped_when_expiry_beyond_duration() {
        let state = ExpirationState::new(NOW + 120.0, 60);
        assert_eq!(state.remaining_fraction(NOW), 1.0);
    }

    #[test]
    fn test_zero_duration_is_expired() {
        let state = ExpirationState::new(NOW + 60.0, 0);
        assert!(state.is_expired(NOW));
        assert_eq!(state.remaining_fraction(NOW), 0.0);
    }

    #[test]
    fn test_non_finite_expiry_is_expired() {
        let state = ExpirationState::new(f64::NAN, 10);
        assert!(state.is_expired(NOW));
        assert_eq!(state.remaining_fraction(NOW), 0.0);
    }

    #[test]
    fn test_start_renders_full_then_counts_down() {
        let mut rl = RunLoop::new();
        let mut c = ExpirationTimerController::new(TICK);

        c.start(&mut rl, NOW + 10.0, 10, NOW);
        assert!(c.is_running());
        assert_eq!(c.view().fraction(), Some(1.0));

        let outcomes = pump(&mut rl, &mut c, NOW + 1.0);
        assert_eq!(outcomes, vec![TickOutcome::Updated(0.9)]);

        let outcomes = pump(&mut rl, &mut c, NOW + 5.0);
        assert_eq!(outcomes, vec![TickOutcome::Updated(0.5)]);
    }

    #[test]
    fn test_natural_expiry_goes_idle() {
        let mut rl = RunLoop::new();
        let mut c = ExpirationTimerController::new(TICK);
        c.start(&mut rl, NOW + 2.0, 2, NOW);

        assert_eq!(pump(&mut rl, &mut c, NOW + 2.0), vec![TickOutcome::Expired]);
        assert!(!c.is_running());
        assert_eq!(c.view().fraction(), Some(0.0));
        assert_eq!(rl.active_count(), 0);

        let updates = c.view().update_count();
        assert!(pump(&mut rl, &mut c, NOW + 10.0).is_empty());
        assert_eq!(c.view().update_count(), updates);
    }

    #[test]
    fn test_is_running_at_sees_expiry_before_tick() {
        let mut rl = RunLoop::new();
        let mut c = ExpirationTimerController::new(TICK);
        c.start(&mut rl, NOW + 2.0, 2, NOW);

        assert!(c.is_running_at(NOW + 1.5));
        // Expired, but the tick observing it has not been delivered yet
        assert!(c.is_running());
        assert!(!c.is_running_at(NOW + 2.0));

        c.stop(&mut rl);
        assert!(!c.is_running_at(NOW));
    }

    #[test]
    fn test_already_expired_renders_empty_immediately() {
        let mut rl = RunLoop::new();
        let mut c = ExpirationTimerController::new(TICK);

        c.start(&mut rl, NOW - 5.0, 60, NOW);
        assert_eq!(c.view().update_count(), 1);
        assert_eq!(c.view().fraction(), Some(0.0));
        assert!(!c.is_running());
        assert_eq!(rl.active_count(), 0);
    }

    #[test]
    fn test_stop_prevents_further_updates() {
        let mut rl = RunLoop::new();
        let mut c = ExpirationTimerController::new(TICK);

        c.start(&mut rl, NOW + 10.0, 10, NOW);
        pump(&mut rl, &mut c, NOW + 1.0);
        pump(&mut rl, &mut c, NOW + 2.0);
        c.stop(&mut rl);
        let updates = c.view().update_count();

        for t in 3..=20 {
            assert!(pump(&mut rl, &mut c, NOW + t as f64).is_empty());
        }
        assert_eq!(c.view().update_count(), updates);
        assert!(!c.view().is_visible());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut rl = RunLoop::new();
        let mut c = ExpirationTimerController::new(TICK);
        c.stop(&mut rl);
        c.start(&mut rl, NOW + 10.0, 10, NOW);
        c.stop(&mut rl);
        c.stop(&mut rl);
        assert!(!c.is_running());
        assert_eq!(rl.active_count(), 0);
    }

    #[test]
    fn test_restart_supersedes_previous_countdown() {
        let mut rl = RunLoop::new();
        let mut c = ExpirationTimerController::new(TICK);

        c.start(&mut rl, NOW + 10.0, 10, NOW);
        let first = c.handle().unwrap();
        c.start(&mut rl, NOW + 100.0, 100, NOW);
        let second = c.handle().unwrap();

        assert_ne!(first, second);
        assert_eq!(rl.active_count(), 1);
        assert_eq!(c.on_tick(&mut rl, first, NOW + 1.0), TickOutcome::Stale);

        let outcomes = pump(&mut rl, &mut c, NOW + 10.0);
        assert_eq!(outcomes, vec![TickOutcome::Updated(0.9)]);
        assert_eq!(c.countdown().unwrap().initial_duration_seconds(), 100);
    }

    #[test]
    fn test_filled_width() {
        let mut view = ExpirationTimerView::default();
        assert_eq!(view.filled_width(10), 0);
        view.render(1.0);
        assert_eq!(view.filled_width(10), 10);
        view.render(0.01);
        assert_eq!(view.filled_width(10), 1);
        view.render(0.0);
        assert_eq!(view.filled_width(10), 0);
    }
}

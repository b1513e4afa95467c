//! Disappearing-message countdowns and the run loop that ticks them.

pub mod clock;
pub mod expiration;
pub mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use expiration::{ExpirationState, ExpirationTimerController, ExpirationTimerView, TickOutcome};
pub use scheduler::{RunLoop, Scheduler, TickHandle};

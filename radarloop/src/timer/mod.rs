//! Cancelable one-shot and repeating timers.
//!
//! Animation and viewport debouncing schedule work through the [`Scheduler`]
//! trait instead of owning tokio tasks directly. [`TokioScheduler`] runs on a
//! tokio runtime; [`ManualScheduler`] is a virtual clock advanced explicitly,
//! for deterministic tests of timer-driven behavior.

mod manual;
mod runtime;

pub use manual::ManualScheduler;
pub use runtime::TokioScheduler;

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Shortest period or delay a scheduler will use.
pub const MIN_TIMER_PERIOD: Duration = Duration::from_millis(1);

/// Work run once when a timer fires.
pub type OnceTask = Box<dyn FnOnce() + Send + 'static>;

/// Work run on every tick of a repeating timer.
pub type RepeatingTask = Box<dyn FnMut() + Send + 'static>;

/// Source of timers.
pub trait Scheduler: Send + Sync {
    /// Run `task` once after `delay`.
    fn schedule_once(&self, delay: Duration, task: OnceTask) -> TimerHandle;

    /// Run `task` every `period`, first after one full period.
    fn schedule_repeating(&self, period: Duration, task: RepeatingTask) -> TimerHandle;
}

/// Handle to a scheduled timer.
///
/// Dropping the handle does not cancel the timer.
#[derive(Debug, Clone, Default)]
pub struct TimerHandle {
    token: CancellationToken,
}

impl TimerHandle {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Cancel the timer. Safe to call more than once.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns true until the timer is cancelled or a one-shot has fired.
    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }
}

pub(crate) fn clamp_period(period: Duration) -> Duration {
    period.max(MIN_TIMER_PERIOD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_cancel_is_idempotent() {
        let handle = TimerHandle::new(CancellationToken::new());
        assert!(handle.is_active());
        handle.cancel();
        handle.cancel();
        assert!(!handle.is_active());
    }

    #[test]
    fn test_cloned_handles_share_state() {
        let handle = TimerHandle::new(CancellationToken::new());
        let clone = handle.clone();
        clone.cancel();
        assert!(!handle.is_active());
    }

    #[test]
    fn test_clamp_period() {
        assert_eq!(clamp_period(Duration::ZERO), MIN_TIMER_PERIOD);
        assert_eq!(clamp_period(Duration::from_secs(1)), Duration::from_secs(1));
    }
}

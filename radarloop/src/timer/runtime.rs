//! Timers backed by the tokio runtime.

use std::time::Duration;

use tokio::runtime::{Handle, TryCurrentError};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::{clamp_period, OnceTask, RepeatingTask, Scheduler, TimerHandle};

/// Scheduler spawning one tokio task per timer.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Schedule on the given runtime.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Schedule on the runtime the caller is running in.
    pub fn try_current() -> Result<Self, TryCurrentError> {
        Handle::try_current().map(Self::new)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_once(&self, delay: Duration, task: OnceTask) -> TimerHandle {
        let token = CancellationToken::new();
        let timer_token = token.clone();

        self.handle.spawn(async move {
            tokio::select! {
                biased;

                _ = timer_token.cancelled() => {
                    trace!("One-shot timer cancelled");
                }

                _ = tokio::time::sleep(delay) => {
                    timer_token.cancel();
                    task();
                }
            }
        });

        TimerHandle::new(token)
    }

    fn schedule_repeating(&self, period: Duration, mut task: RepeatingTask) -> TimerHandle {
        let period = clamp_period(period);
        let token = CancellationToken::new();
        let timer_token = token.clone();

        self.handle.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;

                    _ = timer_token.cancelled() => {
                        trace!(period_ms = period.as_millis() as u64, "Repeating timer cancelled");
                        break;
                    }

                    _ = interval.tick() => {
                        task();
                    }
                }
            }
        });

        TimerHandle::new(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> usize) {
        let count = Arc::new(AtomicUsize::new(0));
        let read = Arc::clone(&count);
        (count, move || read.load(Ordering::SeqCst))
    }

    #[tokio::test(start_paused = true)]
    async fn test_once_fires_after_delay() {
        let scheduler = TokioScheduler::try_current().unwrap();
        let (count, read) = counter();

        let handle = scheduler.schedule_once(
            Duration::from_millis(600),
            Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }),
        );

        tokio::time::sleep(Duration::from_millis(599)).await;
        assert_eq!(read(), 0);
        assert!(handle.is_active());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(read(), 1);
        assert!(!handle.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_once_never_fires() {
        let scheduler = TokioScheduler::try_current().unwrap();
        let (count, read) = counter();

        let handle = scheduler.schedule_once(
            Duration::from_millis(100),
            Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }),
        );
        handle.cancel();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(read(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeating_ticks_until_cancelled() {
        let scheduler = TokioScheduler::try_current().unwrap();
        let (count, read) = counter();

        let handle = scheduler.schedule_repeating(
            Duration::from_millis(300),
            Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }),
        );

        tokio::time::sleep(Duration::from_millis(950)).await;
        assert_eq!(read(), 3);

        handle.cancel();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(read(), 3);
    }

    #[test]
    fn test_try_current_outside_runtime_fails() {
        assert!(TokioScheduler::try_current().is_err());
    }
}

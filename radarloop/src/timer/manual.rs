//! Virtual-clock scheduler.
//!
//! Time only moves when [`ManualScheduler::advance`] is called. Timers due
//! within the advanced span fire in deadline order, each with the lock
//! released so tasks may schedule or cancel other timers.

use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use super::{clamp_period, OnceTask, RepeatingTask, Scheduler, TimerHandle};

enum Task {
    Once(OnceTask),
    Repeating(Duration, RepeatingTask),
}

struct Timer {
    id: u64,
    due: Duration,
    token: CancellationToken,
    task: Task,
}

#[derive(Default)]
struct State {
    now: Duration,
    next_id: u64,
    timers: Vec<Timer>,
}

/// Scheduler driven by an explicit virtual clock.
#[derive(Default)]
pub struct ManualScheduler {
    state: Mutex<State>,
}

impl ManualScheduler {
    /// Create a scheduler at virtual time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time since creation.
    pub fn now(&self) -> Duration {
        self.state.lock().now
    }

    /// Number of timers that are scheduled and not cancelled.
    pub fn active_timers(&self) -> usize {
        self.state
            .lock()
            .timers
            .iter()
            .filter(|t| !t.token.is_cancelled())
            .count()
    }

    /// Move the clock forward by `by`, firing every timer that comes due.
    pub fn advance(&self, by: Duration) {
        let target = self.state.lock().now + by;

        loop {
            let Some(Timer {
                id,
                due,
                token,
                task,
            }) = self.take_next_due(target)
            else {
                self.state.lock().now = target;
                return;
            };

            match task {
                Task::Once(task) => {
                    token.cancel();
                    task();
                }
                Task::Repeating(period, mut task) => {
                    task();
                    if !token.is_cancelled() {
                        self.state.lock().timers.push(Timer {
                            id,
                            due: due + period,
                            token,
                            task: Task::Repeating(period, task),
                        });
                    }
                }
            }
        }
    }

    fn take_next_due(&self, target: Duration) -> Option<Timer> {
        let mut state = self.state.lock();
        state.timers.retain(|t| !t.token.is_cancelled());

        let index = state
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= target)
            .min_by_key(|(_, t)| (t.due, t.id))
            .map(|(i, _)| i)?;

        let timer = state.timers.swap_remove(index);
        state.now = timer.due;
        Some(timer)
    }

    fn insert(&self, delay: Duration, task: Task) -> TimerHandle {
        let token = CancellationToken::new();
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        let due = state.now + delay;
        state.timers.push(Timer {
            id,
            due,
            token: token.clone(),
            task,
        });
        TimerHandle::new(token)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_once(&self, delay: Duration, task: OnceTask) -> TimerHandle {
        self.insert(delay, Task::Once(task))
    }

    fn schedule_repeating(&self, period: Duration, task: RepeatingTask) -> TimerHandle {
        let period = clamp_period(period);
        self.insert(period, Task::Repeating(period, task))
    }
}

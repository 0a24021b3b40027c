//! Timer-driven frame animation.
//!
//! One repeating timer at `base_unit * speed` advances the playhead by one
//! frame per tick, wrapping at the end of the set. Starting while playing
//! and restarting both guarantee at most one live timer.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::frames::Playhead;
use crate::host::PlaybackObserver;
use crate::timer::{Scheduler, TimerHandle};

/// Interval multiplier unit.
pub const DEFAULT_BASE_UNIT: Duration = Duration::from_millis(100);

/// Default playback speed.
pub const DEFAULT_SPEED: u32 = 3;

/// Slowest speed the UI offers (also the lowest accepted).
pub const MIN_SPEED: u32 = 1;

/// Fastest speed the UI offers.
pub const MAX_SPEED: u32 = 5;

struct Playback {
    speed: u32,
    timer: Option<TimerHandle>,
}

/// Plays the frame set in a loop.
pub struct AnimationScheduler {
    scheduler: Arc<dyn Scheduler>,
    playhead: Arc<dyn Playhead>,
    observer: Arc<dyn PlaybackObserver>,
    base_unit: Duration,
    playback: Mutex<Playback>,
}

impl AnimationScheduler {
    /// Create a stopped animation at the default speed.
    pub fn new(
        scheduler: Arc<dyn Scheduler>,
        playhead: Arc<dyn Playhead>,
        observer: Arc<dyn PlaybackObserver>,
    ) -> Self {
        Self {
            scheduler,
            playhead,
            observer,
            base_unit: DEFAULT_BASE_UNIT,
            playback: Mutex::new(Playback {
                speed: DEFAULT_SPEED,
                timer: None,
            }),
        }
    }

    /// Set the interval unit.
    pub fn with_base_unit(mut self, base_unit: Duration) -> Self {
        self.base_unit = base_unit;
        self
    }

    /// Set the initial speed (clamped to at least 1).
    pub fn with_speed(self, speed: u32) -> Self {
        self.playback.lock().speed = speed.max(MIN_SPEED);
        self
    }

    /// Returns true while the timer is running.
    pub fn is_playing(&self) -> bool {
        self.playback.lock().timer.is_some()
    }

    /// Current speed multiplier.
    pub fn speed(&self) -> u32 {
        self.playback.lock().speed
    }

    /// Time between frames at the current speed.
    pub fn interval(&self) -> Duration {
        self.base_unit * self.speed()
    }

    /// Start playing. Returns false if already playing or there are no frames.
    pub fn start(&self) -> bool {
        let mut playback = self.playback.lock();
        if playback.timer.is_some() {
            return false;
        }
        if self.playhead.frame_count() == 0 {
            debug!("No frames to animate");
            return false;
        }

        let interval = self.base_unit * playback.speed;
        playback.timer = Some(self.schedule_ticks(interval));
        drop(playback);

        debug!(interval_ms = interval.as_millis() as u64, "Animation started");
        self.observer.on_playing(true);
        true
    }

    /// Stop playing. Returns false if already stopped.
    pub fn stop(&self) -> bool {
        let Some(timer) = self.playback.lock().timer.take() else {
            return false;
        };
        timer.cancel();

        debug!("Animation stopped");
        self.observer.on_playing(false);
        true
    }

    /// Start if stopped, stop if playing. Returns the new playing state.
    pub fn toggle(&self) -> bool {
        if self.is_playing() {
            self.stop();
        } else {
            self.start();
        }
        self.is_playing()
    }

    /// Replace the running timer with one at the current speed.
    ///
    /// Does nothing while stopped.
    pub fn restart(&self) {
        let mut playback = self.playback.lock();
        let Some(old) = playback.timer.take() else {
            return;
        };
        old.cancel();

        let interval = self.base_unit * playback.speed;
        playback.timer = Some(self.schedule_ticks(interval));
        trace!(interval_ms = interval.as_millis() as u64, "Animation restarted");
    }

    /// Change speed, applying it immediately if playing.
    pub fn set_speed(&self, speed: u32) {
        self.playback.lock().speed = speed.max(MIN_SPEED);
        self.restart();
    }

    /// Stop and show the frame at `index`. Returns false if out of range.
    pub fn scrub(&self, index: usize) -> bool {
        self.stop();
        self.playhead.apply_frame(index)
    }

    fn schedule_ticks(&self, interval: Duration) -> TimerHandle {
        let playhead = Arc::clone(&self.playhead);
        self.scheduler.schedule_repeating(
            interval,
            Box::new(move || {
                let count = playhead.frame_count();
                if count == 0 {
                    return;
                }
                let next = playhead.cursor().map_or(0, |cursor| (cursor + 1) % count);
                playhead.apply_frame(next);
            }),
        )
    }
}

impl Drop for AnimationScheduler {
    fn drop(&mut self) {
        if let Some(timer) = self.playback.get_mut().timer.take() {
            timer.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::tests::RecordingObserver;
    use crate::timer::ManualScheduler;

    /// Playhead over a fixed number of frames that records applied indices.
    struct CountingPlayhead {
        count: Mutex<usize>,
        cursor: Mutex<Option<usize>>,
        applied: Mutex<Vec<usize>>,
    }

    impl CountingPlayhead {
        fn new(count: usize, cursor: Option<usize>) -> Arc<Self> {
            Arc::new(Self {
                count: Mutex::new(count),
                cursor: Mutex::new(cursor),
                applied: Mutex::new(Vec::new()),
            })
        }

        fn applied(&self) -> Vec<usize> {
            self.applied.lock().clone()
        }
    }

    impl Playhead for CountingPlayhead {
        fn frame_count(&self) -> usize {
            *self.count.lock()
        }
        fn cursor(&self) -> Option<usize> {
            *self.cursor.lock()
        }
        fn apply_frame(&self, index: usize) -> bool {
            if index >= self.frame_count() {
                return false;
            }
            *self.cursor.lock() = Some(index);
            self.applied.lock().push(index);
            true
        }
    }

    fn setup(
        count: usize,
        cursor: Option<usize>,
    ) -> (
        AnimationScheduler,
        Arc<ManualScheduler>,
        Arc<CountingPlayhead>,
        Arc<RecordingObserver>,
    ) {
        let scheduler = Arc::new(ManualScheduler::new());
        let playhead = CountingPlayhead::new(count, cursor);
        let observer = Arc::new(RecordingObserver::default());
        let animation = AnimationScheduler::new(
            scheduler.clone() as Arc<dyn Scheduler>,
            playhead.clone() as Arc<dyn Playhead>,
            observer.clone() as Arc<dyn PlaybackObserver>,
        );
        (animation, scheduler, playhead, observer)
    }

    #[test]
    fn test_wraps_around_with_one_apply_per_tick() {
        let (animation, scheduler, playhead, _) = setup(3, Some(2));
        assert!(animation.start());

        // 300ms per tick at the default speed.
        scheduler.advance(Duration::from_millis(300 * 7));

        assert_eq!(playhead.applied(), vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn test_unknown_cursor_starts_at_first_frame() {
        let (animation, scheduler, playhead, _) = setup(3, None);
        animation.start();
        scheduler.advance(Duration::from_millis(300));
        assert_eq!(playhead.applied(), vec![0]);
    }

    #[test]
    fn test_start_twice_keeps_one_timer() {
        let (animation, scheduler, playhead, observer) = setup(4, Some(0));
        assert!(animation.start());
        assert!(!animation.start());
        assert_eq!(scheduler.active_timers(), 1);

        scheduler.advance(Duration::from_millis(300));
        assert_eq!(playhead.applied(), vec![1]);
        assert_eq!(*observer.playing.lock(), vec![true]);
    }

    #[test]
    fn test_start_without_frames_is_noop() {
        let (animation, scheduler, _, observer) = setup(0, None);
        assert!(!animation.start());
        assert!(!animation.is_playing());
        assert_eq!(scheduler.active_timers(), 0);
        assert!(observer.playing.lock().is_empty());
    }

    #[test]
    fn test_stop_cancels_timer() {
        let (animation, scheduler, playhead, observer) = setup(3, Some(0));
        animation.start();
        assert!(animation.stop());
        assert!(!animation.stop());

        scheduler.advance(Duration::from_secs(5));
        assert!(playhead.applied().is_empty());
        assert_eq!(scheduler.active_timers(), 0);
        assert_eq!(*observer.playing.lock(), vec![true, false]);
    }

    #[test]
    fn test_set_speed_restarts_with_new_interval() {
        let (animation, scheduler, playhead, _) = setup(10, Some(0));
        animation.start();
        animation.set_speed(1);

        assert_eq!(scheduler.active_timers(), 1);
        assert_eq!(animation.interval(), Duration::from_millis(100));

        scheduler.advance(Duration::from_millis(500));
        assert_eq!(playhead.applied(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_set_speed_while_stopped_does_not_start() {
        let (animation, scheduler, _, _) = setup(3, Some(0));
        animation.set_speed(5);
        assert!(!animation.is_playing());
        assert_eq!(scheduler.active_timers(), 0);
        assert_eq!(animation.interval(), Duration::from_millis(500));
    }

    #[test]
    fn test_speed_is_clamped() {
        let (animation, _, _, _) = setup(3, Some(0));
        animation.set_speed(0);
        assert_eq!(animation.speed(), 1);
    }

    #[test]
    fn test_scrub_stops_and_applies() {
        let (animation, scheduler, playhead, _) = setup(5, Some(0));
        animation.start();

        assert!(animation.scrub(3));
        assert!(!animation.is_playing());
        assert!(!animation.scrub(9));

        scheduler.advance(Duration::from_secs(1));
        assert_eq!(playhead.applied(), vec![3]);
    }

    #[test]
    fn test_tick_on_emptied_set_does_nothing() {
        let (animation, scheduler, playhead, _) = setup(2, Some(0));
        animation.start();
        *playhead.count.lock() = 0;

        scheduler.advance(Duration::from_secs(1));
        assert!(playhead.applied().is_empty());
    }

    #[test]
    fn test_toggle() {
        let (animation, _, _, _) = setup(2, Some(0));
        assert!(animation.toggle());
        assert!(!animation.toggle());
    }

    #[test]
    fn test_drop_cancels_timer() {
        let (animation, scheduler, _, _) = setup(2, Some(0));
        animation.start();
        drop(animation);
        assert_eq!(scheduler.active_timers(), 0);
    }
}

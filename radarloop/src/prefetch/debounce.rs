//! Re-prefetch the frame set after the viewport settles.
//!
//! Every stationary event restarts a short timer. When it fires, the whole
//! current frame set is prefetched for the new viewport unless a pass is
//! already running or the viewport has not changed since the last pass.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tracing::{debug, trace};

use crate::frames::FrameSetManager;
use crate::host::{MapHost, PlaybackObserver};
use crate::provider::AsyncHttpClient;
use crate::timer::{Scheduler, TimerHandle};

use super::scheduler::{FramePrefetcher, PrefetchReport};

/// Default quiet period after the last stationary event.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(600);

/// Status shown when a viewport change triggers a prefetch pass.
pub const STATUS_EXTENT_PREFETCH: &str = "Status: prefetching frames for new extent...";

/// What a debounced evaluation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtentCheck {
    /// The viewport has no extent yet.
    NotReady,
    /// Another pass is still running.
    InFlight,
    /// Same viewport as the previous pass.
    Unchanged,
    /// A pass ran for the new viewport.
    Prefetched(PrefetchReport),
}

/// Clears the in-flight flag when the pass ends, however it ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Debounces viewport changes into prefetch passes.
pub struct ExtentDebouncer<C> {
    prefetcher: Arc<FramePrefetcher<C>>,
    host: Arc<dyn MapHost>,
    frames: Arc<FrameSetManager>,
    observer: Arc<dyn PlaybackObserver>,
    scheduler: Arc<dyn Scheduler>,
    runtime: Handle,
    delay: Duration,
    in_flight: AtomicBool,
    previous_key: Mutex<Option<String>>,
    pending: Mutex<Option<TimerHandle>>,
}

impl<C: AsyncHttpClient + 'static> ExtentDebouncer<C> {
    /// Create a debouncer running passes on `runtime`.
    pub fn new(
        prefetcher: Arc<FramePrefetcher<C>>,
        host: Arc<dyn MapHost>,
        frames: Arc<FrameSetManager>,
        observer: Arc<dyn PlaybackObserver>,
        scheduler: Arc<dyn Scheduler>,
        runtime: Handle,
        delay: Duration,
    ) -> Self {
        Self {
            prefetcher,
            host,
            frames,
            observer,
            scheduler,
            runtime,
            delay,
            in_flight: AtomicBool::new(false),
            previous_key: Mutex::new(None),
            pending: Mutex::new(None),
        }
    }

    /// Quiet period before a pass is evaluated.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Returns true while a prefetch pass is running.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Viewport key of the last pass.
    pub fn previous_key(&self) -> Option<String> {
        self.previous_key.lock().clone()
    }

    /// Record the viewport a pass already covered, e.g. the initial prefetch.
    pub fn set_previous_key(&self, key: impl Into<String>) {
        *self.previous_key.lock() = Some(key.into());
    }

    /// Returns true if a debounce timer is waiting to fire.
    pub fn has_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(TimerHandle::is_active)
    }

    /// Handle a viewport-stationary event by (re)starting the debounce timer.
    pub fn notify_stationary(self: &Arc<Self>) {
        let weak: Weak<Self> = Arc::downgrade(self);
        let timer = self.scheduler.schedule_once(
            self.delay,
            Box::new(move || {
                if let Some(debouncer) = weak.upgrade() {
                    let runtime = debouncer.runtime.clone();
                    runtime.spawn(async move {
                        debouncer.evaluate().await;
                    });
                }
            }),
        );

        if let Some(previous) = self.pending.lock().replace(timer) {
            previous.cancel();
            trace!("Debounce timer restarted");
        }
    }

    /// Cancel a waiting debounce timer.
    pub fn cancel_pending(&self) {
        if let Some(timer) = self.pending.lock().take() {
            timer.cancel();
        }
    }

    /// Prefetch the current frame set if the viewport changed.
    pub async fn evaluate(&self) -> ExtentCheck {
        let viewport = self.host.viewport();
        let key = viewport.key();
        if key.is_empty() {
            trace!("Viewport has no extent, skipping prefetch");
            return ExtentCheck::NotReady;
        }
        if self.is_in_flight() {
            debug!("Prefetch pass already running, skipping");
            return ExtentCheck::InFlight;
        }
        if self.previous_key.lock().as_deref() == Some(key.as_str()) {
            trace!(key = %key, "Viewport unchanged, skipping prefetch");
            return ExtentCheck::Unchanged;
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return ExtentCheck::InFlight;
        }
        let _guard = InFlightGuard(&self.in_flight);
        *self.previous_key.lock() = Some(key.clone());

        self.observer.on_status(STATUS_EXTENT_PREFETCH);
        let frames = self.frames.current();
        debug!(key = %key, frames = frames.len(), "Prefetching frames for new extent");

        let report = self
            .prefetcher
            .prefetch(&frames, &viewport, self.observer.as_ref())
            .await;
        ExtentCheck::Prefetched(report)
    }
}

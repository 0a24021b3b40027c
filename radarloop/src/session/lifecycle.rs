//! The session facade.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::animation::AnimationScheduler;
use crate::capabilities::fetch_capabilities;
use crate::frames::{FrameSet, FrameSetManager, Playhead};
use crate::host::{
    wait_for_viewport_ready, LayerSpec, MapHost, PlaybackObserver, SubscriptionId,
    VIEWPORT_POLL_INTERVAL,
};
use crate::prefetch::{ExtentDebouncer, FramePrefetcher, PrefetchReport};
use crate::provider::AsyncHttpClient;
use crate::refresh::{frames_available_status, RefreshLoop, RefreshOutcome};
use crate::timer::Scheduler;

use super::config::SessionConfig;
use super::presenter::FramePresenter;
use super::{
    InitOutcome, SessionError, FALLBACK_LAYER_ID, LAYER_OPACITY, RADAR_LAYER_ID,
    STATUS_FALLBACK_ADDED, STATUS_LATEST_ONLY, STATUS_LAYER_ADDED, STATUS_LAYER_ERROR,
    STATUS_LOADING,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Created,
    Initializing,
    Running(InitOutcome),
    TornDown,
}

/// Handles released on teardown.
#[derive(Default)]
struct Handles {
    subscription: Option<SubscriptionId>,
    initial_prefetch: Option<JoinHandle<PrefetchReport>>,
    refresh: Option<JoinHandle<()>>,
}

/// One animated radar layer on a host map.
pub struct RadarSession<C: AsyncHttpClient + 'static> {
    config: SessionConfig,
    client: Arc<C>,
    host: Arc<dyn MapHost>,
    observer: Arc<dyn PlaybackObserver>,
    runtime: Handle,
    frames: Arc<FrameSetManager>,
    presenter: Arc<FramePresenter>,
    animation: AnimationScheduler,
    prefetcher: Arc<FramePrefetcher<C>>,
    debouncer: Arc<ExtentDebouncer<C>>,
    refresh: Arc<RefreshLoop<C>>,
    shutdown: CancellationToken,
    phase: Mutex<Phase>,
    handles: Mutex<Handles>,
}

impl<C: AsyncHttpClient + 'static> RadarSession<C> {
    /// Wire a session. Nothing touches the host until [`initialize`](Self::initialize).
    ///
    /// Background work (prefetch passes, the refresh loop) is spawned on `runtime`.
    pub fn new(
        config: SessionConfig,
        client: Arc<C>,
        host: Arc<dyn MapHost>,
        observer: Arc<dyn PlaybackObserver>,
        scheduler: Arc<dyn Scheduler>,
        runtime: Handle,
    ) -> Self {
        let frames = Arc::new(FrameSetManager::new(config.max_frames));
        let presenter = Arc::new(FramePresenter::new(
            Arc::clone(&host),
            RADAR_LAYER_ID,
            Arc::clone(&frames),
            Arc::clone(&observer),
        ));
        let playhead: Arc<dyn Playhead> = presenter.clone();

        let animation = AnimationScheduler::new(
            Arc::clone(&scheduler),
            Arc::clone(&playhead),
            Arc::clone(&observer),
        )
        .with_base_unit(config.base_unit)
        .with_speed(config.speed);

        let prefetcher = Arc::new(FramePrefetcher::new(
            Arc::clone(&client),
            config.source.wms_url.clone(),
            config.source.layer.clone(),
        ));

        let debouncer = Arc::new(ExtentDebouncer::new(
            Arc::clone(&prefetcher),
            Arc::clone(&host),
            Arc::clone(&frames),
            Arc::clone(&observer),
            scheduler,
            runtime.clone(),
            config.debounce,
        ));

        let refresh = Arc::new(
            RefreshLoop::new(
                Arc::clone(&client),
                config.source.wms_url.clone(),
                config.source.layer.clone(),
                Arc::clone(&frames),
                playhead,
                Arc::clone(&prefetcher),
                Arc::clone(&host),
                Arc::clone(&observer),
            )
            .with_interval(config.refresh_interval),
        );

        Self {
            config,
            client,
            host,
            observer,
            runtime,
            frames,
            presenter,
            animation,
            prefetcher,
            debouncer,
            refresh,
            shutdown: CancellationToken::new(),
            phase: Mutex::new(Phase::Created),
            handles: Mutex::new(Handles::default()),
        }
    }

    /// Settings the session was built with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Discover frames and put the radar layer on the map.
    ///
    /// On success with frames, the newest frame is shown and the initial
    /// prefetch, viewport watch and refresh loop are running. Playback does
    /// not start until [`play`](Self::play).
    pub async fn initialize(&self) -> Result<InitOutcome, SessionError> {
        {
            let mut phase = self.phase.lock();
            match *phase {
                Phase::Created => *phase = Phase::Initializing,
                Phase::TornDown => return Err(SessionError::TornDown),
                Phase::Initializing | Phase::Running(_) => {
                    return Err(SessionError::AlreadyInitialized)
                }
            }
        }

        let result = self.bring_up().await;

        let mut phase = self.phase.lock();
        match (*phase, &result) {
            (Phase::TornDown, _) => {
                drop(phase);
                // Torn down while initializing
                self.release();
                return Err(SessionError::TornDown);
            }
            (_, Ok(outcome)) => *phase = Phase::Running(*outcome),
            (_, Err(_)) => *phase = Phase::Created,
        }
        result
    }

    async fn bring_up(&self) -> Result<InitOutcome, SessionError> {
        self.observer.on_status(STATUS_LOADING);
        let source = &self.config.source;

        let times = match fetch_capabilities(
            self.client.as_ref(),
            &source.wms_url,
            &source.layer,
            self.config.max_frames,
        )
        .await
        {
            Ok(times) => times,
            Err(e) => {
                warn!(url = %source.wms_url, error = %e, "WMS service unusable, adding fallback layer");
                return self.add_fallback();
            }
        };

        let layer = LayerSpec::TimeAnimated {
            id: RADAR_LAYER_ID.to_string(),
            url: source.wms_url.clone(),
            layer: source.layer.clone(),
            title: source.title.clone(),
            opacity: LAYER_OPACITY,
        };
        if let Err(e) = self.host.add_layer(layer, self.placement_position()) {
            warn!(error = %e, "Host rejected WMS layer, adding fallback layer");
            return self.add_fallback();
        }
        self.observer.on_status(STATUS_LAYER_ADDED);

        if times.is_empty() {
            info!(layer = %source.layer, "No time dimension advertised, showing latest image");
            self.observer.on_status(STATUS_LATEST_ONLY);
            return Ok(InitOutcome::LatestOnly);
        }

        let merge = self.frames.merge(&times, None);
        let count = merge.frames.len();
        self.observer.on_frame_count(count);
        self.observer
            .on_status(&frames_available_status(count, false));
        if let Some(last) = merge.frames.last_index() {
            self.presenter.apply_frame(last);
        }

        self.watch_viewport();
        self.spawn_initial_prefetch(merge.frames);
        self.spawn_refresh();

        info!(frames = count, layer = %source.layer, "Radar session initialized");
        Ok(InitOutcome::Animated { frames: count })
    }

    fn add_fallback(&self) -> Result<InitOutcome, SessionError> {
        self.observer.on_status(STATUS_LAYER_ERROR);
        let layer = LayerSpec::Fallback {
            id: FALLBACK_LAYER_ID.to_string(),
            url: self.config.fallback_url.clone(),
            opacity: LAYER_OPACITY,
        };
        self.host.add_layer(layer, self.placement_position())?;
        self.observer.on_status(STATUS_FALLBACK_ADDED);
        Ok(InitOutcome::Fallback)
    }

    /// Insertion index just above the placement layer.
    fn placement_position(&self) -> Option<usize> {
        let placement = self.config.placement_layer.as_deref()?;
        match self.host.layer_position(placement) {
            Some(index) => Some(index + 1),
            None => {
                debug!(layer = placement, "Placement layer not on map, appending");
                None
            }
        }
    }

    fn watch_viewport(&self) {
        let debouncer = Arc::downgrade(&self.debouncer);
        let id = self.host.subscribe_stationary(Box::new(move || {
            if let Some(debouncer) = debouncer.upgrade() {
                debouncer.notify_stationary();
            }
        }));
        self.handles.lock().subscription = Some(id);
    }

    fn spawn_initial_prefetch(&self, frames: FrameSet) {
        let host = Arc::clone(&self.host);
        let prefetcher = Arc::clone(&self.prefetcher);
        let observer = Arc::clone(&self.observer);
        let timeout = self.config.viewport_timeout;

        let task = self.runtime.spawn(async move {
            wait_for_viewport_ready(host.as_ref(), timeout, VIEWPORT_POLL_INTERVAL).await;
            let viewport = host.viewport();
            prefetcher
                .prefetch(&frames, &viewport, observer.as_ref())
                .await
        });
        self.handles.lock().initial_prefetch = Some(task);
    }

    fn spawn_refresh(&self) {
        let task = self
            .runtime
            .spawn(Arc::clone(&self.refresh).run(self.shutdown.clone()));
        self.handles.lock().refresh = Some(task);
    }

    /// Wait for the initial prefetch pass and return its report.
    ///
    /// Returns `None` if no pass was started, it was already awaited, or it
    /// was aborted by teardown.
    pub async fn wait_initial_prefetch(&self) -> Option<PrefetchReport> {
        let task = self.handles.lock().initial_prefetch.take()?;
        task.await.ok()
    }

    /// Run one refresh pass now, outside the interval.
    pub async fn refresh_now(&self) -> RefreshOutcome {
        self.refresh.tick().await
    }

    /// How initialization ended, once it has.
    pub fn outcome(&self) -> Option<InitOutcome> {
        match *self.phase.lock() {
            Phase::Running(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Returns true after [`teardown`](Self::teardown).
    pub fn is_torn_down(&self) -> bool {
        *self.phase.lock() == Phase::TornDown
    }

    /// Current frame set.
    pub fn frames(&self) -> FrameSet {
        self.frames.current()
    }

    /// Index of the displayed frame.
    pub fn cursor(&self) -> Option<usize> {
        self.presenter.cursor()
    }

    /// Time identifier of the displayed frame.
    pub fn current_time(&self) -> Option<String> {
        self.presenter.current_time()
    }

    pub fn is_playing(&self) -> bool {
        self.animation.is_playing()
    }

    pub fn speed(&self) -> u32 {
        self.animation.speed()
    }

    /// Start playback. Returns false if already playing, torn down or empty.
    pub fn play(&self) -> bool {
        if self.is_torn_down() {
            return false;
        }
        self.animation.start()
    }

    /// Pause playback. Returns false if not playing.
    pub fn pause(&self) -> bool {
        self.animation.stop()
    }

    /// Toggle playback and return the new playing state.
    pub fn toggle_play(&self) -> bool {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
        self.is_playing()
    }

    /// Pause and show the frame at `index`.
    pub fn scrub(&self, index: usize) -> bool {
        if self.is_torn_down() {
            return false;
        }
        self.animation.scrub(index)
    }

    /// Change playback speed; a running animation picks it up immediately.
    pub fn set_speed(&self, speed: u32) {
        self.animation.set_speed(speed);
    }

    /// Stop every timer, task and subscription the session owns.
    ///
    /// Layers stay on the map. Calling this again does nothing.
    pub fn teardown(&self) {
        {
            let mut phase = self.phase.lock();
            if *phase == Phase::TornDown {
                return;
            }
            *phase = Phase::TornDown;
        }
        self.release();
        info!("Radar session torn down");
    }

    fn release(&self) {
        self.animation.stop();
        self.shutdown.cancel();
        self.debouncer.cancel_pending();

        let mut handles = self.handles.lock();
        if let Some(id) = handles.subscription.take() {
            self.host.unsubscribe(id);
        }
        if let Some(task) = handles.initial_prefetch.take() {
            task.abort();
        }
        // The loop exits on the cancelled token.
        handles.refresh.take();
    }
}

impl<C: AsyncHttpClient + 'static> Drop for RadarSession<C> {
    fn drop(&mut self) {
        self.teardown();
    }
}

//! Periodic frame discovery.
//!
//! Every refresh interval the capabilities document is fetched again and
//! merged into the frame set. Newly published frames are prefetched, and a
//! viewer watching the newest frame is moved to the new newest frame.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::capabilities::fetch_capabilities;
use crate::frames::{FrameSetManager, Playhead};
use crate::host::{MapHost, PlaybackObserver};
use crate::prefetch::{FramePrefetcher, PrefetchReport};
use crate::provider::AsyncHttpClient;

/// Default time between discovery passes (4 minutes).
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(240);

/// Status line announcing the frame count.
pub fn frames_available_status(count: usize, updated: bool) -> String {
    if updated {
        format!("Status: {} time frames available (updated)", count)
    } else {
        format!("Status: {} time frames available", count)
    }
}

/// Result of one refresh pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Discovery failed; nothing changed.
    Failed,
    /// The server advertised no times; nothing changed.
    Empty,
    /// No new frames.
    Unchanged,
    /// New frames were merged and prefetched.
    Updated {
        added: usize,
        followed_live: bool,
        prefetch: PrefetchReport,
    },
}

/// Rediscovers frames on a fixed interval.
pub struct RefreshLoop<C> {
    client: Arc<C>,
    wms_base: String,
    layer: String,
    frames: Arc<FrameSetManager>,
    playhead: Arc<dyn Playhead>,
    prefetcher: Arc<FramePrefetcher<C>>,
    host: Arc<dyn MapHost>,
    observer: Arc<dyn PlaybackObserver>,
    interval: Duration,
}

impl<C: AsyncHttpClient + 'static> RefreshLoop<C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        client: Arc<C>,
        wms_base: impl Into<String>,
        layer: impl Into<String>,
        frames: Arc<FrameSetManager>,
        playhead: Arc<dyn Playhead>,
        prefetcher: Arc<FramePrefetcher<C>>,
        host: Arc<dyn MapHost>,
        observer: Arc<dyn PlaybackObserver>,
    ) -> Self {
        Self {
            client,
            wms_base: wms_base.into(),
            layer: layer.into(),
            frames,
            playhead,
            prefetcher,
            host,
            observer,
            interval: DEFAULT_REFRESH_INTERVAL,
        }
    }

    /// Sets a custom refresh interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Time between passes.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one discovery pass.
    pub async fn tick(&self) -> RefreshOutcome {
        let times = match fetch_capabilities(
            self.client.as_ref(),
            &self.wms_base,
            &self.layer,
            self.frames.max_frames(),
        )
        .await
        {
            Ok(times) => times,
            Err(e) => {
                warn!(error = %e, "Frame refresh failed");
                return RefreshOutcome::Failed;
            }
        };

        if times.is_empty() {
            debug!("Refresh found no times");
            return RefreshOutcome::Empty;
        }

        let outcome = self.frames.merge(&times, self.playhead.cursor());
        if !outcome.changed() {
            debug!("Refresh found no new frames");
            return RefreshOutcome::Unchanged;
        }

        let count = outcome.frames.len();
        self.observer.on_frame_count(count);
        if outcome.cursor_should_advance {
            if let Some(cursor) = outcome.cursor {
                self.playhead.apply_frame(cursor);
            }
        }
        self.observer
            .on_status(&frames_available_status(count, true));

        info!(
            added = outcome.newly_added.len(),
            frames = count,
            "New radar frames discovered"
        );

        let viewport = self.host.viewport();
        let prefetch = self
            .prefetcher
            .prefetch(&outcome.newly_added, &viewport, self.observer.as_ref())
            .await;

        RefreshOutcome::Updated {
            added: outcome.newly_added.len(),
            followed_live: outcome.cursor_should_advance,
            prefetch,
        }
    }

    /// Tick every interval until `shutdown` is cancelled.
    ///
    /// The first pass runs one full interval after the call.
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            layer = %self.layer,
            "Frame refresh loop starting"
        );

        let mut interval = tokio::time::interval(self.interval);
        // Skip the first immediate tick
        interval.tick().await;

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Frame refresh loop shutting down");
                    break;
                }

                _ = interval.tick() => {
                    self.tick().await;
                }
            }
        }
    }

    /// Spawn [`run`](Self::run) on the current runtime.
    pub fn spawn(self: &Arc<Self>, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(Arc::clone(self).run(shutdown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::tests::{HostCall, RecordingHost, RecordingObserver};
    use crate::provider::{HttpResponse, ProviderError, ScriptedHttpClient};
    use parking_lot::Mutex;

    const BASE: &str = "https://nowcoast.noaa.gov/geoserver/observations/weather_radar/ows";

    fn caps(times: &str) -> HttpResponse {
        HttpResponse::ok(format!(
            r#"<WMS_Capabilities xmlns="http://www.opengis.net/wms"><Capability>
            <Layer><Name>radar</Name><Dimension name="time">{times}</Dimension></Layer>
            </Capability></WMS_Capabilities>"#
        ))
    }

    /// Playhead that shows frames on the recording host.
    struct HostPlayhead {
        frames: Arc<FrameSetManager>,
        host: Arc<RecordingHost>,
        cursor: Mutex<Option<usize>>,
    }

    impl Playhead for HostPlayhead {
        fn frame_count(&self) -> usize {
            self.frames.len()
        }
        fn cursor(&self) -> Option<usize> {
            *self.cursor.lock()
        }
        fn apply_frame(&self, index: usize) -> bool {
            let frames = self.frames.current();
            let Some(time) = frames.get(index) else {
                return false;
            };
            let _ = self.host.set_time_parameter("radar", time);
            *self.cursor.lock() = Some(index);
            true
        }
    }

    struct Fixture {
        refresh: Arc<RefreshLoop<ScriptedHttpClient>>,
        client: Arc<ScriptedHttpClient>,
        host: Arc<RecordingHost>,
        playhead: Arc<HostPlayhead>,
        observer: Arc<RecordingObserver>,
    }

    fn fixture(max_frames: usize) -> Fixture {
        let client = Arc::new(ScriptedHttpClient::new());
        let host = Arc::new(RecordingHost::ready());
        let frames = Arc::new(FrameSetManager::new(max_frames));
        let observer = Arc::new(RecordingObserver::default());
        let playhead = Arc::new(HostPlayhead {
            frames: frames.clone(),
            host: host.clone(),
            cursor: Mutex::new(None),
        });
        let prefetcher = Arc::new(FramePrefetcher::new(client.clone(), BASE, "radar"));

        let refresh = Arc::new(RefreshLoop::new(
            client.clone(),
            BASE,
            "radar",
            frames,
            playhead.clone() as Arc<dyn Playhead>,
            prefetcher,
            host.clone() as Arc<dyn MapHost>,
            observer.clone() as Arc<dyn PlaybackObserver>,
        ));

        Fixture {
            refresh,
            client,
            host,
            playhead,
            observer,
        }
    }

    fn script_caps(client: &ScriptedHttpClient, times: &str) {
        client.clear_rules();
        client.add_rule("GetCapabilities", Ok(caps(times)));
    }

    #[tokio::test]
    async fn test_first_tick_populates_and_follows_live() {
        let f = fixture(30);
        script_caps(&f.client, "t1,t2,t3");

        let outcome = f.refresh.tick().await;

        assert!(matches!(
            outcome,
            RefreshOutcome::Updated { added: 3, followed_live: true, .. }
        ));
        assert_eq!(f.playhead.cursor(), Some(2));
        assert_eq!(f.host.time_updates(), vec!["t3"]);
        assert!(f
            .observer
            .statuses()
            .contains(&"Status: 3 time frames available (updated)".to_string()));
    }

    #[tokio::test]
    async fn test_unchanged_tick_does_nothing() {
        let f = fixture(30);
        script_caps(&f.client, "t1,t2");
        f.refresh.tick().await;
        let calls = f.host.calls().len();

        assert_eq!(f.refresh.tick().await, RefreshOutcome::Unchanged);
        assert_eq!(f.host.calls().len(), calls);
    }

    #[tokio::test]
    async fn test_only_new_frames_are_prefetched() {
        let f = fixture(30);
        script_caps(&f.client, "t1,t2");
        f.refresh.tick().await;

        script_caps(&f.client, "t1,t2,t3");
        let before = f.client.request_count();
        let outcome = f.refresh.tick().await;

        // One capabilities request plus one GetMap for t3.
        assert_eq!(f.client.request_count() - before, 2);
        assert!(f.client.requests().last().unwrap().contains("time=t3"));
        assert!(matches!(outcome, RefreshOutcome::Updated { added: 1, .. }));
    }

    #[tokio::test]
    async fn test_cursor_in_history_is_kept() {
        let f = fixture(30);
        script_caps(&f.client, "t1,t2,t3");
        f.refresh.tick().await;
        f.playhead.apply_frame(0);

        script_caps(&f.client, "t1,t2,t3,t4");
        let outcome = f.refresh.tick().await;

        assert!(matches!(
            outcome,
            RefreshOutcome::Updated { followed_live: false, .. }
        ));
        assert_eq!(f.playhead.cursor(), Some(0));
    }

    #[tokio::test]
    async fn test_discovery_failure_is_noop() {
        let f = fixture(30);
        f.client
            .set_default(Err(ProviderError::HttpError("offline".to_string())));

        assert_eq!(f.refresh.tick().await, RefreshOutcome::Failed);
        assert!(f.observer.statuses().is_empty());
        assert!(f.host.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_discovery_is_noop() {
        let f = fixture(30);
        script_caps(&f.client, "");
        assert_eq!(f.refresh.tick().await, RefreshOutcome::Empty);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ticks_on_interval_until_cancelled() {
        let f = fixture(30);
        script_caps(&f.client, "t1");
        assert_eq!(f.refresh.interval(), DEFAULT_REFRESH_INTERVAL);
        let shutdown = CancellationToken::new();
        let handle = f.refresh.spawn(shutdown.clone());

        tokio::time::sleep(Duration::from_secs(239)).await;
        assert_eq!(f.client.request_count(), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(f.client.request_count() >= 1);
        assert!(f.host.calls().contains(&HostCall::SetTime("radar".into(), "t1".into())));

        shutdown.cancel();
        handle.await.unwrap();
        let count = f.client.request_count();
        tokio::time::sleep(Duration::from_secs(1000)).await;
        assert_eq!(f.client.request_count(), count);
    }
}

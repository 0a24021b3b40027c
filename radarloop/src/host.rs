//! Host map and UI collaborator traits.
//!
//! The session never reaches for a global map view. The embedding
//! application supplies a [`MapHost`] for layers and viewport, and a
//! [`PlaybackObserver`] for everything the UI displays.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::wms::Viewport;

/// Default time to wait for the map to report a usable viewport.
pub const DEFAULT_VIEWPORT_TIMEOUT: Duration = Duration::from_secs(15);

/// Poll interval while waiting for the viewport.
pub const VIEWPORT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Errors reported by the host map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// No layer with this id exists
    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    /// The host refused the operation
    #[error("Host rejected operation: {0}")]
    Rejected(String),
}

/// Identifies a stationary-event subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Callback invoked when the viewport stops moving.
pub type StationaryCallback = Box<dyn Fn() + Send + Sync + 'static>;

/// A layer the session asks the host to display.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerSpec {
    /// WMS layer whose `TIME` parameter is driven by playback.
    TimeAnimated {
        id: String,
        url: String,
        layer: String,
        title: String,
        opacity: f32,
    },
    /// Static map-image layer shown when the WMS service is unusable.
    Fallback {
        id: String,
        url: String,
        opacity: f32,
    },
}

impl LayerSpec {
    /// Layer id.
    pub fn id(&self) -> &str {
        match self {
            LayerSpec::TimeAnimated { id, .. } | LayerSpec::Fallback { id, .. } => id,
        }
    }
}

/// The map the radar layer is shown on.
pub trait MapHost: Send + Sync {
    /// Current viewport; the extent is `None` until the map has laid out.
    fn viewport(&self) -> Viewport;

    /// Add a layer at `position` in the layer list, or on top when `None`.
    fn add_layer(&self, layer: LayerSpec, position: Option<usize>) -> Result<(), HostError>;

    /// Remove a layer.
    fn remove_layer(&self, id: &str) -> Result<(), HostError>;

    /// Position of a layer in the layer list.
    fn layer_position(&self, id: &str) -> Option<usize>;

    /// Set the `TIME` custom parameter of a layer.
    fn set_time_parameter(&self, id: &str, time: &str) -> Result<(), HostError>;

    /// Ask a layer to redraw.
    fn refresh_layer(&self, id: &str) -> Result<(), HostError>;

    /// Register for viewport-stationary events.
    fn subscribe_stationary(&self, callback: StationaryCallback) -> SubscriptionId;

    /// Drop a stationary-event subscription.
    fn unsubscribe(&self, id: SubscriptionId);
}

/// Receives UI state changes from the session.
///
/// Every method defaults to doing nothing.
pub trait PlaybackObserver: Send + Sync {
    /// Status line text.
    fn on_status(&self, _status: &str) {}

    /// Raw time identifier of the displayed frame.
    fn on_timestamp(&self, _timestamp: &str) {}

    /// Cursor (slider position) of the displayed frame.
    fn on_cursor(&self, _index: usize) {}

    /// Playback started or stopped.
    fn on_playing(&self, _playing: bool) {}

    /// Number of frames changed (slider maximum is `count - 1`).
    fn on_frame_count(&self, _count: usize) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl PlaybackObserver for NullObserver {}

/// Wait until the host reports a ready viewport, for at most `timeout`.
///
/// Returns false if the timeout elapsed first; callers proceed anyway.
pub async fn wait_for_viewport_ready<H: MapHost + ?Sized>(
    host: &H,
    timeout: Duration,
    poll: Duration,
) -> bool {
    let start = tokio::time::Instant::now();

    loop {
        if host.viewport().is_ready() {
            debug!(waited_ms = start.elapsed().as_millis() as u64, "Viewport ready");
            return true;
        }
        if start.elapsed() >= timeout {
            warn!(
                timeout_secs = timeout.as_secs(),
                "Viewport not ready, continuing without it"
            );
            return false;
        }
        tokio::time::sleep(poll).await;
    }
}

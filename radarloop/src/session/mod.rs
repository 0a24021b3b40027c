//! Radar session composition.
//!
//! [`RadarSession`] owns one radar layer on a host map for its whole life:
//!
//! ```text
//! initialize ─→ capabilities ─┬─ error ──────────→ fallback image layer
//!                             ├─ no times ───────→ latest-only WMS layer
//!                             └─ frames ─→ WMS layer + last frame shown
//!                                            ├─ initial prefetch (after viewport wait)
//!                                            ├─ stationary → ExtentDebouncer
//!                                            └─ RefreshLoop every interval
//! ```
//!
//! Playback is driven by [`AnimationScheduler`](crate::animation::AnimationScheduler)
//! through the session's [`FramePresenter`]. [`RadarSession::teardown`]
//! releases every timer, task and subscription and is safe to call twice.

mod config;
mod lifecycle;
mod presenter;

use thiserror::Error;

use crate::host::HostError;

pub use config::{
    RadarSource, RadarType, SessionConfig, DEFAULT_FALLBACK_URL, NCEP_CONUS_LAYER,
    NCEP_CONUS_WMS_URL, NOWCOAST_LAYER, NOWCOAST_WMS_URL,
};
pub use lifecycle::RadarSession;
pub use presenter::FramePresenter;

/// Id of the time-animated WMS layer.
pub const RADAR_LAYER_ID: &str = "radar-wms";

/// Id of the fallback map-image layer.
pub const FALLBACK_LAYER_ID: &str = "nowcoast-radar";

/// Opacity of either radar layer.
pub const LAYER_OPACITY: f32 = 0.75;

pub const STATUS_LOADING: &str = "Status: loading...";
pub const STATUS_LAYER_ADDED: &str = "Status: WMS layer added";
pub const STATUS_LATEST_ONLY: &str = "Status: WMS layer (latest) added";
pub const STATUS_LAYER_ERROR: &str = "Status: WMS layer error or not accessible";
pub const STATUS_FALLBACK_ADDED: &str = "Status: nowCOAST MapImageLayer added as fallback";

/// Errors from session lifecycle operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The host refused even the fallback layer
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    /// `initialize` was already called
    #[error("Session already initialized")]
    AlreadyInitialized,

    /// The session was torn down
    #[error("Session has been torn down")]
    TornDown,
}

/// How initialization ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// Frames were discovered and the animation machinery is running.
    Animated { frames: usize },
    /// The service advertised no times; the layer shows its default (latest) image.
    LatestOnly,
    /// The service was unusable; the static fallback layer was added.
    Fallback,
}

impl InitOutcome {
    /// Returns true when frames can be played.
    pub fn is_animated(&self) -> bool {
        matches!(self, InitOutcome::Animated { .. })
    }
}

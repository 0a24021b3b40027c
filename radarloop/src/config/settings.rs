//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;

use crate::session::RadarType;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Radar service settings
    pub radar: RadarSettings,
    /// Frame window settings
    pub frames: FramesSettings,
    /// Background discovery settings
    pub refresh: RefreshSettings,
    /// Playback settings
    pub animation: AnimationSettings,
    /// Viewport prefetch settings
    pub prefetch: PrefetchSettings,
    /// Frame cache settings
    pub cache: CacheSettings,
    /// Download settings
    pub download: DownloadSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Radar service configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarSettings {
    /// Built-in product or "custom"
    pub radar_type: RadarType,
    /// WMS endpoint; required for "custom", overrides the preset otherwise
    pub wms_url: Option<String>,
    /// WMS layer name; required for "custom", overrides the preset otherwise
    pub layer: Option<String>,
    /// Map-image service shown when the WMS service is unusable
    pub fallback_url: String,
    /// Host layer the radar layer is inserted above
    pub placement_layer: Option<String>,
}

/// Frame window configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct FramesSettings {
    /// Newest frames kept for animation.
    pub max_frames: usize,
}

/// Refresh loop configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshSettings {
    /// Seconds between discovery passes.
    pub interval_secs: u64,
}

/// Animation configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSettings {
    /// Frame interval unit in milliseconds; the interval is `base_unit_ms * speed`.
    pub base_unit_ms: u64,
    /// Initial speed multiplier.
    pub speed: u32,
}

/// Prefetch configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefetchSettings {
    /// Quiet period after the map stops moving, in milliseconds.
    pub debounce_ms: u64,
    /// Maximum wait for the map to report a viewport, in seconds.
    pub viewport_timeout_secs: u64,
}

/// Frame cache configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    /// Use the disk store; otherwise frames are cached in memory only
    pub enabled: bool,
    /// Disk store directory
    pub directory: PathBuf,
    /// Query parameters starting with this prefix are dropped from cache keys
    pub volatile_prefix: String,
}

/// Download configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadSettings {
    /// Timeout in seconds for HTTP requests.
    pub timeout: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}

//! Default values and constants for all configuration settings.
//!
//! Contains the `DEFAULT_*` constants and the `ConfigFile::default()`
//! implementation. Library-level defaults are reused so a missing config
//! file behaves exactly like `SessionConfig::default()`.

use std::path::PathBuf;

use super::settings::*;
use crate::animation::{DEFAULT_BASE_UNIT, DEFAULT_SPEED};
use crate::cache::DEFAULT_VOLATILE_PREFIX;
use crate::frames::DEFAULT_MAX_FRAMES;
use crate::host::DEFAULT_VIEWPORT_TIMEOUT;
use crate::prefetch::DEFAULT_DEBOUNCE;
use crate::provider::DEFAULT_TIMEOUT_SECS;
use crate::refresh::DEFAULT_REFRESH_INTERVAL;
use crate::session::{RadarType, DEFAULT_FALLBACK_URL};

/// Default HTTP timeout (30 seconds).
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = DEFAULT_TIMEOUT_SECS;

/// Disk caching is on unless disabled.
pub const DEFAULT_CACHE_ENABLED: bool = true;

/// Default log file name inside the config directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "radarloop.log";

/// Largest accepted frame window.
pub const MAX_FRAMES_LIMIT: usize = 500;

/// Default disk store directory (platform cache dir).
pub fn default_cache_directory() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("radarloop")
        .join("frames")
}

impl Default for ConfigFile {
    fn default() -> Self {
        let config_dir = super::file::config_directory();

        Self {
            radar: RadarSettings {
                radar_type: RadarType::default(),
                wms_url: None,
                layer: None,
                fallback_url: DEFAULT_FALLBACK_URL.to_string(),
                placement_layer: None,
            },
            frames: FramesSettings {
                max_frames: DEFAULT_MAX_FRAMES,
            },
            refresh: RefreshSettings {
                interval_secs: DEFAULT_REFRESH_INTERVAL.as_secs(),
            },
            animation: AnimationSettings {
                base_unit_ms: DEFAULT_BASE_UNIT.as_millis() as u64,
                speed: DEFAULT_SPEED,
            },
            prefetch: PrefetchSettings {
                debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
                viewport_timeout_secs: DEFAULT_VIEWPORT_TIMEOUT.as_secs(),
            },
            cache: CacheSettings {
                enabled: DEFAULT_CACHE_ENABLED,
                directory: default_cache_directory(),
                volatile_prefix: DEFAULT_VOLATILE_PREFIX.to_string(),
            },
            download: DownloadSettings {
                timeout: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            },
            logging: LoggingSettings {
                file: config_dir.join(DEFAULT_LOG_FILE_NAME),
            },
        }
    }
}

//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let wms_url = config.radar.wms_url.as_deref().unwrap_or("");
    let layer = config.radar.layer.as_deref().unwrap_or("");
    let placement_layer = config.radar.placement_layer.as_deref().unwrap_or("");
    let cache_enabled = if config.cache.enabled { "true" } else { "false" };

    format!(
        r#"[radar]
; Radar product:
;   precipitation - nowCOAST base reflectivity mosaic
;   conus         - NCEP CONUS quality-controlled base reflectivity
;   custom        - any WMS service (wms_url and layer required)
type = {}
; WMS endpoint and layer (override the preset, or required for custom)
wms_url = {}
layer = {}
; Map-image service shown when the WMS service cannot be reached
fallback_url = {}
; Host layer the radar layer is inserted above (empty = on top)
placement_layer = {}

[frames]
; Newest frames kept for the animation (default: 30)
max_frames = {}

[refresh]
; Seconds between checks for newly published frames (default: 240)
interval_secs = {}

[animation]
; Frame interval = base_unit_ms * speed (defaults: 100, 3)
base_unit_ms = {}
; Speed multiplier, 1 (fastest) to 5
speed = {}

[prefetch]
; Quiet period after the map stops moving before frames are refetched (default: 600)
debounce_ms = {}
; Maximum wait for the map to report its viewport (default: 15)
viewport_timeout_secs = {}

[cache]
; Persist frames on disk; when false frames are cached in memory only
enabled = {}
; Directory for cached frames
directory = {}
; Query parameters starting with this prefix are ignored in cache keys
volatile_prefix = {}

[download]
; Timeout in seconds for HTTP requests (default: 30)
timeout = {}

[logging]
; Log file path
file = {}
"#,
        config.radar.radar_type,
        wms_url,
        layer,
        config.radar.fallback_url,
        placement_layer,
        config.frames.max_frames,
        config.refresh.interval_secs,
        config.animation.base_unit_ms,
        config.animation.speed,
        config.prefetch.debounce_ms,
        config.prefetch.viewport_timeout_secs,
        cache_enabled,
        path_to_string(&config.cache.directory),
        config.cache.volatile_prefix,
        config.download.timeout,
        path_to_string(&config.logging.file),
    )
}

/// Render a path, abbreviating the home directory as `~`.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::Ini;

use super::defaults::MAX_FRAMES_LIMIT;
use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::animation::{MAX_SPEED, MIN_SPEED};

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [radar] section
    if let Some(section) = ini.section(Some("radar")) {
        if let Some(v) = section.get("type") {
            config.radar.radar_type = v.parse().map_err(|reason| invalid("radar", "type", v, reason))?;
        }
        if let Some(v) = non_empty(section.get("wms_url")) {
            url::Url::parse(v).map_err(|e| invalid("radar", "wms_url", v, e.to_string()))?;
            config.radar.wms_url = Some(v.to_string());
        }
        if let Some(v) = non_empty(section.get("layer")) {
            config.radar.layer = Some(v.to_string());
        }
        if let Some(v) = non_empty(section.get("fallback_url")) {
            config.radar.fallback_url = v.to_string();
        }
        if let Some(v) = non_empty(section.get("placement_layer")) {
            config.radar.placement_layer = Some(v.to_string());
        }
    }
    // A custom product must name its service.
    config.radar_source()?;

    // [frames] section
    if let Some(section) = ini.section(Some("frames")) {
        if let Some(v) = section.get("max_frames") {
            let max_frames: usize = parse_number("frames", "max_frames", v, "must be a positive integer")?;
            if max_frames == 0 || max_frames > MAX_FRAMES_LIMIT {
                return Err(invalid(
                    "frames",
                    "max_frames",
                    v,
                    format!("must be between 1 and {}", MAX_FRAMES_LIMIT),
                ));
            }
            config.frames.max_frames = max_frames;
        }
    }

    // [refresh] section
    if let Some(section) = ini.section(Some("refresh")) {
        if let Some(v) = section.get("interval_secs") {
            config.refresh.interval_secs =
                parse_positive("refresh", "interval_secs", v, "must be a positive integer (seconds)")?;
        }
    }

    // [animation] section
    if let Some(section) = ini.section(Some("animation")) {
        if let Some(v) = section.get("base_unit_ms") {
            config.animation.base_unit_ms = parse_positive(
                "animation",
                "base_unit_ms",
                v,
                "must be a positive integer (milliseconds)",
            )?;
        }
        if let Some(v) = section.get("speed") {
            let speed: u32 = parse_number("animation", "speed", v, "must be a positive integer")?;
            if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
                return Err(invalid(
                    "animation",
                    "speed",
                    v,
                    format!("must be between {} and {}", MIN_SPEED, MAX_SPEED),
                ));
            }
            config.animation.speed = speed;
        }
    }

    // [prefetch] section
    if let Some(section) = ini.section(Some("prefetch")) {
        if let Some(v) = section.get("debounce_ms") {
            config.prefetch.debounce_ms =
                parse_number("prefetch", "debounce_ms", v, "must be an integer (milliseconds)")?;
        }
        if let Some(v) = section.get("viewport_timeout_secs") {
            config.prefetch.viewport_timeout_secs = parse_number(
                "prefetch",
                "viewport_timeout_secs",
                v,
                "must be an integer (seconds)",
            )?;
        }
    }

    // [cache] section
    if let Some(section) = ini.section(Some("cache")) {
        if let Some(v) = section.get("enabled") {
            config.cache.enabled = parse_bool(v);
        }
        if let Some(v) = non_empty(section.get("directory")) {
            config.cache.directory = expand_tilde(v);
        }
        if let Some(v) = section.get("volatile_prefix") {
            let v = v.trim();
            if v.is_empty() {
                return Err(invalid(
                    "cache",
                    "volatile_prefix",
                    v,
                    "must not be empty".to_string(),
                ));
            }
            config.cache.volatile_prefix = v.to_string();
        }
    }

    // [download] section
    if let Some(section) = ini.section(Some("download")) {
        if let Some(v) = section.get("timeout") {
            config.download.timeout =
                parse_positive("download", "timeout", v, "must be a positive integer (seconds)")?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section.get("file")) {
            config.logging.file = expand_tilde(v);
        }
    }

    Ok(config)
}

pub(super) fn invalid(section: &str, key: &str, value: &str, reason: String) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_number<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason.to_string()))
}

fn parse_positive(section: &str, key: &str, value: &str, reason: &str) -> Result<u64, ConfigFileError> {
    match parse_number(section, key, value, reason)? {
        0 => Err(invalid(section, key, value, reason.to_string())),
        n => Ok(n),
    }
}

/// Parse a boolean value from a config string.
/// Accepts: true/false, yes/no, 1/0, on/off (case-insensitive)
pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

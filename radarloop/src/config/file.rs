//! Configuration file handling for ~/.radarloop/config.ini.
//!
//! A missing file means defaults. Values are validated on load and turned
//! into a [`SessionConfig`](crate::session::SessionConfig) for the session.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use super::parser::invalid;
use super::settings::ConfigFile;
use crate::session::{RadarSource, RadarType, SessionConfig};

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Load configuration from the default path (~/.radarloop/config.ini).
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load() -> Result<Self, ConfigFileError> {
        let path = config_file_path();
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Save configuration to the default path (~/.radarloop/config.ini).
    pub fn save(&self) -> Result<(), ConfigFileError> {
        let path = config_file_path();
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Create the default config file if it doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn ensure_exists() -> Result<PathBuf, ConfigFileError> {
        let path = config_file_path();
        if !path.exists() {
            Self::default().save_to(&path)?;
        }
        Ok(path)
    }

    /// The WMS service selected by `[radar]`.
    ///
    /// Preset products take `wms_url` and `layer` as overrides; a custom
    /// product requires both.
    pub fn radar_source(&self) -> Result<RadarSource, ConfigFileError> {
        let radar = &self.radar;
        match radar.radar_type.preset() {
            Some(mut source) => {
                if let Some(url) = &radar.wms_url {
                    source.wms_url = url.clone();
                }
                if let Some(layer) = &radar.layer {
                    source.layer = layer.clone();
                }
                Ok(source)
            }
            None => {
                let required = "required when type = custom".to_string();
                let wms_url = radar
                    .wms_url
                    .clone()
                    .ok_or_else(|| invalid("radar", "wms_url", "", required.clone()))?;
                let layer = radar
                    .layer
                    .clone()
                    .ok_or_else(|| invalid("radar", "layer", "", required))?;
                let title = format!("{} (WMS)", layer);
                Ok(RadarSource::new(wms_url, layer, title))
            }
        }
    }

    /// Build the library's session settings.
    pub fn to_session_config(&self) -> Result<SessionConfig, ConfigFileError> {
        let mut session = SessionConfig::for_source(self.radar_source()?);
        session.fallback_url = self.radar.fallback_url.clone();
        session.placement_layer = self.radar.placement_layer.clone();
        session.max_frames = self.frames.max_frames;
        session.refresh_interval = Duration::from_secs(self.refresh.interval_secs);
        session.base_unit = Duration::from_millis(self.animation.base_unit_ms);
        session.speed = self.animation.speed;
        session.debounce = Duration::from_millis(self.prefetch.debounce_ms);
        session.viewport_timeout = Duration::from_secs(self.prefetch.viewport_timeout_secs);
        Ok(session)
    }

    /// Returns true when the selected product is a built-in preset.
    pub fn uses_preset(&self) -> bool {
        self.radar.radar_type != RadarType::Custom
    }
}

/// Get the path to the config directory (~/.radarloop).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".radarloop")
}

/// Get the path to the config file (~/.radarloop/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::{DEFAULT_DOWNLOAD_TIMEOUT_SECS, DEFAULT_LOG_FILE_NAME};
    use crate::session::{NCEP_CONUS_LAYER, NOWCOAST_WMS_URL};

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();

        assert_eq!(config.radar.radar_type, RadarType::Precipitation);
        assert!(config.radar.wms_url.is_none());
        assert!(config.cache.enabled);
        assert_eq!(config.download.timeout, DEFAULT_DOWNLOAD_TIMEOUT_SECS);
        assert!(config.logging.file.ends_with(DEFAULT_LOG_FILE_NAME));
        assert!(config.uses_preset());
    }

    #[test]
    fn test_defaults_match_session_defaults() {
        let session = ConfigFile::default().to_session_config().unwrap();
        assert_eq!(session, SessionConfig::default());
    }

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let config = ConfigFile::load_from(&config_path).unwrap();

        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.radar.radar_type = RadarType::Conus;
        config.radar.placement_layer = Some("counties".to_string());
        config.frames.max_frames = 12;
        config.animation.speed = 1;
        config.cache.enabled = false;
        config.save_to(&config_path).unwrap();

        let loaded = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_session_config_from_settings() {
        let mut config = ConfigFile::default();
        config.radar.radar_type = RadarType::Conus;
        config.refresh.interval_secs = 60;
        config.animation.base_unit_ms = 50;
        config.prefetch.debounce_ms = 250;

        let session = config.to_session_config().unwrap();

        assert_eq!(session.source.layer, NCEP_CONUS_LAYER);
        assert_eq!(session.refresh_interval, Duration::from_secs(60));
        assert_eq!(session.base_unit, Duration::from_millis(50));
        assert_eq!(session.debounce, Duration::from_millis(250));
    }

    #[test]
    fn test_preset_overrides() {
        let mut config = ConfigFile::default();
        config.radar.layer = Some("other_layer".to_string());

        let source = config.radar_source().unwrap();

        assert_eq!(source.wms_url, NOWCOAST_WMS_URL);
        assert_eq!(source.layer, "other_layer");
    }

    #[test]
    fn test_custom_source() {
        let mut config = ConfigFile::default();
        config.radar.radar_type = RadarType::Custom;
        assert!(config.radar_source().is_err());

        config.radar.wms_url = Some("https://example.com/wms".to_string());
        config.radar.layer = Some("echo".to_string());
        let source = config.radar_source().unwrap();
        assert_eq!(source.title, "echo (WMS)");
        assert!(!config.uses_preset());
    }
}

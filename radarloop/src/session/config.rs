//! Session settings and radar service presets.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::animation::{DEFAULT_BASE_UNIT, DEFAULT_SPEED};
use crate::frames::DEFAULT_MAX_FRAMES;
use crate::host::DEFAULT_VIEWPORT_TIMEOUT;
use crate::prefetch::DEFAULT_DEBOUNCE;
use crate::refresh::DEFAULT_REFRESH_INTERVAL;

/// nowCOAST base reflectivity mosaic.
pub const NOWCOAST_WMS_URL: &str =
    "https://nowcoast.noaa.gov/geoserver/observations/weather_radar/ows";
pub const NOWCOAST_LAYER: &str = "base_reflectivity_mosaic";

/// NCEP CONUS quality-controlled base reflectivity.
pub const NCEP_CONUS_WMS_URL: &str = "https://opengeo.ncep.noaa.gov/geoserver/conus/conus_bref_qcd/ows";
pub const NCEP_CONUS_LAYER: &str = "conus_bref_qcd";

/// Map-image service used when the WMS service is unusable.
pub const DEFAULT_FALLBACK_URL: &str =
    "https://nowcoast.noaa.gov/arcgis/rest/services/nowcoast/radar_meteo_imagery_nexrad_time/MapServer";

/// WMS service and layer a session animates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadarSource {
    pub wms_url: String,
    pub layer: String,
    pub title: String,
}

impl RadarSource {
    pub fn new(
        wms_url: impl Into<String>,
        layer: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            wms_url: wms_url.into(),
            layer: layer.into(),
            title: title.into(),
        }
    }
}

/// Built-in radar products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RadarType {
    /// nowCOAST precipitation radar mosaic.
    #[default]
    Precipitation,
    /// NCEP CONUS base reflectivity.
    Conus,
    /// User-supplied service and layer.
    Custom,
}

impl RadarType {
    /// Config-file spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            RadarType::Precipitation => "precipitation",
            RadarType::Conus => "conus",
            RadarType::Custom => "custom",
        }
    }

    /// Service and layer of a built-in product.
    pub fn preset(&self) -> Option<RadarSource> {
        match self {
            RadarType::Precipitation => Some(RadarSource::new(
                NOWCOAST_WMS_URL,
                NOWCOAST_LAYER,
                "nowCOAST Radar (WMS)",
            )),
            RadarType::Conus => Some(RadarSource::new(
                NCEP_CONUS_WMS_URL,
                NCEP_CONUS_LAYER,
                "NCEP CONUS Radar (WMS)",
            )),
            RadarType::Custom => None,
        }
    }
}

impl fmt::Display for RadarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RadarType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "precipitation" => Ok(RadarType::Precipitation),
            "conus" => Ok(RadarType::Conus),
            "custom" => Ok(RadarType::Custom),
            other => Err(format!(
                "unknown radar type '{}' (expected precipitation, conus or custom)",
                other
            )),
        }
    }
}

/// Everything a [`RadarSession`](super::RadarSession) needs to know.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub source: RadarSource,
    pub fallback_url: String,
    /// Layer the radar layer is inserted directly above.
    pub placement_layer: Option<String>,
    pub max_frames: usize,
    pub refresh_interval: Duration,
    pub base_unit: Duration,
    pub speed: u32,
    pub debounce: Duration,
    pub viewport_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::for_source(RadarType::default().preset().unwrap_or_else(|| {
            RadarSource::new(NOWCOAST_WMS_URL, NOWCOAST_LAYER, "nowCOAST Radar (WMS)")
        }))
    }
}

impl SessionConfig {
    /// Defaults for everything but the service.
    pub fn for_source(source: RadarSource) -> Self {
        Self {
            source,
            fallback_url: DEFAULT_FALLBACK_URL.to_string(),
            placement_layer: None,
            max_frames: DEFAULT_MAX_FRAMES,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            base_unit: DEFAULT_BASE_UNIT,
            speed: DEFAULT_SPEED,
            debounce: DEFAULT_DEBOUNCE,
            viewport_timeout: DEFAULT_VIEWPORT_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radar_type_parsing() {
        assert_eq!("Precipitation".parse::<RadarType>(), Ok(RadarType::Precipitation));
        assert_eq!(" conus ".parse::<RadarType>(), Ok(RadarType::Conus));
        assert_eq!("custom".parse::<RadarType>(), Ok(RadarType::Custom));
        assert!("imagery".parse::<RadarType>().is_err());
    }

    #[test]
    fn test_presets() {
        let precip = RadarType::Precipitation.preset().unwrap();
        assert_eq!(precip.layer, NOWCOAST_LAYER);
        assert_eq!(RadarType::Conus.preset().unwrap().wms_url, NCEP_CONUS_WMS_URL);
        assert_eq!(RadarType::Custom.preset(), None);
    }

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.source.wms_url, NOWCOAST_WMS_URL);
        assert_eq!(config.max_frames, 30);
        assert_eq!(config.refresh_interval, Duration::from_secs(240));
        assert_eq!(config.speed, 3);
        assert_eq!(config.debounce, Duration::from_millis(600));
        assert_eq!(config.viewport_timeout, Duration::from_secs(15));
        assert_eq!(config.placement_layer, None);
    }

    #[test]
    fn test_preset_urls_are_in_cache_scope() {
        let scope = crate::cache::InterceptScope::default();
        for radar in [RadarType::Precipitation, RadarType::Conus] {
            let url = format!("{}?request=GetMap", radar.preset().unwrap().wms_url);
            assert!(scope.matches(&url), "{radar} not in scope");
        }
    }
}

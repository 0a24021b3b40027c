//! GetMap request construction.

use tracing::debug;
use url::{form_urlencoded, Url};

use super::viewport::Extent;

/// Size used when the viewport reports 0 pixels.
pub const DEFAULT_IMAGE_SIZE: u32 = 1024;

/// Smallest image edge requested.
pub const MIN_IMAGE_SIZE: u32 = 256;

fn image_size(pixels: u32) -> u32 {
    let pixels = if pixels == 0 { DEFAULT_IMAGE_SIZE } else { pixels };
    pixels.max(MIN_IMAGE_SIZE)
}

/// Build a WMS 1.3.0 GetMap URL for one time frame.
///
/// Returns `None` when the extent is missing or not finite, or when `base`
/// is not a parseable URL.
pub fn build_get_map_url(
    base: &str,
    layer: &str,
    extent: Option<&Extent>,
    width: u32,
    height: u32,
    time: &str,
) -> Option<String> {
    let Some(extent) = extent else {
        debug!(time = time, "No extent, skipping GetMap URL");
        return None;
    };
    if !extent.is_finite() {
        debug!(time = time, "Non-finite extent, skipping GetMap URL");
        return None;
    }
    if let Err(e) = Url::parse(base) {
        debug!(base = base, error = %e, "Unparseable WMS base URL");
        return None;
    }

    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("service", "WMS")
        .append_pair("version", "1.3.0")
        .append_pair("request", "GetMap")
        .append_pair("layers", layer)
        .append_pair("styles", "")
        .append_pair("crs", "EPSG:3857")
        .append_pair("bbox", &extent.bbox())
        .append_pair("width", &image_size(width).to_string())
        .append_pair("height", &image_size(height).to_string())
        .append_pair("format", "image/png")
        .append_pair("transparent", "TRUE")
        .append_pair("time", time)
        .finish();

    let separator = if base.contains('?') { '&' } else { '?' };
    Some(format!("{}{}{}", base, separator, query))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://nowcoast.noaa.gov/geoserver/observations/weather_radar/ows";

    fn extent() -> Extent {
        Extent::new(-1.0e7, 2.0e6, -8.0e6, 6.0e6)
    }

    #[test]
    fn test_full_url() {
        let url = build_get_map_url(
            BASE,
            "base_reflectivity_mosaic",
            Some(&extent()),
            800,
            600,
            "2024-01-01T00:00:00Z",
        )
        .unwrap();

        assert_eq!(
            url,
            format!(
                "{BASE}?service=WMS&version=1.3.0&request=GetMap&layers=base_reflectivity_mosaic\
                 &styles=&crs=EPSG%3A3857&bbox=-10000000%2C2000000%2C-8000000%2C6000000\
                 &width=800&height=600&format=image%2Fpng&transparent=TRUE\
                 &time=2024-01-01T00%3A00%3A00Z"
            )
        );
    }

    #[test]
    fn test_size_defaults_and_floor() {
        let url = build_get_map_url(BASE, "l", Some(&extent()), 0, 100, "t").unwrap();
        assert!(url.contains("&width=1024&"));
        assert!(url.contains("&height=256&"));
    }

    #[test]
    fn test_missing_extent_is_none() {
        assert_eq!(build_get_map_url(BASE, "l", None, 800, 600, "t"), None);
    }

    #[test]
    fn test_non_finite_extent_is_none() {
        let bad = Extent::new(f64::NAN, 0.0, 1.0, 1.0);
        assert_eq!(build_get_map_url(BASE, "l", Some(&bad), 800, 600, "t"), None);
    }

    #[test]
    fn test_unparseable_base_is_none() {
        assert_eq!(
            build_get_map_url("not a url", "l", Some(&extent()), 800, 600, "t"),
            None
        );
    }

    #[test]
    fn test_base_with_query_uses_ampersand() {
        let url =
            build_get_map_url("https://example.com/wms?map=radar", "l", Some(&extent()), 800, 600, "t")
                .unwrap();
        assert!(url.starts_with("https://example.com/wms?map=radar&service=WMS&"));
    }

    #[test]
    fn test_url_is_in_cache_scope() {
        let url = build_get_map_url(BASE, "l", Some(&extent()), 800, 600, "t").unwrap();
        assert!(crate::cache::InterceptScope::default().matches(&url));
    }
}

//! Map viewport: visible extent plus pixel size.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error parsing an extent from `xmin,ymin,xmax,ymax`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid extent '{input}': {reason}")]
pub struct ExtentParseError {
    pub input: String,
    pub reason: String,
}

/// Rectangular bounds in the map's CRS (EPSG:3857 for the radar services).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Extent {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// Returns true if every coordinate is a finite number.
    pub fn is_finite(&self) -> bool {
        [self.xmin, self.ymin, self.xmax, self.ymax]
            .iter()
            .all(|v| v.is_finite())
    }

    /// `xmin,ymin,xmax,ymax` as used by the WMS `bbox` parameter.
    pub fn bbox(&self) -> String {
        format!("{},{},{},{}", self.xmin, self.ymin, self.xmax, self.ymax)
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.bbox())
    }
}

impl FromStr for Extent {
    type Err = ExtentParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason: &str| ExtentParseError {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let values = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| err("coordinates must be numbers"))?;

        match values.as_slice() {
            &[xmin, ymin, xmax, ymax] => {
                let extent = Extent::new(xmin, ymin, xmax, ymax);
                if extent.is_finite() {
                    Ok(extent)
                } else {
                    Err(err("coordinates must be finite"))
                }
            }
            _ => Err(err("expected four comma-separated values")),
        }
    }
}

/// Snapshot of the host map's visible area.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Visible bounds, absent until the map has laid out.
    pub extent: Option<Extent>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Viewport {
    pub fn new(extent: Extent, width: u32, height: u32) -> Self {
        Self {
            extent: Some(extent),
            width,
            height,
        }
    }

    /// A viewport with no extent yet.
    pub fn unready() -> Self {
        Self::default()
    }

    /// Ready once there is an extent and the size is not 0x0.
    pub fn is_ready(&self) -> bool {
        self.extent.is_some() && !(self.width == 0 && self.height == 0)
    }

    /// Change-detection key `xmin,ymin,xmax,ymax,width,height`.
    ///
    /// Empty when there is no extent.
    pub fn key(&self) -> String {
        match &self.extent {
            Some(extent) => format!("{},{},{}", extent.bbox(), self.width, self.height),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extent() {
        let extent: Extent = "-100.5, 20, -80, 50".parse().unwrap();
        assert_eq!(extent, Extent::new(-100.5, 20.0, -80.0, 50.0));
        assert_eq!(extent.bbox(), "-100.5,20,-80,50");
    }

    #[test]
    fn test_parse_extent_errors() {
        assert!("1,2,3".parse::<Extent>().is_err());
        assert!("1,2,3,x".parse::<Extent>().is_err());
        assert!("1,2,3,inf".parse::<Extent>().is_err());
    }

    #[test]
    fn test_viewport_key() {
        let vp = Viewport::new(Extent::new(-1.0e7, 2.0e6, -8.0e6, 6.0e6), 800, 600);
        assert_eq!(vp.key(), "-10000000,2000000,-8000000,6000000,800,600");
        assert_eq!(Viewport::unready().key(), "");
    }

    #[test]
    fn test_viewport_readiness() {
        assert!(!Viewport::unready().is_ready());
        assert!(!Viewport::new(Extent::new(0.0, 0.0, 1.0, 1.0), 0, 0).is_ready());
        assert!(Viewport::new(Extent::new(0.0, 0.0, 1.0, 1.0), 0, 10).is_ready());
    }
}

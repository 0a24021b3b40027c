//! Common types and utilities shared across CLI commands.

use clap::Args;
use radarloop::wms::{Extent, Viewport, DEFAULT_IMAGE_SIZE, MIN_IMAGE_SIZE};

use crate::error::CliError;

/// Map viewport for commands that request frame images.
#[derive(Debug, Clone, Args)]
pub struct ViewportArgs {
    /// Extent in Web Mercator meters: xmin,ymin,xmax,ymax
    #[arg(long, allow_hyphen_values = true)]
    pub bbox: String,

    /// Image width in pixels
    #[arg(long, default_value_t = DEFAULT_IMAGE_SIZE)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = DEFAULT_IMAGE_SIZE)]
    pub height: u32,
}

impl ViewportArgs {
    /// Validate the arguments and build a viewport.
    pub fn to_viewport(&self) -> Result<Viewport, CliError> {
        let extent: Extent = self
            .bbox
            .parse()
            .map_err(|e| CliError::InvalidArgument(format!("--bbox: {}", e)))?;

        if self.width < MIN_IMAGE_SIZE || self.height < MIN_IMAGE_SIZE {
            return Err(CliError::InvalidArgument(format!(
                "--width and --height must be at least {} pixels",
                MIN_IMAGE_SIZE
            )));
        }

        Ok(Viewport::new(extent, self.width, self.height))
    }
}

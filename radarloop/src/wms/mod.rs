//! WMS viewport model and GetMap request building.

mod request;
mod viewport;

pub use request::{build_get_map_url, DEFAULT_IMAGE_SIZE, MIN_IMAGE_SIZE};
pub use viewport::{Extent, ExtentParseError, Viewport};

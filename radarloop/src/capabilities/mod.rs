//! Frame discovery from WMS capabilities documents.
//!
//! Fetches `GetCapabilities` for a WMS endpoint and extracts the time
//! identifiers a layer advertises. Both explicit comma lists and ISO-8601
//! interval encodings are supported, with or without the WMS namespace.

mod interval;
mod parser;

pub use interval::{expand_interval, parse_duration};
pub use parser::{parse_capabilities, parse_times_from_text, WMS_NS};

use thiserror::Error;
use tracing::debug;

use crate::provider::{AsyncHttpClient, ProviderError};

/// Errors that can occur while discovering frames.
#[derive(Debug, Error)]
pub enum CapabilitiesError {
    /// The capabilities request failed at the transport level
    #[error("Capabilities request failed: {0}")]
    Fetch(#[from] ProviderError),

    /// The server answered with a non-success status
    #[error("Capabilities request returned HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The document is not UTF-8
    #[error("Capabilities document is not valid UTF-8")]
    Encoding,

    /// The document is not well-formed XML
    #[error("Capabilities document is not well-formed XML: {0}")]
    Xml(#[from] roxmltree::Error),
}

/// Build the `GetCapabilities` URL for a WMS base endpoint.
pub fn capabilities_url(wms_base: &str) -> String {
    let separator = if wms_base.contains('?') { '&' } else { '?' };
    format!(
        "{}{}SERVICE=WMS&VERSION=1.3.0&REQUEST=GetCapabilities",
        wms_base, separator
    )
}

/// Fetch a capabilities document and return the times advertised for `layer_name`.
///
/// Transport, status and parse failures are errors; a document without the
/// layer or its time dimension yields an empty list.
pub async fn fetch_capabilities<C: AsyncHttpClient>(
    client: &C,
    wms_base: &str,
    layer_name: &str,
    max_frames: usize,
) -> Result<Vec<String>, CapabilitiesError> {
    let url = capabilities_url(wms_base);
    let response = client.get(&url).await?;

    if !response.is_success() {
        return Err(CapabilitiesError::Status {
            status: response.status,
            url,
        });
    }

    let text = std::str::from_utf8(&response.body).map_err(|_| CapabilitiesError::Encoding)?;
    let times = parse_capabilities(text, layer_name, max_frames)?;

    debug!(
        layer = layer_name,
        count = times.len(),
        "Parsed capabilities time dimension"
    );
    Ok(times)
}

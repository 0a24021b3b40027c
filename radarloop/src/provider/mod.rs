//! HTTP access to WMS servers
//!
//! Capability discovery and frame fetching both go through
//! [`AsyncHttpClient`], which the frame cache decorates with its interception
//! layer.
//!
//! ```ignore
//! use radarloop::provider::{AsyncHttpClient, AsyncReqwestClient};
//!
//! let client = AsyncReqwestClient::with_timeout(30)?;
//! let response = client.get("https://example.com/ows?REQUEST=GetCapabilities").await?;
//! ```

mod http;
mod types;

pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use types::{HttpResponse, ProviderError};

#[cfg(test)]
pub use http::tests::ScriptedHttpClient;

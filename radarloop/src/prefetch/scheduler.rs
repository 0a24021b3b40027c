//! Concurrent frame prefetching.
//!
//! Builds a GetMap URL per frame identifier for the current viewport and
//! issues all requests at once through the (caching) HTTP client. Individual
//! failures are logged and counted, never propagated.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info};

use crate::host::PlaybackObserver;
use crate::provider::AsyncHttpClient;
use crate::wms::{build_get_map_url, Viewport};

/// Status shown once every request in a batch has settled.
pub const STATUS_READY: &str = "Status: ready";

/// Outcome of one prefetch batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefetchReport {
    /// Identifiers handed in.
    pub requested: usize,
    /// Requests answered with a 2xx response.
    pub succeeded: usize,
    /// Requests that failed or returned an error status.
    pub failed: usize,
    /// Identifiers skipped because no URL could be built.
    pub skipped: usize,
}

impl PrefetchReport {
    /// Number of requests issued.
    pub fn issued(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Warms the frame cache for a WMS layer.
pub struct FramePrefetcher<C> {
    client: Arc<C>,
    wms_base: String,
    layer: String,
}

impl<C: AsyncHttpClient> FramePrefetcher<C> {
    /// Prefetch frames of `layer` from `wms_base` through `client`.
    pub fn new(client: Arc<C>, wms_base: impl Into<String>, layer: impl Into<String>) -> Self {
        Self {
            client,
            wms_base: wms_base.into(),
            layer: layer.into(),
        }
    }

    /// The client requests go through.
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Fetch every frame in `ids` for `viewport` and wait for all of them.
    ///
    /// An empty list does nothing and reports no status.
    pub async fn prefetch(
        &self,
        ids: &[String],
        viewport: &Viewport,
        observer: &dyn PlaybackObserver,
    ) -> PrefetchReport {
        let mut report = PrefetchReport {
            requested: ids.len(),
            ..Default::default()
        };
        if ids.is_empty() {
            return report;
        }

        observer.on_status(&format!("Status: caching {} frames...", ids.len()));

        let urls: Vec<String> = ids
            .iter()
            .filter_map(|time| {
                build_get_map_url(
                    &self.wms_base,
                    &self.layer,
                    viewport.extent.as_ref(),
                    viewport.width,
                    viewport.height,
                    time,
                )
            })
            .collect();
        report.skipped = ids.len() - urls.len();

        let results = join_all(urls.iter().map(|url| self.client.get(url))).await;

        for (url, result) in urls.iter().zip(results) {
            match result {
                Ok(response) if response.is_success() => report.succeeded += 1,
                Ok(response) => {
                    debug!(url = %url, status = response.status, "Prefetch returned error status");
                    report.failed += 1;
                }
                Err(e) => {
                    debug!(url = %url, error = %e, "Prefetch failed");
                    report.failed += 1;
                }
            }
        }

        observer.on_status(STATUS_READY);
        info!(
            requested = report.requested,
            succeeded = report.succeeded,
            failed = report.failed,
            skipped = report.skipped,
            "Prefetch batch complete"
        );
        report
    }
}

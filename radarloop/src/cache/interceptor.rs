//! Cache-first interception of frame requests.
//!
//! [`CachingHttpClient`] decorates any [`AsyncHttpClient`]. GetMap requests
//! to the radar services are answered from the [`FrameStore`] when possible
//! and written through on a miss. When the network fails, a previously stored
//! frame is served instead, or a synthetic 503 if none exists.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::cache::key::{canonicalize, DEFAULT_VOLATILE_PREFIX};
use crate::cache::r#trait::FrameStore;
use crate::cache::stats::InterceptStats;
use crate::provider::{AsyncHttpClient, HttpResponse, ProviderError};

/// URL fragments identifying the radar services whose frames are cached.
pub const DEFAULT_SCOPE_PATHS: [&str; 3] = [
    "/api/ogc/imagery/wms",
    "/geoserver/observations/weather_radar/ows",
    "geoserver/conus/conus_bref_qcd/ows",
];

const GETMAP_MARKER: &str = "request=getmap";

/// Which requests the interception layer handles.
///
/// A URL is in scope when it contains one of the service paths and, compared
/// case-insensitively, the `request=getmap` marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptScope {
    paths: Vec<String>,
}

impl Default for InterceptScope {
    fn default() -> Self {
        Self::new(DEFAULT_SCOPE_PATHS)
    }
}

impl InterceptScope {
    /// Scope over the given service path fragments.
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Add another service path fragment.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.paths.push(path.into());
        self
    }

    /// Service path fragments in scope.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Returns true if `url` should be intercepted.
    pub fn matches(&self, url: &str) -> bool {
        self.paths.iter().any(|path| url.contains(path.as_str()))
            && url.to_lowercase().contains(GETMAP_MARKER)
    }
}

/// How a request travelled through the interception layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptOutcome {
    /// Outside the scope; forwarded untouched.
    PassThrough,
    /// Served from the store.
    Hit,
    /// Fetched and stored under the canonical key.
    Stored,
    /// Fetched; the canonical put failed and the raw URL was used.
    StoredUnderRawUrl,
    /// Fetched but could not be stored at all.
    NotStored,
    /// Network failed; a stored response was served.
    Stale,
    /// Network failed and nothing was stored.
    Unavailable,
}

/// HTTP client decorator implementing the frame cache.
pub struct CachingHttpClient<C> {
    inner: C,
    store: Arc<dyn FrameStore>,
    scope: InterceptScope,
    volatile_prefix: String,
    stats: Arc<InterceptStats>,
}

impl<C: AsyncHttpClient> CachingHttpClient<C> {
    /// Wrap `inner` with the default scope and volatile prefix.
    pub fn new(inner: C, store: Arc<dyn FrameStore>) -> Self {
        Self {
            inner,
            store,
            scope: InterceptScope::default(),
            volatile_prefix: DEFAULT_VOLATILE_PREFIX.to_string(),
            stats: Arc::new(InterceptStats::new()),
        }
    }

    /// Replace the interception scope.
    pub fn with_scope(mut self, scope: InterceptScope) -> Self {
        self.scope = scope;
        self
    }

    /// Replace the prefix marking volatile query parameters.
    pub fn with_volatile_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.volatile_prefix = prefix.into();
        self
    }

    /// Shared interception counters.
    pub fn stats(&self) -> Arc<InterceptStats> {
        Arc::clone(&self.stats)
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<dyn FrameStore> {
        &self.store
    }

    /// The wrapped client.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// The interception scope.
    pub fn scope(&self) -> &InterceptScope {
        &self.scope
    }

    /// Fetch `url` and report which path it took.
    ///
    /// In-scope requests never return a transport error: a network failure
    /// becomes a stored response or a synthetic 503.
    pub async fn fetch_with_outcome(
        &self,
        url: &str,
    ) -> (Result<HttpResponse, ProviderError>, InterceptOutcome) {
        if !self.scope.matches(url) {
            InterceptStats::record(&self.stats.pass_through);
            trace!(url = url, "Request outside cache scope");
            return (self.inner.get(url).await, InterceptOutcome::PassThrough);
        }

        let key = canonicalize(url, &self.volatile_prefix);
        if let Some(cached) = self.store.get(&key) {
            InterceptStats::record(&self.stats.hits);
            debug!(key = %key, "Serving cached frame");
            return (Ok(cached), InterceptOutcome::Hit);
        }

        InterceptStats::record(&self.stats.misses);
        trace!(key = %key, "Frame cache miss, fetching");

        match self.inner.get(url).await {
            Ok(response) => {
                let outcome = self.store_response(&key, url, &response);
                (Ok(response), outcome)
            }
            Err(e) => {
                warn!(url = url, error = %e, "Frame fetch failed, trying cache fallback");
                let fallback = self.store.get(&key).or_else(|| self.store.get(url));
                match fallback {
                    Some(cached) => {
                        InterceptStats::record(&self.stats.stale_served);
                        debug!(key = %key, "Serving stored frame after network failure");
                        (Ok(cached), InterceptOutcome::Stale)
                    }
                    None => {
                        InterceptStats::record(&self.stats.unavailable);
                        debug!(key = %key, "No stored frame, returning 503");
                        (
                            Ok(HttpResponse::service_unavailable()),
                            InterceptOutcome::Unavailable,
                        )
                    }
                }
            }
        }
    }

    fn store_response(&self, key: &str, url: &str, response: &HttpResponse) -> InterceptOutcome {
        match self.store.put(key, response) {
            Ok(()) => {
                InterceptStats::record(&self.stats.stores);
                trace!(key = key, "Frame stored");
                InterceptOutcome::Stored
            }
            Err(e) => {
                debug!(key = key, error = %e, "Canonical store failed, retrying under raw URL");
                match self.store.put(url, response) {
                    Ok(()) => {
                        InterceptStats::record(&self.stats.store_fallbacks);
                        InterceptOutcome::StoredUnderRawUrl
                    }
                    Err(e) => {
                        debug!(url = url, error = %e, "Frame could not be stored");
                        InterceptOutcome::NotStored
                    }
                }
            }
        }
    }
}

impl<C: AsyncHttpClient> AsyncHttpClient for CachingHttpClient<C> {
    async fn get(&self, url: &str) -> Result<HttpResponse, ProviderError> {
        self.fetch_with_outcome(url).await.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::MemoryFrameStore;
    use crate::cache::types::CacheError;
    use crate::provider::ScriptedHttpClient;

    const FRAME_URL: &str = "https://nowcoast.noaa.gov/geoserver/observations/weather_radar/ows?service=WMS&request=GetMap&time=t1&_ts=1";

    fn client(
        inner: ScriptedHttpClient,
    ) -> (CachingHttpClient<ScriptedHttpClient>, Arc<MemoryFrameStore>) {
        let store = Arc::new(MemoryFrameStore::new());
        let caching = CachingHttpClient::new(inner, store.clone() as Arc<dyn FrameStore>);
        (caching, store)
    }

    /// Store whose puts fail for keys matching `reject`.
    struct RejectingStore {
        inner: MemoryFrameStore,
        reject: fn(&str) -> bool,
    }

    impl FrameStore for RejectingStore {
        fn get(&self, key: &str) -> Option<HttpResponse> {
            self.inner.get(key)
        }
        fn put(&self, key: &str, response: &HttpResponse) -> Result<(), CacheError> {
            if (self.reject)(key) {
                return Err(CacheError::Unstorable {
                    key: key.to_string(),
                    reason: "rejected".to_string(),
                });
            }
            self.inner.put(key, response)
        }
        fn contains(&self, key: &str) -> bool {
            self.inner.contains(key)
        }
        fn len(&self) -> usize {
            self.inner.len()
        }
        fn clear(&self) -> Result<(), CacheError> {
            self.inner.clear()
        }
    }

    #[test]
    fn test_scope_requires_service_and_getmap() {
        let scope = InterceptScope::default();
        assert!(scope.matches(FRAME_URL));
        assert!(scope.matches(
            "https://opengeo.ncep.noaa.gov/geoserver/conus/conus_bref_qcd/ows?REQUEST=GETMAP"
        ));
        assert!(!scope.matches(
            "https://nowcoast.noaa.gov/geoserver/observations/weather_radar/ows?REQUEST=GetCapabilities"
        ));
        assert!(!scope.matches("https://example.com/wms?request=GetMap"));
    }

    #[test]
    fn test_scope_with_custom_path() {
        let scope = InterceptScope::default().with_path("/my/wms");
        assert!(scope.matches("https://example.com/my/wms?request=GetMap"));
        assert_eq!(scope.paths().len(), 4);
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let (caching, store) = client(ScriptedHttpClient::new());

        let (first, outcome) = caching.fetch_with_outcome(FRAME_URL).await;
        assert_eq!(outcome, InterceptOutcome::Stored);
        assert_eq!(first.unwrap().body, b"frame".to_vec());
        assert_eq!(store.len(), 1);

        let (second, outcome) = caching.fetch_with_outcome(FRAME_URL).await;
        assert_eq!(outcome, InterceptOutcome::Hit);
        assert_eq!(second.unwrap().body, b"frame".to_vec());
        assert_eq!(caching.inner().request_count(), 1);

        let snap = caching.stats().snapshot();
        assert_eq!(snap.hits, 1);
        assert_eq!(snap.misses, 1);
        assert_eq!(snap.stores, 1);
    }

    #[tokio::test]
    async fn test_reordered_and_cache_busted_url_hits() {
        let (caching, _) = client(ScriptedHttpClient::new());
        caching.get(FRAME_URL).await.unwrap();

        let reordered = "https://nowcoast.noaa.gov/geoserver/observations/weather_radar/ows?_ts=99&time=t1&request=GetMap&service=WMS";
        let (_, outcome) = caching.fetch_with_outcome(reordered).await;
        assert_eq!(outcome, InterceptOutcome::Hit);
        assert_eq!(caching.inner().request_count(), 1);
    }

    #[tokio::test]
    async fn test_network_failure_serves_stored_frame() {
        let (caching, store) = client(ScriptedHttpClient::failing());
        // Stored under the raw URL only, as after a failed canonical put.
        store.put(FRAME_URL, &HttpResponse::ok("old")).unwrap();

        let (result, outcome) = caching.fetch_with_outcome(FRAME_URL).await;
        assert_eq!(outcome, InterceptOutcome::Stale);
        assert_eq!(result.unwrap().body, b"old".to_vec());
        assert_eq!(caching.stats().snapshot().stale_served, 1);
    }

    #[tokio::test]
    async fn test_network_failure_without_entry_is_503() {
        let (caching, _) = client(ScriptedHttpClient::failing());

        let (result, outcome) = caching.fetch_with_outcome(FRAME_URL).await;
        assert_eq!(outcome, InterceptOutcome::Unavailable);
        let response = result.unwrap();
        assert_eq!(response.status, 503);
        assert_eq!(response.body, b"Service unavailable".to_vec());
    }

    #[tokio::test]
    async fn test_error_status_is_stored_as_is() {
        let inner = ScriptedHttpClient::new().respond("GetMap", Ok(HttpResponse::new(404, "nope")));
        let (caching, store) = client(inner);

        let response = caching.get(FRAME_URL).await.unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_retries_under_raw_url() {
        let store = Arc::new(RejectingStore {
            inner: MemoryFrameStore::new(),
            reject: |key| !key.contains("_ts"),
        });
        let caching = CachingHttpClient::new(
            ScriptedHttpClient::new(),
            store.clone() as Arc<dyn FrameStore>,
        );

        let (result, outcome) = caching.fetch_with_outcome(FRAME_URL).await;
        assert!(result.is_ok());
        assert_eq!(outcome, InterceptOutcome::StoredUnderRawUrl);
        assert!(store.contains(FRAME_URL));
        assert_eq!(caching.stats().snapshot().store_fallbacks, 1);
    }

    #[tokio::test]
    async fn test_store_failure_everywhere_still_returns_response() {
        let store = Arc::new(RejectingStore {
            inner: MemoryFrameStore::new(),
            reject: |_| true,
        });
        let caching = CachingHttpClient::new(ScriptedHttpClient::new(), store as Arc<dyn FrameStore>);

        let (result, outcome) = caching.fetch_with_outcome(FRAME_URL).await;
        assert_eq!(result.unwrap().body, b"frame".to_vec());
        assert_eq!(outcome, InterceptOutcome::NotStored);
    }

    #[tokio::test]
    async fn test_out_of_scope_passes_through() {
        let (caching, store) = client(ScriptedHttpClient::failing());
        let url = "https://nowcoast.noaa.gov/geoserver/observations/weather_radar/ows?REQUEST=GetCapabilities";

        let (result, outcome) = caching.fetch_with_outcome(url).await;
        assert_eq!(outcome, InterceptOutcome::PassThrough);
        assert!(result.is_err());
        assert!(store.is_empty());
        assert_eq!(caching.stats().snapshot().pass_through, 1);
    }

    #[tokio::test]
    async fn test_custom_volatile_prefix() {
        let (caching, _) = client(ScriptedHttpClient::new());
        let caching = caching.with_volatile_prefix("cb");
        let a = "https://nowcoast.noaa.gov/geoserver/observations/weather_radar/ows?request=GetMap&cb=1";
        let b = "https://nowcoast.noaa.gov/geoserver/observations/weather_radar/ows?request=GetMap&cb=2";

        caching.get(a).await.unwrap();
        let (_, outcome) = caching.fetch_with_outcome(b).await;
        assert_eq!(outcome, InterceptOutcome::Hit);
    }
}

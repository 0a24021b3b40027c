//! Frame store trait definition for dependency injection.

use crate::cache::types::CacheError;
use crate::provider::HttpResponse;

/// Persistent key/response store behind the frame cache.
///
/// Enables different storage strategies (on-disk, in-memory, no-op) to be
/// used interchangeably by the interception layer. Keys are canonical request
/// signatures, or raw request URLs when storing under the canonical key failed.
/// Entries never expire here; capacity is the backing store's concern.
///
/// # Example
///
/// ```
/// use radarloop::cache::{FrameStore, MemoryFrameStore};
/// use radarloop::provider::HttpResponse;
///
/// fn warm(store: &dyn FrameStore) {
///     let key = "https://example.com/ows?request=GetMap&time=t1";
///     if store.get(key).is_none() {
///         store.put(key, &HttpResponse::ok(vec![1, 2, 3])).ok();
///     }
/// }
///
/// warm(&MemoryFrameStore::new());
/// ```
pub trait FrameStore: Send + Sync {
    /// Look up a stored response.
    fn get(&self, key: &str) -> Option<HttpResponse>;

    /// Store a response, overwriting any previous entry for the key.
    fn put(&self, key: &str, response: &HttpResponse) -> Result<(), CacheError>;

    /// Check if a key exists in the store.
    fn contains(&self, key: &str) -> bool;

    /// Number of stored entries.
    fn len(&self) -> usize;

    /// Returns true when the store holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entry.
    fn clear(&self) -> Result<(), CacheError>;
}

/// No-op store that never caches.
///
/// Used when frame caching is disabled in configuration: every request
/// misses, stores succeed without keeping anything.
#[derive(Debug, Clone, Default)]
pub struct NoOpFrameStore;

impl NoOpFrameStore {
    /// Create a new no-op store.
    pub fn new() -> Self {
        Self
    }
}

impl FrameStore for NoOpFrameStore {
    fn get(&self, _key: &str) -> Option<HttpResponse> {
        None
    }

    fn put(&self, _key: &str, _response: &HttpResponse) -> Result<(), CacheError> {
        Ok(())
    }

    fn contains(&self, _key: &str) -> bool {
        false
    }

    fn len(&self) -> usize {
        0
    }

    fn clear(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

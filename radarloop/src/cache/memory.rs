//! In-memory frame store.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::cache::r#trait::FrameStore;
use crate::cache::types::CacheError;
use crate::provider::HttpResponse;

/// In-memory frame store.
///
/// Keeps responses for the lifetime of the process. Useful for tests and for
/// hosts that cannot persist to disk.
#[derive(Debug, Default)]
pub struct MemoryFrameStore {
    entries: RwLock<HashMap<String, HttpResponse>>,
}

impl MemoryFrameStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total size of stored bodies in bytes.
    pub fn size_bytes(&self) -> usize {
        self.entries.read().values().map(|r| r.body.len()).sum()
    }

    /// Snapshot of the stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl FrameStore for MemoryFrameStore {
    fn get(&self, key: &str) -> Option<HttpResponse> {
        self.entries.read().get(key).cloned()
    }

    fn put(&self, key: &str, response: &HttpResponse) -> Result<(), CacheError> {
        self.entries
            .write()
            .insert(key.to_string(), response.clone());
        Ok(())
    }

    fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }

    fn clear(&self) -> Result<(), CacheError> {
        self.entries.write().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let store = MemoryFrameStore::new();
        store.put("a", &HttpResponse::ok(vec![1, 2, 3])).unwrap();

        assert_eq!(store.get("a").unwrap().body, vec![1, 2, 3]);
        assert!(store.contains("a"));
        assert_eq!(store.get("b"), None);
        assert_eq!(store.size_bytes(), 3);
    }

    #[test]
    fn test_put_overwrites() {
        let store = MemoryFrameStore::new();
        store.put("a", &HttpResponse::ok("old")).unwrap();
        store.put("a", &HttpResponse::ok("new")).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").unwrap().body, b"new".to_vec());
    }

    #[test]
    fn test_clear() {
        let store = MemoryFrameStore::new();
        store.put("b", &HttpResponse::ok("1")).unwrap();
        store.put("a", &HttpResponse::ok("2")).unwrap();
        assert_eq!(store.keys(), vec!["a", "b"]);

        store.clear().unwrap();
        assert!(store.is_empty());
        assert_eq!(store.size_bytes(), 0);
    }

    #[test]
    fn test_preserves_status_and_content_type() {
        let store = MemoryFrameStore::new();
        let response = HttpResponse::new(404, "missing").with_content_type("text/xml");
        store.put("k", &response).unwrap();
        assert_eq!(store.get("k"), Some(response));
    }
}

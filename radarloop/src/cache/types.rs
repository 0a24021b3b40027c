//! Core types for the frame cache.

use std::path::PathBuf;
use thiserror::Error;

/// Cache-related errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// I/O error during cache operations
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The entry cannot be stored under this key
    #[error("Entry cannot be stored under key '{key}': {reason}")]
    Unstorable { key: String, reason: String },

    /// A stored entry could not be decoded
    #[error("Corrupt cache entry at {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CacheError::Unstorable {
            key: "k".to_string(),
            reason: "contains a newline".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Entry cannot be stored under key 'k': contains a newline"
        );

        let io = CacheError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        assert_eq!(io.to_string(), "Cache I/O error: disk full");
    }
}

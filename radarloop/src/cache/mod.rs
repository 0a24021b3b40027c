//! Persistent frame cache.
//!
//! Provides canonical request keys, memory and disk frame stores, and the
//! HTTP interception layer that serves GetMap frames cache-first with an
//! offline fallback.

mod disk;
mod interceptor;
mod key;
mod memory;
mod stats;
mod r#trait;
mod types;

pub use disk::DiskFrameStore;
pub use interceptor::{CachingHttpClient, InterceptOutcome, InterceptScope, DEFAULT_SCOPE_PATHS};
pub use key::{canonicalize, CanonicalKey, DEFAULT_VOLATILE_PREFIX};
pub use memory::MemoryFrameStore;
pub use r#trait::{FrameStore, NoOpFrameStore};
pub use stats::{InterceptStats, InterceptStatsSnapshot};
pub use types::CacheError;

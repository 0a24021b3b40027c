//! Frame prefetching.
//!
//! [`FramePrefetcher`] warms the frame cache for a list of time identifiers
//! and the current viewport. [`ExtentDebouncer`] reruns it for the whole
//! frame set once the map stops moving:
//!
//! ```text
//! stationary event → debounce timer (600ms) → viewport key changed?
//!                                                  ↓ yes
//!                                   FramePrefetcher → CachingHttpClient
//! ```

mod debounce;
mod scheduler;

pub use debounce::{ExtentCheck, ExtentDebouncer, DEFAULT_DEBOUNCE, STATUS_EXTENT_PREFETCH};
pub use scheduler::{FramePrefetcher, PrefetchReport, STATUS_READY};

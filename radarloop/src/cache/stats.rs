//! Interception statistics tracking and reporting.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the frame cache interception layer.
#[derive(Debug, Default)]
pub struct InterceptStats {
    /// Requests served from the store without touching the network.
    pub hits: AtomicU64,
    /// Requests that had to be fetched.
    pub misses: AtomicU64,
    /// Fetched responses stored under their canonical key.
    pub stores: AtomicU64,
    /// Fetched responses stored under the raw URL after the canonical put failed.
    pub store_fallbacks: AtomicU64,
    /// Stored responses served after a network failure.
    pub stale_served: AtomicU64,
    /// Synthetic 503 responses.
    pub unavailable: AtomicU64,
    /// Requests outside the interception scope.
    pub pass_through: AtomicU64,
}

impl InterceptStats {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> InterceptStatsSnapshot {
        InterceptStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
            store_fallbacks: self.store_fallbacks.load(Ordering::Relaxed),
            stale_served: self.stale_served.load(Ordering::Relaxed),
            unavailable: self.unavailable.load(Ordering::Relaxed),
            pass_through: self.pass_through.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of interception statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterceptStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
    pub store_fallbacks: u64,
    pub stale_served: u64,
    pub unavailable: u64,
    pub pass_through: u64,
}

impl InterceptStatsSnapshot {
    /// Total intercepted requests.
    pub fn intercepted(&self) -> u64 {
        self.hits + self.misses
    }

    /// Hit rate over intercepted requests, as a fraction.
    pub fn hit_rate(&self) -> f64 {
        let total = self.intercepted();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let stats = InterceptStats::new();
        InterceptStats::record(&stats.hits);
        InterceptStats::record(&stats.hits);
        InterceptStats::record(&stats.misses);
        InterceptStats::record(&stats.unavailable);

        let snap = stats.snapshot();
        assert_eq!(snap.hits, 2);
        assert_eq!(snap.misses, 1);
        assert_eq!(snap.unavailable, 1);
        assert_eq!(snap.intercepted(), 3);
    }

    #[test]
    fn test_hit_rate() {
        assert_eq!(InterceptStatsSnapshot::default().hit_rate(), 0.0);

        let snap = InterceptStatsSnapshot {
            hits: 3,
            misses: 1,
            ..Default::default()
        };
        assert!((snap.hit_rate() - 0.75).abs() < f64::EPSILON);
    }
}

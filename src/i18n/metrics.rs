//! Lookup and load counters for message providers.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Per-provider counters. Updated with relaxed atomics; reports are
/// snapshots, not a consistent cut across counters.
#[derive(Debug, Default)]
pub struct ProviderMetrics {
    /// Lookups answered from the loaded table
    lookup_hits: AtomicUsize,

    /// Lookups that fell back to the sentinel
    lookup_misses: AtomicUsize,

    /// Loads that swapped in a new table
    loads: AtomicUsize,

    /// Loads that left the previous table in place
    load_failures: AtomicUsize,
}

impl ProviderMetrics {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a lookup answered from the table.
    pub fn record_hit(&self) {
        self.lookup_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a lookup that returned the sentinel.
    pub fn record_miss(&self) {
        self.lookup_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a load that swapped in a new table.
    pub fn record_load(&self) {
        self.loads.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a load that kept the previous table.
    pub fn record_load_failure(&self) {
        self.load_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Total lookups answered from the table.
    pub fn lookup_hits(&self) -> usize {
        self.lookup_hits.load(Ordering::Relaxed)
    }

    pub fn lookup_misses(&self) -> usize {
        self.lookup_misses.load(Ordering::Relaxed)
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    pub fn load_failures(&self) -> usize {
        self.load_failures.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.lookup_hits();
        let misses = self.lookup_misses();
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            lookup_hits: hits,
            lookup_misses: misses,
            hit_rate,
            loads: self.loads(),
            load_failures: self.load_failures(),
        }
    }
}

/// Snapshot of a provider's counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub lookup_hits: usize,
    pub lookup_misses: usize,

    /// Hit rate as a percentage (0-100)
    pub hit_rate: f64,

    pub loads: usize,
    pub load_failures: usize,
}

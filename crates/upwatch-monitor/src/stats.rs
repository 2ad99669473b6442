//! Shared per-domain availability counters.
//!
//! The registry is the single shared mutable structure in the system: every
//! probe task increments counters for its endpoint's domain while the
//! reporter snapshots the whole map. Map access is guarded by an async
//! `RwLock`; the counters themselves are atomics, so no lock is ever held
//! across network I/O.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

/// Cumulative counters for one domain label.
///
/// `total` counts every attempted probe; `success` only those classified
/// successful. `total` is always incremented first, so `success <= total`
/// holds at every observable point.
#[derive(Debug, Default)]
pub struct DomainStats {
    success: AtomicU64,
    total: AtomicU64,
}

impl DomainStats {
    /// Count one attempted probe.
    pub fn record_total(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one successful probe.
    ///
    /// Release pairs with the Acquire load in [`counts`](Self::counts): a
    /// reader that sees this increment also sees the `total` increment the
    /// writer made before it.
    pub fn record_success(&self) {
        self.success.fetch_add(1, Ordering::Release);
    }

    /// Load both counters.
    ///
    /// `success` is Acquire-loaded before `total`; any `total` increment
    /// that preceded an observed `success` increment is therefore visible,
    /// so the pair can never show `success > total`.
    pub fn counts(&self) -> DomainCounts {
        let success = self.success.load(Ordering::Acquire);
        let total = self.total.load(Ordering::Relaxed);
        DomainCounts { success, total }
    }
}

/// Point-in-time counter values for one domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainCounts {
    pub success: u64,
    pub total: u64,
}

impl DomainCounts {
    /// Availability percentage, rounded to the nearest integer.
    ///
    /// A domain with no attempts yet reports 0%.
    pub fn availability_pct(&self) -> u64 {
        if self.total == 0 {
            return 0;
        }
        (100.0 * self.success as f64 / self.total as f64).round() as u64
    }
}

/// Thread-safe map from domain label to cumulative counters.
///
/// Cloneable handle (backed by `Arc`), shared by all probe tasks and the
/// reporter. Entries are created lazily and never removed.
#[derive(Debug, Clone, Default)]
pub struct StatsRegistry {
    domains: Arc<RwLock<HashMap<String, Arc<DomainStats>>>>,
}

impl StatsRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotently create a zeroed entry for a domain and return it.
    pub async fn ensure(&self, domain: &str) -> Arc<DomainStats> {
        // Fast path: after the first cycle nearly every lookup hits an
        // existing entry.
        {
            let domains = self.domains.read().await;
            if let Some(stats) = domains.get(domain) {
                return stats.clone();
            }
        }

        let mut domains = self.domains.write().await;
        domains
            .entry(domain.to_string())
            .or_insert_with(|| Arc::new(DomainStats::default()))
            .clone()
    }

    /// Number of known domains.
    pub async fn len(&self) -> usize {
        self.domains.read().await.len()
    }

    /// Whether any domain has been registered.
    pub async fn is_empty(&self) -> bool {
        self.domains.read().await.is_empty()
    }

    /// Consistent point-in-time copy of all entries, sorted by domain.
    ///
    /// Individual entries are read atomically; writers are only excluded
    /// from inserting new domains while the read lock is held.
    pub async fn snapshot(&self) -> Vec<(String, DomainCounts)> {
        let domains = self.domains.read().await;
        let mut entries: Vec<(String, DomainCounts)> = domains
            .iter()
            .map(|(domain, stats)| (domain.clone(), stats.counts()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

//! # Vitrine Report Cache
//!
//! Version-token keyed memoization of the computed `MetricsReport`.
//!
//! The metrics engine is a pure function of the dataset snapshot and knows
//! nothing about caching; this gate wraps it from the outside. The cache key
//! is an opaque version token supplied by the caller: bumping the token after
//! an import invalidates every previously cached report without enumerating
//! entries. A TTL bounds staleness even when the token never changes.

use metrics::MetricsReport;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Source of the opaque cache version token.
///
/// Bumped by the caller after every successful import. Readers only ever
/// compare tokens for equality.
#[derive(Debug, Default)]
pub struct VersionCounter {
    value: AtomicU64,
}

impl VersionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }

    /// Invalidates every report cached under the previous token.
    pub fn bump(&self) -> u64 {
        self.value.fetch_add(1, Ordering::AcqRel) + 1
    }
}

struct CacheEntry {
    version: u64,
    computed_at: Instant,
    report: Arc<MetricsReport>,
}

/// Memoizes one `MetricsReport` keyed by version token, with a TTL.
///
/// The inner mutex is held across the compute future, so at most one
/// computation is in flight: concurrent callers with the same token wait and
/// then share the first caller's result.
pub struct ReportCache {
    entry: Mutex<Option<CacheEntry>>,
    ttl: Duration,
}

impl ReportCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entry: Mutex::new(None),
            ttl,
        }
    }

    /// Returns the cached report for `version`, or runs `compute` and caches
    /// its result. A version mismatch or an expired TTL forces a recompute;
    /// a failed compute caches nothing.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        version: u64,
        compute: F,
    ) -> Result<Arc<MetricsReport>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<MetricsReport, E>>,
    {
        let mut guard = self.entry.lock().await;

        if let Some(entry) = guard.as_ref()
            && entry.version == version
            && entry.computed_at.elapsed() < self.ttl
        {
            tracing::debug!(version, "Serving cached metrics report.");
            return Ok(Arc::clone(&entry.report));
        }

        tracing::debug!(version, "Cache miss; computing metrics report.");
        let report = Arc::new(compute().await?);
        *guard = Some(CacheEntry {
            version,
            computed_at: Instant::now(),
            report: Arc::clone(&report),
        });

        Ok(report)
    }

    /// Drops any cached entry immediately.
    pub async fn clear(&self) {
        *self.entry.lock().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics::{MetricsEngine, OrderDataset};
    use std::convert::Infallible;
    use std::sync::atomic::AtomicUsize;

    fn fresh_report() -> MetricsReport {
        MetricsEngine::new().compute(&OrderDataset::default())
    }

    async fn compute_counted(
        counter: &AtomicUsize,
    ) -> Result<MetricsReport, Infallible> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(fresh_report())
    }

    #[tokio::test]
    async fn same_token_computes_once() {
        let cache = ReportCache::new(Duration::from_secs(60));
        let computations = AtomicUsize::new(0);

        let first = cache
            .get_or_compute(1, || compute_counted(&computations))
            .await
            .unwrap();
        let second = cache
            .get_or_compute(1, || compute_counted(&computations))
            .await
            .unwrap();

        assert_eq!(computations.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn bumped_token_forces_recompute() {
        let cache = ReportCache::new(Duration::from_secs(60));
        let computations = AtomicUsize::new(0);
        let version = VersionCounter::new();

        cache
            .get_or_compute(version.current(), || compute_counted(&computations))
            .await
            .unwrap();
        version.bump();
        cache
            .get_or_compute(version.current(), || compute_counted(&computations))
            .await
            .unwrap();

        assert_eq!(computations.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn expired_ttl_forces_recompute() {
        let cache = ReportCache::new(Duration::ZERO);
        let computations = AtomicUsize::new(0);

        cache
            .get_or_compute(1, || compute_counted(&computations))
            .await
            .unwrap();
        cache
            .get_or_compute(1, || compute_counted(&computations))
            .await
            .unwrap();

        assert_eq!(computations.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn clear_drops_the_entry() {
        let cache = ReportCache::new(Duration::from_secs(60));
        let computations = AtomicUsize::new(0);

        cache
            .get_or_compute(1, || compute_counted(&computations))
            .await
            .unwrap();
        cache.clear().await;
        cache
            .get_or_compute(1, || compute_counted(&computations))
            .await
            .unwrap();

        assert_eq!(computations.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn version_counter_is_monotonic() {
        let version = VersionCounter::new();
        assert_eq!(version.current(), 0);
        assert_eq!(version.bump(), 1);
        assert_eq!(version.bump(), 2);
        assert_eq!(version.current(), 2);
    }
}

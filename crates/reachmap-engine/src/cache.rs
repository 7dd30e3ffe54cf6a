//! Short-lived cache of computed region metrics.
//!
//! Entries are keyed by dataset version, so a reload never serves metrics
//! computed from the previous snapshot; stale-version entries are dropped on
//! the next insert.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reachmap_core::Region;
use tokio::sync::Mutex;

use crate::resolver::RegionMetrics;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    region: Region,
    radius_bits: u64,
    version: u64,
}

impl CacheKey {
    fn new(region: &Region, radius_miles: f64, version: u64) -> Self {
        Self {
            region: region.clone(),
            radius_bits: radius_miles.to_bits(),
            version,
        }
    }
}

#[derive(Debug)]
struct CachedMetrics {
    stored_at: Instant,
    metrics: Arc<RegionMetrics>,
}

/// TTL cache of [`RegionMetrics`] shared across request handlers.
#[derive(Debug, Clone)]
pub struct MetricsCache {
    ttl: Duration,
    entries: Arc<Mutex<HashMap<CacheKey, CachedMetrics>>>,
}

impl MetricsCache {
    /// A zero `ttl` disables caching.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Fresh metrics for the key, if any.
    pub async fn get(
        &self,
        region: &Region,
        radius_miles: f64,
        version: u64,
    ) -> Option<Arc<RegionMetrics>> {
        let key = CacheKey::new(region, radius_miles, version);
        let entries = self.entries.lock().await;
        entries
            .get(&key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| Arc::clone(&entry.metrics))
    }

    /// Stores `metrics` under its own region, radius and version. Expired
    /// entries and entries for older dataset versions are evicted first.
    pub async fn insert(&self, metrics: Arc<RegionMetrics>) {
        if self.ttl.is_zero() {
            return;
        }
        let key = CacheKey::new(&metrics.region, metrics.radius_miles, metrics.dataset_version);
        let ttl = self.ttl;
        let mut entries = self.entries.lock().await;
        entries.retain(|k, entry| k.version >= key.version && entry.stored_at.elapsed() < ttl);
        entries.insert(
            key,
            CachedMetrics {
                stored_at: Instant::now(),
                metrics,
            },
        );
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    #[cfg(test)]
    async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::CoverageResult;

    fn metrics(region: Region, radius_miles: f64, version: u64) -> Arc<RegionMetrics> {
        let coverage = CoverageResult {
            stores_uncovered: 1,
            stores_covered: 3,
            total_stores: 4,
            center_count: 2,
            capacity_units: 5,
        };
        Arc::new(RegionMetrics {
            region,
            radius_miles,
            coverage,
            covered_ratio: coverage.covered_ratio(),
            dataset_version: version,
        })
    }

    fn ohio() -> Region {
        Region::State("OH".to_string())
    }

    #[tokio::test]
    async fn hit_for_same_key() {
        let cache = MetricsCache::new(Duration::from_secs(60));
        cache.insert(metrics(ohio(), 35.0, 1)).await;

        let hit = cache.get(&ohio(), 35.0, 1).await.expect("cached");
        assert_eq!(hit.coverage.stores_covered, 3);
    }

    #[tokio::test]
    async fn miss_for_other_radius_region_or_version() {
        let cache = MetricsCache::new(Duration::from_secs(60));
        cache.insert(metrics(ohio(), 35.0, 1)).await;

        assert!(cache.get(&ohio(), 35.5, 1).await.is_none());
        assert!(cache.get(&Region::Nation, 35.0, 1).await.is_none());
        assert!(cache.get(&ohio(), 35.0, 2).await.is_none());
    }

    #[tokio::test]
    async fn newer_version_evicts_older_entries() {
        let cache = MetricsCache::new(Duration::from_secs(60));
        cache.insert(metrics(ohio(), 35.0, 1)).await;
        cache.insert(metrics(Region::Nation, 35.0, 1)).await;
        assert_eq!(cache.len().await, 2);

        cache.insert(metrics(ohio(), 35.0, 2)).await;

        assert_eq!(cache.len().await, 1);
        assert!(cache.get(&ohio(), 35.0, 2).await.is_some());
    }

    #[tokio::test]
    async fn zero_ttl_never_caches() {
        let cache = MetricsCache::new(Duration::ZERO);
        cache.insert(metrics(ohio(), 35.0, 1)).await;

        assert!(cache.is_empty().await);
        assert!(cache.get(&ohio(), 35.0, 1).await.is_none());
    }

    #[tokio::test]
    async fn expired_entry_is_a_miss() {
        let cache = MetricsCache::new(Duration::from_millis(20));
        cache.insert(metrics(ohio(), 35.0, 1)).await;

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert!(cache.get(&ohio(), 35.0, 1).await.is_none());
    }
}

//! Versioned dataset snapshots.
//!
//! A [`DatasetSnapshot`] is never mutated after construction. [`DatasetStore`]
//! hands out `Arc` clones of the current snapshot and replaces the whole `Arc`
//! on reload, so readers always see one complete dataset.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use reachmap_core::{CenterPoint, RegionAggregate, StorePoint};

use crate::loader::{load_aggregates, load_centers, load_stores, DatasetPaths};
use crate::DataError;

/// One immutable, fully loaded copy of the three collections.
#[derive(Debug, Clone)]
pub struct DatasetSnapshot {
    pub version: u64,
    pub loaded_at: DateTime<Utc>,
    pub stores: Vec<StorePoint>,
    pub centers: Vec<CenterPoint>,
    pub aggregates: Vec<RegionAggregate>,
}

impl DatasetSnapshot {
    #[must_use]
    pub fn new(
        version: u64,
        stores: Vec<StorePoint>,
        centers: Vec<CenterPoint>,
        aggregates: Vec<RegionAggregate>,
    ) -> Self {
        Self {
            version,
            loaded_at: Utc::now(),
            stores,
            centers,
            aggregates,
        }
    }

    /// Read all three files into a new snapshot.
    ///
    /// # Errors
    ///
    /// Returns the first [`DataError`] hit while reading any file.
    pub fn load(paths: &DatasetPaths, version: u64) -> Result<Self, DataError> {
        let stores = load_stores(&paths.stores)?;
        let centers = load_centers(&paths.centers)?;
        let aggregates = match &paths.aggregates {
            Some(path) => load_aggregates(path)?,
            None => Vec::new(),
        };
        Ok(Self::new(version, stores, centers, aggregates))
    }

    /// Sorted, distinct state codes present in the store collection.
    #[must_use]
    pub fn state_codes(&self) -> Vec<String> {
        self.stores
            .iter()
            .filter_map(|s| s.state.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted, distinct city names from the aggregate table.
    #[must_use]
    pub fn city_names(&self) -> Vec<String> {
        self.aggregates
            .iter()
            .map(|a| a.city.clone())
            .filter(|c| !c.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Store count per state code, stores without a code excluded.
    #[must_use]
    pub fn store_counts_by_state(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for state in self.stores.iter().filter_map(|s| s.state.as_deref()) {
            *counts.entry(state.to_string()).or_insert(0) += 1;
        }
        counts
    }
}

/// Holder of the current snapshot, with reload support.
#[derive(Debug)]
pub struct DatasetStore {
    paths: DatasetPaths,
    current: RwLock<Arc<DatasetSnapshot>>,
    next_version: AtomicU64,
}

impl DatasetStore {
    /// Load the initial snapshot from disk.
    ///
    /// # Errors
    ///
    /// Returns [`DataError`] if the dataset cannot be loaded at all. Callers
    /// treat this as fatal.
    pub fn open(paths: DatasetPaths) -> Result<Self, DataError> {
        let snapshot = DatasetSnapshot::load(&paths, 1)?;
        Ok(Self::from_snapshot(paths, snapshot))
    }

    /// Wrap an already-built snapshot. Later reloads read from `paths`.
    #[must_use]
    pub fn from_snapshot(paths: DatasetPaths, snapshot: DatasetSnapshot) -> Self {
        let next_version = snapshot.version + 1;
        Self {
            paths,
            current: RwLock::new(Arc::new(snapshot)),
            next_version: AtomicU64::new(next_version),
        }
    }

    /// The snapshot currently being served.
    #[must_use]
    pub fn current(&self) -> Arc<DatasetSnapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Re-read the dataset files and swap in the result.
    ///
    /// On failure the previous snapshot stays current.
    ///
    /// # Errors
    ///
    /// Returns the [`DataError`] that prevented the new snapshot from loading.
    pub fn reload(&self) -> Result<Arc<DatasetSnapshot>, DataError> {
        let version = self.next_version.fetch_add(1, Ordering::SeqCst);
        let snapshot = match DatasetSnapshot::load(&self.paths, version) {
            Ok(snapshot) => Arc::new(snapshot),
            Err(e) => {
                let kept = self.current().version;
                tracing::error!(
                    error = %e,
                    kept_version = kept,
                    "dataset reload failed; keeping last good snapshot"
                );
                return Err(e);
            }
        };

        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        // Two overlapping reloads may finish out of order; never go backwards.
        if snapshot.version > guard.version {
            *guard = Arc::clone(&snapshot);
        }
        let installed = Arc::clone(&guard);
        drop(guard);

        tracing::info!(
            version = installed.version,
            stores = installed.stores.len(),
            centers = installed.centers.len(),
            aggregates = installed.aggregates.len(),
            "dataset reloaded"
        );
        Ok(installed)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn store(state: Option<&str>) -> StorePoint {
        StorePoint {
            name: "Store".to_string(),
            street_address: None,
            city: None,
            state: state.map(str::to_string),
            latitude: Some(35.0),
            longitude: Some(-80.0),
        }
    }

    fn aggregate(city: &str) -> RegionAggregate {
        RegionAggregate {
            city: city.to_string(),
            state: Some("NC".to_string()),
            latitude: None,
            longitude: None,
            center_count: Some(1),
            capacity: Some(2),
        }
    }

    fn unreachable_paths() -> DatasetPaths {
        DatasetPaths {
            stores: PathBuf::from("/nonexistent/stores.json"),
            centers: PathBuf::from("/nonexistent/centers.json"),
            aggregates: None,
        }
    }

    #[test]
    fn state_codes_are_sorted_and_distinct() {
        let snapshot = DatasetSnapshot::new(
            1,
            vec![store(Some("TX")), store(Some("AL")), store(Some("TX")), store(None)],
            vec![],
            vec![],
        );
        assert_eq!(snapshot.state_codes(), vec!["AL", "TX"]);
    }

    #[test]
    fn city_names_skip_blank_entries() {
        let snapshot = DatasetSnapshot::new(
            1,
            vec![],
            vec![],
            vec![aggregate("Raleigh"), aggregate(""), aggregate("Charlotte")],
        );
        assert_eq!(snapshot.city_names(), vec!["Charlotte", "Raleigh"]);
    }

    #[test]
    fn store_counts_by_state() {
        let snapshot = DatasetSnapshot::new(
            1,
            vec![store(Some("TX")), store(Some("TX")), store(Some("OK")), store(None)],
            vec![],
            vec![],
        );
        let counts = snapshot.store_counts_by_state();
        assert_eq!(counts.get("TX"), Some(&2));
        assert_eq!(counts.get("OK"), Some(&1));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn failed_reload_keeps_previous_snapshot() {
        let snapshot = DatasetSnapshot::new(7, vec![store(Some("TX"))], vec![], vec![]);
        let dataset = DatasetStore::from_snapshot(unreachable_paths(), snapshot);

        let err = dataset.reload().unwrap_err();
        assert!(matches!(err, DataError::Io { .. }), "got {err:?}");

        let current = dataset.current();
        assert_eq!(current.version, 7);
        assert_eq!(current.stores.len(), 1);
    }

    #[test]
    fn open_fails_without_files() {
        assert!(DatasetStore::open(unreachable_paths()).is_err());
    }
}

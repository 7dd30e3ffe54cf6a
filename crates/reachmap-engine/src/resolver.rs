//! Region narrowing and metrics assembly.

use reachmap_boundary::{BoundaryOutcome, BoundaryResolver};
use reachmap_core::{CenterPoint, Region, RegionAggregate, RegionTable, StorePoint};
use reachmap_data::DatasetSnapshot;
use serde::Serialize;

use crate::coverage::{
    compute_coverage, uncovered_stores, CapacityTotals, CoverageResult, NearestDistances,
};
use crate::AGGREGATE_MATCH_TOLERANCE_DEGREES;

/// The slice of a snapshot that belongs to one region.
///
/// `centers` are the centers counted in the region. Coverage of the region's
/// stores is measured against every center in the snapshot, since the
/// nearest center may sit across a state line or carry no state code.
#[derive(Debug, Clone)]
pub struct ResolvedRegion<'a> {
    pub region: Region,
    pub stores: Vec<&'a StorePoint>,
    pub centers: Vec<&'a CenterPoint>,
    pub aggregates: Vec<&'a RegionAggregate>,
    candidates: &'a [CenterPoint],
    aggregate_totals: bool,
}

impl<'a> ResolvedRegion<'a> {
    /// Filters `snapshot` down to `region`.
    ///
    /// Stores and aggregates match on their state code. A center matches on
    /// its own state code when it has one; otherwise it belongs to the region
    /// if it sits on one of the region's aggregate cities. The nation takes
    /// everything unfiltered.
    #[must_use]
    pub fn resolve(snapshot: &'a DatasetSnapshot, region: &Region) -> Self {
        let stores = snapshot
            .stores
            .iter()
            .filter(|s| region.contains_code(s.state.as_deref()))
            .collect();
        let aggregates: Vec<&RegionAggregate> = snapshot
            .aggregates
            .iter()
            .filter(|a| region.contains_code(a.state.as_deref()))
            .collect();
        let centers = snapshot
            .centers
            .iter()
            .filter(|c| center_in_region(c, region, &aggregates))
            .collect();

        Self {
            region: region.clone(),
            stores,
            centers,
            aggregates,
            candidates: &snapshot.centers,
            aggregate_totals: !snapshot.aggregates.is_empty(),
        }
    }

    /// Center and capacity totals: from the region's aggregates when the
    /// dataset has an aggregate table, else from its centers.
    #[must_use]
    pub fn totals(&self) -> CapacityTotals {
        if self.aggregate_totals {
            CapacityTotals::from_aggregates(self.aggregates.iter().copied())
        } else {
            CapacityTotals::from_centers(self.centers.iter().copied())
        }
    }

    /// Centers a store in this region can be covered by.
    #[must_use]
    pub fn candidates(&self) -> &'a [CenterPoint] {
        self.candidates
    }

    #[must_use]
    pub fn coverage(&self, radius_miles: f64) -> CoverageResult {
        compute_coverage(self.stores.iter().copied(), self.candidates, radius_miles)
        .with_totals(self.totals())
    }

    #[must_use]
    pub fn uncovered(&self, radius_miles: f64) -> Vec<&'a StorePoint> {
        uncovered_stores(self.stores.iter().copied(), self.candidates, radius_miles)
    }

    /// Nearest-center distances for a radius sweep. Totals follow
    /// [`ResolvedRegion::totals`].
    #[must_use]
    pub fn nearest_distances(&self) -> NearestDistances {
        NearestDistances::compute(self.stores.iter().copied(), self.candidates)
            .with_totals(self.totals())
    }
}

fn center_in_region(
    center: &CenterPoint,
    region: &Region,
    aggregates: &[&RegionAggregate],
) -> bool {
    if region.is_nation() {
        return true;
    }
    if let Some(state) = center.state.as_deref() {
        return region.contains_code(Some(state));
    }
    let Some(position) = center.coordinate() else {
        return false;
    };
    aggregates.iter().any(|a| {
        a.coordinate()
            .is_some_and(|c| c.approx_eq(&position, AGGREGATE_MATCH_TOLERANCE_DEGREES))
    })
}

/// Coverage for one (region, radius) against a specific dataset version.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionMetrics {
    pub region: Region,
    pub radius_miles: f64,
    #[serde(flatten)]
    pub coverage: CoverageResult,
    pub covered_ratio: Option<f64>,
    pub dataset_version: u64,
}

/// Resolves `region` in `snapshot` and computes its coverage at
/// `radius_miles`. Codes with no data yield all-zero metrics.
#[must_use]
pub fn region_metrics(
    snapshot: &DatasetSnapshot,
    region: &Region,
    radius_miles: f64,
) -> RegionMetrics {
    let coverage = ResolvedRegion::resolve(snapshot, region).coverage(radius_miles);
    RegionMetrics {
        region: region.clone(),
        radius_miles,
        coverage,
        covered_ratio: coverage.covered_ratio(),
        dataset_version: snapshot.version,
    }
}

/// Asks `resolver` for the boundary of `region`.
///
/// State codes absent from the region table are reported as not found
/// without a lookup.
pub async fn resolve_boundary(
    resolver: &dyn BoundaryResolver,
    region: &Region,
) -> BoundaryOutcome {
    if !RegionTable::global().is_known(region) {
        tracing::debug!(region = %region, "skipping boundary lookup for unknown region");
        return BoundaryOutcome::NotFound;
    }
    resolver.resolve_boundary(region).await
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;

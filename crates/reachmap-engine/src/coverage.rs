//! Store coverage classification.
//!
//! A store is covered when at least one center with a valid coordinate lies
//! within `radius_miles` of it (distance ≤ radius). Stores without a valid
//! coordinate are never covered but still count toward the total. A radius
//! that is zero, negative, or not finite covers nothing, even a store sitting
//! on top of a center.

use reachmap_core::{distance_miles, CenterPoint, Coordinate, RegionAggregate, StorePoint};
use serde::Serialize;

/// Covered/uncovered counts plus center totals for one region and radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CoverageResult {
    pub stores_uncovered: usize,
    pub stores_covered: usize,
    pub total_stores: usize,
    pub center_count: u64,
    pub capacity_units: u64,
}

impl CoverageResult {
    /// Fraction of stores covered, or `None` when there are no stores.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn covered_ratio(&self) -> Option<f64> {
        (self.total_stores > 0).then(|| self.stores_covered as f64 / self.total_stores as f64)
    }

    #[must_use]
    pub fn with_totals(self, totals: CapacityTotals) -> Self {
        Self {
            center_count: totals.center_count,
            capacity_units: totals.capacity_units,
            ..self
        }
    }
}

/// Center and capacity sums for a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapacityTotals {
    pub center_count: u64,
    pub capacity_units: u64,
}

impl CapacityTotals {
    /// Each center counts once unless it carries its own center count.
    #[must_use]
    pub fn from_centers<'c>(centers: impl IntoIterator<Item = &'c CenterPoint>) -> Self {
        centers
            .into_iter()
            .fold(Self::default(), |acc, c| Self {
                center_count: acc.center_count + u64::from(c.center_count.unwrap_or(1)),
                capacity_units: acc.capacity_units + u64::from(c.capacity.unwrap_or(0)),
            })
    }

    #[must_use]
    pub fn from_aggregates<'a>(
        aggregates: impl IntoIterator<Item = &'a RegionAggregate>,
    ) -> Self {
        aggregates
            .into_iter()
            .fold(Self::default(), |acc, a| Self {
                center_count: acc.center_count + u64::from(a.center_count.unwrap_or(0)),
                capacity_units: acc.capacity_units + u64::from(a.capacity.unwrap_or(0)),
            })
    }
}

fn radius_covers_anything(radius_miles: f64) -> bool {
    radius_miles.is_finite() && radius_miles > 0.0
}

fn candidate_coordinates<'c>(
    centers: impl IntoIterator<Item = &'c CenterPoint>,
) -> Vec<Coordinate> {
    centers
        .into_iter()
        .filter_map(CenterPoint::coordinate)
        .collect()
}

fn is_covered(store: &StorePoint, candidates: &[Coordinate], radius_miles: f64) -> bool {
    let Some(origin) = store.coordinate() else {
        return false;
    };
    candidates
        .iter()
        .any(|center| distance_miles(&origin, center) <= radius_miles)
}

/// Classifies every store against every valid center.
///
/// `center_count` and `capacity_units` are summed over all given centers,
/// including those whose coordinate is invalid.
#[must_use]
pub fn compute_coverage<'s, 'c, S, C>(
    stores: S,
    centers: C,
    radius_miles: f64,
) -> CoverageResult
where
    S: IntoIterator<Item = &'s StorePoint>,
    C: IntoIterator<Item = &'c CenterPoint> + Clone,
{
    let totals = CapacityTotals::from_centers(centers.clone());
    let candidates = candidate_coordinates(centers);
    let active = radius_covers_anything(radius_miles);

    let mut result = CoverageResult::default().with_totals(totals);
    for store in stores {
        result.total_stores += 1;
        if active && is_covered(store, &candidates, radius_miles) {
            result.stores_covered += 1;
        } else {
            result.stores_uncovered += 1;
        }
    }
    result
}

/// The stores [`compute_coverage`] would count as uncovered, in input order.
#[must_use]
pub fn uncovered_stores<'s, 'c, S, C>(
    stores: S,
    centers: C,
    radius_miles: f64,
) -> Vec<&'s StorePoint>
where
    S: IntoIterator<Item = &'s StorePoint>,
    C: IntoIterator<Item = &'c CenterPoint>,
{
    let candidates = candidate_coordinates(centers);
    let active = radius_covers_anything(radius_miles);
    stores
        .into_iter()
        .filter(|store| !(active && is_covered(store, &candidates, radius_miles)))
        .collect()
}

/// Per-store distance to the nearest valid center, computed once so that
/// many radii can be answered without repeating the pairwise scan.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestDistances {
    nearest: Vec<Option<f64>>,
    totals: CapacityTotals,
}

impl NearestDistances {
    #[must_use]
    pub fn compute<'s, 'c, S, C>(stores: S, centers: C) -> Self
    where
        S: IntoIterator<Item = &'s StorePoint>,
        C: IntoIterator<Item = &'c CenterPoint> + Clone,
    {
        let totals = CapacityTotals::from_centers(centers.clone());
        let candidates = candidate_coordinates(centers);
        let nearest = stores
            .into_iter()
            .map(|store| {
                let origin = store.coordinate()?;
                candidates
                    .iter()
                    .map(|center| distance_miles(&origin, center))
                    .min_by(f64::total_cmp)
            })
            .collect();
        Self { nearest, totals }
    }

    /// Replaces the center totals reported by [`NearestDistances::coverage_at`].
    #[must_use]
    pub fn with_totals(self, totals: CapacityTotals) -> Self {
        Self { totals, ..self }
    }

    /// Nearest-center distance per store, in input order.
    #[must_use]
    pub fn distances(&self) -> &[Option<f64>] {
        &self.nearest
    }

    /// Same answer as [`compute_coverage`] for the stores and centers this
    /// was built from.
    #[must_use]
    pub fn coverage_at(&self, radius_miles: f64) -> CoverageResult {
        let active = radius_covers_anything(radius_miles);
        let covered = self
            .nearest
            .iter()
            .filter(|nearest| active && nearest.is_some_and(|d| d <= radius_miles))
            .count();
        CoverageResult {
            stores_uncovered: self.nearest.len() - covered,
            stores_covered: covered,
            total_stores: self.nearest.len(),
            center_count: self.totals.center_count,
            capacity_units: self.totals.capacity_units,
        }
    }
}

#[cfg(test)]
#[path = "coverage_test.rs"]
mod tests;

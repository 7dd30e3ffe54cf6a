use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::*;

fn store(state: Option<&str>, lat: f64, lon: f64) -> StorePoint {
    StorePoint {
        name: format!("Store {lat},{lon}"),
        street_address: None,
        city: None,
        state: state.map(str::to_string),
        latitude: Some(lat),
        longitude: Some(lon),
    }
}

fn center(name: &str, state: Option<&str>, lat: f64, lon: f64, capacity: u32) -> CenterPoint {
    CenterPoint {
        name: name.to_string(),
        state: state.map(str::to_string),
        latitude: Some(lat),
        longitude: Some(lon),
        capacity: Some(capacity),
        center_count: None,
    }
}

fn aggregate(
    city: &str,
    state: &str,
    lat: f64,
    lon: f64,
    centers: u32,
    capacity: u32,
) -> RegionAggregate {
    RegionAggregate {
        city: city.to_string(),
        state: Some(state.to_string()),
        latitude: Some(lat),
        longitude: Some(lon),
        center_count: Some(centers),
        capacity: Some(capacity),
    }
}

fn snapshot_with_aggregates(aggregates: Vec<RegionAggregate>) -> DatasetSnapshot {
    DatasetSnapshot::new(
        3,
        vec![
            store(Some("GA"), 33.75, -84.39),
            store(Some("GA"), 32.08, -81.09),
            store(Some("SC"), 34.00, -81.03),
            store(None, 35.00, -80.00),
        ],
        vec![
            center("Atlanta Center", Some("GA"), 33.79, -84.32, 4),
            // No state code: assigned through the Columbia aggregate.
            center("Columbia Center", None, 34.005, -81.035, 2),
            center("Nowhere Center", None, 10.0, 10.0, 1),
        ],
        aggregates,
    )
}

fn snapshot() -> DatasetSnapshot {
    snapshot_with_aggregates(vec![
        aggregate("Atlanta", "GA", 33.749, -84.388, 3, 9),
        aggregate("Columbia", "SC", 34.0, -81.03, 1, 2),
    ])
}

#[test]
fn nation_returns_everything_unfiltered() {
    let snapshot = snapshot();
    let resolved = ResolvedRegion::resolve(&snapshot, &Region::Nation);

    assert_eq!(resolved.stores.len(), 4);
    assert_eq!(resolved.centers.len(), 3);
    assert_eq!(resolved.aggregates.len(), 2);
}

#[test]
fn state_filters_by_code() {
    let snapshot = snapshot();
    let resolved = ResolvedRegion::resolve(&snapshot, &Region::State("GA".to_string()));

    assert_eq!(resolved.stores.len(), 2);
    assert_eq!(resolved.centers.len(), 1);
    assert_eq!(resolved.centers[0].name, "Atlanta Center");
    assert_eq!(resolved.aggregates.len(), 1);
}

#[test]
fn center_without_code_is_matched_by_aggregate_coordinate() {
    let snapshot = snapshot();
    let resolved = ResolvedRegion::resolve(&snapshot, &Region::State("SC".to_string()));

    let names: Vec<&str> = resolved.centers.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Columbia Center"]);
}

#[test]
fn totals_come_from_aggregates_when_present() {
    let snapshot = snapshot();
    let metrics = region_metrics(&snapshot, &Region::State("GA".to_string()), 35.0);

    assert_eq!(metrics.coverage.center_count, 3);
    assert_eq!(metrics.coverage.capacity_units, 9);
    assert_eq!(metrics.dataset_version, 3);
}

#[test]
fn totals_fall_back_to_centers_without_aggregate_table() {
    let snapshot = snapshot_with_aggregates(Vec::new());
    let metrics = region_metrics(&snapshot, &Region::State("GA".to_string()), 35.0);

    assert_eq!(metrics.coverage.center_count, 1);
    assert_eq!(metrics.coverage.capacity_units, 4);
}

#[test]
fn state_metrics_count_covered_stores() {
    let snapshot = snapshot();
    let metrics = region_metrics(&snapshot, &Region::State("GA".to_string()), 35.0);

    // Atlanta store is ~4 miles from the center, Savannah ~220.
    assert_eq!(metrics.coverage.total_stores, 2);
    assert_eq!(metrics.coverage.stores_covered, 1);
    assert_eq!(metrics.coverage.stores_uncovered, 1);
    assert_eq!(metrics.covered_ratio, Some(0.5));
}

#[test]
fn store_is_covered_by_center_across_state_line() {
    // Camden NJ store, Philadelphia PA center about 4 miles away.
    let snapshot = DatasetSnapshot::new(
        1,
        vec![store(Some("NJ"), 39.9259, -75.1196)],
        vec![center("Penn Radiation", Some("PA"), 39.9496, -75.1932, 3)],
        Vec::new(),
    );
    let region = Region::State("NJ".to_string());
    let resolved = ResolvedRegion::resolve(&snapshot, &region);

    assert!(resolved.centers.is_empty());
    assert_eq!(resolved.candidates().len(), 1);

    let metrics = region_metrics(&snapshot, &region, 35.0);
    assert_eq!(metrics.coverage.stores_covered, 1);
    assert_eq!(metrics.coverage.stores_uncovered, 0);
    assert_eq!(metrics.coverage.center_count, 0);
    assert_eq!(metrics.coverage.capacity_units, 0);
    assert!(resolved.uncovered(35.0).is_empty());
}

#[test]
fn center_without_state_code_covers_nearby_store() {
    let snapshot = DatasetSnapshot::new(
        1,
        vec![store(Some("GA"), 33.80, -84.33)],
        vec![center("Decatur Site", None, 33.7925, -84.3220, 2)],
        vec![aggregate("Atlanta", "GA", 33.749, -84.388, 3, 9)],
    );
    let region = Region::State("GA".to_string());

    // Too far from the Atlanta centroid to be counted in GA.
    let resolved = ResolvedRegion::resolve(&snapshot, &region);
    assert!(resolved.centers.is_empty());

    let metrics = region_metrics(&snapshot, &region, 35.0);
    assert_eq!(metrics.coverage.stores_covered, 1);
    assert_eq!(metrics.coverage.center_count, 3);
    assert_eq!(metrics.covered_ratio, Some(1.0));
}

#[test]
fn state_sweep_uses_all_centers() {
    let snapshot = snapshot();
    let resolved = ResolvedRegion::resolve(&snapshot, &Region::State("SC".to_string()));
    let nearest = resolved.nearest_distances();

    for radius in [0.5, 35.0, 500.0] {
        assert_eq!(nearest.coverage_at(radius), resolved.coverage(radius));
    }
    // The SC store's nearest center is the unassigned Columbia site.
    let distances = nearest.distances();
    assert_eq!(distances.len(), 1);
    assert!(distances[0].is_some_and(|d| d < 1.0));
}

#[test]
fn unknown_state_yields_zero_metrics() {
    let snapshot = snapshot();
    let metrics = region_metrics(&snapshot, &Region::State("ZZ".to_string()), 35.0);

    assert_eq!(metrics.coverage, CoverageResult::default());
    assert_eq!(metrics.covered_ratio, None);
}

#[test]
fn uncovered_lists_the_far_store() {
    let snapshot = snapshot();
    let resolved = ResolvedRegion::resolve(&snapshot, &Region::State("GA".to_string()));
    let uncovered = resolved.uncovered(35.0);

    assert_eq!(uncovered.len(), 1);
    assert_eq!(uncovered[0].latitude, Some(32.08));
}

#[test]
fn sweep_matches_metrics() {
    let snapshot = snapshot();
    let resolved = ResolvedRegion::resolve(&snapshot, &Region::Nation);
    let nearest = resolved.nearest_distances();

    for radius in [0.0, 10.0, 35.0, 300.0] {
        assert_eq!(nearest.coverage_at(radius), resolved.coverage(radius));
    }
}

#[test]
fn metrics_serialize_flat() {
    let snapshot = snapshot();
    let metrics = region_metrics(&snapshot, &Region::State("GA".to_string()), 35.0);
    let json = serde_json::to_value(&metrics).unwrap();

    assert_eq!(json["region"], "GA");
    assert_eq!(json["stores_covered"], 1);
    assert_eq!(json["total_stores"], 2);
    assert_eq!(json["dataset_version"], 3);
    assert!(json.get("coverage").is_none());
}

struct FakeBoundary {
    calls: AtomicUsize,
    outcome: BoundaryOutcome,
}

#[async_trait]
impl BoundaryResolver for FakeBoundary {
    async fn resolve_boundary(&self, _region: &Region) -> BoundaryOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

fn square() -> geojson::Geometry {
    geojson::Geometry::new(geojson::Value::Polygon(vec![vec![
        vec![0.0, 0.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
        vec![0.0, 0.0],
    ]]))
}

#[tokio::test]
async fn boundary_delegates_for_known_state() {
    let fake = FakeBoundary {
        calls: AtomicUsize::new(0),
        outcome: BoundaryOutcome::Found(square()),
    };

    let outcome = resolve_boundary(&fake, &Region::State("GA".to_string())).await;

    assert!(matches!(outcome, BoundaryOutcome::Found(_)));
    assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn boundary_passes_through_unavailable() {
    let fake = FakeBoundary {
        calls: AtomicUsize::new(0),
        outcome: BoundaryOutcome::Unavailable("timeout".to_string()),
    };

    let outcome = resolve_boundary(&fake, &Region::Nation).await;

    assert_eq!(outcome, BoundaryOutcome::Unavailable("timeout".to_string()));
}

#[tokio::test]
async fn boundary_for_unknown_code_skips_lookup() {
    let fake = FakeBoundary {
        calls: AtomicUsize::new(0),
        outcome: BoundaryOutcome::Found(square()),
    };

    let outcome = resolve_boundary(&fake, &Region::State("ZZ".to_string())).await;

    assert_eq!(outcome, BoundaryOutcome::NotFound);
    assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
}

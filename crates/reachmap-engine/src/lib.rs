//! Proximity metrics over a loaded dataset.
//!
//! - [`coverage`]: pure covered/uncovered classification for a radius.
//! - [`resolver`]: narrows a snapshot to one region and assembles
//!   [`RegionMetrics`].
//! - [`cache`]: TTL cache of computed metrics keyed by dataset version.

pub mod cache;
pub mod coverage;
pub mod resolver;

pub use cache::MetricsCache;
pub use coverage::{
    compute_coverage, uncovered_stores, CapacityTotals, CoverageResult, NearestDistances,
};
pub use resolver::{region_metrics, resolve_boundary, RegionMetrics, ResolvedRegion};

/// Tolerance, in degrees on each axis, for matching a center to a city
/// aggregate by coordinate.
pub const AGGREGATE_MATCH_TOLERANCE_DEGREES: f64 = 0.01;

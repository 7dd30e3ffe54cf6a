//! Region boundary lookup.
//!
//! [`BoundaryResolver`] is the seam the rest of the workspace depends on;
//! [`NominatimClient`] is the production implementation backed by the
//! `OpenStreetMap` Nominatim search API.

pub mod client;
pub mod error;
pub(crate) mod retry;

pub use client::NominatimClient;
pub use error::BoundaryError;

use async_trait::async_trait;
use reachmap_core::Region;

/// Result of a boundary lookup. Callers must be able to tell "this region
/// has no boundary" apart from "the lookup service is down".
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryOutcome {
    Found(geojson::Geometry),
    NotFound,
    Unavailable(String),
}

/// Something that can turn a region into its outline polygon.
#[async_trait]
pub trait BoundaryResolver: Send + Sync {
    async fn resolve_boundary(&self, region: &Region) -> BoundaryOutcome;
}

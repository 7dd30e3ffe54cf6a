use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use reachmap_core::{Region, StorePoint};
use reachmap_engine::{region_metrics, RegionMetrics, ResolvedRegion};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{
    map_join_error, parse_radius, parse_region, ApiError, ApiResponse, AppState, ResponseMeta,
};

/// `state` and `radius` stay strings so malformed values get a JSON
/// `bad_request` instead of axum's plain-text rejection.
#[derive(Debug, Deserialize)]
pub(super) struct CoverageQuery {
    pub state: Option<String>,
    pub radius: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct UncoveredStores {
    region: Region,
    radius_miles: f64,
    dataset_version: u64,
    count: usize,
    stores: Vec<StorePoint>,
}

pub(super) async fn get_metrics(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CoverageQuery>,
) -> Result<Json<ApiResponse<RegionMetrics>>, ApiError> {
    let region = parse_region(&req_id.0, query.state.as_deref())?;
    let radius = parse_radius(
        &req_id.0,
        query.radius.as_deref(),
        state.default_radius_miles,
    )?;
    let snapshot = state.dataset.current();

    let metrics = if let Some(hit) = state.cache.get(&region, radius, snapshot.version).await {
        hit
    } else {
        let computed = tokio::task::spawn_blocking(move || {
            Arc::new(region_metrics(&snapshot, &region, radius))
        })
        .await
        .map_err(|e| map_join_error(req_id.0.clone(), &e))?;
        state.cache.insert(Arc::clone(&computed)).await;
        computed
    };

    tracing::debug!(
        region = %metrics.region,
        radius_miles = metrics.radius_miles,
        covered = metrics.coverage.stores_covered,
        uncovered = metrics.coverage.stores_uncovered,
        "metrics served"
    );

    Ok(Json(ApiResponse {
        data: RegionMetrics::clone(&metrics),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_uncovered_stores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CoverageQuery>,
) -> Result<Json<ApiResponse<UncoveredStores>>, ApiError> {
    let region = parse_region(&req_id.0, query.state.as_deref())?;
    let radius = parse_radius(
        &req_id.0,
        query.radius.as_deref(),
        state.default_radius_miles,
    )?;
    let snapshot = state.dataset.current();

    let data = tokio::task::spawn_blocking(move || {
        let stores: Vec<StorePoint> = ResolvedRegion::resolve(&snapshot, &region)
            .uncovered(radius)
            .into_iter()
            .cloned()
            .collect();
        UncoveredStores {
            region,
            radius_miles: radius,
            dataset_version: snapshot.version,
            count: stores.len(),
            stores,
        }
    })
    .await
    .map_err(|e| map_join_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

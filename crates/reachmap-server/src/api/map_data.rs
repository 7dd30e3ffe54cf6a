use axum::{
    extract::{Query, State},
    Extension, Json,
};
use reachmap_core::{CenterPoint, RegionAggregate, StorePoint};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct MapDataQuery {
    pub city: Option<String>,
}

/// Everything the map draws: every store, every center that can be placed,
/// and the city aggregates (optionally narrowed to one city).
#[derive(Debug, Serialize)]
pub(super) struct MapData {
    dataset_version: u64,
    stores: Vec<StorePoint>,
    centers: Vec<CenterPoint>,
    aggregates: Vec<RegionAggregate>,
}

pub(super) async fn get_map_data(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<MapDataQuery>,
) -> Json<ApiResponse<MapData>> {
    let snapshot = state.dataset.current();
    let city = query
        .city
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"));

    let aggregates = snapshot
        .aggregates
        .iter()
        .filter(|a| city.is_none_or(|c| a.city == c))
        .cloned()
        .collect();
    let centers = snapshot
        .centers
        .iter()
        .filter(|c| c.coordinate().is_some())
        .cloned()
        .collect();

    Json(ApiResponse {
        data: MapData {
            dataset_version: snapshot.version,
            stores: snapshot.stores.clone(),
            centers,
            aggregates,
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use reachmap_boundary::BoundaryOutcome;
use reachmap_core::{Region, RegionTable};
use reachmap_engine::resolve_boundary;
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct BoundaryData {
    region: Region,
    name: String,
    geometry: geojson::Geometry,
}

pub(super) async fn list_states(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<String>>> {
    Json(ApiResponse {
        data: state.dataset.current().state_codes(),
        meta: ResponseMeta::new(req_id.0),
    })
}

pub(super) async fn list_cities(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<String>>> {
    Json(ApiResponse {
        data: state.dataset.current().city_names(),
        meta: ResponseMeta::new(req_id.0),
    })
}

pub(super) async fn get_state_boundary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse<BoundaryData>>, ApiError> {
    let region: Region = code.parse().map_err(|_| {
        ApiError::new(
            req_id.0.clone(),
            "bad_request",
            format!("invalid state code '{code}'"),
        )
    })?;

    match resolve_boundary(state.boundary.as_ref(), &region).await {
        BoundaryOutcome::Found(geometry) => Ok(Json(ApiResponse {
            data: BoundaryData {
                name: RegionTable::global().display_name(&region).to_string(),
                region,
                geometry,
            },
            meta: ResponseMeta::new(req_id.0),
        })),
        BoundaryOutcome::NotFound => Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("no boundary found for {region}"),
        )),
        BoundaryOutcome::Unavailable(reason) => {
            tracing::warn!(region = %region, reason = %reason, "boundary service unavailable");
            Err(ApiError::new(
                req_id.0,
                "boundary_unavailable",
                "boundary service is unavailable, try again later",
            ))
        }
    }
}

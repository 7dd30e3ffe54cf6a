use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_join_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct ReloadData {
    dataset_version: u64,
    loaded_at: DateTime<Utc>,
    stores: usize,
    centers: usize,
    aggregates: usize,
}

/// Re-reads the dataset files now. On failure the previous snapshot keeps
/// serving and the error is reported as `reload_failed`.
pub(super) async fn reload_dataset(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<ReloadData>>, ApiError> {
    let dataset = Arc::clone(&state.dataset);
    let snapshot = tokio::task::spawn_blocking(move || dataset.reload())
        .await
        .map_err(|e| map_join_error(req_id.0.clone(), &e))?
        .map_err(|e| ApiError::new(req_id.0.clone(), "reload_failed", e.to_string()))?;

    Ok(Json(ApiResponse {
        data: ReloadData {
            dataset_version: snapshot.version,
            loaded_at: snapshot.loaded_at,
            stores: snapshot.stores.len(),
            centers: snapshot.centers.len(),
            aggregates: snapshot.aggregates.len(),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

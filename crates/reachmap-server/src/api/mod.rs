mod dataset;
mod map_data;
mod metrics;
mod regions;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use reachmap_boundary::BoundaryResolver;
use reachmap_core::Region;
use reachmap_data::DatasetStore;
use reachmap_engine::MetricsCache;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::{enforce_rate_limit, no_store, request_id, RateLimitState, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<DatasetStore>,
    pub boundary: Arc<dyn BoundaryResolver>,
    pub cache: MetricsCache,
    pub default_radius_miles: f64,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
    dataset_version: u64,
    loaded_at: DateTime<Utc>,
    stores: usize,
    centers: usize,
    aggregates: usize,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "boundary_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Parses an optional `state` parameter. Missing, `US` and `all` mean the
/// whole nation.
pub(super) fn parse_region(request_id: &str, raw: Option<&str>) -> Result<Region, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(Region::Nation),
        Some(code) => code.parse().map_err(|_| {
            ApiError::new(
                request_id,
                "bad_request",
                format!("invalid state code '{code}'"),
            )
        }),
    }
}

/// Parses an optional `radius` parameter in miles, falling back to
/// `default`. Zero and negative radii are accepted and cover nothing.
pub(super) fn parse_radius(
    request_id: &str,
    raw: Option<&str>,
    default: f64,
) -> Result<f64, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(default);
    };
    raw.parse::<f64>()
        .ok()
        .filter(|r| r.is_finite())
        .ok_or_else(|| {
            ApiError::new(
                request_id,
                "bad_request",
                format!("radius must be a finite number of miles, got '{raw}'"),
            )
        })
}

pub(super) fn map_join_error(request_id: String, error: &tokio::task::JoinError) -> ApiError {
    tracing::error!(error = %error, "blocking computation failed");
    ApiError::new(request_id, "internal_error", "computation failed")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

fn api_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/states", get(regions::list_states))
        .route(
            "/api/v1/states/{state}/boundary",
            get(regions::get_state_boundary),
        )
        .route("/api/v1/cities", get(regions::list_cities))
        .route("/api/v1/metrics", get(metrics::get_metrics))
        .route(
            "/api/v1/stores/uncovered",
            get(metrics::list_uncovered_stores),
        )
        .route("/api/v1/map-data", get(map_data::get_map_data))
        .route("/api/v1/dataset/reload", post(dataset::reload_dataset))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(api_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(no_store())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let snapshot = state.dataset.current();
    Json(ApiResponse {
        data: HealthData {
            status: "ok",
            dataset_version: snapshot.version,
            loaded_at: snapshot.loaded_at,
            stores: snapshot.stores.len(),
            centers: snapshot.centers.len(),
            aggregates: snapshot.aggregates.len(),
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

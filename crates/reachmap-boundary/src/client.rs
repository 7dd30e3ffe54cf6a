//! HTTP client for the Nominatim search API.
//!
//! Looks a region up by its display name, then picks the administrative
//! boundary out of the returned places. States must resolve to an OSM
//! relation; the nation accepts any administrative boundary since Nominatim
//! is queried with `featuretype=country` there.

use std::time::Duration;

use async_trait::async_trait;
use geojson::{GeoJson, Geometry};
use reachmap_core::{Region, RegionTable};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::BoundaryError;
use crate::retry::retry_with_backoff;
use crate::{BoundaryOutcome, BoundaryResolver};

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org/";
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_BACKOFF_BASE_MS: u64 = 250;
const DEFAULT_TOTAL_TIMEOUT: Duration = Duration::from_secs(8);

/// One entry of a Nominatim `search` response. Only the fields used for
/// boundary selection are decoded.
#[derive(Debug, Deserialize)]
struct Place {
    #[serde(default)]
    osm_type: Option<String>,
    #[serde(default)]
    class: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    geojson: Option<serde_json::Value>,
}

impl Place {
    fn is_administrative_boundary(&self) -> bool {
        self.class.as_deref() == Some("boundary")
            && self.kind.as_deref() == Some("administrative")
            && self.geojson.is_some()
    }

    fn is_relation(&self) -> bool {
        self.osm_type.as_deref() == Some("relation")
    }
}

/// Client for the Nominatim search API.
///
/// Use [`NominatimClient::new`] for the public instance or
/// [`NominatimClient::with_base_url`] to point at a self-hosted server or a
/// mock server in tests.
pub struct NominatimClient {
    client: Client,
    search_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
    total_timeout: Duration,
}

impl NominatimClient {
    /// Creates a client pointed at the public Nominatim instance.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(user_agent: &str, timeout_secs: u64) -> Result<Self, BoundaryError> {
        Self::with_base_url(DEFAULT_BASE_URL, user_agent, timeout_secs)
    }

    /// Creates a client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`BoundaryError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        user_agent: &str,
        timeout_secs: u64,
    ) -> Result<Self, BoundaryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `join` appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let search_url = Url::parse(&normalised)
            .and_then(|u| u.join("search"))
            .map_err(|e| BoundaryError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            search_url,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
            total_timeout: DEFAULT_TOTAL_TIMEOUT,
        })
    }

    /// Overrides the retry policy for transient failures.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Caps the whole lookup, every attempt and backoff sleep included.
    #[must_use]
    pub fn with_total_timeout(mut self, total_timeout: Duration) -> Self {
        self.total_timeout = total_timeout;
        self
    }

    /// Looks up the boundary geometry of `region`.
    ///
    /// Returns `Ok(None)` when the search succeeds but nothing matches.
    ///
    /// # Errors
    ///
    /// - [`BoundaryError::Http`] on network failure or non-2xx status, after
    ///   retries are exhausted.
    /// - [`BoundaryError::Deserialize`] if the body is not a JSON array of
    ///   places.
    /// - [`BoundaryError::InvalidGeometry`] if the matching place's
    ///   `geojson` is not a geometry.
    /// - [`BoundaryError::Timeout`] if the lookup outlives the total budget.
    pub async fn lookup(&self, region: &Region) -> Result<Option<Geometry>, BoundaryError> {
        let url = self.build_url(&search_params(region));
        let attempts = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.request_places(&url)
        });
        let places = tokio::time::timeout(self.total_timeout, attempts)
            .await
            .map_err(|_| BoundaryError::Timeout(self.total_timeout))??;
        tracing::debug!(region = %region, results = places.len(), "nominatim search returned");
        select_geometry(region, places)
    }

    /// Builds the search URL with percent-encoded query parameters.
    fn build_url(&self, params: &[(&str, String)]) -> Url {
        let mut url = self.search_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    async fn request_places(&self, url: &Url) -> Result<Vec<Place>, BoundaryError> {
        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| BoundaryError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }
}

#[async_trait]
impl BoundaryResolver for NominatimClient {
    async fn resolve_boundary(&self, region: &Region) -> BoundaryOutcome {
        match self.lookup(region).await {
            Ok(Some(geometry)) => BoundaryOutcome::Found(geometry),
            Ok(None) => {
                tracing::info!(region = %region, "no administrative boundary found");
                BoundaryOutcome::NotFound
            }
            Err(e) => {
                tracing::warn!(region = %region, error = %e, "boundary lookup unavailable");
                BoundaryOutcome::Unavailable(e.to_string())
            }
        }
    }
}

fn search_params(region: &Region) -> Vec<(&'static str, String)> {
    let name = RegionTable::global().display_name(region);
    let mut params = vec![
        (
            "q",
            if region.is_nation() {
                name.to_owned()
            } else {
                format!("{name}, United States")
            },
        ),
        ("format", "json".to_owned()),
        ("polygon_geojson", "1".to_owned()),
        ("countrycodes", "us".to_owned()),
    ];
    if region.is_nation() {
        params.push(("featuretype", "country".to_owned()));
    }
    params
}

fn select_geometry(region: &Region, places: Vec<Place>) -> Result<Option<Geometry>, BoundaryError> {
    let chosen = places
        .into_iter()
        .filter(Place::is_administrative_boundary)
        .find(|p| region.is_nation() || p.is_relation());

    let Some(raw) = chosen.and_then(|p| p.geojson) else {
        return Ok(None);
    };

    match GeoJson::from_json_value(raw) {
        Ok(GeoJson::Geometry(geometry)) => Ok(Some(geometry)),
        Ok(other) => Err(BoundaryError::InvalidGeometry(format!(
            "expected a geometry, got {}",
            geojson_kind(&other)
        ))),
        Err(e) => Err(BoundaryError::InvalidGeometry(e.to_string())),
    }
}

fn geojson_kind(value: &GeoJson) -> &'static str {
    match value {
        GeoJson::Geometry(_) => "Geometry",
        GeoJson::Feature(_) => "Feature",
        GeoJson::FeatureCollection(_) => "FeatureCollection",
    }
}

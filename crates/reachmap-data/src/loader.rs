//! JSON dataset readers.
//!
//! Each file is a JSON array of records. Records are decoded one at a time so
//! a single malformed entry is skipped instead of failing the whole file.
//! Numeric fields accept numbers or numeric strings; anything else is left
//! absent rather than defaulted to zero.

use std::path::{Path, PathBuf};

use reachmap_core::{AppConfig, CenterPoint, RegionAggregate, StorePoint};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::DataError;

/// Locations of the three dataset files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    pub stores: PathBuf,
    pub centers: PathBuf,
    /// Optional per-city summary table.
    pub aggregates: Option<PathBuf>,
}

impl DatasetPaths {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            stores: config.stores_path.clone(),
            centers: config.centers_path.clone(),
            aggregates: config.aggregates_path.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawStore {
    #[serde(default)]
    name: Option<serde_json::Value>,
    #[serde(default)]
    street_address: Option<serde_json::Value>,
    #[serde(default)]
    city: Option<serde_json::Value>,
    #[serde(default)]
    state: Option<serde_json::Value>,
    #[serde(default)]
    latitude: Option<serde_json::Value>,
    #[serde(default)]
    longitude: Option<serde_json::Value>,
}

/// Accepts both the per-site shape (`LINAC Name`) and the city-summary shape
/// (`Cities`).
#[derive(Debug, Deserialize)]
struct RawCenter {
    #[serde(default, rename = "LINAC Name", alias = "name", alias = "Cities")]
    name: Option<serde_json::Value>,
    #[serde(default, rename = "States", alias = "state")]
    state: Option<serde_json::Value>,
    #[serde(default, rename = "Latitude", alias = "latitude")]
    latitude: Option<serde_json::Value>,
    #[serde(
        default,
        rename = "Longitude",
        alias = "Longtitude",
        alias = "longitude"
    )]
    longitude: Option<serde_json::Value>,
    #[serde(default, rename = "Number of LINACs")]
    capacity: Option<serde_json::Value>,
    #[serde(default, rename = "Number of LINAC Centers")]
    center_count: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawAggregate {
    #[serde(default, rename = "Cities", alias = "city")]
    city: Option<serde_json::Value>,
    #[serde(default, rename = "States", alias = "state")]
    state: Option<serde_json::Value>,
    #[serde(default, rename = "Latitude", alias = "latitude")]
    latitude: Option<serde_json::Value>,
    // The source file spells it "Longtitude".
    #[serde(
        default,
        rename = "Longtitude",
        alias = "Longitude",
        alias = "longitude"
    )]
    longitude: Option<serde_json::Value>,
    #[serde(default, rename = "Number of LINAC Centers")]
    center_count: Option<serde_json::Value>,
    #[serde(default, rename = "Number of LINACs")]
    capacity: Option<serde_json::Value>,
}

/// Load store records.
///
/// # Errors
///
/// Returns [`DataError`] if the file cannot be read or is not a JSON array.
pub fn load_stores(path: &Path) -> Result<Vec<StorePoint>, DataError> {
    let raw: Vec<RawStore> = read_records(path)?;
    let stores: Vec<StorePoint> = raw
        .into_iter()
        .map(|r| StorePoint {
            name: value_as_string(r.name.as_ref()).unwrap_or_default(),
            street_address: value_as_string(r.street_address.as_ref()),
            city: value_as_string(r.city.as_ref()),
            state: value_as_state(r.state.as_ref()),
            latitude: value_as_f64(r.latitude.as_ref()),
            longitude: value_as_f64(r.longitude.as_ref()),
        })
        .collect();

    let missing = stores.iter().filter(|s| s.coordinate().is_none()).count();
    tracing::info!(
        path = %path.display(),
        count = stores.len(),
        missing_coordinates = missing,
        "loaded store records"
    );
    Ok(stores)
}

/// Load center records.
///
/// # Errors
///
/// Returns [`DataError`] if the file cannot be read or is not a JSON array.
pub fn load_centers(path: &Path) -> Result<Vec<CenterPoint>, DataError> {
    let raw: Vec<RawCenter> = read_records(path)?;
    let centers: Vec<CenterPoint> = raw
        .into_iter()
        .map(|r| CenterPoint {
            name: value_as_string(r.name.as_ref()).unwrap_or_default(),
            state: value_as_state(r.state.as_ref()),
            latitude: value_as_f64(r.latitude.as_ref()),
            longitude: value_as_f64(r.longitude.as_ref()),
            capacity: value_as_u32(r.capacity.as_ref()),
            center_count: value_as_u32(r.center_count.as_ref()),
        })
        .collect();

    let valid = centers.iter().filter(|c| c.coordinate().is_some()).count();
    tracing::info!(
        path = %path.display(),
        count = centers.len(),
        valid_coordinates = valid,
        "loaded center records"
    );
    Ok(centers)
}

/// Load the per-city aggregate table.
///
/// # Errors
///
/// Returns [`DataError`] if the file cannot be read or is not a JSON array.
pub fn load_aggregates(path: &Path) -> Result<Vec<RegionAggregate>, DataError> {
    let raw: Vec<RawAggregate> = read_records(path)?;
    let aggregates: Vec<RegionAggregate> = raw
        .into_iter()
        .map(|r| RegionAggregate {
            city: value_as_string(r.city.as_ref()).unwrap_or_default(),
            state: value_as_state(r.state.as_ref()),
            latitude: value_as_f64(r.latitude.as_ref()),
            longitude: value_as_f64(r.longitude.as_ref()),
            center_count: value_as_u32(r.center_count.as_ref()),
            capacity: value_as_u32(r.capacity.as_ref()),
        })
        .collect();

    tracing::info!(
        path = %path.display(),
        count = aggregates.len(),
        "loaded region aggregates"
    );
    Ok(aggregates)
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DataError> {
    let content = std::fs::read_to_string(path).map_err(|e| DataError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_records(&content, path)
}

fn parse_records<T: DeserializeOwned>(content: &str, path: &Path) -> Result<Vec<T>, DataError> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| DataError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;

    let serde_json::Value::Array(items) = value else {
        return Err(DataError::NotAnArray {
            path: path.display().to_string(),
        });
    };

    let total = items.len();
    let records: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<T>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    index,
                    error = %e,
                    "skipping malformed record"
                );
                None
            }
        })
        .collect();

    if records.len() < total {
        tracing::warn!(
            path = %path.display(),
            skipped = total - records.len(),
            "some dataset records could not be decoded"
        );
    }
    Ok(records)
}

fn value_as_f64(value: Option<&serde_json::Value>) -> Option<f64> {
    let value = value?;
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
        .filter(|v| v.is_finite())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn value_as_u32(value: Option<&serde_json::Value>) -> Option<u32> {
    let value = value?;
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    let as_float = value_as_f64(Some(value))?;
    let integral = as_float >= 0.0 && as_float.fract() == 0.0;
    (integral && as_float <= f64::from(u32::MAX)).then(|| as_float as u32)
}

fn value_as_string(value: Option<&serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) => Some(s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_as_state(value: Option<&serde_json::Value>) -> Option<String> {
    value_as_string(value).map(|s| s.to_ascii_uppercase())
}

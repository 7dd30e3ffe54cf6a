use serde::{Deserialize, Serialize};

/// A validated latitude/longitude pair in decimal degrees.
///
/// Only constructed through [`Coordinate::new`] / [`Coordinate::from_parts`],
/// so both components are always finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Returns `None` if either component is NaN or infinite.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        (latitude.is_finite() && longitude.is_finite()).then_some(Self {
            latitude,
            longitude,
        })
    }

    /// Builds a coordinate from optional raw components.
    #[must_use]
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        Self::new(latitude?, longitude?)
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// True when both axes differ by at most `tolerance_degrees`.
    #[must_use]
    pub fn approx_eq(&self, other: &Coordinate, tolerance_degrees: f64) -> bool {
        (self.latitude - other.latitude).abs() <= tolerance_degrees
            && (self.longitude - other.longitude).abs() <= tolerance_degrees
    }
}

/// A retail store location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorePoint {
    pub name: String,
    pub street_address: Option<String>,
    pub city: Option<String>,
    /// Two-letter state abbreviation.
    pub state: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl StorePoint {
    /// The store's coordinate, or `None` if either axis is missing or not finite.
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::from_parts(self.latitude, self.longitude)
    }
}

/// A radiation-therapy center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CenterPoint {
    pub name: String,
    /// Two-letter state abbreviation, when the source file carries one.
    pub state: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Number of linear accelerators at the site.
    pub capacity: Option<u32>,
    /// Present when the record summarizes several physical centers.
    pub center_count: Option<u32>,
}

impl CenterPoint {
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::from_parts(self.latitude, self.longitude)
    }
}

/// Precomputed per-city totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionAggregate {
    pub city: String,
    pub state: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub center_count: Option<u32>,
    pub capacity: Option<u32>,
}

impl RegionAggregate {
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::from_parts(self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(latitude: Option<f64>, longitude: Option<f64>) -> StorePoint {
        StorePoint {
            name: "Store".to_string(),
            street_address: None,
            city: None,
            state: Some("PA".to_string()),
            latitude,
            longitude,
        }
    }

    #[test]
    fn coordinate_rejects_non_finite() {
        assert!(Coordinate::new(f64::NAN, 0.0).is_none());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_none());
        assert!(Coordinate::new(40.0, -75.0).is_some());
    }

    #[test]
    fn zero_is_a_valid_coordinate() {
        let c = Coordinate::new(0.0, 0.0).expect("equator/prime meridian is valid");
        assert!(c.latitude().abs() < f64::EPSILON);
    }

    #[test]
    fn store_without_latitude_has_no_coordinate() {
        assert!(store(None, Some(-75.0)).coordinate().is_none());
        assert!(store(Some(40.0), None).coordinate().is_none());
        assert!(store(Some(40.0), Some(-75.0)).coordinate().is_some());
    }

    #[test]
    fn approx_eq_uses_tolerance_on_both_axes() {
        let a = Coordinate::new(33.749, -84.388).unwrap();
        let b = Coordinate::new(33.755, -84.380).unwrap();
        let c = Coordinate::new(33.749, -84.420).unwrap();
        assert!(a.approx_eq(&b, 0.01));
        assert!(!a.approx_eq(&c, 0.01));
    }

    #[test]
    fn store_point_serializes_missing_coordinates_as_null() {
        let json = serde_json::to_value(store(None, None)).expect("serialize");
        assert!(json["latitude"].is_null());
        assert_eq!(json["state"].as_str(), Some("PA"));
    }
}

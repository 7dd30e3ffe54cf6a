pub mod app_config;
pub mod config;
pub mod geo;
pub mod regions;
pub mod types;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{distance_miles, haversine_miles, EARTH_RADIUS_MILES};
pub use regions::{Region, RegionTable, NATION_CODE};
pub use types::{CenterPoint, Coordinate, RegionAggregate, StorePoint};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid region identifier: {0:?}")]
    InvalidRegion(String),
}

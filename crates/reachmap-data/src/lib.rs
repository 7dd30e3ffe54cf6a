//! Dataset loading and versioned, immutable dataset snapshots.

pub mod loader;
pub mod snapshot;

pub use loader::{load_aggregates, load_centers, load_stores, DatasetPaths};
pub use snapshot::{DatasetSnapshot, DatasetStore};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read dataset file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse dataset file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("dataset file {path} must contain a JSON array of records")]
    NotAnArray { path: String },
}

use thiserror::Error;

/// Errors returned by the boundary lookup client.
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// Network, TLS, timeout, or non-2xx failure from the HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The response body was not the expected JSON array of places.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The lookup, retries included, ran past its total time budget.
    #[error("boundary lookup timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// A matching place carried a `geojson` member that is not a geometry.
    #[error("invalid boundary geometry: {0}")]
    InvalidGeometry(String),
}

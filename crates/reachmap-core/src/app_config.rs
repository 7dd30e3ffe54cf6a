use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub stores_path: PathBuf,
    pub centers_path: PathBuf,
    /// Per-city summary table. `None` when the deployment ships without one.
    pub aggregates_path: Option<PathBuf>,
    pub default_radius_miles: f64,
    pub boundary_base_url: String,
    pub boundary_user_agent: String,
    pub boundary_timeout_secs: u64,
    pub boundary_max_retries: u32,
    pub boundary_backoff_base_ms: u64,
    /// Upper bound on one lookup, retries and backoff included.
    pub boundary_total_timeout_secs: u64,
    pub metrics_cache_ttl_secs: u64,
    /// Six-field cron expression (seconds first) for the dataset reload job.
    pub reload_cron: String,
}

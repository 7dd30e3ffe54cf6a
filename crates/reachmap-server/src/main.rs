mod api;
mod middleware;
mod scheduler;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use reachmap_boundary::NominatimClient;
use reachmap_data::{DatasetPaths, DatasetSnapshot, DatasetStore};
use reachmap_engine::MetricsCache;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, default_rate_limit_state, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(reachmap_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let paths = DatasetPaths::from_app_config(&config);
    let dataset = Arc::new(
        DatasetStore::open(paths).context("initial dataset load failed; refusing to start")?,
    );
    log_dataset_summary(&dataset.current());

    let boundary = NominatimClient::with_base_url(
        &config.boundary_base_url,
        &config.boundary_user_agent,
        config.boundary_timeout_secs,
    )?
    .with_retry(config.boundary_max_retries, config.boundary_backoff_base_ms)
    .with_total_timeout(Duration::from_secs(config.boundary_total_timeout_secs));

    let _scheduler = scheduler::build_scheduler(Arc::clone(&dataset), &config.reload_cron).await?;

    let state = AppState {
        dataset,
        boundary: Arc::new(boundary),
        cache: MetricsCache::new(Duration::from_secs(config.metrics_cache_ttl_secs)),
        default_radius_miles: config.default_radius_miles,
    };
    let app = build_app(state, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "reachmap server listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    Ok(())
}

fn log_dataset_summary(snapshot: &DatasetSnapshot) {
    tracing::info!(
        version = snapshot.version,
        stores = snapshot.stores.len(),
        centers = snapshot.centers.len(),
        aggregates = snapshot.aggregates.len(),
        "dataset loaded"
    );
    for (state, count) in snapshot.store_counts_by_state() {
        tracing::info!(state = %state, stores = count, "stores by state");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}

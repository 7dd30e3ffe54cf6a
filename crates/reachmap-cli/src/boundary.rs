use std::io::Write;
use std::time::Duration;

use anyhow::bail;
use reachmap_boundary::{BoundaryOutcome, NominatimClient};
use reachmap_core::{AppConfig, Region};
use reachmap_engine::resolve_boundary;

/// Look up a region's boundary and print it as GeoJSON.
///
/// # Errors
///
/// Returns an error if the client cannot be built, no boundary exists, or
/// the boundary service is unavailable.
pub(crate) async fn run_boundary(
    config: &AppConfig,
    region: &Region,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let client = NominatimClient::with_base_url(
        &config.boundary_base_url,
        &config.boundary_user_agent,
        config.boundary_timeout_secs,
    )?
    .with_retry(config.boundary_max_retries, config.boundary_backoff_base_ms)
    .with_total_timeout(Duration::from_secs(config.boundary_total_timeout_secs));

    match resolve_boundary(&client, region).await {
        BoundaryOutcome::Found(geometry) => {
            serde_json::to_writer_pretty(&mut *out, &geometry)?;
            writeln!(out)?;
            Ok(())
        }
        BoundaryOutcome::NotFound => bail!("no boundary found for {region}"),
        BoundaryOutcome::Unavailable(reason) => {
            bail!("boundary service unavailable for {region}: {reason}")
        }
    }
}

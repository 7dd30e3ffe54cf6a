//! Offline coverage reports over the dataset files.
//!
//! Every command writes to the given writer so the output can be captured
//! in tests; `main` passes a locked stdout.

use std::io::Write;

use reachmap_core::{Region, RegionTable};
use reachmap_data::DatasetSnapshot;
use reachmap_engine::{region_metrics, ResolvedRegion};

use crate::OutputFormat;

/// Format an optional covered ratio as a percentage, `"n/a"` when the
/// region has no stores.
pub(crate) fn fmt_ratio(ratio: Option<f64>) -> String {
    ratio.map_or_else(|| "n/a".to_string(), |r| format!("{:.1}%", r * 100.0))
}

/// Print the sorted state codes with their display names and store counts.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub(crate) fn run_states(snapshot: &DatasetSnapshot, out: &mut impl Write) -> anyhow::Result<()> {
    let counts = snapshot.store_counts_by_state();
    if counts.is_empty() {
        writeln!(out, "no stores with a state code in the dataset")?;
        return Ok(());
    }

    let table = RegionTable::global();
    writeln!(out, "{:<7}{:<24}STORES", "CODE", "NAME")?;
    for (code, count) in &counts {
        let region = Region::State(code.clone());
        writeln!(out, "{:<7}{:<24}{}", code, table.display_name(&region), count)?;
    }
    Ok(())
}

/// Print coverage metrics for one region and radius.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub(crate) fn run_metrics(
    snapshot: &DatasetSnapshot,
    region: &Region,
    radius_miles: f64,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let metrics = region_metrics(snapshot, region, radius_miles);
    let name = RegionTable::global().display_name(region);
    let c = &metrics.coverage;

    writeln!(out, "region:           {name} ({region})")?;
    writeln!(out, "radius (miles):   {radius_miles}")?;
    writeln!(out, "total stores:     {}", c.total_stores)?;
    writeln!(out, "covered:          {}", c.stores_covered)?;
    writeln!(out, "uncovered:        {}", c.stores_uncovered)?;
    writeln!(out, "covered ratio:    {}", fmt_ratio(metrics.covered_ratio))?;
    writeln!(out, "centers:          {}", c.center_count)?;
    writeln!(out, "capacity units:   {}", c.capacity_units)?;
    Ok(())
}

/// Print one coverage row per radius, computed from a single nearest-center
/// pass over the region.
///
/// # Errors
///
/// Returns an error if `radii` is empty or writing to `out` fails.
pub(crate) fn run_sweep(
    snapshot: &DatasetSnapshot,
    region: &Region,
    radii: &[f64],
    out: &mut impl Write,
) -> anyhow::Result<()> {
    if radii.is_empty() {
        anyhow::bail!("at least one radius is required");
    }

    let nearest = ResolvedRegion::resolve(snapshot, region).nearest_distances();
    writeln!(
        out,
        "{:<10}{:<10}{:<11}{:<8}RATIO",
        "RADIUS", "COVERED", "UNCOVERED", "TOTAL"
    )?;
    for &radius in radii {
        let c = nearest.coverage_at(radius);
        writeln!(
            out,
            "{:<10}{:<10}{:<11}{:<8}{}",
            radius,
            c.stores_covered,
            c.stores_uncovered,
            c.total_stores,
            fmt_ratio(c.covered_ratio())
        )?;
    }
    Ok(())
}

/// Export the uncovered stores of a region as a table, JSON array, or CSV.
///
/// # Errors
///
/// Returns an error if serialization or writing to `out` fails.
pub(crate) fn run_uncovered(
    snapshot: &DatasetSnapshot,
    region: &Region,
    radius_miles: f64,
    format: OutputFormat,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let resolved = ResolvedRegion::resolve(snapshot, region);
    let stores = resolved.uncovered(radius_miles);
    tracing::info!(
        region = %region,
        radius_miles,
        uncovered = stores.len(),
        total = resolved.stores.len(),
        "uncovered stores computed"
    );

    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &stores)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(&mut *out);
            for store in &stores {
                writer.serialize(store)?;
            }
            writer.flush()?;
        }
        OutputFormat::Table => {
            if stores.is_empty() {
                writeln!(
                    out,
                    "every store in {region} is within {radius_miles} miles of a center"
                )?;
                return Ok(());
            }
            writeln!(out, "{:<6}{:<20}{:<36}ADDRESS", "STATE", "CITY", "NAME")?;
            for store in &stores {
                writeln!(
                    out,
                    "{:<6}{:<20}{:<36}{}",
                    store.state.as_deref().unwrap_or("-"),
                    store.city.as_deref().unwrap_or("-"),
                    store.name,
                    store.street_address.as_deref().unwrap_or("-")
                )?;
            }
        }
    }
    Ok(())
}

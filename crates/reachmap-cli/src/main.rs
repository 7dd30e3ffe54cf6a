mod boundary;
mod report;

use clap::{Parser, Subcommand, ValueEnum};
use reachmap_core::{AppConfig, Region};
use reachmap_data::{DatasetPaths, DatasetSnapshot};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "reachmap-cli")]
#[command(about = "Store-to-center proximity coverage from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the state codes present in the store dataset
    States,
    /// Coverage metrics for one region and radius
    Metrics {
        /// State code (e.g., TX); omit or pass US for the whole nation
        #[arg(long)]
        state: Option<String>,
        /// Coverage radius in miles (defaults to REACHMAP_DEFAULT_RADIUS_MILES)
        #[arg(long, allow_negative_numbers = true)]
        radius: Option<f64>,
    },
    /// Coverage at several radii from one nearest-distance pass
    Sweep {
        /// State code (e.g., TX); omit or pass US for the whole nation
        #[arg(long)]
        state: Option<String>,
        /// Comma-separated radii in miles
        #[arg(long, value_delimiter = ',', default_value = "10,25,35,50")]
        radii: Vec<f64>,
    },
    /// Export the stores no center reaches
    Uncovered {
        /// State code (e.g., TX); omit or pass US for the whole nation
        #[arg(long)]
        state: Option<String>,
        /// Coverage radius in miles (defaults to REACHMAP_DEFAULT_RADIUS_MILES)
        #[arg(long, allow_negative_numbers = true)]
        radius: Option<f64>,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Fetch a region's boundary polygon as GeoJSON
    Boundary {
        /// State code (e.g., TX) or US
        #[arg(long)]
        state: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = reachmap_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    // Logs go to stderr so exported JSON/CSV on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let mut out = std::io::stdout().lock();
    match cli.command {
        Commands::States => report::run_states(&load_snapshot(&config)?, &mut out)?,
        Commands::Metrics { state, radius } => {
            let region = parse_region(state.as_deref())?;
            let radius = radius.unwrap_or(config.default_radius_miles);
            report::run_metrics(&load_snapshot(&config)?, &region, radius, &mut out)?;
        }
        Commands::Sweep { state, radii } => {
            let region = parse_region(state.as_deref())?;
            report::run_sweep(&load_snapshot(&config)?, &region, &radii, &mut out)?;
        }
        Commands::Uncovered {
            state,
            radius,
            format,
        } => {
            let region = parse_region(state.as_deref())?;
            let radius = radius.unwrap_or(config.default_radius_miles);
            report::run_uncovered(&load_snapshot(&config)?, &region, radius, format, &mut out)?;
        }
        Commands::Boundary { state } => {
            let region = parse_region(Some(&state))?;
            boundary::run_boundary(&config, &region, &mut out).await?;
        }
    }

    Ok(())
}

fn load_snapshot(config: &AppConfig) -> anyhow::Result<DatasetSnapshot> {
    let paths = DatasetPaths::from_app_config(config);
    let snapshot = DatasetSnapshot::load(&paths, 1)?;
    tracing::debug!(
        stores = snapshot.stores.len(),
        centers = snapshot.centers.len(),
        aggregates = snapshot.aggregates.len(),
        "dataset loaded"
    );
    Ok(snapshot)
}

fn parse_region(raw: Option<&str>) -> anyhow::Result<Region> {
    match raw {
        None => Ok(Region::Nation),
        Some(code) => Ok(code.parse::<Region>()?),
    }
}

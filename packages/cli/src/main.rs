#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the regional sales map.
//!
//! Reads per-region rows exported from the metrics API, loads the state
//! geometry (over HTTP or from a local file), and writes the choropleth as
//! SVG or prints the regional summary. Running without a subcommand opens
//! an interactive menu.

mod interactive;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use mango_insights_geography::projection::BRAZIL;
use mango_insights_geography::rows::read_region_rows;
use mango_insights_geography::source::{
    FileGeometrySource, GeometrySource, HttpGeometrySource, geojson_url_from_env,
};
use mango_insights_geography::summary::RegionSummary;
use mango_insights_geography::view::{GeometryState, MountedMapView};
use mango_insights_geography_models::region::{self, Region, STATE_CODES};
use mango_insights_geography_models::{ProductType, RegionAggregate};

#[derive(Parser)]
#[command(name = "mango_insights", about = "Regional sales map for the mango dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the regional choropleth as SVG
    Render {
        /// JSON file with the per-region rows (`/api/geografia/regioes` body)
        #[arg(long)]
        regions: PathBuf,
        /// Highlight one macro-region (e.g. "Sul", "Centro-Oeste")
        #[arg(long)]
        region: Option<String>,
        /// Read state geometry from a local `GeoJSON` file
        #[arg(long, conflicts_with = "geometry_url")]
        geometry_file: Option<PathBuf>,
        /// Fetch state geometry from this URL (overrides `MANGO_GEOJSON_URL`)
        #[arg(long)]
        geometry_url: Option<String>,
        /// Output path. Prints to stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print revenue, records and quantity per macro-region
    Summary {
        /// JSON file with the per-region rows
        #[arg(long)]
        regions: PathBuf,
        /// Product line the rows belong to (`polpa` or `extrato`)
        #[arg(long, default_value = "polpa")]
        product: ProductType,
    },
    /// List the state-to-region classification table
    Regions,
}

/// Where the state geometry comes from.
pub enum GeometryInput {
    /// A local `GeoJSON` file.
    File(PathBuf),
    /// A URL to download.
    Url(String),
}

impl GeometryInput {
    fn into_source(self) -> Result<Arc<dyn GeometrySource>, Box<dyn std::error::Error>> {
        Ok(match self {
            Self::File(path) => Arc::new(FileGeometrySource::new(path)),
            Self::Url(url) => Arc::new(HttpGeometrySource::new(url)?),
        })
    }
}

/// Parses a `--region` value, rejecting names that are not selectable.
///
/// # Errors
///
/// Returns an error naming the accepted regions when `name` is unknown.
pub fn parse_region_filter(name: &str) -> Result<Region, String> {
    name.trim()
        .parse::<Region>()
        .ok()
        .filter(|r| r.is_selectable())
        .ok_or_else(|| {
            let accepted: Vec<String> = Region::SELECTABLE.iter().map(ToString::to_string).collect();
            format!(
                "unknown region {name:?}; expected one of: {}",
                accepted.join(", ")
            )
        })
}

/// Mounts a map view, waits for its geometry and renders it.
///
/// # Errors
///
/// Returns an error if the geometry source cannot be built. A failed
/// geometry fetch is not an error here: it is rendered into the SVG.
pub async fn render_map(
    rows: Vec<RegionAggregate>,
    filter: Option<Region>,
    geometry: GeometryInput,
) -> Result<String, Box<dyn std::error::Error>> {
    let source = geometry.into_source()?;
    let mut mounted = MountedMapView::mount(source, BRAZIL);
    mounted.set_rows(rows);
    mounted.set_region_filter(filter);
    mounted.settled().await;

    mounted.with_view(|view| match view.geometry() {
        GeometryState::Ready(features) => {
            log::info!("Rendering {} state shapes", features.len());
        }
        GeometryState::Failed(message) => log::warn!("Map geometry unavailable: {message}"),
        GeometryState::Loading => {}
    });

    Ok(mounted.render(&BRAZIL))
}

/// Writes `svg` to `out`, or stdout when `out` is `None`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub async fn write_output(svg: &str, out: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match out {
        Some(path) => {
            tokio::fs::write(path, svg).await?;
            log::info!("Wrote map to {}", path.display());
        }
        None => print!("{svg}"),
    }
    Ok(())
}

fn print_regions() {
    for region in Region::SELECTABLE {
        println!("{region}: {}", region.state_codes().join(", "));
    }
    for code in STATE_CODES {
        let name = region::state_name(code).unwrap_or_default();
        println!("  {code}  {name} ({})", region::classify(code));
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run().await;
    };

    match command {
        Commands::Render {
            regions,
            region,
            geometry_file,
            geometry_url,
            out,
        } => {
            let filter = region.as_deref().map(parse_region_filter).transpose()?;
            let rows = read_region_rows(&regions).await?;
            let geometry = geometry_file.map_or_else(
                || GeometryInput::Url(geometry_url.unwrap_or_else(geojson_url_from_env)),
                GeometryInput::File,
            );
            let svg = render_map(rows, filter, geometry).await?;
            write_output(&svg, out.as_deref()).await?;
        }
        Commands::Summary { regions, product } => {
            let rows = read_region_rows(&regions).await?;
            print!("{}", RegionSummary::new(product, rows).render_text());
        }
        Commands::Regions => print_regions(),
    }

    Ok(())
}

//! Interactive mode.
//!
//! Prompts for the rows file, product line, region filter and output path
//! instead of requiring CLI flags.

use std::path::PathBuf;

use dialoguer::{Input, Select};
use mango_insights_geography::rows::read_region_rows;
use mango_insights_geography::source::geojson_url_from_env;
use mango_insights_geography::summary::RegionSummary;
use mango_insights_geography_models::{ProductType, Region};

use crate::{GeometryInput, render_map, write_output};

/// Top-level actions offered by the menu.
enum Action {
    RenderMap,
    Summary,
}

impl Action {
    const ALL: &[Self] = &[Self::RenderMap, Self::Summary];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::RenderMap => "Render regional map (SVG)",
            Self::Summary => "Print regional summary",
        }
    }
}

/// Runs the interactive menu.
///
/// # Errors
///
/// Returns an error if a prompt fails, the rows file cannot be read, or the
/// output cannot be written.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("Mango Insights");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();
    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    let regions: String = Input::new()
        .with_prompt("Region rows file")
        .default("regioes.json".to_string())
        .interact_text()?;
    let rows = read_region_rows(&PathBuf::from(regions)).await?;

    match Action::ALL[idx] {
        Action::RenderMap => {
            let mut filters = vec!["Todas".to_string()];
            filters.extend(Region::SELECTABLE.iter().map(ToString::to_string));
            let choice = Select::new()
                .with_prompt("Região")
                .items(&filters)
                .default(0)
                .interact()?;
            let filter = choice.checked_sub(1).map(|i| Region::SELECTABLE[i]);

            let geometry: String = Input::new()
                .with_prompt("Geometry URL or file")
                .default(geojson_url_from_env())
                .interact_text()?;
            let geometry = if geometry.starts_with("http://") || geometry.starts_with("https://") {
                GeometryInput::Url(geometry)
            } else {
                GeometryInput::File(PathBuf::from(geometry))
            };

            let out: String = Input::new()
                .with_prompt("Output file")
                .default("mapa.svg".to_string())
                .interact_text()?;

            let svg = render_map(rows, filter, geometry).await?;
            write_output(&svg, Some(&PathBuf::from(out))).await?;
        }
        Action::Summary => {
            let products = [ProductType::Polpa, ProductType::Extrato];
            let labels: Vec<&str> = products.iter().map(|p| p.label()).collect();
            let choice = Select::new()
                .with_prompt("Tipo")
                .items(&labels)
                .default(0)
                .interact()?;
            print!("{}", RegionSummary::new(products[choice], rows).render_text());
        }
    }

    Ok(())
}

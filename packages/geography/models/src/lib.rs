#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Macro-region and regional metric types.
//!
//! These types describe the per-region aggregates produced by the metrics
//! API (revenue, record count and quantity per macro-region) and the static
//! classification of Brazilian states into macro-regions. They carry no
//! I/O and are shared by the map renderer and the CLI.

pub mod region;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use region::Region;

/// Product line a metric query was made for.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProductType {
    /// Frozen mango pulp, measured in kilograms.
    Polpa,
    /// Mango extract, measured in liters.
    Extrato,
}

impl ProductType {
    /// Human-readable product line name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Polpa => "Polpa congelada",
            Self::Extrato => "Extrato de manga",
        }
    }

    /// Unit suffix for the quantity column.
    #[must_use]
    pub const fn quantity_unit(self) -> &'static str {
        match self {
            Self::Polpa => "kg",
            Self::Extrato => "L",
        }
    }

    /// Picks the quantity that applies to this product line, defaulting to
    /// zero when the row does not carry it.
    #[must_use]
    pub fn quantity(self, row: &RegionAggregate) -> f64 {
        match self {
            Self::Polpa => row.quantity_kg,
            Self::Extrato => row.quantity_liters,
        }
        .unwrap_or(0.0)
    }
}

/// One row of the per-region metrics for the active product and period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionAggregate {
    /// Macro-region name as reported by the metrics API (e.g. "Sul").
    #[serde(rename = "regiao")]
    pub region: String,
    /// Total revenue in BRL.
    #[serde(rename = "receita")]
    pub revenue: f64,
    /// Number of purchase records.
    #[serde(rename = "registros")]
    pub record_count: u64,
    /// Quantity in kilograms (pulp only).
    #[serde(
        rename = "quantidade_kg",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub quantity_kg: Option<f64>,
    /// Quantity in liters (extract only).
    #[serde(
        rename = "quantidade_litros",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub quantity_liters: Option<f64>,
}

impl RegionAggregate {
    /// Creates a row with no quantity fields.
    #[must_use]
    pub fn new(region: impl Into<String>, revenue: f64, record_count: u64) -> Self {
        Self {
            region: region.into(),
            revenue,
            record_count,
            quantity_kg: None,
            quantity_liters: None,
        }
    }

    /// The macro-region this row belongs to, or [`Region::Outros`] when the
    /// name is not recognized.
    #[must_use]
    pub fn classified_region(&self) -> Region {
        self.region.parse().unwrap_or(Region::Outros)
    }
}

/// Body of the regional metrics response.
///
/// The API wraps rows in a `regioes` array; exported files sometimes hold
/// the bare array. A wrapper without the array yields no rows.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RegionRowsDocument {
    /// A plain JSON array of rows.
    Bare(Vec<RegionAggregate>),
    /// `{ "regioes": [...] }`
    Wrapped {
        /// Rows, empty when the key is missing.
        #[serde(default)]
        regioes: Vec<RegionAggregate>,
    },
}

impl RegionRowsDocument {
    /// Unwraps the rows regardless of the document shape.
    #[must_use]
    pub fn into_rows(self) -> Vec<RegionAggregate> {
        match self {
            Self::Bare(rows) | Self::Wrapped { regioes: rows } => rows,
        }
    }
}

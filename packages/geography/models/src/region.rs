//! Brazilian state (UF) to macro-region classification.
//!
//! Provides the fixed partition of the 27 federative units into the five
//! IBGE macro-regions, the derived inverse mapping, and the screen
//! positions used for per-region revenue labels on the map canvas.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// IBGE macro-region, plus the [`Region::Outros`] sentinel for codes that
/// are not part of the classification table.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Region {
    /// AC, AM, AP, PA, RO, RR, TO
    Norte,
    /// AL, BA, CE, MA, PB, PE, PI, RN, SE
    Nordeste,
    /// DF, GO, MS, MT
    #[serde(rename = "Centro-Oeste")]
    #[strum(serialize = "Centro-Oeste")]
    CentroOeste,
    /// ES, MG, RJ, SP
    Sudeste,
    /// PR, RS, SC
    Sul,
    /// Anything not in the table. Used for coloring only, never offered as
    /// a filter value.
    Outros,
}

impl Region {
    /// Regions that can be chosen as a map filter, in IBGE order.
    pub const SELECTABLE: &[Self] = &[
        Self::Norte,
        Self::Nordeste,
        Self::CentroOeste,
        Self::Sudeste,
        Self::Sul,
    ];

    /// Whether this region may be used as a map filter.
    #[must_use]
    pub const fn is_selectable(self) -> bool {
        !matches!(self, Self::Outros)
    }

    /// Approximate `(x, y)` position on the 400×420 map canvas where the
    /// revenue label for this region is drawn.
    #[must_use]
    pub const fn label_position(self) -> Option<(f64, f64)> {
        match self {
            Self::Norte => Some((200.0, 100.0)),
            Self::Nordeste => Some((310.0, 170.0)),
            Self::CentroOeste => Some((170.0, 230.0)),
            Self::Sudeste => Some((270.0, 310.0)),
            Self::Sul => Some((250.0, 370.0)),
            Self::Outros => Some((200.0, 210.0)),
        }
    }

    /// UF codes belonging to this region, in table order.
    ///
    /// Empty for [`Region::Outros`].
    #[must_use]
    pub fn state_codes(self) -> &'static [&'static str] {
        REGION_TO_STATES
            .get(&self)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// The 27 UF codes covered by [`classify`].
pub const STATE_CODES: &[&str] = &[
    "AC", "AM", "AP", "PA", "RO", "RR", "TO", "AL", "BA", "CE", "MA", "PB", "PE", "PI", "RN", "SE",
    "DF", "GO", "MS", "MT", "ES", "MG", "RJ", "SP", "PR", "RS", "SC",
];

/// Inverse of [`classify`], built once on first use.
static REGION_TO_STATES: LazyLock<BTreeMap<Region, Vec<&'static str>>> = LazyLock::new(|| {
    let mut map: BTreeMap<Region, Vec<&'static str>> = BTreeMap::new();
    for &code in STATE_CODES {
        map.entry(classify(code)).or_default().push(code);
    }
    map
});

/// Maps a two-letter UF code to its macro-region.
///
/// Surrounding whitespace is trimmed and matching ignores ASCII case, so
/// `" sp"` classifies as [`Region::Sudeste`] even though `GeoJSON` sources
/// only ever carry upper-case codes. Returns [`Region::Outros`] for codes
/// outside the table, including the empty string.
#[must_use]
pub fn classify(code: &str) -> Region {
    match code.trim().to_ascii_uppercase().as_str() {
        "AC" | "AM" | "AP" | "PA" | "RO" | "RR" | "TO" => Region::Norte,
        "AL" | "BA" | "CE" | "MA" | "PB" | "PE" | "PI" | "RN" | "SE" => Region::Nordeste,
        "DF" | "GO" | "MS" | "MT" => Region::CentroOeste,
        "ES" | "MG" | "RJ" | "SP" => Region::Sudeste,
        "PR" | "RS" | "SC" => Region::Sul,
        _ => Region::Outros,
    }
}

/// Maps a UF code to the full state name.
///
/// Returns `None` for codes outside the table.
#[must_use]
pub fn state_name(code: &str) -> Option<&'static str> {
    let name = match code.trim().to_ascii_uppercase().as_str() {
        "AC" => "Acre",
        "AM" => "Amazonas",
        "AP" => "Amapá",
        "PA" => "Pará",
        "RO" => "Rondônia",
        "RR" => "Roraima",
        "TO" => "Tocantins",
        "AL" => "Alagoas",
        "BA" => "Bahia",
        "CE" => "Ceará",
        "MA" => "Maranhão",
        "PB" => "Paraíba",
        "PE" => "Pernambuco",
        "PI" => "Piauí",
        "RN" => "Rio Grande do Norte",
        "SE" => "Sergipe",
        "DF" => "Distrito Federal",
        "GO" => "Goiás",
        "MS" => "Mato Grosso do Sul",
        "MT" => "Mato Grosso",
        "ES" => "Espírito Santo",
        "MG" => "Minas Gerais",
        "RJ" => "Rio de Janeiro",
        "SP" => "São Paulo",
        "PR" => "Paraná",
        "RS" => "Rio Grande do Sul",
        "SC" => "Santa Catarina",
        _ => return None,
    };
    Some(name)
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Regional choropleth of Brazil for the mango sales dashboard.
//!
//! Fetches state polygons as `GeoJSON`, projects them onto a fixed canvas,
//! joins each state to its macro-region and colors it by the region's
//! revenue. The [`view::MapView`] state machine owns the geometry lifecycle
//! (one fetch per mount, stale results discarded after unmount) and
//! [`svg::render`] turns a view into a standalone SVG document.

pub mod color;
pub mod format;
pub mod projection;
pub mod rows;
pub mod source;
pub mod summary;
pub mod svg;
pub mod view;

use thiserror::Error;

/// Errors that can occur while loading geometry or region rows.
#[derive(Debug, Error)]
pub enum GeoError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The geometry endpoint answered with a non-success status.
    #[error("HTTP {status} fetching {url}")]
    Status {
        /// Response status.
        status: reqwest::StatusCode,
        /// Requested URL.
        url: String,
    },

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a local file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

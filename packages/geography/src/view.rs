//! Map view state machine.
//!
//! Geometry moves `Loading -> Ready | Failed` exactly once per mount.
//! Metric rows are supplied from outside and replaced wholesale; every
//! change re-derives the per-region lookups and maxima used for coloring.
//! A failed geometry load is terminal: later filter changes are ignored
//! until the view is mounted again.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mango_insights_geography_models::RegionAggregate;
use mango_insights_geography_models::region::{self, Region};
use tokio::task::JoinHandle;

use crate::color::{self, ColorScale, Rgb};
use crate::format::{format_count, format_currency};
use crate::projection::Projection;
use crate::source::{GeometrySource, MapFeature, parse_features};

/// Message shown when a geometry error carries no text of its own.
pub const DEFAULT_ERROR_MESSAGE: &str = "Erro ao carregar mapa.";

/// Lifecycle of the state geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryState {
    /// The fetch has been issued and has not settled.
    Loading,
    /// Geometry is available. May be empty.
    Ready(Vec<MapFeature>),
    /// The fetch failed with this message. Not retried.
    Failed(String),
}

/// A state polygon with its computed fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape<'a> {
    /// UF code.
    pub code: &'a str,
    /// State name, when the geometry carries one.
    pub name: Option<&'a str>,
    /// SVG path data.
    pub path: &'a str,
    /// Fill color.
    pub fill: Rgb,
    /// Record count of the state's region, for the accessibility label.
    pub record_count: u64,
}

/// Revenue label drawn for the selected region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionLabel {
    /// Selected region.
    pub region: Region,
    /// Label text, e.g. `Sul: R$ 1.000`.
    pub text: String,
    /// Canvas x coordinate (text anchor is the middle).
    pub x: f64,
    /// Canvas y coordinate.
    pub y: f64,
}

/// One legend row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    /// Region name as reported by the metrics rows.
    pub region: String,
    /// Swatch color on the revenue scale.
    pub color: Rgb,
    /// Legend text, e.g. `Sul: 1.234 compras`.
    pub text: String,
}

/// State of one map view.
#[derive(Debug, Clone)]
pub struct MapView {
    geometry: GeometryState,
    rows: Vec<RegionAggregate>,
    revenue_by_region: BTreeMap<String, f64>,
    records_by_region: BTreeMap<String, u64>,
    max_revenue: f64,
    max_records: u64,
    data_loading: bool,
    region_filter: Option<Region>,
    scale: ColorScale,
}

impl Default for MapView {
    fn default() -> Self {
        Self::new()
    }
}

impl MapView {
    /// A freshly mounted view waiting for geometry, with no rows.
    #[must_use]
    pub fn new() -> Self {
        Self {
            geometry: GeometryState::Loading,
            rows: Vec::new(),
            revenue_by_region: BTreeMap::new(),
            records_by_region: BTreeMap::new(),
            max_revenue: 0.0,
            max_records: 0,
            data_loading: false,
            region_filter: None,
            scale: color::REVENUE_SCALE,
        }
    }

    /// Current geometry state.
    #[must_use]
    pub const fn geometry(&self) -> &GeometryState {
        &self.geometry
    }

    /// Rows currently driving the fills.
    #[must_use]
    pub fn rows(&self) -> &[RegionAggregate] {
        &self.rows
    }

    /// Active region filter.
    #[must_use]
    pub const fn region_filter(&self) -> Option<Region> {
        self.region_filter
    }

    /// Largest revenue among the rows (never negative).
    #[must_use]
    pub const fn max_revenue(&self) -> f64 {
        self.max_revenue
    }

    /// Largest record count among the rows.
    #[must_use]
    pub const fn max_records(&self) -> u64 {
        self.max_records
    }

    /// Geometry is still loading or the parent is fetching new rows.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.geometry, GeometryState::Loading) || self.data_loading
    }

    /// Stores fetched geometry. Ignored unless the view is still loading.
    pub fn geometry_loaded(&mut self, features: Vec<MapFeature>) {
        if !matches!(self.geometry, GeometryState::Loading) {
            log::debug!("Ignoring geometry delivered after the load settled");
            return;
        }
        log::debug!("Geometry ready with {} features", features.len());
        self.geometry = GeometryState::Ready(features);
    }

    /// Records a failed geometry load. Ignored unless the view is still
    /// loading.
    pub fn geometry_failed(&mut self, message: impl Into<String>) {
        if !matches!(self.geometry, GeometryState::Loading) {
            return;
        }
        let message = message.into();
        let message = if message.trim().is_empty() {
            DEFAULT_ERROR_MESSAGE.to_string()
        } else {
            message
        };
        log::error!("Failed to load map geometry: {message}");
        self.geometry = GeometryState::Failed(message);
    }

    /// Marks whether the parent is fetching a new set of rows.
    pub fn set_data_loading(&mut self, loading: bool) {
        self.data_loading = loading;
    }

    /// Replaces the metric rows and re-derives lookups and maxima.
    ///
    /// Rows are keyed by region name; a repeated name keeps the last row.
    pub fn set_rows(&mut self, rows: Vec<RegionAggregate>) {
        self.revenue_by_region = rows
            .iter()
            .map(|r| (r.region.clone(), r.revenue))
            .collect();
        self.records_by_region = rows
            .iter()
            .map(|r| (r.region.clone(), r.record_count))
            .collect();
        self.max_revenue = rows.iter().map(|r| r.revenue).fold(0.0, f64::max);
        self.max_records = rows.iter().map(|r| r.record_count).max().unwrap_or(0);
        self.rows = rows;
    }

    /// Narrows coloring to one region, or clears the filter with `None`.
    ///
    /// Returns `false` without changing anything when the geometry load
    /// failed or the region is not selectable.
    pub fn set_region_filter(&mut self, filter: Option<Region>) -> bool {
        if matches!(self.geometry, GeometryState::Failed(_)) {
            log::debug!("Ignoring region filter change on a failed map");
            return false;
        }
        if filter.is_some_and(|r| !r.is_selectable()) {
            return false;
        }
        self.region_filter = filter;
        true
    }

    /// Revenue of a region according to the current rows.
    #[must_use]
    pub fn region_revenue(&self, region: Region) -> f64 {
        let key: &str = region.as_ref();
        self.revenue_by_region.get(key).copied().unwrap_or(0.0)
    }

    /// Fill color for a state.
    ///
    /// With a filter active, states outside the selected region are dimmed
    /// regardless of their revenue.
    #[must_use]
    pub fn fill_for(&self, code: &str) -> Rgb {
        let region = region::classify(code);
        if self.region_filter.is_some_and(|selected| selected != region) {
            return color::DIMMED;
        }
        self.scale.color(self.region_revenue(region), self.max_revenue)
    }

    /// Record count of a state's region. Unmapped states report zero.
    #[must_use]
    pub fn records_for(&self, code: &str) -> u64 {
        match region::classify(code) {
            Region::Outros => 0,
            region => {
                let key: &str = region.as_ref();
                self.records_by_region.get(key).copied().unwrap_or(0)
            }
        }
    }

    /// Drawable shapes. Empty unless the geometry is ready.
    #[must_use]
    pub fn shapes(&self) -> Vec<Shape<'_>> {
        let GeometryState::Ready(features) = &self.geometry else {
            return Vec::new();
        };
        features
            .iter()
            .map(|f| Shape {
                code: &f.code,
                name: f.name.as_deref(),
                path: &f.path,
                fill: self.fill_for(&f.code),
                record_count: self.records_for(&f.code),
            })
            .collect()
    }

    /// Revenue label for the selected region.
    ///
    /// Present only when a filter is active, a row exists for that region
    /// and the region has a configured position.
    #[must_use]
    pub fn label(&self) -> Option<RegionLabel> {
        let region = self.region_filter?;
        let name: &str = region.as_ref();
        if !self.rows.iter().any(|r| r.region == name) {
            return None;
        }
        let (x, y) = region.label_position()?;
        Some(RegionLabel {
            region,
            text: format!(
                "{region}: {}",
                format_currency(self.region_revenue(region), 0)
            ),
            x,
            y,
        })
    }

    /// Legend rows, one per metric row in row order.
    #[must_use]
    pub fn legend(&self) -> Vec<LegendEntry> {
        self.rows
            .iter()
            .map(|r| LegendEntry {
                region: r.region.clone(),
                color: self.scale.color(r.revenue, self.max_revenue),
                text: format!("{}: {} compras", r.region, format_count(r.record_count)),
            })
            .collect()
    }
}

fn lock(view: &Mutex<MapView>) -> MutexGuard<'_, MapView> {
    view.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A [`MapView`] with its geometry fetch in flight.
///
/// Mounting spawns exactly one fetch. Dropping or unmounting the handle
/// sets a cancellation flag that the fetch task checks before touching the
/// view; the request itself is left to finish.
pub struct MountedMapView {
    view: Arc<Mutex<MapView>>,
    cancelled: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl MountedMapView {
    /// Creates a view and starts loading its geometry.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn mount(source: Arc<dyn GeometrySource>, projection: Projection) -> Self {
        let view = Arc::new(Mutex::new(MapView::new()));
        let cancelled = Arc::new(AtomicBool::new(false));

        let task = tokio::spawn({
            let view = Arc::clone(&view);
            let cancelled = Arc::clone(&cancelled);
            async move {
                log::debug!("Loading map geometry from {}", source.describe());
                let result = source
                    .fetch()
                    .await
                    .map(|doc| parse_features(&doc, &projection));

                let mut guard = lock(&view);
                if cancelled.load(Ordering::Acquire) {
                    log::debug!("Map unmounted before geometry arrived, discarding result");
                    return;
                }
                match result {
                    Ok(features) => guard.geometry_loaded(features),
                    Err(e) => guard.geometry_failed(e.to_string()),
                }
            }
        });

        Self {
            view,
            cancelled,
            task: Some(task),
        }
    }

    /// Waits until the geometry fetch has settled (or was discarded).
    pub async fn settled(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                log::error!("Geometry task failed: {e}");
            }
        }
    }

    /// Runs `f` with exclusive access to the view.
    pub fn with_view<R>(&self, f: impl FnOnce(&mut MapView) -> R) -> R {
        f(&mut lock(&self.view))
    }

    /// Shared handle to the view, e.g. for inspection after unmount.
    #[must_use]
    pub fn shared_view(&self) -> Arc<Mutex<MapView>> {
        Arc::clone(&self.view)
    }

    /// Replaces the metric rows.
    pub fn set_rows(&self, rows: Vec<RegionAggregate>) {
        self.with_view(|v| v.set_rows(rows));
    }

    /// Marks whether new rows are being fetched.
    pub fn set_data_loading(&self, loading: bool) {
        self.with_view(|v| v.set_data_loading(loading));
    }

    /// Sets or clears the region filter. See [`MapView::set_region_filter`].
    pub fn set_region_filter(&self, filter: Option<Region>) -> bool {
        self.with_view(|v| v.set_region_filter(filter))
    }

    /// Renders the current state as an SVG document.
    #[must_use]
    pub fn render(&self, projection: &Projection) -> String {
        self.with_view(|v| crate::svg::render(v, projection))
    }

    /// Cancels the mount and returns the fetch task, which keeps running
    /// but will not write to the view.
    #[must_use]
    pub fn unmount(mut self) -> Option<JoinHandle<()>> {
        self.cancel();
        self.task.take()
    }

    /// Sets the cancellation flag while holding the view lock, so a fetch
    /// task that is mid-write finishes first and one that has not yet
    /// checked the flag sees it.
    fn cancel(&self) {
        let _guard = lock(&self.view);
        self.cancelled.store(true, Ordering::Release);
    }
}

impl Drop for MountedMapView {
    fn drop(&mut self) {
        self.cancel();
    }
}

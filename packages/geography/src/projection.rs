//! Equirectangular projection of state polygons onto the map canvas.
//!
//! The projection is a plain linear transform of longitude/latitude into a
//! fixed-size canvas. It is neither conformal nor equal-area, which is fine
//! for a regional choropleth but not for precise cartography.

use std::fmt::Write as _;

use geojson::Value;

/// A linear mapping from a geographic bounding box to a canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Western edge, maps to `x = 0`.
    pub lng_min: f64,
    /// Eastern edge, maps to `x = width`.
    pub lng_max: f64,
    /// Southern edge, maps to `y = height`.
    pub lat_min: f64,
    /// Northern edge, maps to `y = 0`.
    pub lat_max: f64,
    /// Canvas width in user units.
    pub width: f64,
    /// Canvas height in user units.
    pub height: f64,
}

/// Approximate bounds of Brazil on a 400×420 canvas.
pub const BRAZIL: Projection = Projection {
    lng_min: -73.5,
    lng_max: -34.5,
    lat_min: -33.5,
    lat_max: 5.5,
    width: 400.0,
    height: 420.0,
};

impl Projection {
    /// Projects a longitude/latitude pair to canvas coordinates.
    #[must_use]
    pub fn project(&self, lng: f64, lat: f64) -> (f64, f64) {
        let x = (lng - self.lng_min) / (self.lng_max - self.lng_min) * self.width;
        let y = (self.lat_max - lat) / (self.lat_max - self.lat_min) * self.height;
        (x, y)
    }

    /// SVG `viewBox` attribute value covering the whole canvas.
    #[must_use]
    pub fn view_box(&self) -> String {
        format!("0 0 {} {}", self.width, self.height)
    }

    /// Builds a closed path (`M … L … Z`) for one ring.
    ///
    /// Positions with fewer than two components are skipped. Returns an
    /// empty string when no usable position remains.
    #[must_use]
    pub fn ring_to_path(&self, ring: &[Vec<f64>]) -> String {
        let mut d = String::new();
        for position in ring {
            let [lng, lat, ..] = position.as_slice() else {
                continue;
            };
            let (x, y) = self.project(*lng, *lat);
            let cmd = if d.is_empty() { 'M' } else { 'L' };
            if !d.is_empty() {
                d.push(' ');
            }
            let _ = write!(d, "{cmd} {x:.2} {y:.2}");
        }
        if !d.is_empty() {
            d.push_str(" Z");
        }
        d
    }

    /// Converts a polygon or multi-polygon into path data.
    ///
    /// Only outer rings are drawn; holes are ignored. A multi-polygon gets
    /// one closed sub-path per member. Any other geometry type yields an
    /// empty string.
    #[must_use]
    pub fn geometry_to_path(&self, geometry: &Value) -> String {
        match geometry {
            Value::Polygon(rings) => rings
                .first()
                .map(|outer| self.ring_to_path(outer))
                .unwrap_or_default(),
            Value::MultiPolygon(polygons) => polygons
                .iter()
                .filter_map(|rings| rings.first())
                .map(|outer| self.ring_to_path(outer))
                .filter(|d| !d.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(lng: f64, lat: f64) -> Vec<Vec<f64>> {
        vec![
            vec![lng, lat],
            vec![lng + 1.0, lat],
            vec![lng + 1.0, lat + 1.0],
            vec![lng, lat + 1.0],
            vec![lng, lat],
        ]
    }

    #[test]
    fn corners_map_to_canvas_corners() {
        assert_eq!(BRAZIL.project(-73.5, 5.5), (0.0, 0.0));
        let (x, y) = BRAZIL.project(-34.5, -33.5);
        assert!((x - 400.0).abs() < 1e-9);
        assert!((y - 420.0).abs() < 1e-9);
    }

    #[test]
    fn points_inside_bbox_stay_on_canvas() {
        let mut lng = -73.5;
        while lng <= -34.5 {
            let mut lat = -33.5;
            while lat <= 5.5 {
                let (x, y) = BRAZIL.project(lng, lat);
                assert!((0.0..=400.0).contains(&x), "x={x} for lng={lng}");
                assert!((0.0..=420.0).contains(&y), "y={y} for lat={lat}");
                lat += 1.3;
            }
            lng += 1.3;
        }
    }

    #[test]
    fn empty_ring_is_empty_path() {
        assert_eq!(BRAZIL.ring_to_path(&[]), "");
        assert_eq!(BRAZIL.geometry_to_path(&Value::Polygon(vec![vec![]])), "");
        assert_eq!(BRAZIL.geometry_to_path(&Value::Polygon(vec![])), "");
    }

    #[test]
    fn polygon_path_is_closed() {
        let d = BRAZIL.geometry_to_path(&Value::Polygon(vec![square(-50.0, -20.0)]));
        assert!(d.starts_with("M "), "{d}");
        assert!(d.ends_with(" Z"), "{d}");
        assert_eq!(d.matches('L').count(), 4);
    }

    #[test]
    fn coordinates_rounded_to_two_decimals() {
        let d = BRAZIL.ring_to_path(&[vec![-73.5, 5.5], vec![-50.0, -10.0]]);
        assert_eq!(d, "M 0.00 0.00 L 241.03 166.92 Z");
    }

    #[test]
    fn polygon_holes_are_ignored() {
        let hole = square(-49.8, -19.8);
        let d = BRAZIL.geometry_to_path(&Value::Polygon(vec![square(-50.0, -20.0), hole]));
        assert_eq!(d.matches('M').count(), 1);
    }

    #[test]
    fn multipolygon_emits_one_subpath_per_member() {
        let d = BRAZIL.geometry_to_path(&Value::MultiPolygon(vec![
            vec![square(-50.0, -20.0)],
            vec![square(-40.0, -10.0), square(-39.8, -9.8)],
            vec![],
        ]));
        assert_eq!(d.matches('M').count(), 2);
        assert_eq!(d.matches('Z').count(), 2);
    }

    #[test]
    fn unsupported_geometry_is_empty() {
        assert_eq!(BRAZIL.geometry_to_path(&Value::Point(vec![-50.0, -20.0])), "");
    }

    #[test]
    fn short_positions_are_skipped() {
        let d = BRAZIL.ring_to_path(&[vec![-50.0], vec![-73.5, 5.5]]);
        assert_eq!(d, "M 0.00 0.00 Z");
    }

    #[test]
    fn view_box_matches_canvas() {
        assert_eq!(BRAZIL.view_box(), "0 0 400 420");
    }
}

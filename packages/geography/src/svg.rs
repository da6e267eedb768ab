//! SVG serialization of a [`MapView`].
//!
//! Produces a standalone document: the state shapes on the projection
//! canvas, the selected region's revenue label, and a legend stacked under
//! the map. While loading, or after a failed geometry load, a small
//! placeholder card is produced instead.

use std::fmt::Write;

use crate::projection::Projection;
use crate::view::{GeometryState, MapView};

/// Document title for the map.
pub const MAP_TITLE: &str = "Compras e receita por região";

/// Placeholder text while geometry or rows are loading.
pub const LOADING_TEXT: &str = "Carregando mapa…";

const LEGEND_HEADING: &str = "Compras por região:";
const STROKE: &str = "#ffffff";
const STROKE_WIDTH: f64 = 0.8;
const TEXT_PRIMARY: &str = "#1f2937";
const TEXT_MUTED: &str = "#6b7280";
const ERROR_TEXT: &str = "#b91c1c";
const LABEL_FONT_SIZE: u32 = 14;
const LEGEND_TOP_GAP: f64 = 24.0;
const LEGEND_ROW_HEIGHT: f64 = 20.0;
const LEGEND_SWATCH: f64 = 12.0;
const PLACEHOLDER_LOADING_HEIGHT: f64 = 280.0;
const PLACEHOLDER_ERROR_HEIGHT: f64 = 200.0;

/// Escapes the five XML special characters.
fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

fn write_preamble(out: &mut String, width: f64, height: f64, title: &str) {
    let _ = writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" role="img" aria-label="{}">"#,
        xml_escape(title),
    );
    let _ = writeln!(out, "  <title>{}</title>", xml_escape(title));
}

fn placeholder(width: f64, height: f64, text: &str, color: &str) -> String {
    let mut out = String::new();
    write_preamble(&mut out, width, height, MAP_TITLE);
    let _ = writeln!(
        out,
        r#"  <text x="{}" y="{}" text-anchor="middle" dominant-baseline="middle" font-size="14" fill="{color}">{}</text>"#,
        width / 2.0,
        height / 2.0,
        xml_escape(text),
    );
    out.push_str("</svg>\n");
    out
}

/// Renders the view.
///
/// Loading (geometry or rows) gives the loading placeholder, even after a
/// failed geometry load. Otherwise a failed load gives the error message
/// and a loaded one the full map with legend.
#[must_use]
pub fn render(view: &MapView, projection: &Projection) -> String {
    if view.is_loading() {
        return placeholder(
            projection.width,
            PLACEHOLDER_LOADING_HEIGHT,
            LOADING_TEXT,
            TEXT_MUTED,
        );
    }
    if let GeometryState::Failed(message) = view.geometry() {
        return placeholder(
            projection.width,
            PLACEHOLDER_ERROR_HEIGHT,
            message,
            ERROR_TEXT,
        );
    }

    let legend = view.legend();
    #[allow(clippy::cast_precision_loss)]
    let legend_height = if legend.is_empty() {
        0.0
    } else {
        LEGEND_TOP_GAP + LEGEND_ROW_HEIGHT * (legend.len() as f64 + 1.0)
    };
    let width = projection.width;
    let height = projection.height + legend_height;

    let mut out = String::new();
    write_preamble(&mut out, width, height, MAP_TITLE);

    // Map canvas
    let _ = writeln!(
        out,
        r#"  <svg x="0" y="0" width="{}" height="{}" viewBox="{}">"#,
        projection.width,
        projection.height,
        projection.view_box(),
    );
    let _ = writeln!(out, r#"    <g aria-hidden="true">"#);
    for shape in view.shapes() {
        let _ = writeln!(
            out,
            r#"      <path d="{}" fill="{}" stroke="{STROKE}" stroke-width="{STROKE_WIDTH}" aria-label="{}: {} compras">"#,
            shape.path,
            shape.fill,
            xml_escape(shape.code),
            shape.record_count,
        );
        if let Some(name) = shape.name {
            let _ = writeln!(out, "        <title>{}</title>", xml_escape(name));
        }
        let _ = writeln!(out, "      </path>");
    }
    let _ = writeln!(out, "    </g>");

    // Selected region label: white halo under dark text.
    if let Some(label) = view.label() {
        let text = xml_escape(&label.text);
        let (x, y) = (label.x, label.y);
        let _ = writeln!(
            out,
            r#"    <g style="pointer-events: none; user-select: none">"#
        );
        let _ = writeln!(
            out,
            r#"      <text x="{x}" y="{y}" text-anchor="middle" font-size="{LABEL_FONT_SIZE}" font-weight="700" fill="{STROKE}" stroke="{STROKE}" stroke-width="3">{text}</text>"#,
        );
        let _ = writeln!(
            out,
            r#"      <text x="{x}" y="{y}" text-anchor="middle" font-size="{LABEL_FONT_SIZE}" font-weight="700" fill="{TEXT_PRIMARY}">{text}</text>"#,
        );
        let _ = writeln!(out, "    </g>");
    }
    let _ = writeln!(out, "  </svg>");

    if !legend.is_empty() {
        let top = projection.height + LEGEND_TOP_GAP;
        let _ = writeln!(out, r#"  <g class="legend" font-size="12" fill="{TEXT_PRIMARY}">"#);
        let _ = writeln!(out, r#"    <text x="8" y="{top}">{LEGEND_HEADING}</text>"#);
        for (i, entry) in legend.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let y = top + LEGEND_ROW_HEIGHT * (i as f64 + 1.0);
            let _ = writeln!(
                out,
                r#"    <rect x="8" y="{}" width="{LEGEND_SWATCH}" height="{LEGEND_SWATCH}" fill="{}"/>"#,
                y - LEGEND_SWATCH + 2.0,
                entry.color,
            );
            let _ = writeln!(
                out,
                r#"    <text x="{}" y="{y}">{}</text>"#,
                8.0 + LEGEND_SWATCH + 6.0,
                xml_escape(&entry.text),
            );
        }
        let _ = writeln!(out, "  </g>");
    }

    out.push_str("</svg>\n");
    out
}

#[cfg(test)]
mod tests {
    use mango_insights_geography_models::{RegionAggregate, region::Region};

    use super::*;
    use crate::color;
    use crate::projection::BRAZIL;
    use crate::source::MapFeature;

    fn feature(code: &str, name: Option<&str>) -> MapFeature {
        MapFeature {
            code: code.to_string(),
            name: name.map(ToString::to_string),
            path: "M 1.00 2.00 L 3.00 4.00 Z".to_string(),
        }
    }

    #[test]
    fn loading_placeholder() {
        let view = MapView::new();
        let svg = render(&view, &BRAZIL);
        assert!(svg.contains(LOADING_TEXT));
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn data_loading_also_shows_placeholder() {
        let mut view = MapView::new();
        view.geometry_loaded(vec![feature("SP", None)]);
        view.set_data_loading(true);
        assert!(render(&view, &BRAZIL).contains(LOADING_TEXT));
    }

    #[test]
    fn error_message_is_escaped() {
        let mut view = MapView::new();
        view.geometry_failed("bad <json> & stuff");
        let svg = render(&view, &BRAZIL);
        assert!(svg.contains("bad &lt;json&gt; &amp; stuff"));
        assert!(svg.contains(ERROR_TEXT));
    }

    #[test]
    fn reloading_rows_after_failure_shows_loading() {
        let mut view = MapView::new();
        view.geometry_failed("network down");
        view.set_data_loading(true);
        let svg = render(&view, &BRAZIL);
        assert!(svg.contains(LOADING_TEXT));
        assert!(!svg.contains("network down"));

        view.set_data_loading(false);
        assert!(render(&view, &BRAZIL).contains("network down"));
    }

    #[test]
    fn empty_geometry_renders_legend_only() {
        let mut view = MapView::new();
        view.geometry_loaded(Vec::new());
        view.set_rows(vec![RegionAggregate::new("Sul", 1000.0, 10)]);
        let svg = render(&view, &BRAZIL);
        assert!(!svg.contains("<path"));
        assert!(svg.contains("Sul: 10 compras"));
        assert!(svg.contains(LEGEND_HEADING));
        assert!(svg.contains(r#"viewBox="0 0 400 420""#));
    }

    #[test]
    fn full_map_with_label() {
        let mut view = MapView::new();
        view.geometry_loaded(vec![
            feature("PR", Some("Paraná")),
            feature("SP", Some("São Paulo")),
        ]);
        view.set_rows(vec![RegionAggregate::new("Sul", 1000.0, 10)]);
        view.set_region_filter(Some(Region::Sul));

        let svg = render(&view, &BRAZIL);
        assert_eq!(svg.matches("<path").count(), 2);
        assert!(svg.contains(&format!(r#"fill="{}""#, color::HIGH)));
        assert!(svg.contains(&format!(r#"fill="{}""#, color::DIMMED)));
        assert!(svg.contains(r#"aria-label="PR: 10 compras""#));
        assert!(svg.contains(r#"aria-label="SP: 0 compras""#));
        assert!(svg.contains("<title>Paraná</title>"));
        assert!(svg.contains(r#"<text x="250" y="370""#));
        assert_eq!(svg.matches("Sul: R$ 1.000").count(), 2);
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn escape_handles_all_special_chars() {
        assert_eq!(
            xml_escape(r#"<a & 'b' "c">"#),
            "&lt;a &amp; &apos;b&apos; &quot;c&quot;&gt;"
        );
    }
}

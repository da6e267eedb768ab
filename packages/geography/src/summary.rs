//! Page-level summary of the regional rows: KPI totals and the
//! revenue/records/quantity table per macro-region.

use std::fmt::Write;

use mango_insights_geography_models::{ProductType, RegionAggregate};

use crate::format::{format_count, format_currency, format_quantity};

/// Shown when there are no rows for the selected period.
pub const NO_DATA_TEXT: &str = "Nenhum dado de geografia no período selecionado.";

/// Totals and table for one product line.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSummary {
    /// Product line the rows were fetched for.
    pub product: ProductType,
    /// Sum of revenue across regions.
    pub total_revenue: f64,
    /// Sum of records across regions.
    pub total_records: u64,
    /// Rows in the order the metrics API returned them.
    pub rows: Vec<RegionAggregate>,
}

impl RegionSummary {
    /// Builds the summary.
    #[must_use]
    pub fn new(product: ProductType, rows: Vec<RegionAggregate>) -> Self {
        let total_revenue = rows.iter().map(|r| r.revenue).sum();
        let total_records = rows.iter().map(|r| r.record_count).sum();
        Self {
            product,
            total_revenue,
            total_records,
            rows,
        }
    }

    /// Formatted table cells: region, revenue, records, quantity.
    #[must_use]
    pub fn table(&self) -> Vec<[String; 4]> {
        self.rows
            .iter()
            .map(|r| {
                [
                    r.region.clone(),
                    format_currency(r.revenue, 2),
                    format_count(r.record_count),
                    format_quantity(self.product.quantity(r)),
                ]
            })
            .collect()
    }

    /// Plain-text rendering with right-aligned numeric columns.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.product.label());

        if self.rows.is_empty() {
            let _ = writeln!(out, "{NO_DATA_TEXT}");
            return out;
        }

        let _ = writeln!(
            out,
            "Receita total (período): {}",
            format_currency(self.total_revenue, 2)
        );
        let _ = writeln!(
            out,
            "Registros (todas as regiões): {}",
            format_count(self.total_records)
        );
        out.push('\n');

        let header = [
            "Região".to_string(),
            "Receita".to_string(),
            "Registros".to_string(),
            format!("Quantidade ({})", self.product.quantity_unit()),
        ];
        let body = self.table();

        let mut widths = header.each_ref().map(|h| h.chars().count());
        for row in &body {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        for row in std::iter::once(&header).chain(&body) {
            let mut line = String::new();
            for (i, (cell, width)) in row.iter().zip(widths).enumerate() {
                let pad = width - cell.chars().count();
                if i > 0 {
                    line.push_str("  ");
                    line.push_str(&" ".repeat(pad));
                    line.push_str(cell);
                } else {
                    line.push_str(cell);
                    line.push_str(&" ".repeat(pad));
                }
            }
            let _ = writeln!(out, "{}", line.trim_end());
        }
        out
    }
}

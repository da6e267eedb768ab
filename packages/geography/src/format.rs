//! Brazilian Portuguese number and currency formatting.
//!
//! Thousands are grouped with `.` and decimals separated with `,`, so
//! `1234.5` renders as `1.234,5` and revenue as `R$ 1.234,50`.

use std::sync::LazyLock;

use num_format::{CustomFormat, Grouping, ToFormattedString};

static PT_BR: LazyLock<CustomFormat> = LazyLock::new(|| {
    CustomFormat::builder()
        .grouping(Grouping::Standard)
        .separator(".")
        .decimal(",")
        .minus_sign("-")
        .build()
        .unwrap_or_default()
});

/// Formats a count with `.` thousands separators (e.g. `1.234.567`).
#[must_use]
pub fn format_count<T: ToFormattedString>(n: T) -> String {
    n.to_formatted_string(&*PT_BR)
}

/// Formats a number with a fixed number of decimals, grouped thousands and
/// a `,` decimal separator. Non-finite input renders as zero.
#[must_use]
pub fn format_decimal(n: f64, decimals: usize) -> String {
    let n = if n.is_finite() { n } else { 0.0 };
    let fixed = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let mut out = int_part
        .parse::<u128>()
        .map_or_else(|_| int_part.to_string(), format_count);
    if decimals > 0 {
        out.push(',');
        out.push_str(frac_part);
    }

    // Values that round to zero never show a minus sign.
    if n < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.insert(0, '-');
    }
    out
}

/// Formats an amount in BRL, e.g. `R$ 1.234,56` with two decimals or
/// `R$ 1.235` with none.
#[must_use]
pub fn format_currency(n: f64, decimals: usize) -> String {
    let body = format_decimal(n, decimals);
    body.strip_prefix('-')
        .map_or_else(|| format!("R$ {body}"), |abs| format!("-R$ {abs}"))
}

/// Formats a quantity, dropping the decimal part when it is zero.
#[must_use]
pub fn format_quantity(n: f64) -> String {
    if n.fract().abs() < f64::EPSILON {
        format_decimal(n, 0)
    } else {
        format_decimal(n, 2)
    }
}

//! Linear color scale for the choropleth fills.

use std::fmt;

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Creates a color from its channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` form.
    #[must_use]
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Dark green, used for the lowest values.
pub const LOW: Rgb = Rgb::new(0x1b, 0x43, 0x32);

/// Medium green, used for the dataset maximum.
pub const HIGH: Rgb = Rgb::new(0x40, 0x91, 0x6c);

/// Fill used when the dataset has no positive maximum.
pub const NO_DATA: Rgb = Rgb::new(0xe5, 0xe7, 0xeb);

/// Fill for states outside the selected region filter.
pub const DIMMED: Rgb = Rgb::new(0xe5, 0xe7, 0xeb);

/// Interpolates between two endpoints in proportion to `value / max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScale {
    /// Color at ratio 0.
    pub low: Rgb,
    /// Color at ratio 1.
    pub high: Rgb,
    /// Color returned when `max` is not positive.
    pub no_data: Rgb,
}

/// The green revenue scale used by the map and its legend.
pub const REVENUE_SCALE: ColorScale = ColorScale {
    low: LOW,
    high: HIGH,
    no_data: NO_DATA,
};

impl Default for ColorScale {
    fn default() -> Self {
        REVENUE_SCALE
    }
}

impl ColorScale {
    /// Maps `value` onto the scale.
    ///
    /// The ratio is clamped to `[0, 1]`; a non-finite ratio counts as 0.
    /// `max <= 0` (or NaN) means there is nothing to compare against and
    /// yields [`ColorScale::no_data`].
    #[must_use]
    pub fn color(&self, value: f64, max: f64) -> Rgb {
        if max.is_nan() || max <= 0.0 {
            return self.no_data;
        }
        let ratio = value / max;
        let pct = if ratio.is_finite() {
            ratio.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Rgb {
            r: lerp_channel(self.low.r, self.high.r, pct),
            g: lerp_channel(self.low.g, self.high.g, pct),
            b: lerp_channel(self.low.b, self.high.b, pct),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lerp_channel(low: u8, high: u8, pct: f64) -> u8 {
    let low = f64::from(low);
    let high = f64::from(high);
    (high - low).mul_add(pct, low).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints() {
        assert_eq!(REVENUE_SCALE.color(0.0, 100.0), LOW);
        assert_eq!(REVENUE_SCALE.color(100.0, 100.0), HIGH);
    }

    #[test]
    fn zero_max_is_neutral_for_any_value() {
        for v in [-5.0, 0.0, 1.0, 1e12] {
            assert_eq!(REVENUE_SCALE.color(v, 0.0), NO_DATA);
            assert_eq!(REVENUE_SCALE.color(v, -1.0), NO_DATA);
        }
        assert_eq!(REVENUE_SCALE.color(1.0, f64::NAN), NO_DATA);
    }

    #[test]
    fn ratio_is_clamped() {
        assert_eq!(REVENUE_SCALE.color(500.0, 100.0), HIGH);
        assert_eq!(REVENUE_SCALE.color(-500.0, 100.0), LOW);
        assert_eq!(REVENUE_SCALE.color(f64::NAN, 100.0), LOW);
    }

    #[test]
    fn monotonic_in_value() {
        let max = 1000.0;
        let mut prev = REVENUE_SCALE.color(0.0, max);
        for step in 1..=100 {
            let next = REVENUE_SCALE.color(f64::from(step) * 10.0, max);
            assert!(next.r >= prev.r && next.g >= prev.g && next.b >= prev.b);
            prev = next;
        }
    }

    #[test]
    fn midpoint_is_rounded() {
        // 0x1b + (0x40 - 0x1b) * 0.5 = 45.5 -> 46
        assert_eq!(REVENUE_SCALE.color(50.0, 100.0), Rgb::new(46, 106, 79));
    }

    #[test]
    fn display_forms() {
        assert_eq!(HIGH.to_string(), "rgb(64, 145, 108)");
        assert_eq!(DIMMED.hex(), "#e5e7eb");
    }
}

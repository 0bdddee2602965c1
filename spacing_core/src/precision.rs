//! # Rounding and Number Formatting
//!
//! Output values are rounded to a user-chosen number of decimal places,
//! half away from zero. Binary floating point stores many decimal values
//! slightly low (1.005 is really 1.00499999...), so the value is nudged up
//! by one relative epsilon before rounding.

use serde::{Deserialize, Serialize};

use crate::units::Measurement;

/// Largest accepted number of decimal places.
///
/// An f64 carries 15-17 significant digits; cavity heights run to four
/// digits before the point, so more than 12 places is noise.
pub const MAX_PRECISION: u32 = 12;

/// Round `value` to `digits` decimal places, half away from zero.
///
/// Idempotent: rounding an already rounded value returns it unchanged.
///
/// ```rust
/// use spacing_core::precision::round_to;
///
/// assert_eq!(round_to(8.4375, 2), 8.44);
/// assert_eq!(round_to(1.005, 2), 1.01);
/// assert_eq!(round_to(-2.5, 0), -3.0);
/// ```
pub fn round_to(value: f64, digits: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scale = 10f64.powi(digits.min(MAX_PRECISION) as i32);
    let nudged = value.abs() * (1.0 + f64::EPSILON);
    ((nudged * scale).round() / scale).copysign(value)
}

/// How rounded numbers are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberStyle {
    /// Shortest representation: `185.6`, `1000`
    #[default]
    Trimmed,
    /// Always `precision` decimals: `185.60`, `1000.00`
    Fixed,
}

/// Format an already rounded value.
pub fn format_value(value: f64, precision: u32, style: NumberStyle) -> String {
    match style {
        NumberStyle::Trimmed => format!("{}", value),
        NumberStyle::Fixed => format!("{:.*}", precision as usize, value),
    }
}

/// Format a measurement as `<value> <unit>`.
pub fn format_measurement(m: Measurement, precision: u32, style: NumberStyle) -> String {
    format!("{} {}", format_value(m.value, precision, style), m.unit)
}

//! Copyable text summary.

use crate::calculations::{SpacingInput, SpacingResult};
use crate::precision::{format_value, round_to, NumberStyle};

/// Render the plain-text summary of a calculation.
///
/// Height and thickness are echoed in the display unit at the result's
/// precision; then one line per shelf.
///
/// ```rust
/// use spacing_core::calculations::{calculate, SpacingInput};
/// use spacing_core::precision::NumberStyle;
/// use spacing_core::report::render_summary;
/// use spacing_core::units::LengthUnit;
///
/// let input = SpacingInput::new(1000.0, 18.0, 4, LengthUnit::Millimeters);
/// let result = calculate(&input).unwrap();
/// let text = render_summary(&input, &result, NumberStyle::Trimmed);
/// assert!(text.contains("Gap g = 185.6 mm"));
/// ```
pub fn render_summary(input: &SpacingInput, result: &SpacingResult, style: NumberStyle) -> String {
    let unit = result.display_unit;
    let precision = result.precision;
    let fmt = |value: f64| format_value(value, precision, style);

    let height = round_to(input.height.convert_to(unit).value, precision);
    let thickness = round_to(input.thickness.convert_to(unit).value, precision);

    let mut lines = vec![
        "Shelf Spacing (middle shelves only)".to_string(),
        format!(
            "H={} {unit}, t={} {unit}, n={}",
            fmt(height),
            fmt(thickness),
            input.count,
            unit = unit
        ),
        format!("Gap g = {} {}", fmt(result.gap.value), unit),
    ];

    lines.extend(result.shelves.iter().map(|shelf| {
        format!(
            "Shelf {}: bottom {} {unit}, centre {} {unit}",
            shelf.index,
            fmt(shelf.bottom_offset.value),
            fmt(shelf.center_offset.value),
            unit = unit
        )
    }));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::calculate;
    use crate::units::{LengthUnit, Measurement};

    #[test]
    fn test_metric_summary() {
        let input = SpacingInput::new(1000.0, 18.0, 4, LengthUnit::Millimeters);
        let result = calculate(&input).unwrap();
        let text = render_summary(&input, &result, NumberStyle::Trimmed);

        let expected = "\
Shelf Spacing (middle shelves only)
H=1000 mm, t=18 mm, n=4
Gap g = 185.6 mm
Shelf 1: bottom 185.6 mm, centre 194.6 mm
Shelf 2: bottom 389.2 mm, centre 398.2 mm
Shelf 3: bottom 592.8 mm, centre 601.8 mm
Shelf 4: bottom 796.4 mm, centre 805.4 mm";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_one_line_per_shelf() {
        let input = SpacingInput::new(36.0, 0.75, 3, LengthUnit::Inches);
        let result = calculate(&input).unwrap();
        let text = render_summary(&input, &result, NumberStyle::Fixed);

        assert_eq!(text.lines().count(), 3 + 3);
        assert!(text.contains("H=36.00 in, t=0.75 in, n=3"));
        assert!(text.contains("Gap g = 8.44 in"));
    }

    #[test]
    fn test_inputs_echoed_in_display_unit() {
        let input = SpacingInput {
            height: Measurement::inches(36.0),
            thickness: Measurement::mm(19.05),
            count: 3,
            display_unit: LengthUnit::Millimeters,
            precision: 1,
        };
        let result = calculate(&input).unwrap();
        let text = render_summary(&input, &result, NumberStyle::Trimmed);
        assert!(text.contains("H=914.4 mm, t=19.1 mm, n=3"), "{}", text);
    }
}

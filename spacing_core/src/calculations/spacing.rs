//! # Shelf Spacing Calculation
//!
//! Places `n` shelves of thickness `t` inside a cavity of height `H` so that
//! the empty space below the first shelf, above the last shelf and between
//! every pair of shelves is the same gap `g`.
//!
//! The cavity is `n + 1` gaps plus `n` shelves:
//!
//! ```text
//! H = (n + 1)·g + n·t   =>   g = (H - n·t) / (n + 1)
//! ```
//!
//! Shelf `i` (1-based, counted from the base) has `i` gaps and `i - 1`
//! shelves beneath it:
//!
//! ```text
//! bottom(i) = g·i + t·(i - 1)
//! center(i) = g·i + t·(i - 0.5)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use spacing_core::calculations::spacing::{calculate, SpacingInput};
//! use spacing_core::units::LengthUnit;
//!
//! let input = SpacingInput::new(1000.0, 18.0, 4, LengthUnit::Millimeters);
//! let result = calculate(&input).unwrap();
//!
//! assert_eq!(result.gap.value, 185.6);
//! assert_eq!(result.shelves[0].center_offset.value, 194.6);
//! assert_eq!(result.shelves.len(), 4);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{CalcError, CalcResult};
use crate::precision::{round_to, MAX_PRECISION};
use crate::units::{LengthUnit, Measurement, Millimeters};

/// Decimal places used when the caller does not choose.
pub const DEFAULT_PRECISION: u32 = 2;

/// Largest accepted shelf count.
///
/// Every shelf gets its own entry in the result, and no real cavity holds
/// more than a few dozen.
pub const MAX_SHELVES: u32 = 1000;

/// Input parameters for a spacing calculation.
///
/// ## JSON Example
///
/// ```json
/// {
///   "height": { "value": 36.0, "unit": "in" },
///   "thickness": { "value": 0.75, "unit": "in" },
///   "count": 3,
///   "display_unit": "in",
///   "precision": 2
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpacingInput {
    /// Internal cavity height
    pub height: Measurement,

    /// Shelf material thickness
    pub thickness: Measurement,

    /// Number of shelves to place
    pub count: u32,

    /// Unit for every value in the result
    pub display_unit: LengthUnit,

    /// Decimal places in the result
    pub precision: u32,
}

impl SpacingInput {
    /// Build an input where height, thickness and output share one unit.
    pub fn new(height: f64, thickness: f64, count: u32, unit: LengthUnit) -> Self {
        SpacingInput {
            height: Measurement::new(height, unit),
            thickness: Measurement::new(thickness, unit),
            count,
            display_unit: unit,
            precision: DEFAULT_PRECISION,
        }
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_display_unit(mut self, unit: LengthUnit) -> Self {
        self.display_unit = unit;
        self
    }

    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        if !self.height.value.is_finite() || self.height.value <= 0.0 {
            return Err(CalcError::invalid_input(
                "height",
                self.height.value.to_string(),
                "Height must be a positive number",
            ));
        }
        if !self.thickness.value.is_finite() || self.thickness.value < 0.0 {
            return Err(CalcError::invalid_input(
                "thickness",
                self.thickness.value.to_string(),
                "Thickness must be zero or a positive number",
            ));
        }
        if self.count < 1 || self.count > MAX_SHELVES {
            return Err(CalcError::invalid_input(
                "count",
                self.count.to_string(),
                format!("Shelf count must be between 1 and {}", MAX_SHELVES),
            ));
        }
        if self.precision > MAX_PRECISION {
            return Err(CalcError::invalid_input(
                "precision",
                self.precision.to_string(),
                format!("Precision must be between 0 and {}", MAX_PRECISION),
            ));
        }
        Ok(())
    }

    /// Parse raw text fields, as typed into a form or a prompt.
    ///
    /// The single `units` field applies to height, thickness and output.
    ///
    /// ```rust
    /// use spacing_core::calculations::spacing::{SpacingFields, SpacingInput};
    ///
    /// let fields = SpacingFields::new("36", "0.75", "3", "in", "2");
    /// let input = SpacingInput::from_fields(&fields).unwrap();
    /// assert_eq!(input.count, 3);
    /// ```
    pub fn from_fields(fields: &SpacingFields) -> CalcResult<Self> {
        let unit: LengthUnit = required("units", &fields.units)?.parse()?;
        let height = parse_length("height", &fields.height)?;
        let thickness = parse_length("thickness", &fields.thickness)?;
        let count = parse_whole("count", &fields.count)?;
        let precision = parse_whole("precision", &fields.precision)?;

        let input = SpacingInput::new(height, thickness, count, unit).with_precision(precision);
        input.validate()?;
        Ok(input)
    }
}

/// The five raw text fields of the calculator form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpacingFields {
    pub height: String,
    pub thickness: String,
    pub count: String,
    pub units: String,
    pub precision: String,
}

impl SpacingFields {
    pub fn new(
        height: impl Into<String>,
        thickness: impl Into<String>,
        count: impl Into<String>,
        units: impl Into<String>,
        precision: impl Into<String>,
    ) -> Self {
        SpacingFields {
            height: height.into(),
            thickness: thickness.into(),
            count: count.into(),
            units: units.into(),
            precision: precision.into(),
        }
    }
}

fn required<'a>(field: &str, raw: &'a str) -> CalcResult<&'a str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CalcError::missing_field(field));
    }
    Ok(trimmed)
}

fn parse_length(field: &str, raw: &str) -> CalcResult<f64> {
    let text = required(field, raw)?;
    let value: f64 = text
        .parse()
        .map_err(|_| CalcError::invalid_input(field, text, "Not a number"))?;
    if !value.is_finite() {
        return Err(CalcError::invalid_input(field, text, "Must be a finite number"));
    }
    Ok(value)
}

fn parse_whole(field: &str, raw: &str) -> CalcResult<u32> {
    let text = required(field, raw)?;
    text.parse()
        .map_err(|_| CalcError::invalid_input(field, text, "Must be a whole number of zero or more"))
}

/// Unrounded millimeter geometry behind a result.
///
/// Kept alongside the display values so that consumers needing full
/// precision (the drilling template scales against the cavity height)
/// never work from rounded numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanonicalSpacing {
    pub height: Millimeters,
    pub thickness: Millimeters,
    pub count: u32,
    pub gap: Millimeters,
}

impl CanonicalSpacing {
    /// Solve for the equal gap. Fails when the shelves do not fit with a
    /// positive gap.
    pub fn solve(height: Millimeters, thickness: Millimeters, count: u32) -> CalcResult<Self> {
        let n = count as f64;
        let gap = (height - thickness * n) / (n + 1.0);

        if !gap.0.is_finite() || gap.0 <= 0.0 {
            warn!(
                height_mm = height.0,
                thickness_mm = thickness.0,
                count,
                gap_mm = gap.0,
                "shelves do not fit with a positive gap"
            );
            return Err(CalcError::InfeasibleGeometry {
                height_mm: height.0,
                thickness_mm: thickness.0,
                count,
                gap_mm: gap.0,
            });
        }

        Ok(CanonicalSpacing {
            height,
            thickness,
            count,
            gap,
        })
    }

    /// Base of the cavity to the lower face of shelf `index` (1-based)
    pub fn bottom_offset(&self, index: u32) -> Millimeters {
        let i = index as f64;
        self.gap * i + self.thickness * (i - 1.0)
    }

    /// Base of the cavity to the midline of shelf `index` (1-based)
    pub fn center_offset(&self, index: u32) -> Millimeters {
        let i = index as f64;
        self.gap * i + self.thickness * (i - 0.5)
    }

    /// Gaps plus shelves; equals `height` up to floating point error.
    pub fn stacked_height(&self) -> Millimeters {
        let n = self.count as f64;
        self.gap * (n + 1.0) + self.thickness * n
    }
}

/// One shelf in the result, values in the display unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShelfPosition {
    /// 1-based, counted from the cavity base upward
    pub index: u32,

    /// Base of the cavity to the shelf's lower face
    pub bottom_offset: Measurement,

    /// Base of the cavity to the shelf's midline (drilling line)
    pub center_offset: Measurement,
}

/// Results from a spacing calculation.
///
/// ## JSON Example
///
/// ```json
/// {
///   "display_unit": "mm",
///   "precision": 2,
///   "gap": { "value": 185.6, "unit": "mm" },
///   "shelves": [
///     { "index": 1,
///       "bottom_offset": { "value": 185.6, "unit": "mm" },
///       "center_offset": { "value": 194.6, "unit": "mm" } }
///   ],
///   "canonical": { "height": 1000.0, "thickness": 18.0, "count": 4, "gap": 185.6 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpacingResult {
    pub display_unit: LengthUnit,
    pub precision: u32,

    /// Equal gap above, below and between shelves (rounded)
    pub gap: Measurement,

    /// One entry per shelf, base upward
    pub shelves: Vec<ShelfPosition>,

    /// Unrounded millimeter geometry
    pub canonical: CanonicalSpacing,
}

impl SpacingResult {
    /// Get a shelf by its 1-based index
    pub fn shelf(&self, index: u32) -> Option<&ShelfPosition> {
        index
            .checked_sub(1)
            .and_then(|i| self.shelves.get(i as usize))
    }

    /// Round a canonical length into the display unit.
    pub fn display(&self, mm: Millimeters) -> Measurement {
        to_display(mm, self.display_unit, self.precision)
    }
}

fn to_display(mm: Millimeters, unit: LengthUnit, precision: u32) -> Measurement {
    Measurement::new(round_to(unit.from_mm(mm), precision), unit)
}

/// Compute equal shelf spacing.
///
/// # Arguments
///
/// * `input` - Cavity height, shelf thickness, count, output unit and precision
///
/// # Returns
///
/// * `Ok(SpacingResult)` - Gap and one position per shelf, rounded in the display unit
/// * `Err(CalcError::InvalidInput)` - Non-finite or out-of-range input
/// * `Err(CalcError::InfeasibleGeometry)` - Shelves do not fit with a gap that is
///   still positive after rounding in the display unit
pub fn calculate(input: &SpacingInput) -> CalcResult<SpacingResult> {
    input.validate()?;

    let canonical = CanonicalSpacing::solve(input.height.to_mm(), input.thickness.to_mm(), input.count)?;

    let unit = input.display_unit;
    let precision = input.precision;

    // A gap that rounds away in the display unit is no gap at all
    let gap = to_display(canonical.gap, unit, precision);
    if gap.value <= 0.0 {
        warn!(
            gap_mm = canonical.gap.0,
            unit = unit.symbol(),
            precision,
            "gap rounds to zero in the display unit"
        );
        return Err(CalcError::InfeasibleGeometry {
            height_mm: canonical.height.0,
            thickness_mm: canonical.thickness.0,
            count: canonical.count,
            gap_mm: canonical.gap.0,
        });
    }

    let shelves: Vec<ShelfPosition> = (1..=input.count)
        .map(|index| ShelfPosition {
            index,
            bottom_offset: to_display(canonical.bottom_offset(index), unit, precision),
            center_offset: to_display(canonical.center_offset(index), unit, precision),
        })
        .collect();

    debug!(
        height_mm = canonical.height.0,
        thickness_mm = canonical.thickness.0,
        count = canonical.count,
        gap_mm = canonical.gap.0,
        unit = unit.symbol(),
        "computed shelf spacing"
    );

    Ok(SpacingResult {
        display_unit: unit,
        precision,
        gap,
        shelves,
        canonical,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kitchen_cabinet() -> SpacingInput {
        SpacingInput::new(1000.0, 18.0, 4, LengthUnit::Millimeters)
    }

    #[test]
    fn test_metric_example() {
        let result = calculate(&kitchen_cabinet()).unwrap();

        // g = (1000 - 4*18) / 5 = 185.6
        assert_eq!(result.gap, Measurement::mm(185.6));

        let bottoms: Vec<f64> = result.shelves.iter().map(|s| s.bottom_offset.value).collect();
        let centers: Vec<f64> = result.shelves.iter().map(|s| s.center_offset.value).collect();
        assert_eq!(bottoms, vec![185.6, 389.2, 592.8, 796.4]);
        assert_eq!(centers, vec![194.6, 398.2, 601.8, 805.4]);
    }

    #[test]
    fn test_imperial_example_uses_mm_internally() {
        let input = SpacingInput::new(36.0, 0.75, 3, LengthUnit::Inches);
        let result = calculate(&input).unwrap();

        assert!((result.canonical.height.0 - 914.4).abs() < 1e-9);
        assert!((result.canonical.thickness.0 - 19.05).abs() < 1e-9);
        assert!((result.canonical.gap.0 - 214.3125).abs() < 1e-9);
        assert_eq!(result.gap, Measurement::inches(8.44));

        let precise = calculate(&input.with_precision(4)).unwrap();
        assert_eq!(precise.gap.value, 8.4375);
    }

    #[test]
    fn test_mixed_units() {
        // Inch cavity, metric board, metric output
        let input = SpacingInput {
            height: Measurement::inches(36.0),
            thickness: Measurement::mm(19.05),
            count: 3,
            display_unit: LengthUnit::Millimeters,
            precision: 4,
        };
        let result = calculate(&input).unwrap();
        assert_eq!(result.gap.value, 214.3125);
        assert_eq!(result.gap.unit, LengthUnit::Millimeters);
    }

    #[test]
    fn test_shelf_count_and_ordering() {
        for count in 1..=12 {
            let input = SpacingInput::new(2100.0, 19.0, count, LengthUnit::Millimeters);
            let result = calculate(&input).unwrap();
            assert_eq!(result.shelves.len(), count as usize);

            for (pos, shelf) in result.shelves.iter().enumerate() {
                assert_eq!(shelf.index, pos as u32 + 1);
                assert!(shelf.bottom_offset.value < shelf.center_offset.value);
                if let Some(next) = result.shelves.get(pos + 1) {
                    assert!(shelf.center_offset.value < next.bottom_offset.value);
                }
            }
        }
    }

    #[test]
    fn test_stack_sums_to_height() {
        for (h, t, n) in [(1000.0, 18.0, 4), (914.4, 19.05, 3), (333.3, 0.0, 7), (2400.0, 25.0, 20)] {
            let spacing = CanonicalSpacing::solve(Millimeters(h), Millimeters(t), n).unwrap();
            assert!((spacing.stacked_height().0 - h).abs() < 1e-9, "H={} t={} n={}", h, t, n);
        }
    }

    #[test]
    fn test_single_shelf() {
        let input = SpacingInput::new(600.0, 18.0, 1, LengthUnit::Millimeters);
        let result = calculate(&input).unwrap();
        let g = (600.0 - 18.0) / 2.0;

        assert_eq!(result.shelves.len(), 1);
        assert_eq!(result.gap.value, g);
        assert_eq!(result.shelves[0].bottom_offset.value, g);
        assert_eq!(result.shelves[0].center_offset.value, g + 9.0);
    }

    #[test]
    fn test_infeasible_geometry() {
        // n*t == H leaves no gap at all
        let exact = SpacingInput::new(72.0, 18.0, 4, LengthUnit::Millimeters);
        assert!(calculate(&exact).unwrap_err().is_infeasible());

        let too_thick = SpacingInput::new(50.0, 18.0, 3, LengthUnit::Millimeters);
        match calculate(&too_thick) {
            Err(CalcError::InfeasibleGeometry { count, gap_mm, .. }) => {
                assert_eq!(count, 3);
                assert!(gap_mm < 0.0);
            }
            other => panic!("expected InfeasibleGeometry, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_inputs() {
        let mut input = kitchen_cabinet();
        input.height.value = -5.0;
        assert!(calculate(&input).unwrap_err().is_invalid_input());

        let mut input = kitchen_cabinet();
        input.height.value = f64::NAN;
        assert!(calculate(&input).unwrap_err().is_invalid_input());

        let mut input = kitchen_cabinet();
        input.thickness.value = f64::INFINITY;
        assert!(calculate(&input).unwrap_err().is_invalid_input());

        let mut input = kitchen_cabinet();
        input.thickness.value = -1.0;
        assert!(calculate(&input).unwrap_err().is_invalid_input());

        let mut input = kitchen_cabinet();
        input.count = 0;
        assert!(calculate(&input).unwrap_err().is_invalid_input());

        let input = kitchen_cabinet().with_precision(MAX_PRECISION + 1);
        assert!(calculate(&input).unwrap_err().is_invalid_input());

        let mut input = kitchen_cabinet();
        input.count = MAX_SHELVES + 1;
        assert!(calculate(&input).unwrap_err().is_invalid_input());

        let huge = SpacingInput::new(1.0e12, 0.0, u32::MAX, LengthUnit::Millimeters);
        assert!(calculate(&huge).unwrap_err().is_invalid_input());

        let most = SpacingInput::new(1.0e6, 0.0, MAX_SHELVES, LengthUnit::Millimeters);
        assert_eq!(calculate(&most).unwrap().shelves.len(), MAX_SHELVES as usize);
    }

    #[test]
    fn test_gap_rounding_to_zero_is_infeasible() {
        // g = (1 - 0.9) / 4 = 0.025 mm, shown as 0 at whole millimeters
        let input = SpacingInput::new(1.0, 0.3, 3, LengthUnit::Millimeters).with_precision(0);
        assert!(calculate(&input).unwrap_err().is_infeasible());

        // Same cavity is fine once the gap survives rounding
        let finer = input.with_precision(3);
        assert_eq!(calculate(&finer).unwrap().gap.value, 0.025);

        // g = 0.08 mm, about 0.003 in, which vanishes at two decimal places
        let inches = SpacingInput::new(10.4, 2.5, 4, LengthUnit::Millimeters)
            .with_display_unit(LengthUnit::Inches);
        assert!(calculate(&inches).unwrap_err().is_infeasible());
    }

    #[test]
    fn test_zero_thickness_allowed() {
        let input = SpacingInput::new(100.0, 0.0, 3, LengthUnit::Millimeters);
        let result = calculate(&input).unwrap();
        assert_eq!(result.gap.value, 25.0);
        assert_eq!(result.shelves[2].bottom_offset.value, 75.0);
        assert_eq!(result.shelves[2].center_offset.value, 75.0);
    }

    #[test]
    fn test_from_fields() {
        let fields = SpacingFields::new(" 1000 ", "18", "4", "mm", "2");
        let input = SpacingInput::from_fields(&fields).unwrap();
        assert_eq!(input, kitchen_cabinet());
    }

    #[test]
    fn test_from_fields_rejects_bad_text() {
        let missing = SpacingFields::new("", "18", "4", "mm", "2");
        assert_eq!(
            SpacingInput::from_fields(&missing).unwrap_err(),
            CalcError::missing_field("height")
        );

        let words = SpacingFields::new("tall", "18", "4", "mm", "2");
        let err = SpacingInput::from_fields(&words).unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput { ref field, .. } if field == "height"));

        let fractional_count = SpacingFields::new("1000", "18", "2.5", "mm", "2");
        assert!(SpacingInput::from_fields(&fractional_count).unwrap_err().is_invalid_input());

        let negative_count = SpacingFields::new("1000", "18", "-1", "mm", "2");
        assert!(SpacingInput::from_fields(&negative_count).unwrap_err().is_invalid_input());

        let zero_count = SpacingFields::new("1000", "18", "0", "mm", "2");
        assert!(SpacingInput::from_fields(&zero_count).unwrap_err().is_invalid_input());

        let infinite = SpacingFields::new("inf", "18", "4", "mm", "2");
        assert!(SpacingInput::from_fields(&infinite).unwrap_err().is_invalid_input());

        let bad_unit = SpacingFields::new("1000", "18", "4", "cm", "2");
        assert!(SpacingInput::from_fields(&bad_unit).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_shelf_lookup() {
        let result = calculate(&kitchen_cabinet()).unwrap();
        assert_eq!(result.shelf(1).map(|s| s.index), Some(1));
        assert_eq!(result.shelf(4).map(|s| s.index), Some(4));
        assert!(result.shelf(0).is_none());
        assert!(result.shelf(5).is_none());
    }

    #[test]
    fn test_serialization() {
        let input = SpacingInput::new(36.0, 0.75, 3, LengthUnit::Inches);
        let json = serde_json::to_string_pretty(&input).unwrap();
        let roundtrip: SpacingInput = serde_json::from_str(&json).unwrap();
        assert_eq!(input, roundtrip);

        let result = calculate(&input).unwrap();
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["display_unit"], "in");
        assert_eq!(value["shelves"].as_array().map(|a| a.len()), Some(3));
        assert_eq!(value["gap"]["value"], 8.44);
    }
}

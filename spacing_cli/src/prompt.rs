//! Interactive mode: asks for each field in turn, the way the calculator
//! form does, then prints the table and summary.

use std::io::{self, BufRead, Write};

use spacing_core::calculations::{calculate, SpacingFields, SpacingInput};
use spacing_core::report::{render_summary, SpacingTable};
use spacing_core::settings::CalculatorSettings;
use spacing_core::units::LengthUnit;
use spacing_core::SpacingResult;

/// Ask for one field. An empty answer takes the default (if any).
pub fn prompt_field<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    label: &str,
    default: Option<&str>,
) -> io::Result<String> {
    match default {
        Some(d) => write!(out, "{} [{}]: ", label, d)?,
        None => write!(out, "{}: ", label)?,
    }
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    let answer = line.trim();
    if answer.is_empty() {
        Ok(default.unwrap_or_default().to_string())
    } else {
        Ok(answer.to_string())
    }
}

/// Typical board thickness for the unit, offered as the default.
fn default_thickness(unit: LengthUnit) -> &'static str {
    match unit {
        LengthUnit::Millimeters => "18",
        LengthUnit::Inches => "0.75",
    }
}

/// Collect the five fields from the user.
pub fn read_fields<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    settings: &CalculatorSettings,
) -> io::Result<SpacingFields> {
    let units = prompt_field(input, out, "Units (mm/in)", Some(settings.default_unit.symbol()))?;
    let unit_hint = units.parse::<LengthUnit>().unwrap_or(settings.default_unit);

    let height = prompt_field(input, out, &format!("Internal height ({})", unit_hint), None)?;
    let thickness = prompt_field(
        input,
        out,
        &format!("Shelf thickness ({})", unit_hint),
        Some(default_thickness(unit_hint)),
    )?;
    let count = prompt_field(input, out, "Number of shelves", Some("3"))?;
    let precision = prompt_field(
        input,
        out,
        "Decimal places",
        Some(settings.default_precision.to_string().as_str()),
    )?;

    Ok(SpacingFields {
        height,
        thickness,
        count,
        units,
        precision,
    })
}

/// Run one interactive calculation.
///
/// Returns the input and result when the calculation succeeded, so the
/// caller can offer a template export. On failure the user-facing message
/// is printed instead of any result.
pub fn run<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    settings: &CalculatorSettings,
) -> io::Result<Option<(SpacingInput, SpacingResult)>> {
    writeln!(out, "Shelf Spacing Calculator (middle shelves only)")?;
    writeln!(out, "==============================================")?;
    writeln!(out)?;

    let fields = read_fields(input, out, settings)?;
    writeln!(out)?;

    let outcome = SpacingInput::from_fields(&fields).and_then(|spacing| {
        calculate(&spacing).map(|result| (spacing, result))
    });

    match outcome {
        Ok((spacing, result)) => {
            let style = settings.number_style;
            write!(out, "{}", SpacingTable::from_result(&result, style).render())?;
            writeln!(out)?;
            writeln!(out, "{}", render_summary(&spacing, &result, style))?;
            Ok(Some((spacing, result)))
        }
        Err(e) => {
            tracing::debug!(code = e.error_code(), "interactive calculation rejected");
            writeln!(out, "{}", e.user_message())?;
            Ok(None)
        }
    }
}

/// Yes/no question, default no.
pub fn confirm<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> io::Result<bool> {
    let answer = prompt_field(input, out, &format!("{} (y/N)", question), None)?;
    Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
}

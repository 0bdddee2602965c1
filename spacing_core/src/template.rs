//! # Drilling Template
//!
//! Renders a printable strip with one mark per shelf centerline, scaled so
//! the drawn axis spans the full cavity height (base at the bottom).
//!
//! ## Architecture
//!
//! - Mark positions are computed in Rust ([`DrillingTemplate::plan`])
//! - The plan is written out as Typst source with absolute placement
//! - Typst compiles it; output is PNG bytes (`typst-render`) or PDF bytes
//!   (`typst-pdf`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use spacing_core::calculations::{calculate, SpacingInput};
//! use spacing_core::precision::NumberStyle;
//! use spacing_core::template::{render_template, TemplateFormat, TemplateSettings};
//! use spacing_core::units::LengthUnit;
//!
//! let input = SpacingInput::new(1000.0, 18.0, 4, LengthUnit::Millimeters);
//! let result = calculate(&input).unwrap();
//! let settings = TemplateSettings::default();
//!
//! let png = render_template(&result, &settings, NumberStyle::Trimmed, TemplateFormat::Png).unwrap();
//! std::fs::write(settings.file_name(TemplateFormat::Png), png).unwrap();
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::layout::PagedDocument;
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::calculations::SpacingResult;
use crate::errors::{CalcError, CalcResult};
use crate::precision::{format_measurement, NumberStyle};
use crate::units::Millimeters;

// ============================================================================
// Layout and Settings
// ============================================================================

/// Page geometry in typographic points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateLayout {
    pub width_pt: f64,
    pub height_pt: f64,
    /// Space above the axis for the title block
    pub margin_top_pt: f64,
    /// Space below the axis for the date stamp
    pub margin_bottom_pt: f64,
    /// Horizontal position of the axis
    pub margin_left_pt: f64,
    /// Raster scale for PNG export
    pub pixel_per_pt: f32,
}

impl Default for TemplateLayout {
    fn default() -> Self {
        TemplateLayout {
            width_pt: 260.0,
            height_pt: 1400.0,
            margin_top_pt: 84.0,
            margin_bottom_pt: 40.0,
            margin_left_pt: 40.0,
            pixel_per_pt: 3.0,
        }
    }
}

impl TemplateLayout {
    /// Length of the drawn axis
    pub fn line_height(&self) -> f64 {
        self.height_pt - self.margin_top_pt - self.margin_bottom_pt
    }

    /// Vertical page position for a point `mm` above the cavity base.
    ///
    /// `0` maps to the bottom of the axis, `height_mm` to the top.
    pub fn y_for(&self, mm: Millimeters, height_mm: Millimeters) -> f64 {
        self.margin_top_pt + self.line_height() * (1.0 - mm.0 / height_mm.0)
    }

    pub fn validate(&self) -> CalcResult<()> {
        let positive = [
            ("width_pt", self.width_pt),
            ("height_pt", self.height_pt),
            ("pixel_per_pt", self.pixel_per_pt as f64),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(CalcError::invalid_input(field, value.to_string(), "Must be positive"));
            }
        }

        let margins = [
            ("margin_top_pt", self.margin_top_pt),
            ("margin_bottom_pt", self.margin_bottom_pt),
            ("margin_left_pt", self.margin_left_pt),
        ];
        for (field, value) in margins {
            if !value.is_finite() || value < 0.0 {
                return Err(CalcError::invalid_input(field, value.to_string(), "Must be zero or positive"));
            }
        }

        if self.line_height() <= 0.0 {
            return Err(CalcError::invalid_input(
                "height_pt",
                self.height_pt.to_string(),
                "Page is shorter than its top and bottom margins",
            ));
        }
        if self.margin_left_pt >= self.width_pt {
            return Err(CalcError::invalid_input(
                "margin_left_pt",
                self.margin_left_pt.to_string(),
                "Axis falls outside the page",
            ));
        }
        Ok(())
    }
}

/// User-adjustable template options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    pub title: String,
    /// Output file name without extension
    pub file_stem: String,
    pub layout: TemplateLayout,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        TemplateSettings {
            title: "Shelf Drilling Template".to_string(),
            file_stem: "shelf_drilling_template".to_string(),
            layout: TemplateLayout::default(),
        }
    }
}

impl TemplateSettings {
    pub fn file_name(&self, format: TemplateFormat) -> String {
        format!("{}.{}", self.file_stem, format.extension())
    }
}

/// Export format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateFormat {
    #[default]
    Png,
    Pdf,
}

impl TemplateFormat {
    pub fn extension(self) -> &'static str {
        match self {
            TemplateFormat::Png => "png",
            TemplateFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for TemplateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TemplateFormat {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(TemplateFormat::Png),
            "pdf" => Ok(TemplateFormat::Pdf),
            _ => Err(CalcError::invalid_input("format", s, "Format must be 'png' or 'pdf'")),
        }
    }
}

// ============================================================================
// Template Plan
// ============================================================================

/// A centerline mark on the axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateMark {
    pub index: u32,
    /// Page position of the centerline, from the top edge
    pub y_pt: f64,
    /// e.g. `Shelf 1: 194.6 mm`
    pub label: String,
}

/// Everything needed to draw the template, in page coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillingTemplate {
    pub title: String,
    /// Lines under the title (height, gap)
    pub header: Vec<String>,
    pub marks: Vec<TemplateMark>,
    pub layout: TemplateLayout,
    pub date: String,
}

impl DrillingTemplate {
    /// Lay out the marks for a result.
    pub fn plan(result: &SpacingResult, settings: &TemplateSettings, style: NumberStyle) -> Self {
        let layout = settings.layout;
        let precision = result.precision;
        let height_mm = result.canonical.height;

        let header = vec![
            format!(
                "Internal height: {}",
                format_measurement(result.display(height_mm), precision, style)
            ),
            format!("Gap: {}", format_measurement(result.gap, precision, style)),
        ];

        let marks = result
            .shelves
            .iter()
            .map(|shelf| TemplateMark {
                index: shelf.index,
                y_pt: layout.y_for(result.canonical.center_offset(shelf.index), height_mm),
                label: format!(
                    "Shelf {}: {}",
                    shelf.index,
                    format_measurement(shelf.center_offset, precision, style)
                ),
            })
            .collect();

        DrillingTemplate {
            title: settings.title.clone(),
            header,
            marks,
            layout,
            date: Utc::now().format("%Y-%m-%d").to_string(),
        }
    }

    /// Write the plan as a Typst document.
    pub fn to_typst(&self) -> String {
        let l = &self.layout;
        let axis_x = l.margin_left_pt;
        let axis_top = l.margin_top_pt;
        let axis_len = l.line_height();
        let axis_bottom = axis_top + axis_len;
        let label_x = axis_x + 16.0;

        let mut src = format!(
            r##"#set page(width: {w:.2}pt, height: {h:.2}pt, margin: 0pt, fill: white)
#set text(font: "DejaVu Sans Mono", size: 12pt, fill: black)

#place(top + left, dx: 16pt, dy: 14pt)[#text(size: 14pt, weight: "bold")[{title}]]
"##,
            w = l.width_pt,
            h = l.height_pt,
            title = escape_typst(&self.title),
        );

        for (i, line) in self.header.iter().enumerate() {
            src.push_str(&format!(
                "#place(top + left, dx: 16pt, dy: {:.2}pt)[{}]\n",
                38.0 + 20.0 * i as f64,
                escape_typst(line)
            ));
        }

        // Axis, with ticks at the cavity top and base
        src.push_str(&format!(
            "#place(top + left, dx: {x:.2}pt, dy: {top:.2}pt, line(start: (0pt, 0pt), end: (0pt, {len:.2}pt), stroke: 1pt + black))\n",
            x = axis_x,
            top = axis_top,
            len = axis_len,
        ));
        for y in [axis_top, axis_bottom] {
            src.push_str(&format!(
                "#place(top + left, dx: {:.2}pt, dy: {:.2}pt, line(start: (0pt, 0pt), end: (16pt, 0pt), stroke: 1pt + black))\n",
                axis_x - 8.0,
                y
            ));
        }

        for mark in &self.marks {
            src.push_str(&format!(
                "#place(top + left, dx: {:.2}pt, dy: {:.2}pt, circle(radius: 6pt, fill: black))\n",
                axis_x - 6.0,
                mark.y_pt - 6.0
            ));
            src.push_str(&format!(
                "#place(top + left, dx: {:.2}pt, dy: {:.2}pt)[{}]\n",
                label_x,
                mark.y_pt - 7.0,
                escape_typst(&mark.label)
            ));
        }

        src.push_str(&format!(
            "#place(top + left, dx: 16pt, dy: {:.2}pt)[#text(size: 9pt, fill: gray)[Cavity base #h(1em) {}]]\n",
            axis_bottom + 12.0,
            escape_typst(&self.date)
        ));

        src
    }
}

/// Escape special Typst characters in user-provided text.
///
/// Covers inline markup and the line-start markers (`-`, `+`, `=`, `/`),
/// so a title such as `- Pantry` stays plain text.
fn escape_typst(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '*' => "\\*".to_string(),
            '_' => "\\_".to_string(),
            '#' => "\\#".to_string(),
            '$' => "\\$".to_string(),
            '@' => "\\@".to_string(),
            '<' => "\\<".to_string(),
            '>' => "\\>".to_string(),
            '[' => "\\[".to_string(),
            ']' => "\\]".to_string(),
            '\\' => "\\\\".to_string(),
            '`' => "\\`".to_string(),
            '~' => "\\~".to_string(),
            '-' => "\\-".to_string(),
            '+' => "\\+".to_string(),
            '=' => "\\=".to_string(),
            '/' => "\\/".to_string(),
            '"' => "\\\"".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

// ============================================================================
// Typst World Implementation
// ============================================================================

/// Bundled fonts, parsed once per process.
static FONTS: Lazy<Vec<Font>> = Lazy::new(|| {
    typst_assets::fonts()
        .flat_map(|data| Font::iter(Bytes::new(data)))
        .collect()
});

/// A minimal Typst world for compiling one in-memory document.
struct TemplateWorld {
    main: Source,
    book: LazyHash<FontBook>,
    library: LazyHash<Library>,
}

impl TemplateWorld {
    fn new(source: String) -> Self {
        TemplateWorld {
            main: Source::detached(source),
            book: LazyHash::new(FontBook::from_fonts(FONTS.iter())),
            library: LazyHash::new(Library::default()),
        }
    }
}

impl World for TemplateWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        FONTS.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = Utc::now();
        Datetime::from_ymd(now.year(), now.month() as u8, now.day() as u8)
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn compile(source: String) -> CalcResult<PagedDocument> {
    let world = TemplateWorld::new(source);
    let warned = typst::compile::<PagedDocument>(&world);

    warned.output.map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::render_failed("typst", error_msgs.join("; "))
    })
}

/// Render the drilling template for `result` in the requested format.
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - PNG or PDF file contents
/// * `Err(CalcError::InvalidInput)` - Layout settings are unusable
/// * `Err(CalcError::RenderFailed)` - Typst compilation or export failed
pub fn render_template(
    result: &SpacingResult,
    settings: &TemplateSettings,
    style: NumberStyle,
    format: TemplateFormat,
) -> CalcResult<Vec<u8>> {
    settings.layout.validate()?;

    let plan = DrillingTemplate::plan(result, settings, style);
    let document = compile(plan.to_typst())?;

    let bytes = match format {
        TemplateFormat::Png => {
            let page = document
                .pages
                .first()
                .ok_or_else(|| CalcError::render_failed("png", "Template produced no pages"))?;
            let pixmap = typst_render::render(page, settings.layout.pixel_per_pt);
            pixmap
                .encode_png()
                .map_err(|e| CalcError::render_failed("png", e.to_string()))?
        }
        TemplateFormat::Pdf => typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
            CalcError::render_failed("pdf", error_msgs.join("; "))
        })?,
    };

    debug!(
        format = format.extension(),
        marks = plan.marks.len(),
        bytes = bytes.len(),
        "rendered drilling template"
    );
    Ok(bytes)
}

/// Render the template as PNG.
pub fn render_template_png(result: &SpacingResult, settings: &TemplateSettings, style: NumberStyle) -> CalcResult<Vec<u8>> {
    render_template(result, settings, style, TemplateFormat::Png)
}

/// Render the template as PDF.
pub fn render_template_pdf(result: &SpacingResult, settings: &TemplateSettings, style: NumberStyle) -> CalcResult<Vec<u8>> {
    render_template(result, settings, style, TemplateFormat::Pdf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::{calculate, SpacingInput};
    use crate::units::LengthUnit;

    fn result() -> SpacingResult {
        calculate(&SpacingInput::new(1000.0, 18.0, 4, LengthUnit::Millimeters)).unwrap()
    }

    #[test]
    fn test_y_for_spans_axis() {
        let layout = TemplateLayout::default();
        let h = Millimeters(1000.0);
        let axis_bottom = layout.margin_top_pt + layout.line_height();

        assert!((layout.y_for(Millimeters(0.0), h) - axis_bottom).abs() < 1e-9);
        assert!((layout.y_for(h, h) - layout.margin_top_pt).abs() < 1e-9);
        assert!((layout.y_for(Millimeters(500.0), h) - (layout.margin_top_pt + layout.line_height() / 2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_plan_marks_move_up_the_page() {
        let plan = DrillingTemplate::plan(&result(), &TemplateSettings::default(), NumberStyle::Trimmed);

        assert_eq!(plan.marks.len(), 4);
        assert_eq!(plan.marks[0].label, "Shelf 1: 194.6 mm");
        assert_eq!(plan.header[0], "Internal height: 1000 mm");
        assert_eq!(plan.header[1], "Gap: 185.6 mm");

        // Higher shelves sit closer to the top edge
        for pair in plan.marks.windows(2) {
            assert!(pair[1].y_pt < pair[0].y_pt);
        }

        let layout = TemplateLayout::default();
        let expected = layout.margin_top_pt + layout.line_height() * (1.0 - 194.6 / 1000.0);
        assert!((plan.marks[0].y_pt - expected).abs() < 1e-9);
    }

    #[test]
    fn test_plan_uses_canonical_mm_for_inch_results() {
        let input = SpacingInput::new(36.0, 0.75, 3, LengthUnit::Inches).with_precision(0);
        let result = calculate(&input).unwrap();
        let plan = DrillingTemplate::plan(&result, &TemplateSettings::default(), NumberStyle::Trimmed);

        // Rounded labels, unrounded positions
        assert_eq!(plan.marks[0].label, "Shelf 1: 9 in");
        let layout = TemplateLayout::default();
        let center_mm = result.canonical.center_offset(1).0;
        let expected = layout.y_for(Millimeters(center_mm), Millimeters(914.4));
        assert!((plan.marks[0].y_pt - expected).abs() < 1e-6);
    }

    #[test]
    fn test_typst_source() {
        let mut settings = TemplateSettings::default();
        settings.title = "Pantry #2 [left]".to_string();
        let plan = DrillingTemplate::plan(&result(), &settings, NumberStyle::Trimmed);
        let src = plan.to_typst();

        assert!(src.contains("#set page(width: 260.00pt, height: 1400.00pt"));
        assert!(src.contains("Pantry \\#2 \\[left\\]"));
        assert_eq!(src.matches("circle(radius: 6pt").count(), 4);
        assert!(src.contains("Shelf 4: 805.4 mm"));
    }

    #[test]
    fn test_escape_typst() {
        assert_eq!(escape_typst("a_b*c"), "a\\_b\\*c");
        assert_eq!(escape_typst("plain text"), "plain text");
        assert_eq!(escape_typst("- Pantry"), "\\- Pantry");
        assert_eq!(escape_typst("= Top"), "\\= Top");
        assert_eq!(escape_typst("+ 1/2~in"), "\\+ 1\\/2\\~in");
    }

    #[test]
    fn test_markup_title_compiles_as_text() {
        let mut settings = TemplateSettings::default();
        settings.title = "- Pantry / left = 2".to_string();
        let plan = DrillingTemplate::plan(&result(), &settings, NumberStyle::Trimmed);
        assert!(plan.to_typst().contains("\\- Pantry \\/ left \\= 2"));

        let pdf = render_template(&result(), &settings, NumberStyle::Trimmed, TemplateFormat::Pdf).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn test_layout_validation() {
        assert!(TemplateLayout::default().validate().is_ok());

        let squashed = TemplateLayout { height_pt: 100.0, ..TemplateLayout::default() };
        assert!(squashed.validate().is_err());

        let zero_scale = TemplateLayout { pixel_per_pt: 0.0, ..TemplateLayout::default() };
        assert!(zero_scale.validate().is_err());

        let off_page = TemplateLayout { margin_left_pt: 400.0, ..TemplateLayout::default() };
        assert!(off_page.validate().is_err());
    }

    #[test]
    fn test_format_parse_and_file_name() {
        assert_eq!("PNG".parse::<TemplateFormat>().unwrap(), TemplateFormat::Png);
        assert_eq!("pdf".parse::<TemplateFormat>().unwrap(), TemplateFormat::Pdf);
        assert!("svg".parse::<TemplateFormat>().is_err());

        let settings = TemplateSettings::default();
        assert_eq!(settings.file_name(TemplateFormat::Pdf), "shelf_drilling_template.pdf");
    }

    #[test]
    fn test_png_generation() {
        let png = render_template_png(&result(), &TemplateSettings::default(), NumberStyle::Trimmed);
        assert!(png.is_ok(), "PNG generation failed: {:?}", png.err());

        let png_bytes = png.unwrap();
        assert!(png_bytes.starts_with(&[0x89, b'P', b'N', b'G']), "Output is not a valid PNG");
        assert!(png_bytes.len() > 1000, "PNG seems too small");
    }

    #[test]
    fn test_pdf_generation() {
        let pdf = render_template_pdf(&result(), &TemplateSettings::default(), NumberStyle::Fixed);
        assert!(pdf.is_ok(), "PDF generation failed: {:?}", pdf.err());
        assert!(pdf.unwrap().starts_with(b"%PDF"), "Output is not a valid PDF");
    }
}

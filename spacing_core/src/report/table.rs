//! Tabular rendering of shelf positions.
//!
//! ```text
//! Equal gap (top, bottom, between shelves): 185.6 mm
//!
//! Shelf | Bottom from base | Centre line
//! ------+------------------+------------
//! 1     | 185.6 mm         | 194.6 mm
//! 2     | 389.2 mm         | 398.2 mm
//! ```

use serde::{Deserialize, Serialize};

use crate::calculations::SpacingResult;
use crate::precision::{format_measurement, NumberStyle};

/// Column headers, left to right
pub const HEADERS: [&str; 3] = ["Shelf", "Bottom from base", "Centre line"];

/// One formatted row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub shelf: u32,
    pub bottom: String,
    pub center: String,
}

/// Formatted table, ready to print or hand to another renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpacingTable {
    /// Formatted gap, e.g. `185.6 mm`
    pub gap: String,
    pub rows: Vec<TableRow>,
}

impl SpacingTable {
    pub fn from_result(result: &SpacingResult, style: NumberStyle) -> Self {
        let precision = result.precision;
        let rows = result
            .shelves
            .iter()
            .map(|shelf| TableRow {
                shelf: shelf.index,
                bottom: format_measurement(shelf.bottom_offset, precision, style),
                center: format_measurement(shelf.center_offset, precision, style),
            })
            .collect();

        SpacingTable {
            gap: format_measurement(result.gap, precision, style),
            rows,
        }
    }

    /// Render as aligned plain text.
    pub fn render(&self) -> String {
        let index_cells: Vec<String> = self.rows.iter().map(|r| r.shelf.to_string()).collect();

        let widths = [
            column_width(HEADERS[0], index_cells.iter().map(String::as_str)),
            column_width(HEADERS[1], self.rows.iter().map(|r| r.bottom.as_str())),
            column_width(HEADERS[2], self.rows.iter().map(|r| r.center.as_str())),
        ];

        let mut out = String::new();
        out.push_str(&format!("Equal gap (top, bottom, between shelves): {}\n\n", self.gap));
        out.push_str(&format_line(&HEADERS, &widths));
        out.push_str(&format!(
            "{}-+-{}-+-{}\n",
            "-".repeat(widths[0]),
            "-".repeat(widths[1]),
            "-".repeat(widths[2])
        ));

        for (row, index) in self.rows.iter().zip(&index_cells) {
            out.push_str(&format_line(
                &[index.as_str(), row.bottom.as_str(), row.center.as_str()],
                &widths,
            ));
        }
        out
    }
}

fn column_width<'a>(header: &str, cells: impl Iterator<Item = &'a str>) -> usize {
    cells
        .map(|c| c.chars().count())
        .chain(std::iter::once(header.chars().count()))
        .max()
        .unwrap_or(0)
}

fn format_line(cells: &[&str; 3], widths: &[usize; 3]) -> String {
    let line = format!(
        "{:<w0$} | {:<w1$} | {:<w2$}",
        cells[0],
        cells[1],
        cells[2],
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2]
    );
    format!("{}\n", line.trim_end())
}

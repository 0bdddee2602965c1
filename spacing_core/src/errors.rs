//! # Error Types
//!
//! Structured error types for spacing_core. Every failure carries enough
//! context for a front end to show a useful message and for scripts to
//! branch on a stable error code.
//!
//! ## Example
//!
//! ```rust
//! use spacing_core::errors::{CalcError, CalcResult};
//!
//! fn validate_height(height_mm: f64) -> CalcResult<()> {
//!     if height_mm <= 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "height",
//!             height_mm.to_string(),
//!             "Height must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for spacing_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculation, rendering and settings operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (non-numeric, non-finite, out of range)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is empty
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// The shelves do not fit with a positive gap
    #[error(
        "Shelves do not fit: {count} x {thickness_mm} mm in {height_mm} mm leaves a gap of {gap_mm} mm"
    )]
    InfeasibleGeometry {
        height_mm: f64,
        thickness_mm: f64,
        count: u32,
        gap_mm: f64,
    },

    /// Template compilation or image/PDF export failed
    #[error("Render failed ({format}): {reason}")]
    RenderFailed { format: String, reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Settings schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create a RenderFailed error
    pub fn render_failed(format: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::RenderFailed {
            format: format.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by the values the user typed
    /// (malformed, missing, or out of range).
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, CalcError::InvalidInput { .. } | CalcError::MissingField { .. })
    }

    /// True when the inputs were well-formed but the shelves cannot fit.
    pub fn is_infeasible(&self) -> bool {
        matches!(self, CalcError::InfeasibleGeometry { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::InfeasibleGeometry { .. } => "INFEASIBLE_GEOMETRY",
            CalcError::RenderFailed { .. } => "RENDER_FAILED",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }

    /// Short message suitable for showing in place of a result.
    pub fn user_message(&self) -> String {
        match self {
            CalcError::InvalidInput { .. } | CalcError::MissingField { .. } => {
                format!("Please enter a valid height, thickness, and shelf count. ({})", self)
            }
            CalcError::InfeasibleGeometry { .. } => {
                "These inputs do not produce a positive gap. Check your numbers.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

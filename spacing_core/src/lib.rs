//! # spacing_core - Shelf Spacing Calculation Engine
//!
//! `spacing_core` computes evenly spaced shelf positions inside a cabinet
//! cavity and renders the result as a table, a copyable summary, or a
//! printable drilling template.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and return results
//! - **One canonical unit**: All arithmetic in millimeters; inches only at the edges
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use spacing_core::calculations::{calculate, SpacingInput};
//! use spacing_core::units::LengthUnit;
//!
//! // 36" cavity, 3/4" boards, three shelves
//! let input = SpacingInput::new(36.0, 0.75, 3, LengthUnit::Inches);
//! let result = calculate(&input).unwrap();
//!
//! assert_eq!(result.gap.value, 8.44);
//! assert_eq!(result.shelves.len(), 3);
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - The spacing calculation and raw field parsing
//! - [`units`] - Type-safe length units and unit-tagged measurements
//! - [`precision`] - Rounding and number formatting
//! - [`report`] - Text table and summary renderers
//! - [`template`] - Drilling template (PNG/PDF) via Typst
//! - [`settings`] - User defaults with atomic saves
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod errors;
pub mod precision;
pub mod report;
pub mod settings;
pub mod template;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{calculate, SpacingFields, SpacingInput, SpacingResult};
pub use errors::{CalcError, CalcResult};
pub use settings::{load_or_default, save_settings, CalculatorSettings};
pub use units::{LengthUnit, Measurement};

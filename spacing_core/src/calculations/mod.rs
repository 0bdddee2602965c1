//! # Calculations
//!
//! Each calculation follows the pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable)
//! - `*Result` - Calculation results (JSON-serializable)
//! - `calculate(input) -> Result<*Result, CalcError>` - Pure calculation function
//!
//! ## Available Calculations
//!
//! - [`spacing`] - Equal shelf spacing inside a cabinet cavity

pub mod spacing;

// Re-export commonly used types
pub use spacing::{
    calculate, CanonicalSpacing, ShelfPosition, SpacingFields, SpacingInput, SpacingResult,
    DEFAULT_PRECISION, MAX_SHELVES,
};

//! # Unit Types
//!
//! Type-safe wrappers for the two length units a cabinet maker works in.
//! All spacing arithmetic is done in millimeters; values are converted to
//! the user's unit only on the way in and on the way out.
//!
//! ## Example
//!
//! ```rust
//! use spacing_core::units::{Inches, LengthUnit, Measurement, Millimeters};
//!
//! let depth = Inches(0.75);
//! let depth_mm: Millimeters = depth.into();
//! assert!((depth_mm.0 - 19.05).abs() < 1e-9);
//!
//! let height = Measurement::new(36.0, LengthUnit::Inches);
//! assert!((height.to_mm().0 - 914.4).abs() < 1e-9);
//! ```

use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CalcError;

/// Millimeters per inch (exact by definition)
pub const MM_PER_INCH: f64 = 25.4;

// ============================================================================
// Length Units
// ============================================================================

/// Length in millimeters (canonical unit for all calculations)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

/// Length in inches
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inches(pub f64);

impl From<Inches> for Millimeters {
    fn from(inches: Inches) -> Self {
        Millimeters(inches.0 * MM_PER_INCH)
    }
}

impl From<Millimeters> for Inches {
    fn from(mm: Millimeters) -> Self {
        Inches(mm.0 / MM_PER_INCH)
    }
}

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Millimeters);
impl_arithmetic!(Inches);

// ============================================================================
// Unit Tag
// ============================================================================

/// The unit a raw number was entered in, or should be displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LengthUnit {
    #[default]
    #[serde(rename = "mm")]
    Millimeters,
    #[serde(rename = "in")]
    Inches,
}

impl LengthUnit {
    /// All supported units, for menus and help text
    pub const ALL: [LengthUnit; 2] = [LengthUnit::Millimeters, LengthUnit::Inches];

    /// Short symbol used after every displayed value
    pub fn symbol(self) -> &'static str {
        match self {
            LengthUnit::Millimeters => "mm",
            LengthUnit::Inches => "in",
        }
    }

    /// Convert a value in this unit to millimeters.
    pub fn to_mm(self, value: f64) -> Millimeters {
        match self {
            LengthUnit::Millimeters => Millimeters(value),
            LengthUnit::Inches => Inches(value).into(),
        }
    }

    /// Convert millimeters to a value in this unit.
    pub fn from_mm(self, mm: Millimeters) -> f64 {
        match self {
            LengthUnit::Millimeters => mm.0,
            LengthUnit::Inches => Inches::from(mm).0,
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for LengthUnit {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mm" | "millimeter" | "millimeters" | "millimetre" | "millimetres" => {
                Ok(LengthUnit::Millimeters)
            }
            "in" | "inch" | "inches" | "\"" => Ok(LengthUnit::Inches),
            _ => Err(CalcError::invalid_input("units", s, "Units must be 'mm' or 'in'")),
        }
    }
}

// ============================================================================
// Measurement
// ============================================================================

/// A number tagged with the unit it is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub value: f64,
    pub unit: LengthUnit,
}

impl Measurement {
    pub fn new(value: f64, unit: LengthUnit) -> Self {
        Measurement { value, unit }
    }

    pub fn mm(value: f64) -> Self {
        Measurement::new(value, LengthUnit::Millimeters)
    }

    pub fn inches(value: f64) -> Self {
        Measurement::new(value, LengthUnit::Inches)
    }

    /// Canonical millimeter value
    pub fn to_mm(self) -> Millimeters {
        self.unit.to_mm(self.value)
    }

    /// Express a canonical length in `unit`.
    pub fn from_mm(mm: Millimeters, unit: LengthUnit) -> Self {
        Measurement::new(unit.from_mm(mm), unit)
    }

    /// Re-express this measurement in another unit.
    pub fn convert_to(self, unit: LengthUnit) -> Self {
        if unit == self.unit {
            return self;
        }
        Measurement::from_mm(self.to_mm(), unit)
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

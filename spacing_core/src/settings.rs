//! # Calculator Settings
//!
//! User defaults (unit, precision, number style, template options) stored
//! as human-readable JSON.
//!
//! - **Atomic saves**: Write to .tmp, sync, rename to prevent corruption
//! - **Version validation**: Reject files written by an incompatible release
//! - **No silent fallback**: A missing file means defaults; a malformed file is an error
//!
//! ## Example
//!
//! ```rust,no_run
//! use spacing_core::settings::{load_or_default, save_settings, CalculatorSettings};
//! use spacing_core::units::LengthUnit;
//! use std::path::Path;
//!
//! let path = Path::new("settings.json");
//! let mut settings = load_or_default(path)?;
//! settings.default_unit = LengthUnit::Inches;
//! save_settings(&settings, path)?;
//! # Ok::<(), spacing_core::errors::CalcError>(())
//! ```

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::calculations::DEFAULT_PRECISION;
use crate::errors::{CalcError, CalcResult};
use crate::precision::{NumberStyle, MAX_PRECISION};
use crate::template::TemplateSettings;
use crate::units::LengthUnit;

/// Current schema version for settings files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Defaults applied when a value is not given on the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorSettings {
    /// Schema version of the file this was loaded from
    pub version: String,
    pub default_unit: LengthUnit,
    pub default_precision: u32,
    pub number_style: NumberStyle,
    pub template: TemplateSettings,
}

impl Default for CalculatorSettings {
    fn default() -> Self {
        CalculatorSettings {
            version: SCHEMA_VERSION.to_string(),
            default_unit: LengthUnit::Millimeters,
            default_precision: DEFAULT_PRECISION,
            number_style: NumberStyle::Trimmed,
            template: TemplateSettings::default(),
        }
    }
}

impl CalculatorSettings {
    /// Validate settings values.
    pub fn validate(&self) -> CalcResult<()> {
        if self.default_precision > MAX_PRECISION {
            return Err(CalcError::invalid_input(
                "default_precision",
                self.default_precision.to_string(),
                format!("Precision must be between 0 and {}", MAX_PRECISION),
            ));
        }
        if self.template.file_stem.trim().is_empty() {
            return Err(CalcError::invalid_input(
                "template.file_stem",
                self.template.file_stem.clone(),
                "File name must not be empty",
            ));
        }
        self.template.layout.validate()
    }
}

/// Save settings to a file with atomic write semantics.
///
/// 1. Serialize to JSON
/// 2. Write to a temporary file (.tmp)
/// 3. Sync to disk
/// 4. Rename over the target
pub fn save_settings(settings: &CalculatorSettings, path: &Path) -> CalcResult<()> {
    settings.validate()?;

    let json = serde_json::to_string_pretty(settings).map_err(|e| CalcError::SerializationError {
        reason: e.to_string(),
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            CalcError::file_error("create directory", parent.display().to_string(), e.to_string())
        })?;
    }

    let tmp_path = path.with_extension("json.tmp");

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    drop(tmp_file);

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    info!(path = %path.display(), "saved settings");
    Ok(())
}

/// Load settings from a file.
///
/// # Returns
///
/// * `Ok(CalculatorSettings)` - Successfully loaded and validated
/// * `Err(CalcError::VersionMismatch)` - File version is incompatible
/// * `Err(CalcError::SerializationError)` - Invalid JSON
/// * `Err(CalcError::FileError)` - I/O error
pub fn load_settings(path: &Path) -> CalcResult<CalculatorSettings> {
    let mut file = File::open(path).map_err(|e| {
        CalcError::file_error("open", path.display().to_string(), e.to_string())
    })?;

    let mut contents = String::new();
    file.read_to_string(&mut contents).map_err(|e| {
        CalcError::file_error("read", path.display().to_string(), e.to_string())
    })?;

    let settings: CalculatorSettings =
        serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path.display(), e),
        })?;

    validate_version(&settings.version)?;
    settings.validate()?;

    Ok(settings)
}

/// Load settings, or return the defaults when the file does not exist.
pub fn load_or_default(path: &Path) -> CalcResult<CalculatorSettings> {
    if !path.exists() {
        return Ok(CalculatorSettings::default());
    }
    load_settings(path)
}

/// Validate that a file version is compatible with the current schema.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let file_parts: Vec<u32> = file_version
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(mismatch());
    }

    // Major version must match
    if file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }

    // For 0.x versions, a newer minor may carry breaking changes
    if current_parts[0] == 0
        && file_parts.len() > 1
        && current_parts.len() > 1
        && file_parts[1] > current_parts[1]
    {
        return Err(mismatch());
    }

    Ok(())
}

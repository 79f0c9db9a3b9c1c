//! Application configuration.
//!
//! Handles loading, validating, and merging `config.toml`. The file is
//! sparse: stock defaults are the base layer and the user's file overrides
//! only the keys it names. Command-line flags override both.
//!
//! ## Config File Location
//!
//! Pass `--config <file>` explicitly, or drop a `config.toml` in the working
//! directory. Without either, stock defaults apply.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [conversion]
//! baseline_mm = 64.0           # Camera separation in millimeters (> 0)
//! horizontal_fov_deg = 60.0    # Horizontal field of view, strictly within (0, 180)
//! disparity_adjustment = 0.0   # Manual parallax offset
//!
//! [encoder]
//! program = "spatial"          # External encoder executable
//! args = ["make", "-i", "{left}", "-i", "{right}", "-o", "{output}",
//!         "--baseline", "{baseline}", "--hfov", "{fov}", "--hadjust", "{disparity}"]
//!
//! [library]
//! path = "spatial-library"     # Where finished spatial photos are saved
//!
//! [storage]
//! # temp_dir = "/tmp"          # Omit for the platform temp directory
//!
//! [motion]
//! sample_rate_hz = 60          # Tilt sampling rate (1-240)
//!
//! [preview]
//! comparison = "side-by-side"  # side-by-side | vertical | overlay | slide
//! overlay = "motion"           # motion | manual
//! ```
//!
//! Unknown keys are rejected to catch typos early. Out-of-range values are
//! rejected, never clamped.

use crate::convert::ConversionParameters;
use crate::preview::{ComparisonMode, OverlayMode, PreviewState};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Highest accepted motion sampling rate.
pub const MAX_SAMPLE_RATE_HZ: u32 = 240;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("config file not found: {}", .0.display())]
    Missing(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Application configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Default camera geometry for conversions.
    pub conversion: ConversionConfig,
    /// External encoder command.
    pub encoder: EncoderConfig,
    /// Media library location.
    pub library: LibraryConfig,
    /// Temporary file location.
    pub storage: StorageConfig,
    /// Tilt sampling.
    pub motion: MotionConfig,
    /// Initial comparison display.
    pub preview: PreviewConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.conversion
            .parameters()
            .validate()
            .map_err(|e| ConfigError::Validation(format!("conversion: {e}")))?;
        if self.encoder.program.trim().is_empty() {
            return Err(ConfigError::Validation(
                "encoder.program must not be empty".into(),
            ));
        }
        if self.library.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "library.path must not be empty".into(),
            ));
        }
        if !(1..=MAX_SAMPLE_RATE_HZ).contains(&self.motion.sample_rate_hz) {
            return Err(ConfigError::Validation(format!(
                "motion.sample_rate_hz must be 1-{MAX_SAMPLE_RATE_HZ}"
            )));
        }
        Ok(())
    }
}

/// Camera geometry defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConversionConfig {
    pub baseline_mm: f64,
    pub horizontal_fov_deg: f64,
    pub disparity_adjustment: f64,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            baseline_mm: 64.0,
            horizontal_fov_deg: 60.0,
            disparity_adjustment: 0.0,
        }
    }
}

impl ConversionConfig {
    /// Unvalidated parameters; callers validate before encoding.
    pub fn parameters(&self) -> ConversionParameters {
        ConversionParameters {
            baseline_mm: self.baseline_mm,
            horizontal_fov_deg: self.horizontal_fov_deg,
            disparity_adjustment: self.disparity_adjustment,
        }
    }
}

/// External encoder command line.
///
/// `args` are templates; see [`CommandEncoder`](crate::convert::CommandEncoder)
/// for the placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncoderConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            program: "spatial".to_string(),
            args: [
                "make",
                "-i",
                "{left}",
                "-i",
                "{right}",
                "-o",
                "{output}",
                "--baseline",
                "{baseline}",
                "--hfov",
                "{fov}",
                "--hadjust",
                "{disparity}",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LibraryConfig {
    pub path: PathBuf,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("spatial-library"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// When absent, the platform temp directory is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MotionConfig {
    pub sample_rate_hz: u32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: crate::motion::DEFAULT_SAMPLE_RATE_HZ,
        }
    }
}

impl MotionConfig {
    /// Time between attitude samples at the configured rate.
    pub fn interval(&self) -> std::time::Duration {
        crate::motion::sample_interval(self.sample_rate_hz)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewConfig {
    pub comparison: ComparisonMode,
    pub overlay: OverlayMode,
}

impl PreviewConfig {
    pub fn state(&self) -> PreviewState {
        PreviewState::new(self.comparison, self.overlay)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(AppConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AppConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective configuration.
///
/// An explicit `path` must exist. Without one, `config.toml` in the working
/// directory is used when present.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let overlay = match path {
        Some(path) => Some(
            load_raw_config(path)?.ok_or_else(|| ConfigError::Missing(path.to_path_buf()))?,
        ),
        None => load_raw_config(Path::new(CONFIG_FILENAME))?,
    };
    if overlay.is_some() {
        log::debug!("applying config overrides");
    }
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Spatial Photo Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Pass this file with --config, or name it config.toml in the working
# directory. Command-line flags override values set here.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Conversion defaults
# ---------------------------------------------------------------------------
[conversion]
# Distance between the two cameras, in millimeters. Must be positive.
baseline_mm = 64.0

# Horizontal field of view of each view, in degrees.
# Must be strictly between 0 and 180; values outside are rejected.
horizontal_fov_deg = 60.0

# Extra horizontal parallax on top of the geometric disparity.
disparity_adjustment = 0.0

# ---------------------------------------------------------------------------
# External encoder
# ---------------------------------------------------------------------------
[encoder]
# Program that writes the spatial photo container.
program = "spatial"

# Arguments. Placeholders: {left} {right} {output} {baseline} {fov} {disparity}
args = ["make", "-i", "{left}", "-i", "{right}", "-o", "{output}", "--baseline", "{baseline}", "--hfov", "{fov}", "--hadjust", "{disparity}"]

# ---------------------------------------------------------------------------
# Media library
# ---------------------------------------------------------------------------
[library]
# Directory that receives finished spatial photos.
path = "spatial-library"

# ---------------------------------------------------------------------------
# Temporary storage
# ---------------------------------------------------------------------------
[storage]
# Directory for intermediate files. Files are not cleaned up automatically.
# Omit or comment out to use the platform temp directory.
# temp_dir = "/tmp"

# ---------------------------------------------------------------------------
# Motion
# ---------------------------------------------------------------------------
[motion]
# Device tilt sampling rate in Hz (1-240).
sample_rate_hz = 60

# ---------------------------------------------------------------------------
# Preview
# ---------------------------------------------------------------------------
[preview]
# Initial comparison layout: side-by-side | vertical | overlay | slide
comparison = "side-by-side"

# Slide offset source: motion (device tilt) | manual (slider)
overlay = "motion"
"##
}

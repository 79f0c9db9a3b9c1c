//! CLI output formatting for every command.
//!
//! Output leads with the thing inspected (file name or "Tilt"), followed by
//! indented `Label: value` context lines:
//!
//! ```text
//! IMG_0042.HEIC
//!     Format: heic
//!     Extension: heic
//! ```
//!
//! ```text
//! pair.jpg (3840x1080)
//!     Left: 1920x1080 → out/pair-left.png
//!     Right: 1920x1080 → out/pair-right.png
//!     Orientation: up
//!     Preview: Side by side (also Vertical side by side, Overlay, Slide)
//! ```
//!
//! ```text
//! Spatial photo
//!     Baseline: 10 mm
//!     Field of view: 42°
//!     Disparity adjustment: 0
//!     Saved: spatial-library/9f86d081884c7d65.heic
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects. The report structs also
//! serialize to JSON for `--json`.

use crate::convert::{ConversionOutcome, ConversionParameters};
use crate::format::ImageFormat;
use crate::motion::DeviceOrientation;
use crate::orientation::DisplayOrientation;
use crate::preview::ComparisonMode;
use crate::report::Reportable;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn context(label: &str, value: impl std::fmt::Display) -> String {
    format!("{}{}: {}", indent(1), label, value)
}

/// File name for headers, falling back to the whole path.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn kebab<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        _ => String::from("?"),
    }
}

// ============================================================================
// sniff
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SniffReport {
    pub path: PathBuf,
    pub format: ImageFormat,
    pub extension: Option<&'static str>,
}

impl SniffReport {
    pub fn new(path: impl Into<PathBuf>, format: ImageFormat) -> Self {
        Self {
            path: path.into(),
            format,
            extension: format.extension(),
        }
    }
}

pub fn format_sniff(report: &SniffReport) -> Vec<String> {
    vec![
        display_name(&report.path),
        context("Format", report.format),
        context("Extension", report.extension.unwrap_or("none")),
    ]
}

pub fn print_sniff(report: &SniffReport) {
    for line in format_sniff(report) {
        println!("{}", line);
    }
}

// ============================================================================
// orientation
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrientationReport {
    pub path: PathBuf,
    /// Raw EXIF value, `None` when the file has no orientation tag.
    pub exif: Option<u32>,
    pub display: DisplayOrientation,
}

pub fn format_orientation(report: &OrientationReport) -> Vec<String> {
    let exif = match report.exif {
        Some(value) => value.to_string(),
        None => "none".to_string(),
    };
    vec![
        display_name(&report.path),
        context("EXIF orientation", exif),
        context("Display", kebab(&report.display)),
    ]
}

pub fn print_orientation(report: &OrientationReport) {
    for line in format_orientation(report) {
        println!("{}", line);
    }
}

// ============================================================================
// split
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "kebab-case")]
pub enum SplitReport {
    Split {
        source: PathBuf,
        width: u32,
        height: u32,
        left: ViewFile,
        right: ViewFile,
        orientation: DisplayOrientation,
        comparison: ComparisonMode,
    },
    /// Not decodable here; copied for direct display.
    Fallback {
        source: PathBuf,
        format: ImageFormat,
        copy: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewFile {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

pub fn format_split(report: &SplitReport) -> Vec<String> {
    match report {
        SplitReport::Split {
            source,
            width,
            height,
            left,
            right,
            orientation,
            comparison,
        } => vec![
            format!("{} ({}x{})", display_name(source), width, height),
            context(
                "Left",
                format!("{}x{} → {}", left.width, left.height, left.path.display()),
            ),
            context(
                "Right",
                format!("{}x{} → {}", right.width, right.height, right.path.display()),
            ),
            context("Orientation", kebab(orientation)),
            context("Preview", comparison_line(*comparison)),
        ],
        SplitReport::Fallback {
            source,
            format,
            copy,
        } => vec![
            display_name(source),
            context("Format", format),
            context("Not split, shown as is", copy.display()),
        ],
    }
}

/// Current mode followed by what the toolbar would offer instead.
fn comparison_line(mode: ComparisonMode) -> String {
    let others: Vec<_> = mode.alternatives().iter().map(|m| m.label()).collect();
    format!("{} (also {})", mode.label(), others.join(", "))
}

pub fn print_split(report: &SplitReport) {
    for line in format_split(report) {
        println!("{}", line);
    }
}

// ============================================================================
// tilt
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TiltReport {
    pub roll: f64,
    pub pitch: f64,
    pub device: DeviceOrientation,
    pub disparity: f64,
    pub slide_offset: f64,
    pub sample_rate_hz: u32,
}

pub fn format_tilt(report: &TiltReport) -> Vec<String> {
    vec![
        "Tilt".to_string(),
        context("Roll", format!("{:.3} rad", report.roll)),
        context("Pitch", format!("{:.3} rad", report.pitch)),
        context("Device", kebab(&report.device)),
        context("Disparity", format!("{:.3}", report.disparity)),
        context("Slide offset", format!("{:.3}", report.slide_offset)),
        context("Sampling", format!("{} Hz", report.sample_rate_hz)),
    ]
}

pub fn print_tilt(report: &TiltReport) {
    for line in format_tilt(report) {
        println!("{}", line);
    }
}

// ============================================================================
// convert
// ============================================================================

pub fn format_conversion(params: &ConversionParameters, outcome: &ConversionOutcome) -> Vec<String> {
    let mut lines = vec![
        "Spatial photo".to_string(),
        context("Baseline", format!("{} mm", params.baseline_mm)),
        context("Field of view", format!("{}°", params.horizontal_fov_deg)),
        context("Disparity adjustment", params.disparity_adjustment),
    ];
    match outcome {
        ConversionOutcome::Succeeded(path) => lines.push(context("Saved", path.display())),
        ConversionOutcome::Failed(e) => lines.push(context("Failed", e.alert())),
    }
    lines
}

pub fn print_conversion(params: &ConversionParameters, outcome: &ConversionOutcome) {
    for line in format_conversion(params, outcome) {
        println!("{}", line);
    }
}

/// Print any report as pretty JSON.
pub fn print_json<T: Serialize>(report: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{ConversionError, EncoderError};

    #[test]
    fn sniff_lines() {
        let lines = format_sniff(&SniffReport::new("/photos/IMG_0042.HEIC", ImageFormat::Heic));
        assert_eq!(
            lines,
            vec!["IMG_0042.HEIC", "    Format: heic", "    Extension: heic"]
        );
    }

    #[test]
    fn sniff_unknown_has_no_extension() {
        let lines = format_sniff(&SniffReport::new("notes.txt", ImageFormat::Unknown));
        assert_eq!(lines[2], "    Extension: none");
    }

    #[test]
    fn orientation_lines() {
        let lines = format_orientation(&OrientationReport {
            path: "a.jpg".into(),
            exif: Some(6),
            display: DisplayOrientation::Right,
        });
        assert_eq!(lines[1], "    EXIF orientation: 6");
        assert_eq!(lines[2], "    Display: right");

        let lines = format_orientation(&OrientationReport {
            path: "b.png".into(),
            exif: None,
            display: DisplayOrientation::Up,
        });
        assert_eq!(lines[1], "    EXIF orientation: none");
    }

    #[test]
    fn split_lines() {
        let lines = format_split(&SplitReport::Split {
            source: "in/pair.jpg".into(),
            width: 3840,
            height: 1080,
            left: ViewFile {
                path: "out/pair-left.png".into(),
                width: 1920,
                height: 1080,
            },
            right: ViewFile {
                path: "out/pair-right.png".into(),
                width: 1920,
                height: 1080,
            },
            orientation: DisplayOrientation::UpMirrored,
            comparison: ComparisonMode::Overlay,
        });
        assert_eq!(lines[0], "pair.jpg (3840x1080)");
        assert_eq!(lines[1], "    Left: 1920x1080 → out/pair-left.png");
        assert_eq!(lines[3], "    Orientation: up-mirrored");
        assert_eq!(
            lines[4],
            "    Preview: Overlay (also Side by side, Vertical side by side, Slide)"
        );
    }

    #[test]
    fn split_fallback_lines() {
        let lines = format_split(&SplitReport::Fallback {
            source: "x.heic".into(),
            format: ImageFormat::Heic,
            copy: "/tmp/abc.heic".into(),
        });
        assert_eq!(lines[1], "    Format: heic");
        assert!(lines[2].ends_with("/tmp/abc.heic"));
    }

    #[test]
    fn tilt_lines() {
        let lines = format_tilt(&TiltReport {
            roll: 0.0,
            pitch: 0.0,
            device: DeviceOrientation::LandscapeLeft,
            disparity: 0.5,
            slide_offset: 0.1,
            sample_rate_hz: 60,
        });
        assert_eq!(lines[3], "    Device: landscape-left");
        assert_eq!(lines[4], "    Disparity: 0.500");
        assert_eq!(lines[5], "    Slide offset: 0.100");
        assert_eq!(lines[6], "    Sampling: 60 Hz");
    }

    #[test]
    fn conversion_lines() {
        let params = ConversionParameters::new(10.0, 42.0, 0.0).unwrap();
        let lines = format_conversion(&params, &ConversionOutcome::Succeeded("lib/a.heic".into()));
        assert_eq!(lines[1], "    Baseline: 10 mm");
        assert_eq!(lines[2], "    Field of view: 42°");
        assert_eq!(lines[4], "    Saved: lib/a.heic");

        let failed = ConversionOutcome::Failed(ConversionError::EncodingFailed(
            EncoderError::Rejected("bad input".into()),
        ));
        let lines = format_conversion(&params, &failed);
        assert!(lines[4].starts_with("    Failed: "));
        assert!(lines[4].contains("bad input"));
    }

    #[test]
    fn reports_serialize_to_json() {
        let json = serde_json::to_value(SniffReport::new("a.png", ImageFormat::Png)).unwrap();
        assert_eq!(json["format"], "png");
        assert_eq!(json["extension"], "png");

        let json = serde_json::to_value(SplitReport::Fallback {
            source: "x.heic".into(),
            format: ImageFormat::Heic,
            copy: "y.heic".into(),
        })
        .unwrap();
        assert_eq!(json["result"], "fallback");
    }
}

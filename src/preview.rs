//! Comparison display variants for a stereo pair.
//!
//! The renderer draws the same [`StereoPair`](crate::imaging::StereoPair) in
//! one of four ways. This module only describes which one and with what
//! offset; drawing is the renderer's job.
//!
//! | Mode | Layout |
//! |---|---|
//! | `SideBySide` | left and right next to each other |
//! | `Vertical` | left above right |
//! | `Overlay` | right drawn over left, revealed up to a slider fraction |
//! | `Slide` | both drawn shifted apart by the slide offset |
//!
//! In slide mode the offset comes either from device tilt
//! ([`OverlayMode::Motion`]) or from a manual slider
//! ([`OverlayMode::Manual`]). [`MotionPreview`] keeps the tilt side live.

use crate::config::MotionConfig;
use crate::motion::{
    self, AttitudeReader, AttitudeSample, AttitudeSource, DeviceOrientation, disparity,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Centre of the slide offset range.
pub const SLIDE_CENTER: f64 = 0.1;
/// Width of the slide offset range.
pub const SLIDE_SPAN: f64 = 0.2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComparisonMode {
    #[default]
    SideBySide,
    Vertical,
    Overlay,
    Slide,
}

impl ComparisonMode {
    pub const ALL: [ComparisonMode; 4] = [
        ComparisonMode::SideBySide,
        ComparisonMode::Vertical,
        ComparisonMode::Overlay,
        ComparisonMode::Slide,
    ];

    /// The modes a toolbar offers when `self` is showing.
    pub fn alternatives(self) -> [ComparisonMode; 3] {
        match self {
            ComparisonMode::SideBySide => [
                ComparisonMode::Vertical,
                ComparisonMode::Overlay,
                ComparisonMode::Slide,
            ],
            ComparisonMode::Vertical => [
                ComparisonMode::SideBySide,
                ComparisonMode::Overlay,
                ComparisonMode::Slide,
            ],
            ComparisonMode::Overlay => [
                ComparisonMode::SideBySide,
                ComparisonMode::Vertical,
                ComparisonMode::Slide,
            ],
            ComparisonMode::Slide => [
                ComparisonMode::SideBySide,
                ComparisonMode::Vertical,
                ComparisonMode::Overlay,
            ],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ComparisonMode::SideBySide => "Side by side",
            ComparisonMode::Vertical => "Vertical side by side",
            ComparisonMode::Overlay => "Overlay",
            ComparisonMode::Slide => "Slide",
        }
    }
}

/// Where the slide offset comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlayMode {
    #[default]
    Motion,
    Manual,
}

/// Rescale a normalized disparity into the slide offset range `[0, 0.2]`.
///
/// Upright (`0.5`) lands on the centre, `0.1`.
pub fn slide_offset(normalized: f64) -> f64 {
    SLIDE_CENTER + (normalized - 0.5) * SLIDE_SPAN
}

/// Per-screen preview settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PreviewState {
    pub comparison: ComparisonMode,
    pub overlay: OverlayMode,
    /// Manual slider value: reveal fraction in overlay mode, offset in slide mode.
    pub manual_value: f64,
}

impl PreviewState {
    pub fn new(comparison: ComparisonMode, overlay: OverlayMode) -> Self {
        Self {
            comparison,
            overlay,
            manual_value: 0.0,
        }
    }

    /// Offset the slide view should use right now.
    pub fn adjusted_value(&self, sample: AttitudeSample, device: DeviceOrientation) -> f64 {
        match self.overlay {
            OverlayMode::Motion => slide_offset(disparity(sample, device)),
            OverlayMode::Manual => self.manual_value,
        }
    }
}

/// A motion source sampled at the configured rate, read by a screen's preview.
///
/// Must be started inside a Tokio runtime. Dropping it stops the sampler.
#[derive(Debug)]
pub struct MotionPreview {
    reader: AttitudeReader,
    interval: Duration,
    sampler: JoinHandle<()>,
}

impl MotionPreview {
    pub fn start<S: AttitudeSource>(source: S, config: &MotionConfig) -> Self {
        let (publisher, reader) = motion::attitude_channel();
        let sampler = motion::spawn_sampler(source, config.sample_rate_hz, publisher);
        Self {
            reader,
            interval: config.interval(),
            sampler,
        }
    }

    /// Time between samples.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn latest(&self) -> AttitudeSample {
        self.reader.latest()
    }

    /// Wait for the next published sample.
    pub async fn next(&mut self) -> Option<AttitudeSample> {
        self.reader.next().await
    }

    pub fn disparity(&self, device: DeviceOrientation) -> f64 {
        self.reader.disparity(device)
    }

    /// Slide offset for `state` at the latest sample.
    pub fn offset(&self, state: &PreviewState, device: DeviceOrientation) -> f64 {
        state.adjusted_value(self.latest(), device)
    }
}

impl Drop for MotionPreview {
    fn drop(&mut self) {
        self.sampler.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn alternatives_exclude_current_mode() {
        for mode in ComparisonMode::ALL {
            let alts = mode.alternatives();
            assert!(!alts.contains(&mode), "{mode:?} offered itself");
            for other in ComparisonMode::ALL.into_iter().filter(|m| *m != mode) {
                assert!(alts.contains(&other));
            }
        }
    }

    #[test]
    fn default_is_side_by_side_with_motion() {
        let state = PreviewState::default();
        assert_eq!(state.comparison, ComparisonMode::SideBySide);
        assert_eq!(state.overlay, OverlayMode::Motion);
    }

    #[test]
    fn slide_offset_range() {
        assert!((slide_offset(0.0) - 0.0).abs() < 1e-12);
        assert!((slide_offset(0.5) - 0.1).abs() < 1e-12);
        assert!((slide_offset(1.0) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn motion_mode_follows_tilt() {
        let state = PreviewState::new(ComparisonMode::Slide, OverlayMode::Motion);
        let upright = state.adjusted_value(AttitudeSample::default(), DeviceOrientation::Portrait);
        let tilted = state.adjusted_value(
            AttitudeSample::new(FRAC_PI_4, 0.0),
            DeviceOrientation::Portrait,
        );
        assert!((upright - 0.1).abs() < 1e-12);
        assert!((tilted - 0.2).abs() < 1e-12);
    }

    #[test]
    fn manual_mode_ignores_tilt() {
        let mut state = PreviewState::new(ComparisonMode::Slide, OverlayMode::Manual);
        state.manual_value = -0.05;
        let value = state.adjusted_value(
            AttitudeSample::new(FRAC_PI_4, 0.0),
            DeviceOrientation::Portrait,
        );
        assert_eq!(value, -0.05);
    }

    #[test]
    fn labels_are_distinct() {
        assert_eq!(ComparisonMode::SideBySide.label(), "Side by side");
        assert_eq!(ComparisonMode::Vertical.label(), "Vertical side by side");
        let labels: std::collections::HashSet<_> =
            ComparisonMode::ALL.iter().map(|m| m.label()).collect();
        assert_eq!(labels.len(), 4);
    }

    // =========================================================================
    // MotionPreview
    // =========================================================================

    #[tokio::test]
    async fn motion_preview_uses_configured_rate() {
        let config = MotionConfig {
            sample_rate_hz: 120,
        };
        let preview = MotionPreview::start(|| None::<AttitudeSample>, &config);
        assert_eq!(preview.interval(), motion::sample_interval(120));
        assert_eq!(config.interval(), motion::sample_interval(120));
        assert_ne!(preview.interval(), MotionConfig::default().interval());
    }

    #[tokio::test]
    async fn motion_preview_feeds_slide_offset() {
        let config = MotionConfig {
            sample_rate_hz: 240,
        };
        let mut preview =
            MotionPreview::start(|| Some(AttitudeSample::new(FRAC_PI_4, 0.0)), &config);
        let sample = tokio::time::timeout(Duration::from_secs(5), preview.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sample, AttitudeSample::new(FRAC_PI_4, 0.0));

        let motion = PreviewState::new(ComparisonMode::Slide, OverlayMode::Motion);
        let offset = preview.offset(&motion, DeviceOrientation::Portrait);
        assert!((offset - 0.2).abs() < 1e-12);
        assert!((preview.disparity(DeviceOrientation::LandscapeLeft) - 0.5).abs() < 1e-12);

        let mut manual = PreviewState::new(ComparisonMode::Slide, OverlayMode::Manual);
        manual.manual_value = 0.03;
        assert_eq!(preview.offset(&manual, DeviceOrientation::Portrait), 0.03);
    }

    #[test]
    fn modes_parse_from_kebab_case() {
        let mode: ComparisonMode = serde_json::from_str("\"side-by-side\"").unwrap();
        assert_eq!(mode, ComparisonMode::SideBySide);
        let overlay: OverlayMode = serde_json::from_str("\"manual\"").unwrap();
        assert_eq!(overlay, OverlayMode::Manual);
    }
}

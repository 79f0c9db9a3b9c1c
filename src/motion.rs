//! Device tilt to parallax preview offset.
//!
//! The slide preview nudges the two views apart as the device tilts, giving
//! a quick feel for the pair's depth without a stereo display. Tilt comes in
//! as an [`AttitudeSample`] (roll and pitch, radians) and leaves as a
//! normalized disparity in `[0, 1]`:
//!
//! ```text
//! axis  = roll   (portrait, upside-down, unknown)
//!         pitch  (landscape left/right)
//! value = clamp((axis + π/4) / (π/2), 0, 1)
//! ```
//!
//! A ±45° window maps linearly onto `[0, 1]`; beyond it the value saturates.
//! Upright (`axis = 0`) is exactly `0.5`.
//!
//! ## Publishing samples
//!
//! A motion source writes samples at a fixed rate and any number of readers
//! look at the latest one. [`attitude_channel`] builds that as a
//! `tokio::sync::watch` channel: one [`AttitudePublisher`], cloneable
//! [`AttitudeReader`]s. Each sample is published whole, so a reader never sees
//! the roll of one sample with the pitch of another, and reading never waits.

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Disparity reported for an upright device or an unusable reading.
pub const NEUTRAL_DISPARITY: f64 = 0.5;

/// Default motion sampling rate.
pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 60;

/// Device attitude in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttitudeSample {
    pub roll: f64,
    pub pitch: f64,
}

impl AttitudeSample {
    pub fn new(roll: f64, pitch: f64) -> Self {
        Self { roll, pitch }
    }
}

/// How the device is currently held, as reported by the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceOrientation {
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
    #[default]
    Unknown,
}

impl DeviceOrientation {
    pub fn is_landscape(self) -> bool {
        matches!(
            self,
            DeviceOrientation::LandscapeLeft | DeviceOrientation::LandscapeRight
        )
    }
}

/// The attitude component that tracks left/right tilt for this orientation.
pub fn axis_value(sample: AttitudeSample, device: DeviceOrientation) -> f64 {
    if device.is_landscape() {
        sample.pitch
    } else {
        sample.roll
    }
}

/// Normalize a tilt angle onto `[0, 1]` over a ±π/4 window.
pub fn normalize_tilt(angle: f64) -> f64 {
    if angle.is_nan() {
        return NEUTRAL_DISPARITY;
    }
    ((angle + FRAC_PI_4) / FRAC_PI_2).clamp(0.0, 1.0)
}

/// Normalized disparity for the current attitude and device orientation.
pub fn disparity(sample: AttitudeSample, device: DeviceOrientation) -> f64 {
    normalize_tilt(axis_value(sample, device))
}

// =============================================================================
// Attitude channel
// =============================================================================

/// Writing end of the attitude channel. There is exactly one.
#[derive(Debug)]
pub struct AttitudePublisher {
    tx: watch::Sender<AttitudeSample>,
}

/// Reading end of the attitude channel.
#[derive(Debug, Clone)]
pub struct AttitudeReader {
    rx: watch::Receiver<AttitudeSample>,
}

/// Create a channel whose readers start at the upright sample.
pub fn attitude_channel() -> (AttitudePublisher, AttitudeReader) {
    let (tx, rx) = watch::channel(AttitudeSample::default());
    (AttitudePublisher { tx }, AttitudeReader { rx })
}

impl AttitudePublisher {
    /// Replace the current sample. Last writer wins.
    pub fn publish(&self, sample: AttitudeSample) {
        self.tx.send_replace(sample);
    }

    /// True once every reader has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    pub fn subscribe(&self) -> AttitudeReader {
        AttitudeReader {
            rx: self.tx.subscribe(),
        }
    }
}

impl AttitudeReader {
    /// The most recently published sample. Never blocks.
    pub fn latest(&self) -> AttitudeSample {
        *self.rx.borrow()
    }

    /// Disparity for the most recent sample.
    pub fn disparity(&self, device: DeviceOrientation) -> f64 {
        disparity(self.latest(), device)
    }

    /// Wait for a sample newer than the last one seen by this reader.
    ///
    /// Returns `None` once the publisher is gone.
    pub async fn next(&mut self) -> Option<AttitudeSample> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}

/// Anything that can report the device's current attitude.
pub trait AttitudeSource: Send + 'static {
    /// Current attitude, or `None` when no reading is available this tick.
    fn sample(&mut self) -> Option<AttitudeSample>;
}

impl<F> AttitudeSource for F
where
    F: FnMut() -> Option<AttitudeSample> + Send + 'static,
{
    fn sample(&mut self) -> Option<AttitudeSample> {
        self()
    }
}

/// Interval between samples for a rate in hertz (clamped to at least 1 Hz).
pub fn sample_interval(rate_hz: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(rate_hz.max(1)))
}

/// Poll `source` at a fixed rate and publish each reading.
///
/// Ticks with no reading are skipped. The task ends when every reader has
/// been dropped, so tearing down the preview stops sampling.
pub fn spawn_sampler<S: AttitudeSource>(
    mut source: S,
    rate_hz: u32,
    publisher: AttitudePublisher,
) -> JoinHandle<()> {
    let period = sample_interval(rate_hz);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        log::debug!("motion sampler started at {rate_hz} Hz");
        while !publisher.is_closed() {
            ticker.tick().await;
            if let Some(sample) = source.sample() {
                publisher.publish(sample);
            }
        }
        log::debug!("motion sampler stopped: no readers left");
    })
}

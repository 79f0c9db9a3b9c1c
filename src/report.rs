//! User-facing failure reports.
//!
//! Errors that a person should see implement [`Reportable`], which turns
//! them into an [`Alert`]. Alerts go to exactly one [`ReportSink`]; the CLI
//! uses [`LogSink`], an embedding UI would show a dialog instead.

use crate::convert::{ConversionError, ConversionOutcome};
use crate::format::FormatError;
use crate::imaging::SplitError;
use crate::session::LoadError;
use std::fmt;

/// Message shown when a picked payload is none of the supported formats.
pub const UNSUPPORTED_FORMAT_MESSAGE: &str =
    "Unsupported image format. Please select a JPEG, PNG, GIF or HEIC image.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

pub trait Reportable {
    fn alert(&self) -> Alert;
}

impl Reportable for FormatError {
    fn alert(&self) -> Alert {
        Alert::new("Unsupported image", UNSUPPORTED_FORMAT_MESSAGE)
    }
}

impl Reportable for SplitError {
    fn alert(&self) -> Alert {
        match self {
            SplitError::CropFailed { width, height, .. } => Alert::new(
                "Cannot split this image",
                format!("A {width}x{height} image is too small to hold a left and a right view."),
            ),
        }
    }
}

impl Reportable for ConversionError {
    fn alert(&self) -> Alert {
        match self {
            ConversionError::InvalidParameters(e) => Alert::new("Invalid settings", e.to_string()),
            ConversionError::SourceUnreadable { eye, reason } => {
                Alert::new(format!("Cannot read the {eye} image"), reason.clone())
            }
            ConversionError::UnknownFormat { .. } => {
                Alert::new("Unsupported image", UNSUPPORTED_FORMAT_MESSAGE)
            }
            ConversionError::EncodingFailed(e) => {
                Alert::new("Spatial photo conversion failed", e.to_string())
            }
            ConversionError::PersistenceFailed { output, source } => Alert::new(
                "Spatial photo not saved",
                format!(
                    "The spatial photo was created at {} but could not be saved to the library: {source}",
                    output.display()
                ),
            ),
            ConversionError::Interrupted(reason) => {
                Alert::new("Conversion interrupted", reason.clone())
            }
        }
    }
}

impl Reportable for LoadError {
    fn alert(&self) -> Alert {
        match self {
            LoadError::Format(e) => e.alert(),
            LoadError::Split(e) => e.alert(),
            other => Alert::new("Cannot open this image", other.to_string()),
        }
    }
}

/// Terminal destination for alerts.
pub trait ReportSink {
    fn report(&self, alert: Alert);
}

/// Routes alerts to the `log` facade at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn report(&self, alert: Alert) {
        log::error!("{}: {}", alert.title, alert.message);
    }
}

/// Report `error` to `sink` and hand it back unchanged.
pub fn report<E: Reportable>(sink: &impl ReportSink, error: E) -> E {
    sink.report(error.alert());
    error
}

/// Send a failed outcome to `sink`. Success is not an alert.
pub fn report_outcome(sink: &impl ReportSink, outcome: &ConversionOutcome) {
    if let ConversionOutcome::Failed(e) = outcome {
        sink.report(e.alert());
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::convert::{EncoderError, LibraryError};
    use crate::imaging::{CropError, CropRect, Eye};
    use std::sync::Mutex;

    /// Sink that keeps every alert.
    #[derive(Default)]
    pub struct RecordingSink {
        pub alerts: Mutex<Vec<Alert>>,
    }

    impl RecordingSink {
        pub fn get_alerts(&self) -> Vec<Alert> {
            self.alerts.lock().unwrap().clone()
        }
    }

    impl ReportSink for RecordingSink {
        fn report(&self, alert: Alert) {
            self.alerts.lock().unwrap().push(alert);
        }
    }

    #[test]
    fn crop_failure_says_cannot_split() {
        let err = SplitError::CropFailed {
            width: 1,
            height: 4,
            source: CropError::Empty(CropRect::new(0, 0, 0, 4)),
        };
        assert_eq!(err.alert().title, "Cannot split this image");
    }

    #[test]
    fn unknown_format_uses_fixed_wording() {
        assert_eq!(FormatError::UnknownFormat.alert().message, UNSUPPORTED_FORMAT_MESSAGE);
        let err = ConversionError::UnknownFormat {
            eye: Eye::Left,
            source: FormatError::UnknownFormat,
        };
        assert_eq!(err.alert().message, UNSUPPORTED_FORMAT_MESSAGE);
    }

    #[test]
    fn encoding_failure_carries_encoder_message() {
        let err = ConversionError::EncodingFailed(EncoderError::Rejected(
            "left and right sizes differ".into(),
        ));
        assert!(err.alert().message.contains("left and right sizes differ"));
    }

    #[test]
    fn persistence_failure_says_produced_not_saved() {
        let err = ConversionError::PersistenceFailed {
            output: "/tmp/out.heic".into(),
            source: LibraryError::Rejected("denied".into()),
        };
        let alert = err.alert();
        assert_eq!(alert.title, "Spatial photo not saved");
        assert!(alert.message.contains("/tmp/out.heic"));
        assert!(alert.message.contains("denied"));
    }

    #[test]
    fn outcomes_only_report_failures() {
        let sink = RecordingSink::default();
        report_outcome(&sink, &ConversionOutcome::Succeeded("x.heic".into()));
        assert!(sink.get_alerts().is_empty());

        report_outcome(
            &sink,
            &ConversionOutcome::Failed(ConversionError::Interrupted("cancelled".into())),
        );
        assert_eq!(sink.get_alerts().len(), 1);
    }

    #[test]
    fn report_returns_error() {
        let sink = RecordingSink::default();
        let err = report(&sink, FormatError::UnknownFormat);
        assert_eq!(err, FormatError::UnknownFormat);
        assert_eq!(sink.get_alerts()[0].title, "Unsupported image");
    }
}

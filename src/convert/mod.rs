//! Spatial photo conversion.
//!
//! A conversion takes two views and three camera-geometry numbers and asks
//! an external encoder to bundle them into one spatial photo, which is then
//! saved to the media library:
//!
//! ```text
//! left  ─┐                      ┌──────────┐      ┌─────────┐
//!        ├─ resolve → files ───▶│ encoder  │─────▶│ library │──▶ outcome
//! right ─┘   (temp store)       └──────────┘      └─────────┘
//! ```
//!
//! Encoding and saving are separate steps with separate failure kinds: a
//! [`ConversionErrorKind::PersistenceFailed`] means the spatial photo exists
//! on disk but is not in the library. Nothing is retried; the caller decides.
//!
//! The module is split into:
//! - **Parameters, sources, outcomes**: this file
//! - **Encoder**: [`SpatialEncoder`] trait + [`CommandEncoder`]
//! - **Library**: [`MediaLibrary`] trait + [`DirectoryLibrary`]
//! - **Request**: [`ConversionRequest`], the async orchestration

pub mod encoder;
pub mod library;
pub mod request;

pub use encoder::{CommandEncoder, EncodeJob, EncoderError, SpatialEncoder};
pub use library::{DirectoryLibrary, LibraryError, MediaLibrary};
pub use request::{ConversionRequest, ConversionTask};

use crate::format::{self, FormatError, ImageFormat};
use crate::imaging::{Eye, RasterImage};
use crate::temp::{TempError, TempStore};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("baseline must be a positive number of millimeters, got {0}")]
    Baseline(f64),
    #[error("horizontal field of view must be strictly between 0 and 180 degrees, got {0}")]
    FieldOfView(f64),
    #[error("disparity adjustment must be a finite number, got {0}")]
    Disparity(f64),
}

/// Camera geometry handed to the encoder.
///
/// Out-of-range values are rejected, never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversionParameters {
    /// Simulated inter-camera distance in millimeters.
    pub baseline_mm: f64,
    /// Horizontal field of view in degrees, in `(0, 180)`.
    pub horizontal_fov_deg: f64,
    /// Manual parallax offset on top of the geometric disparity.
    pub disparity_adjustment: f64,
}

impl ConversionParameters {
    pub fn new(
        baseline_mm: f64,
        horizontal_fov_deg: f64,
        disparity_adjustment: f64,
    ) -> Result<Self, ParameterError> {
        let params = Self {
            baseline_mm,
            horizontal_fov_deg,
            disparity_adjustment,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        if !(self.baseline_mm.is_finite() && self.baseline_mm > 0.0) {
            return Err(ParameterError::Baseline(self.baseline_mm));
        }
        if !(self.horizontal_fov_deg > 0.0 && self.horizontal_fov_deg < 180.0) {
            return Err(ParameterError::FieldOfView(self.horizontal_fov_deg));
        }
        if !self.disparity_adjustment.is_finite() {
            return Err(ParameterError::Disparity(self.disparity_adjustment));
        }
        Ok(())
    }
}

/// Where one view of the pair comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Raw picker payload, format unknown until sniffed.
    Bytes(Vec<u8>),
    /// An image file already on disk; handed to the encoder as is.
    File(PathBuf),
    /// Decoded pixels, e.g. one half of a split frame. Written out as PNG.
    Raster(RasterImage),
}

impl ImageSource {
    /// Turn the source into a file the encoder can open.
    ///
    /// Checks that the content is a known format and, for formats the
    /// bundled decoders understand, that its header actually decodes.
    pub async fn resolve(&self, eye: Eye, store: &TempStore) -> Result<PathBuf, ConversionError> {
        let unreadable = |reason: String| ConversionError::SourceUnreadable { eye, reason };
        match self {
            ImageSource::Bytes(bytes) => {
                check_decodable(bytes).map_err(|e| e.for_eye(eye))?;
                store
                    .materialize_async(bytes)
                    .await
                    .map_err(|e| ConversionError::from_temp(eye, e))
            }
            ImageSource::File(path) => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|e| unreadable(format!("{}: {e}", path.display())))?;
                check_decodable(&bytes).map_err(|e| e.for_eye(eye))?;
                Ok(path.clone())
            }
            ImageSource::Raster(raster) => {
                let png = raster.to_png_bytes().map_err(|e| unreadable(e.to_string()))?;
                store
                    .materialize_async(&png)
                    .await
                    .map_err(|e| ConversionError::from_temp(eye, e))
            }
        }
    }
}

/// Pre-resolution failure, before we know which eye it belongs to.
enum SourceCheck {
    Unknown,
    Undecodable(String),
}

impl SourceCheck {
    fn for_eye(self, eye: Eye) -> ConversionError {
        match self {
            SourceCheck::Unknown => ConversionError::UnknownFormat {
                eye,
                source: FormatError::UnknownFormat,
            },
            SourceCheck::Undecodable(reason) => ConversionError::SourceUnreadable { eye, reason },
        }
    }
}

fn check_decodable(bytes: &[u8]) -> Result<ImageFormat, SourceCheck> {
    let format = format::classify(bytes);
    if format == ImageFormat::Unknown {
        return Err(SourceCheck::Unknown);
    }
    if format.is_decodable() {
        image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| SourceCheck::Undecodable(e.to_string()))?
            .into_dimensions()
            .map_err(|e| SourceCheck::Undecodable(e.to_string()))?;
    }
    Ok(format)
}

/// Coarse error category, for callers that branch on the kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionErrorKind {
    InvalidParameters,
    InvalidSource,
    UnknownFormat,
    EncodingFailed,
    PersistenceFailed,
    Interrupted,
}

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("invalid conversion parameters: {0}")]
    InvalidParameters(#[from] ParameterError),
    #[error("{eye} image is not usable: {reason}")]
    SourceUnreadable { eye: Eye, reason: String },
    #[error("{eye} image: {source}")]
    UnknownFormat {
        eye: Eye,
        #[source]
        source: FormatError,
    },
    #[error("encoding failed: {0}")]
    EncodingFailed(#[source] EncoderError),
    #[error("spatial photo was created at {} but could not be saved: {source}", .output.display())]
    PersistenceFailed {
        output: PathBuf,
        #[source]
        source: LibraryError,
    },
    #[error("conversion was interrupted: {0}")]
    Interrupted(String),
}

impl ConversionError {
    pub fn kind(&self) -> ConversionErrorKind {
        match self {
            ConversionError::InvalidParameters(_) => ConversionErrorKind::InvalidParameters,
            ConversionError::SourceUnreadable { .. } => ConversionErrorKind::InvalidSource,
            ConversionError::UnknownFormat { .. } => ConversionErrorKind::UnknownFormat,
            ConversionError::EncodingFailed(_) => ConversionErrorKind::EncodingFailed,
            ConversionError::PersistenceFailed { .. } => ConversionErrorKind::PersistenceFailed,
            ConversionError::Interrupted(_) => ConversionErrorKind::Interrupted,
        }
    }

    fn from_temp(eye: Eye, error: TempError) -> Self {
        match error {
            TempError::Format(source) => ConversionError::UnknownFormat { eye, source },
            TempError::Io(e) => ConversionError::SourceUnreadable {
                eye,
                reason: format!("could not write temporary file: {e}"),
            },
        }
    }
}

/// Terminal result of a conversion.
#[derive(Debug)]
pub enum ConversionOutcome {
    /// Encoded and saved; the spatial photo is at this location.
    Succeeded(PathBuf),
    Failed(ConversionError),
}

impl ConversionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionOutcome::Succeeded(_))
    }

    /// Kind of failure, `None` on success.
    pub fn error_kind(&self) -> Option<ConversionErrorKind> {
        match self {
            ConversionOutcome::Succeeded(_) => None,
            ConversionOutcome::Failed(e) => Some(e.kind()),
        }
    }

    pub fn into_result(self) -> Result<PathBuf, ConversionError> {
        match self {
            ConversionOutcome::Succeeded(path) => Ok(path),
            ConversionOutcome::Failed(e) => Err(e),
        }
    }
}

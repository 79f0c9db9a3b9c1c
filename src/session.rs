//! Per-screen state.
//!
//! Two screens share the core:
//!
//! - [`SplitScreen`] inspects one combined side-by-side photo. It keeps the
//!   split pair, or a file the renderer can show directly when the payload
//!   cannot be decoded here.
//! - [`GenerateScreen`] builds a spatial photo from two separately picked
//!   images. Each slot is loaded and replaced on its own.
//!
//! Both hold only what the screen shows. Sniffing, orientation and splitting
//! are delegated to [`format`](crate::format),
//! [`orientation`](crate::orientation) and [`imaging`](crate::imaging).

use crate::convert::{ConversionParameters, ConversionRequest, ImageSource};
use crate::format::{self, FormatError, ImageFormat};
use crate::imaging::{self, Eye, RasterError, RasterImage, SplitError, StereoPair};
use crate::orientation::{self, DisplayOrientation};
use crate::preview::PreviewState;
use crate::report::{self, ReportSink};
use crate::temp::{TempError, TempStore};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("could not decode image: {0}")]
    Decode(#[from] RasterError),
    #[error(transparent)]
    Split(#[from] SplitError),
    #[error("could not store image: {0}")]
    Temp(#[from] TempError),
    #[error("image loading was interrupted: {0}")]
    Interrupted(String),
}

/// What the split screen displays.
#[derive(Debug, Clone)]
pub enum SplitView {
    Pair(StereoPair),
    /// Not decodable here; the renderer opens the file itself.
    Fallback { path: PathBuf, format: ImageFormat },
}

/// Decide how to show `bytes` on the split screen.
///
/// Decodable formats are split, with their orientation attached. Formats
/// decoded elsewhere (HEIC) are written to `store`. A corrupt payload in a
/// decodable format, or one too narrow to split, is an error.
pub fn prepare_split_view(bytes: &[u8], store: &TempStore) -> Result<SplitView, LoadError> {
    let format = format::classify(bytes);
    if format == ImageFormat::Unknown {
        return Err(FormatError::UnknownFormat.into());
    }

    if !format.is_decodable() {
        log::debug!("{format} is not decoded here, showing the file directly");
        let path = store.materialize(bytes)?;
        return Ok(SplitView::Fallback { path, format });
    }

    let raster = RasterImage::decode(bytes)?;
    let orientation = orientation::display_orientation_of(bytes);
    let pair = imaging::split(&raster)?.with_orientation(orientation);
    Ok(SplitView::Pair(pair))
}

#[derive(Debug, Clone, Default)]
pub struct SplitScreen {
    pub preview: PreviewState,
    view: Option<SplitView>,
}

impl SplitScreen {
    pub fn new(preview: PreviewState) -> Self {
        Self {
            preview,
            view: None,
        }
    }

    pub fn view(&self) -> Option<&SplitView> {
        self.view.as_ref()
    }

    pub fn pair(&self) -> Option<&StereoPair> {
        match &self.view {
            Some(SplitView::Pair(pair)) => Some(pair),
            _ => None,
        }
    }

    /// Load a picked payload off the async runtime's worker threads.
    ///
    /// On failure the previous view is cleared and the error is reported to
    /// `sink` before being returned.
    pub async fn load(
        &mut self,
        bytes: Vec<u8>,
        store: &TempStore,
        sink: &impl ReportSink,
    ) -> Result<&SplitView, LoadError> {
        self.view = None;
        let store = store.clone();
        let view = tokio::task::spawn_blocking(move || prepare_split_view(&bytes, &store))
            .await
            .map_err(|e| LoadError::Interrupted(e.to_string()))
            .and_then(|result| result)
            .map_err(|e| report::report(sink, e))?;
        Ok(self.view.insert(view))
    }

    /// Conversion request for the loaded pair; `None` without a pair.
    pub fn conversion_request(&self, params: ConversionParameters) -> Option<ConversionRequest> {
        let pair = self.pair()?;
        Some(ConversionRequest::new(
            ImageSource::Raster(pair.left.clone()),
            ImageSource::Raster(pair.right.clone()),
            params,
        ))
    }
}

/// One picked image on the generate screen.
#[derive(Debug, Clone)]
pub struct PickedImage {
    pub format: ImageFormat,
    /// Decoded pixels for the preview; `None` for formats decoded elsewhere.
    pub raster: Option<RasterImage>,
    /// `None` when the image carries no orientation tag.
    pub orientation: Option<DisplayOrientation>,
    /// The original payload, handed to the encoder untouched.
    pub bytes: Vec<u8>,
}

impl PickedImage {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, LoadError> {
        let format = format::classify(&bytes);
        if format == ImageFormat::Unknown {
            return Err(FormatError::UnknownFormat.into());
        }
        let raster = if format.is_decodable() {
            Some(RasterImage::decode(&bytes)?)
        } else {
            None
        };
        let orientation = match orientation::read_codec_orientation(&bytes) {
            Ok(codec) => codec.map(|c| orientation::to_display(Some(c))),
            Err(e) => {
                log::warn!("ignoring orientation tag: {e}");
                None
            }
        };
        Ok(Self {
            format,
            raster,
            orientation,
            bytes,
        })
    }

    pub fn display_orientation(&self) -> DisplayOrientation {
        self.orientation.unwrap_or_default()
    }
}

/// Decode a picked payload on the blocking pool.
pub async fn load_picked(bytes: Vec<u8>) -> Result<PickedImage, LoadError> {
    tokio::task::spawn_blocking(move || PickedImage::from_bytes(bytes))
        .await
        .map_err(|e| LoadError::Interrupted(e.to_string()))?
}

#[derive(Debug, Clone)]
pub struct GenerateScreen {
    pub params: ConversionParameters,
    pub preview: PreviewState,
    left: Option<PickedImage>,
    right: Option<PickedImage>,
}

impl GenerateScreen {
    pub fn new(params: ConversionParameters, preview: PreviewState) -> Self {
        Self {
            params,
            preview,
            left: None,
            right: None,
        }
    }

    pub fn slot(&self, eye: Eye) -> Option<&PickedImage> {
        match eye {
            Eye::Left => self.left.as_ref(),
            Eye::Right => self.right.as_ref(),
        }
    }

    pub fn set(&mut self, eye: Eye, picked: PickedImage) {
        log::debug!("{eye} slot: {} ({} bytes)", picked.format, picked.bytes.len());
        *self.slot_mut(eye) = Some(picked);
    }

    pub fn clear(&mut self, eye: Eye) {
        *self.slot_mut(eye) = None;
    }

    fn slot_mut(&mut self, eye: Eye) -> &mut Option<PickedImage> {
        match eye {
            Eye::Left => &mut self.left,
            Eye::Right => &mut self.right,
        }
    }

    /// Load `bytes` into one slot. A failure leaves that slot as it was.
    pub async fn pick(
        &mut self,
        eye: Eye,
        bytes: Vec<u8>,
        sink: &impl ReportSink,
    ) -> Result<(), LoadError> {
        let picked = load_picked(bytes).await.map_err(|e| report::report(sink, e))?;
        self.set(eye, picked);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    /// Conversion request from both slots; `None` until both are picked.
    pub fn request(&self) -> Option<ConversionRequest> {
        let (left, right) = (self.left.as_ref()?, self.right.as_ref()?);
        Some(ConversionRequest::new(
            ImageSource::Bytes(left.bytes.clone()),
            ImageSource::Bytes(right.bytes.clone()),
            self.params,
        ))
    }
}

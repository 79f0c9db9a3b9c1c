//! One conversion, from two sources to a saved spatial photo.
//!
//! [`ConversionRequest::convert`] runs the whole pipeline on the caller's
//! task. [`ConversionRequest::spawn`] runs it on the runtime and hands back a
//! [`ConversionTask`]; dropping the task lets the conversion finish in the
//! background, [`ConversionTask::abort`] stops it.
//!
//! Every failure ends up in the returned [`ConversionOutcome`]. There is no
//! retry and no partial cleanup: a file the encoder already produced stays
//! where it is.

use super::{
    ConversionError, ConversionOutcome, ConversionParameters, EncodeJob, ImageSource,
    MediaLibrary, SpatialEncoder,
};
use crate::imaging::Eye;
use crate::temp::TempStore;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Extension for spatial photos written to the temp store.
const OUTPUT_EXTENSION: &str = "heic";

#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub left: ImageSource,
    pub right: ImageSource,
    pub params: ConversionParameters,
    /// Where the encoder writes; a fresh temp file when `None`.
    pub destination: Option<PathBuf>,
}

impl ConversionRequest {
    pub fn new(left: ImageSource, right: ImageSource, params: ConversionParameters) -> Self {
        Self {
            left,
            right,
            params,
            destination: None,
        }
    }

    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Encode and save. The library is only consulted after a successful encode.
    pub async fn convert<E, L>(self, encoder: &E, library: &L, store: &TempStore) -> ConversionOutcome
    where
        E: SpatialEncoder,
        L: MediaLibrary,
    {
        match self.run(encoder, library, store).await {
            Ok(saved) => {
                log::info!("spatial photo saved: {}", saved.display());
                ConversionOutcome::Succeeded(saved)
            }
            Err(e) => {
                log::warn!("conversion failed: {e}");
                ConversionOutcome::Failed(e)
            }
        }
    }

    async fn run<E, L>(self, encoder: &E, library: &L, store: &TempStore) -> Result<PathBuf, ConversionError>
    where
        E: SpatialEncoder,
        L: MediaLibrary,
    {
        self.params.validate()?;

        let (left, right) = tokio::join!(
            self.left.resolve(Eye::Left, store),
            self.right.resolve(Eye::Right, store),
        );
        let (left, right) = (left?, right?);

        let output = match self.destination {
            Some(path) => path,
            None => store.unique_path(OUTPUT_EXTENSION),
        };
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ConversionError::EncodingFailed(super::EncoderError::Rejected(format!(
                    "cannot create {}: {e}",
                    parent.display()
                )))
            })?;
        }

        let job = EncodeJob {
            left,
            right,
            output,
            params: self.params,
        };
        log::info!(
            "encoding {} + {} (baseline {} mm, hfov {}°, adjustment {})",
            job.left.display(),
            job.right.display(),
            job.params.baseline_mm,
            job.params.horizontal_fov_deg,
            job.params.disparity_adjustment
        );
        encoder
            .encode(&job)
            .await
            .map_err(ConversionError::EncodingFailed)?;

        library
            .save(&job.output)
            .await
            .map_err(|source| ConversionError::PersistenceFailed {
                output: job.output.clone(),
                source,
            })
    }

    /// Run [`convert`](Self::convert) on the tokio runtime.
    pub fn spawn<E, L>(self, encoder: Arc<E>, library: Arc<L>, store: TempStore) -> ConversionTask
    where
        E: SpatialEncoder + 'static,
        L: MediaLibrary + 'static,
    {
        let handle = tokio::spawn(async move {
            self.convert(encoder.as_ref(), library.as_ref(), &store)
                .await
        });
        ConversionTask { handle }
    }
}

/// Handle to a conversion running on the runtime.
#[derive(Debug)]
pub struct ConversionTask {
    handle: JoinHandle<ConversionOutcome>,
}

impl ConversionTask {
    /// Wait for the outcome. Aborted or panicked tasks become `Interrupted`.
    pub async fn outcome(self) -> ConversionOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => {
                ConversionOutcome::Failed(ConversionError::Interrupted("cancelled".into()))
            }
            Err(e) => ConversionOutcome::Failed(ConversionError::Interrupted(e.to_string())),
        }
    }

    pub fn abort(&self) {
        self.handle.abort();
    }
}

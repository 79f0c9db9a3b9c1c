//! Temporary materialization of byte buffers.
//!
//! The external encoder and the fallback viewer both want files, while
//! pickers hand over bytes. [`TempStore`] writes a buffer into a directory
//! under a fresh UUID, with the extension chosen by
//! [`format::extension_for`](crate::format::extension_for):
//!
//! ```text
//! <dir>/3f0c9a4e-6c1d-4f7b-9a55-0e3c2b9f1d2a.heic
//! ```
//!
//! Buffers whose format cannot be identified are refused before anything is
//! written. Files are never removed by this module; callers that care about
//! disk usage must clean up after themselves.

use crate::format::{self, FormatError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum TempError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// A directory that receives uniquely named temporary files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempStore {
    dir: PathBuf,
}

impl TempStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at a directory, or the platform temp dir when `None`.
    pub fn from_config(dir: Option<&Path>) -> Self {
        match dir {
            Some(dir) => Self::new(dir),
            None => Self::new(std::env::temp_dir()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// A fresh path with the given extension. Nothing is created.
    pub fn unique_path(&self, extension: &str) -> PathBuf {
        self.dir
            .join(Uuid::new_v4().to_string())
            .with_extension(extension)
    }

    /// Write `bytes` to a new file named after their detected format.
    pub fn materialize(&self, bytes: &[u8]) -> Result<PathBuf, TempError> {
        let extension = format::extension_for(bytes)?;
        let path = self.unique_path(extension);
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(&path, bytes)?;
        log::debug!("materialized {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }

    /// Async variant of [`materialize`](Self::materialize) for use inside tasks.
    pub async fn materialize_async(&self, bytes: &[u8]) -> Result<PathBuf, TempError> {
        let extension = format::extension_for(bytes)?;
        let path = self.unique_path(extension);
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, bytes).await?;
        log::debug!("materialized {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}

impl Default for TempStore {
    fn default() -> Self {
        Self::from_config(None)
    }
}

//! Destination for finished spatial photos.
//!
//! [`DirectoryLibrary`] is a content-addressed folder: each saved file is
//! named after the SHA-256 of its contents, so saving the same photo twice
//! keeps one copy.
//!
//! ```text
//! spatial-library/
//! ├── 9f86d081884c7d65.heic
//! └── 2c26b46b68ffc68f.heic
//! ```

use sha2::{Digest, Sha256};
use std::future::Future;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Hex digits of the content hash kept in library file names.
const NAME_HASH_LEN: usize = 16;

/// Extension used when the produced file has none.
const DEFAULT_EXTENSION: &str = "heic";

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("library refused the file: {0}")]
    Rejected(String),
}

/// Somewhere a finished spatial photo can be saved.
pub trait MediaLibrary: Send + Sync {
    /// Save `file` and return where the library keeps it.
    fn save(&self, file: &Path) -> impl Future<Output = Result<PathBuf, LibraryError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryLibrary {
    root: PathBuf,
}

impl DirectoryLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Library file name for `bytes` originally stored at `source`.
    pub fn entry_name(source: &Path, bytes: &[u8]) -> String {
        let digest = format!("{:x}", Sha256::digest(bytes));
        let extension = source
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
            .unwrap_or(DEFAULT_EXTENSION)
            .to_ascii_lowercase();
        format!("{}.{extension}", &digest[..NAME_HASH_LEN])
    }
}

impl MediaLibrary for DirectoryLibrary {
    async fn save(&self, file: &Path) -> Result<PathBuf, LibraryError> {
        let bytes = tokio::fs::read(file).await?;
        if bytes.is_empty() {
            return Err(LibraryError::Rejected(format!(
                "{} is empty",
                file.display()
            )));
        }
        let target = self.root.join(Self::entry_name(file, &bytes));

        if tokio::fs::try_exists(&target).await? {
            log::info!("already in library: {}", target.display());
            return Ok(target);
        }

        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&target, &bytes).await?;
        log::info!("saved to library: {}", target.display());
        Ok(target)
    }
}

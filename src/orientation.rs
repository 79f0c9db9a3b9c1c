//! Orientation normalization between container metadata and display.
//!
//! Both sides use the same eight EXIF-style states, but they are separate
//! types: [`CodecOrientation`] is what a container's metadata says (and may
//! be absent), [`DisplayOrientation`] is what the renderer consumes (and is
//! always present).
//!
//! | EXIF | Codec / Display |
//! |---|---|
//! | 1 | `Up` |
//! | 2 | `UpMirrored` |
//! | 3 | `Down` |
//! | 4 | `DownMirrored` |
//! | 5 | `LeftMirrored` |
//! | 6 | `Right` |
//! | 7 | `RightMirrored` |
//! | 8 | `Left` |
//!
//! Missing metadata displays as `Up`. There is no "unknown" display state;
//! a raw value outside 1–8 is rejected with
//! [`OrientationError::InvalidOrientation`] before it can reach the mapper.

use serde::{Deserialize, Serialize};
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrientationError {
    #[error("invalid orientation value {0} (expected 1-8)")]
    InvalidOrientation(u32),
}

/// Orientation as recorded in container metadata (EXIF tag 0x0112).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodecOrientation {
    Up,
    UpMirrored,
    Down,
    DownMirrored,
    Left,
    LeftMirrored,
    Right,
    RightMirrored,
}

/// Orientation handed to the rendering layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayOrientation {
    #[default]
    Up,
    UpMirrored,
    Down,
    DownMirrored,
    Left,
    LeftMirrored,
    Right,
    RightMirrored,
}

impl CodecOrientation {
    pub const ALL: [CodecOrientation; 8] = [
        CodecOrientation::Up,
        CodecOrientation::UpMirrored,
        CodecOrientation::Down,
        CodecOrientation::DownMirrored,
        CodecOrientation::Left,
        CodecOrientation::LeftMirrored,
        CodecOrientation::Right,
        CodecOrientation::RightMirrored,
    ];

    /// The EXIF value for this orientation.
    pub fn exif_value(self) -> u32 {
        match self {
            CodecOrientation::Up => 1,
            CodecOrientation::UpMirrored => 2,
            CodecOrientation::Down => 3,
            CodecOrientation::DownMirrored => 4,
            CodecOrientation::LeftMirrored => 5,
            CodecOrientation::Right => 6,
            CodecOrientation::RightMirrored => 7,
            CodecOrientation::Left => 8,
        }
    }
}

impl TryFrom<u32> for CodecOrientation {
    type Error = OrientationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(CodecOrientation::Up),
            2 => Ok(CodecOrientation::UpMirrored),
            3 => Ok(CodecOrientation::Down),
            4 => Ok(CodecOrientation::DownMirrored),
            5 => Ok(CodecOrientation::LeftMirrored),
            6 => Ok(CodecOrientation::Right),
            7 => Ok(CodecOrientation::RightMirrored),
            8 => Ok(CodecOrientation::Left),
            other => Err(OrientationError::InvalidOrientation(other)),
        }
    }
}

/// Map container orientation to display orientation. Absent metadata is `Up`.
pub fn to_display(codec: Option<CodecOrientation>) -> DisplayOrientation {
    match codec {
        None | Some(CodecOrientation::Up) => DisplayOrientation::Up,
        Some(CodecOrientation::UpMirrored) => DisplayOrientation::UpMirrored,
        Some(CodecOrientation::Down) => DisplayOrientation::Down,
        Some(CodecOrientation::DownMirrored) => DisplayOrientation::DownMirrored,
        Some(CodecOrientation::Left) => DisplayOrientation::Left,
        Some(CodecOrientation::LeftMirrored) => DisplayOrientation::LeftMirrored,
        Some(CodecOrientation::Right) => DisplayOrientation::Right,
        Some(CodecOrientation::RightMirrored) => DisplayOrientation::RightMirrored,
    }
}

/// Inverse of [`to_display`] over the eight defined values.
pub fn to_codec(display: DisplayOrientation) -> CodecOrientation {
    match display {
        DisplayOrientation::Up => CodecOrientation::Up,
        DisplayOrientation::UpMirrored => CodecOrientation::UpMirrored,
        DisplayOrientation::Down => CodecOrientation::Down,
        DisplayOrientation::DownMirrored => CodecOrientation::DownMirrored,
        DisplayOrientation::Left => CodecOrientation::Left,
        DisplayOrientation::LeftMirrored => CodecOrientation::LeftMirrored,
        DisplayOrientation::Right => CodecOrientation::Right,
        DisplayOrientation::RightMirrored => CodecOrientation::RightMirrored,
    }
}

/// Read the orientation tag from raw container bytes.
///
/// Returns `Ok(None)` when the container has no EXIF block or no orientation
/// tag. A tag holding a value outside 1–8 is a data error.
pub fn read_codec_orientation(bytes: &[u8]) -> Result<Option<CodecOrientation>, OrientationError> {
    let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => exif,
        Err(e) => {
            log::debug!("no readable EXIF block: {e}");
            return Ok(None);
        }
    };

    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .map(CodecOrientation::try_from)
        .transpose()
}

/// Display orientation for a picked payload, falling back to `Up`.
///
/// Invalid tags are logged and treated like missing metadata so a single bad
/// file never blocks display.
pub fn display_orientation_of(bytes: &[u8]) -> DisplayOrientation {
    match read_codec_orientation(bytes) {
        Ok(codec) => to_display(codec),
        Err(e) => {
            log::warn!("ignoring orientation metadata: {e}");
            DisplayOrientation::Up
        }
    }
}

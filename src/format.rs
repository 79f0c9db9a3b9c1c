//! Content-based image format detection.
//!
//! Picker payloads arrive as opaque bytes with no trustworthy filename or
//! MIME type, so the format is always decided by looking at the data itself.
//!
//! ## Detection order
//!
//! Signatures are checked in a fixed priority order and the first match wins:
//!
//! | Priority | Format | Test |
//! |---|---|---|
//! | 1 | PNG | first 8 bytes are `89 50 4E 47 0D 0A 1A 0A` |
//! | 2 | JPEG | first 2 bytes are `FF D8` |
//! | 3 | GIF | at least 6 bytes, ASCII, starting with `GIF` |
//! | 4 | HEIC/HEIF | ISO-BMFF `ftyp` box with a HEIC-family brand (`infer`) |
//!
//! Anything else is [`ImageFormat::Unknown`]. Detection never fails and never
//! reads past the end of the buffer, whatever its length.
//!
//! ## Extensions
//!
//! Temporary files handed to the encoder need an extension the encoder can
//! trust. [`ImageFormat::extension`] gives it for every known format;
//! [`extension_for`] turns `Unknown` into a hard [`FormatError::UnknownFormat`]
//! instead of guessing.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SIGNATURE: [u8; 2] = [0xFF, 0xD8];
const GIF_HEADER_LEN: usize = 6;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Unsupported image format. Please select a JPEG, PNG, GIF or HEIC image.")]
    UnknownFormat,
}

/// Image container detected from leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageFormat {
    Unknown,
    Png,
    Jpeg,
    Gif,
    /// HEIC and the wider HEIF family (`heic`, `mif1`+`heic`, ...).
    Heic,
}

impl ImageFormat {
    /// File extension for temporary materialization, `None` for `Unknown`.
    pub fn extension(self) -> Option<&'static str> {
        match self {
            ImageFormat::Gif => Some("gif"),
            ImageFormat::Jpeg => Some("jpg"),
            ImageFormat::Png => Some("png"),
            ImageFormat::Heic => Some("heic"),
            ImageFormat::Unknown => None,
        }
    }

    /// Whether the bundled `image` decoders can turn this format into pixels.
    ///
    /// HEIC is recognised but not decoded; it is passed through to the
    /// encoder or displayed from a temporary file instead.
    pub fn is_decodable(self) -> bool {
        matches!(self, ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Gif)
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageFormat::Unknown => "unknown",
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
            ImageFormat::Heic => "heic",
        };
        f.write_str(name)
    }
}

/// Classify a byte buffer by its signature.
pub fn classify(bytes: &[u8]) -> ImageFormat {
    if bytes.starts_with(&PNG_SIGNATURE) {
        ImageFormat::Png
    } else if bytes.starts_with(&JPEG_SIGNATURE) {
        ImageFormat::Jpeg
    } else if is_gif(bytes) {
        ImageFormat::Gif
    } else if infer::image::is_heif(bytes) {
        ImageFormat::Heic
    } else {
        ImageFormat::Unknown
    }
}

fn is_gif(bytes: &[u8]) -> bool {
    bytes.len() >= GIF_HEADER_LEN
        && bytes[..GIF_HEADER_LEN].is_ascii()
        && bytes.starts_with(b"GIF")
}

/// Extension for a buffer about to be written to disk.
///
/// Fails fast with [`FormatError::UnknownFormat`] rather than writing a file
/// with no determinable extension.
pub fn extension_for(bytes: &[u8]) -> Result<&'static str, FormatError> {
    let format = classify(bytes);
    log::debug!("classified {} bytes as {format}", bytes.len());
    format.extension().ok_or(FormatError::UnknownFormat)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Minimal ISO-BMFF `ftyp` box with the given major and compatible brands.
    pub(crate) fn ftyp(major: &[u8; 4], compatible: &[&[u8; 4]]) -> Vec<u8> {
        let len = 16 + 4 * compatible.len();
        let mut out = Vec::with_capacity(len);
        out.extend_from_slice(&(len as u32).to_be_bytes());
        out.extend_from_slice(b"ftyp");
        out.extend_from_slice(major);
        out.extend_from_slice(&[0, 0, 0, 0]);
        for brand in compatible {
            out.extend_from_slice(*brand);
        }
        out
    }

    // =========================================================================
    // Signatures
    // =========================================================================

    #[test]
    fn png_signature_with_tail() {
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend_from_slice(b"IHDR and whatever follows");
        assert_eq!(classify(&bytes), ImageFormat::Png);
    }

    #[test]
    fn png_signature_alone() {
        assert_eq!(classify(&PNG_SIGNATURE), ImageFormat::Png);
    }

    #[test]
    fn truncated_png_signature_is_unknown() {
        assert_eq!(classify(&PNG_SIGNATURE[..7]), ImageFormat::Unknown);
    }

    #[test]
    fn jpeg_two_byte_marker() {
        assert_eq!(classify(&[0xFF, 0xD8]), ImageFormat::Jpeg);
        assert_eq!(classify(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10]), ImageFormat::Jpeg);
    }

    #[test]
    fn gif87a_and_gif89a() {
        assert_eq!(classify(b"GIF87a"), ImageFormat::Gif);
        assert_eq!(classify(b"GIF89a\x01\x00\x01\x00"), ImageFormat::Gif);
    }

    #[test]
    fn gif_prefix_shorter_than_six_bytes_is_unknown() {
        assert_eq!(classify(b"GIF8"), ImageFormat::Unknown);
    }

    #[test]
    fn gif_header_with_non_ascii_byte_is_unknown() {
        assert_eq!(classify(b"GIF\xFFa\x00"), ImageFormat::Unknown);
    }

    #[test]
    fn heic_major_brand() {
        let bytes = ftyp(b"heic", &[b"mif1", b"heic"]);
        assert_eq!(classify(&bytes), ImageFormat::Heic);
    }

    #[test]
    fn heif_mif1_with_heic_compatible_brand() {
        let bytes = ftyp(b"mif1", &[b"heic"]);
        assert_eq!(classify(&bytes), ImageFormat::Heic);
    }

    #[test]
    fn avif_container_is_not_heic() {
        let bytes = ftyp(b"avif", &[b"mif1", b"avif"]);
        assert_eq!(classify(&bytes), ImageFormat::Unknown);
    }

    #[test]
    fn empty_buffer_is_unknown() {
        assert_eq!(classify(&[]), ImageFormat::Unknown);
    }

    #[test]
    fn random_sixteen_bytes_are_unknown() {
        let bytes = [
            0x13, 0x37, 0xC0, 0xDE, 0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99,
            0xAA, 0xBB,
        ];
        assert_eq!(classify(&bytes), ImageFormat::Unknown);
    }

    #[test]
    fn png_wins_over_later_checks() {
        // A PNG signature followed by a GIF header is still PNG.
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend_from_slice(b"GIF89a");
        assert_eq!(classify(&bytes), ImageFormat::Png);
    }

    // =========================================================================
    // Extensions
    // =========================================================================

    #[test]
    fn extension_table() {
        assert_eq!(ImageFormat::Gif.extension(), Some("gif"));
        assert_eq!(ImageFormat::Jpeg.extension(), Some("jpg"));
        assert_eq!(ImageFormat::Png.extension(), Some("png"));
        assert_eq!(ImageFormat::Heic.extension(), Some("heic"));
        assert_eq!(ImageFormat::Unknown.extension(), None);
    }

    #[test]
    fn extension_for_unknown_fails_fast() {
        assert_eq!(extension_for(b"plain text"), Err(FormatError::UnknownFormat));
    }

    #[test]
    fn extension_for_jpeg() {
        assert_eq!(extension_for(&[0xFF, 0xD8, 0xFF]), Ok("jpg"));
    }

    #[test]
    fn display_names() {
        assert_eq!(ImageFormat::Heic.to_string(), "heic");
        assert_eq!(ImageFormat::Unknown.to_string(), "unknown");
    }

    proptest! {
        #[test]
        fn classify_never_panics_on_short_buffers(bytes in proptest::collection::vec(any::<u8>(), 0..8)) {
            let _ = classify(&bytes);
        }

        #[test]
        fn classify_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            let _ = classify(&bytes);
        }

        #[test]
        fn png_prefix_always_png(tail in proptest::collection::vec(any::<u8>(), 0..64)) {
            let mut bytes = PNG_SIGNATURE.to_vec();
            bytes.extend_from_slice(&tail);
            prop_assert_eq!(classify(&bytes), ImageFormat::Png);
        }

        #[test]
        fn jpeg_prefix_always_jpeg(tail in proptest::collection::vec(any::<u8>(), 0..64)) {
            let mut bytes = JPEG_SIGNATURE.to_vec();
            bytes.extend_from_slice(&tail);
            prop_assert_eq!(classify(&bytes), ImageFormat::Jpeg);
        }

        #[test]
        fn gif89a_prefix_always_gif(tail in proptest::collection::vec(any::<u8>(), 0..64)) {
            let mut bytes = b"GIF89a".to_vec();
            bytes.extend_from_slice(&tail);
            prop_assert_eq!(classify(&bytes), ImageFormat::Gif);
        }
    }
}

//! Owned raster images backed by the `image` crate.
//!
//! [`RasterImage`] is the one pixel container the rest of the crate sees. It
//! wraps a [`DynamicImage`] and adds a checked crop: `image`'s own
//! `crop_imm` silently clamps out-of-range rectangles, which would turn a
//! bad split into a quietly wrong picture. Here a rectangle that is empty or
//! leaves the image is a [`CropError`].

use image::{DynamicImage, GenericImageView, ImageFormat as CodecFormat};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to encode image: {0}")]
    Encode(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CropError {
    #[error("crop rectangle {0:?} is empty")]
    Empty(CropRect),
    #[error("crop rectangle {rect:?} exceeds image bounds {width}x{height}")]
    OutOfBounds {
        rect: CropRect,
        width: u32,
        height: u32,
    },
}

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x
            .checked_add(self.width)
            .is_some_and(|right| right <= width)
            && self
                .y
                .checked_add(self.height)
                .is_some_and(|bottom| bottom <= height)
    }
}

/// An owned 2-D pixel grid.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pixels: DynamicImage,
}

impl RasterImage {
    pub fn from_dynamic(pixels: DynamicImage) -> Self {
        Self { pixels }
    }

    /// Decode an in-memory PNG, JPEG or GIF payload (first frame).
    pub fn decode(bytes: &[u8]) -> Result<Self, RasterError> {
        let pixels = image::load_from_memory(bytes).map_err(|e| RasterError::Decode(e.to_string()))?;
        Ok(Self { pixels })
    }

    /// Decode an image file from disk, guessing the codec from its content.
    pub fn open(path: &Path) -> Result<Self, RasterError> {
        let bytes = std::fs::read(path)?;
        Self::decode(&bytes).map_err(|e| match e {
            RasterError::Decode(msg) => {
                RasterError::Decode(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// RGBA sample at `(x, y)`, `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixels
            .in_bounds(x, y)
            .then(|| self.pixels.get_pixel(x, y).0)
    }

    /// Copy the pixels inside `rect` into a new image.
    pub fn crop(&self, rect: CropRect) -> Result<RasterImage, CropError> {
        if rect.width == 0 || rect.height == 0 {
            return Err(CropError::Empty(rect));
        }
        if !rect.fits_within(self.width(), self.height()) {
            return Err(CropError::OutOfBounds {
                rect,
                width: self.width(),
                height: self.height(),
            });
        }
        Ok(Self {
            pixels: self.pixels.crop_imm(rect.x, rect.y, rect.width, rect.height),
        })
    }

    /// Encode as PNG in memory.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, RasterError> {
        let mut out = Cursor::new(Vec::new());
        self.pixels
            .write_to(&mut out, CodecFormat::Png)
            .map_err(|e| RasterError::Encode(e.to_string()))?;
        Ok(out.into_inner())
    }

    /// Encode as PNG and write to `path`.
    pub fn save_png(&self, path: &Path) -> Result<(), RasterError> {
        let bytes = self.to_png_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageEncoder, RgbImage, RgbaImage};

    /// Image whose red channel is the column index and green the row index.
    pub(crate) fn gradient(width: u32, height: u32) -> RasterImage {
        RasterImage::from_dynamic(DynamicImage::ImageRgba8(RgbaImage::from_fn(
            width,
            height,
            |x, y| image::Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255]),
        )))
    }

    /// Encode a small synthetic JPEG in memory.
    pub(crate) fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut out = Vec::new();
        image::codecs::jpeg::JpegEncoder::new(&mut out)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
        out
    }

    #[test]
    fn decode_synthetic_jpeg() {
        let raster = RasterImage::decode(&jpeg_bytes(40, 30)).unwrap();
        assert_eq!((raster.width(), raster.height()), (40, 30));
    }

    #[test]
    fn decode_garbage_errors() {
        let err = RasterImage::decode(b"definitely not pixels").unwrap_err();
        assert!(matches!(err, RasterError::Decode(_)));
    }

    #[test]
    fn open_nonexistent_file_errors() {
        let result = RasterImage::open(Path::new("/nonexistent/left.png"));
        assert!(matches!(result, Err(RasterError::Io(_))));
    }

    #[test]
    fn pixel_sampling_in_and_out_of_bounds() {
        let raster = gradient(4, 3);
        assert_eq!(raster.pixel(2, 1), Some([2, 1, 128, 255]));
        assert_eq!(raster.pixel(4, 0), None);
        assert_eq!(raster.pixel(0, 3), None);
    }

    #[test]
    fn crop_copies_region() {
        let raster = gradient(10, 6);
        let cropped = raster.crop(CropRect::new(3, 2, 4, 2)).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (4, 2));
        assert_eq!(cropped.pixel(0, 0), Some([3, 2, 128, 255]));
        assert_eq!(cropped.pixel(3, 1), Some([6, 3, 128, 255]));
    }

    #[test]
    fn crop_full_image() {
        let raster = gradient(5, 5);
        let cropped = raster.crop(CropRect::new(0, 0, 5, 5)).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (5, 5));
    }

    #[test]
    fn crop_empty_rect_errors() {
        let raster = gradient(5, 5);
        let rect = CropRect::new(0, 0, 0, 5);
        assert_eq!(raster.crop(rect).unwrap_err(), CropError::Empty(rect));
    }

    #[test]
    fn crop_out_of_bounds_errors() {
        let raster = gradient(5, 5);
        let err = raster.crop(CropRect::new(3, 0, 3, 5)).unwrap_err();
        assert!(matches!(err, CropError::OutOfBounds { width: 5, .. }));
    }

    #[test]
    fn crop_overflowing_rect_errors() {
        let raster = gradient(5, 5);
        let err = raster.crop(CropRect::new(u32::MAX, 0, 2, 5)).unwrap_err();
        assert!(matches!(err, CropError::OutOfBounds { .. }));
    }

    #[test]
    fn png_export_decodes_back() {
        let raster = gradient(8, 4);
        let bytes = raster.to_png_bytes().unwrap();
        assert_eq!(crate::format::classify(&bytes), crate::format::ImageFormat::Png);
        let decoded = RasterImage::decode(&bytes).unwrap();
        assert_eq!(decoded.pixel(7, 3), raster.pixel(7, 3));
    }

    #[test]
    fn save_png_writes_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("half.png");
        gradient(6, 6).save_png(&path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}

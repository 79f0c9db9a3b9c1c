//! Side-by-side stereo decomposition.
//!
//! A combined stereo frame holds the left-eye view in its left half and the
//! right-eye view in its right half. [`split`] cuts it along the vertical
//! midline:
//!
//! ```text
//! w = 7                    left  = (0, 0, 3, h)
//! ┌───┬────┐               right = (3, 0, 4, h)
//! │ L │ R  │
//! └───┴────┘
//! ```
//!
//! With an odd width the right half gets the extra column. The two halves
//! therefore always add back up to the original width and never differ by
//! more than one column.

use super::raster::{CropError, CropRect, RasterImage};
use crate::orientation::DisplayOrientation;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SplitError {
    #[error("cannot split a {width}x{height} image into stereo halves: {source}")]
    CropFailed {
        width: u32,
        height: u32,
        #[source]
        source: CropError,
    },
}

/// One side of a stereo pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Eye {
    Left,
    Right,
}

impl fmt::Display for Eye {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Eye::Left => "left",
            Eye::Right => "right",
        })
    }
}

/// Left/right views of one binocular image.
#[derive(Debug, Clone)]
pub struct StereoPair {
    pub left: RasterImage,
    pub right: RasterImage,
    /// Shared orientation for both views, when known.
    pub orientation: Option<DisplayOrientation>,
}

impl StereoPair {
    pub fn new(left: RasterImage, right: RasterImage) -> Self {
        Self {
            left,
            right,
            orientation: None,
        }
    }

    pub fn with_orientation(mut self, orientation: DisplayOrientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn view(&self, eye: Eye) -> &RasterImage {
        match eye {
            Eye::Left => &self.left,
            Eye::Right => &self.right,
        }
    }

    /// Orientation the renderer should apply; `Up` when unknown.
    pub fn display_orientation(&self) -> DisplayOrientation {
        self.orientation.unwrap_or_default()
    }
}

/// Rectangles for the two halves of a `width` x `height` image.
///
/// Pure arithmetic; the rectangles may be empty for widths below 2.
pub fn split_regions(width: u32, height: u32) -> (CropRect, CropRect) {
    let half = width / 2;
    (
        CropRect::new(0, 0, half, height),
        CropRect::new(half, 0, width - half, height),
    )
}

/// Split a side-by-side image at its horizontal midpoint.
pub fn split(image: &RasterImage) -> Result<StereoPair, SplitError> {
    let (width, height) = (image.width(), image.height());
    let (left_rect, right_rect) = split_regions(width, height);
    log::debug!("splitting {width}x{height}: left {left_rect:?}, right {right_rect:?}");

    let (left, right) = rayon::join(|| image.crop(left_rect), || image.crop(right_rect));
    let fail = |source| SplitError::CropFailed {
        width,
        height,
        source,
    };

    Ok(StereoPair::new(left.map_err(fail)?, right.map_err(fail)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::raster::tests::gradient;
    use image::{DynamicImage, RgbaImage};
    use proptest::prelude::*;

    fn empty(width: u32, height: u32) -> RasterImage {
        RasterImage::from_dynamic(DynamicImage::ImageRgba8(RgbaImage::new(width, height)))
    }

    // =========================================================================
    // split_regions
    // =========================================================================

    #[test]
    fn regions_even_width() {
        let (l, r) = split_regions(8, 3);
        assert_eq!(l, CropRect::new(0, 0, 4, 3));
        assert_eq!(r, CropRect::new(4, 0, 4, 3));
    }

    #[test]
    fn regions_odd_width_gives_right_extra_column() {
        let (l, r) = split_regions(7, 2);
        assert_eq!(l, CropRect::new(0, 0, 3, 2));
        assert_eq!(r, CropRect::new(3, 0, 4, 2));
    }

    // =========================================================================
    // split
    // =========================================================================

    #[test]
    fn split_even_width_halves_match_source_pixels() {
        let pair = split(&gradient(10, 4)).unwrap();
        assert_eq!((pair.left.width(), pair.right.width()), (5, 5));
        assert_eq!(pair.left.pixel(0, 0), Some([0, 0, 128, 255]));
        assert_eq!(pair.right.pixel(0, 0), Some([5, 0, 128, 255]));
        assert_eq!(pair.right.pixel(4, 3), Some([9, 3, 128, 255]));
    }

    #[test]
    fn split_odd_width() {
        let pair = split(&gradient(9, 2)).unwrap();
        assert_eq!(pair.left.width(), 4);
        assert_eq!(pair.right.width(), 5);
        assert_eq!(pair.right.pixel(0, 0), Some([4, 0, 128, 255]));
    }

    #[test]
    fn view_selects_eye() {
        let pair = split(&gradient(6, 2)).unwrap();
        assert_eq!(pair.view(Eye::Left).pixel(0, 0), Some([0, 0, 128, 255]));
        assert_eq!(pair.view(Eye::Right).pixel(0, 0), Some([3, 0, 128, 255]));
        assert_eq!(Eye::Right.to_string(), "right");
    }

    #[test]
    fn split_width_two() {
        let pair = split(&gradient(2, 1)).unwrap();
        assert_eq!((pair.left.width(), pair.right.width()), (1, 1));
    }

    #[test]
    fn split_width_one_fails() {
        let err = split(&gradient(1, 5)).unwrap_err();
        assert!(matches!(err, SplitError::CropFailed { width: 1, .. }));
    }

    #[test]
    fn split_width_zero_fails() {
        let err = split(&empty(0, 5)).unwrap_err();
        assert!(matches!(err, SplitError::CropFailed { width: 0, .. }));
    }

    #[test]
    fn split_height_zero_fails() {
        assert!(split(&empty(4, 0)).is_err());
    }

    #[test]
    fn split_preserves_height() {
        let pair = split(&gradient(6, 11)).unwrap();
        assert_eq!(pair.left.height(), 11);
        assert_eq!(pair.right.height(), 11);
    }

    #[test]
    fn pair_orientation_defaults_to_up() {
        let pair = split(&gradient(4, 4)).unwrap();
        assert_eq!(pair.orientation, None);
        assert_eq!(pair.display_orientation(), DisplayOrientation::Up);

        let pair = pair.with_orientation(DisplayOrientation::Left);
        assert_eq!(pair.display_orientation(), DisplayOrientation::Left);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn halves_cover_width(width in 2u32..300, height in 1u32..8) {
            let pair = split(&empty(width, height)).unwrap();
            prop_assert_eq!(pair.left.width() + pair.right.width(), width);
            let diff = pair.right.width() - pair.left.width();
            prop_assert!(diff == 0 || diff == 1);
        }

        #[test]
        fn narrow_images_never_panic(width in 0u32..2, height in 0u32..4) {
            let result = split(&empty(width, height));
            prop_assert!(
                matches!(result, Err(SplitError::CropFailed { .. })),
                "expected CropFailed for {}x{}",
                width,
                height
            );
        }
    }
}

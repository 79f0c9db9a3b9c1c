//! Raster handling for stereo pairs.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** (PNG, JPEG, GIF) | `image::load_from_memory` |
//! | **Crop** | `DynamicImage::crop_imm` behind a bounds check |
//! | **Split** | midline crop of both halves in parallel (`rayon::join`) |
//! | **Export** | PNG via `DynamicImage::write_to` |
//!
//! The module is split into:
//! - **Raster**: [`RasterImage`], the owned pixel grid with a checked crop
//! - **Split**: [`split`], turning one side-by-side frame into a [`StereoPair`]

pub mod raster;
pub mod split;

pub use raster::{CropError, CropRect, RasterError, RasterImage};
pub use split::{Eye, SplitError, StereoPair, split, split_regions};

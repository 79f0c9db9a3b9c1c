//! # Spatial Photo
//!
//! Core of a tool for inspecting and authoring spatial (stereoscopic)
//! photographs: pairs of left/right views that, together with camera
//! geometry, make a binocular image viewed with parallax.
//!
//! # Architecture
//!
//! Everything a screen needs flows through a handful of small, pure units.
//! Screens hold only their own selection and settings:
//!
//! ```text
//! bytes ─▶ format::classify ─┬─▶ orientation ─┐
//!                            └─▶ imaging::split ─┴─▶ StereoPair ─▶ preview
//!
//! left + right + geometry ─▶ convert::ConversionRequest ─▶ encoder ─▶ library
//!
//! device attitude ─▶ motion (watch channel) ─▶ disparity ─▶ preview offset
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`format`] | Magic-byte sniffing (PNG, JPEG, GIF, HEIC) and file extensions |
//! | [`orientation`] | EXIF orientation reading and the codec → display mapping |
//! | [`imaging`] | Raster decode/crop/export and the side-by-side stereo split |
//! | [`motion`] | Tilt → disparity, attitude channel and fixed-rate sampler |
//! | [`preview`] | Comparison display modes, the slide offset and the live motion preview |
//! | [`temp`] | Unique-name temporary files for byte buffers |
//! | [`convert`] | Conversion parameters, external encoder, media library, requests |
//! | [`session`] | Split and generate screen state |
//! | [`report`] | User-facing alerts and the report sink |
//! | [`config`] | `config.toml` loading, validation, merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## External Encoder
//!
//! The multi-view spatial photo container is written by an external program
//! ([`convert::CommandEncoder`]) configured in `config.toml`. The crate only
//! prepares inputs and interprets the result, so the container format can
//! evolve without touching this code.
//!
//! ## Errors Are Values
//!
//! Sniffing and orientation mapping are total: unknown input maps to
//! `Unknown` or `Up`. Splitting and conversion return explicit errors, and
//! every failure that reaches a screen is turned into an
//! [`report::Alert`] and handed to one [`report::ReportSink`].
//!
//! ## Whole Attitude Samples
//!
//! Roll and pitch are published together through a `tokio::sync::watch`
//! channel. Readers always see a matching pair, never roll from one sample
//! and pitch from the next.

pub mod config;
pub mod convert;
pub mod format;
pub mod imaging;
pub mod motion;
pub mod orientation;
pub mod output;
pub mod preview;
pub mod report;
pub mod session;
pub mod temp;

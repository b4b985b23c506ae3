//! # capture-normalize
//!
//! Post-capture normalization for photos: take a freshly captured still,
//! rotate it upright according to its EXIF orientation, center-crop it to a
//! fixed aspect ratio, resample it to a fixed resolution, and re-encode it over
//! the original path.
//!
//! # Architecture: Four-Stage Pipeline
//!
//! Every capture goes through the same linear sequence:
//!
//! ```text
//! 1. Decode     file      →  pixels + orientation   (content-sniffed, EXIF optional)
//! 2. Orient     pixels    →  upright pixels         (lossless 90/180/270 rotation)
//! 3. Crop       upright   →  fixed-size pixels      (exact integer center crop + resample)
//! 4. Encode     pixels    →  same path              (temp file + atomic rename)
//! ```
//!
//! The stages never branch and never share state between captures, so a batch
//! is just the same pipeline fanned out over rayon.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Decoding, orientation, crop geometry, resampling, encoding |
//! | [`pipeline`] | Stage orchestration, fallback policy, batch driver |
//! | [`config`] | `capture-normalize.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting for outcomes, plans, and identify results |
//!
//! # Design Decisions
//!
//! ## The Photo Always Survives
//!
//! Post-processing is best effort. [`pipeline::normalize_capture`] returns an
//! [`pipeline::Outcome`] rather than a `Result`: any decode, geometry, or
//! encode failure is logged and the caller gets the original path back. The
//! encoder writes through a temporary file in the destination directory, so a
//! failed encode never leaves a half-written photo behind.
//!
//! ## Exact Crop Arithmetic
//!
//! The crop rectangle is computed with integer math in `u64`
//! (`floor(w * aspect_h / aspect_w)`) rather than floating point, so the same
//! capture size always yields the same rectangle on every platform. See
//! [`imaging::calculate_crop_rect`].
//!
//! ## Backend Trait
//!
//! All I/O with pixels goes through [`imaging::ImageBackend`]. The production
//! [`imaging::RustBackend`] is pure Rust (`image`, `kamadak-exif`,
//! `avif-parse`); tests swap in a recording mock so pipeline logic is
//! exercised without encoding real images.

pub mod config;
pub mod imaging;
pub mod output;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod test_helpers;

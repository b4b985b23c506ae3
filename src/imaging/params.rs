//! Parameter types for image operations.
//!
//! These types describe *what* to produce, not *how*. The
//! [`operations`](super::operations) module turns them into pixel work and the
//! [`backend`](super::backend) turns them into bytes on disk, which keeps the
//! geometry testable without touching a codec.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 100). Clamped on construction.
//! - [`AspectRatio`]: Crop ratio as `width:height` (default 3:4).
//! - [`OutputFormat`]: Which lossy codec the encoder writes.
//! - [`ResampleFilter`]: Interpolating filter used when scaling the crop.
//! - [`EncodeParams`]: Everything one encode needs (destination, format, quality).

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub const MAX: Quality = Quality(100);

    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::MAX
    }
}

/// Target crop ratio, `width:height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::new(3, 4)
    }
}

impl From<[u32; 2]> for AspectRatio {
    fn from([width, height]: [u32; 2]) -> Self {
        Self::new(width, height)
    }
}

/// Lossy codec written by the encoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossy WebP (VP8) via libwebp. What camera captures are named for.
    #[default]
    Webp,
    /// Baseline JPEG. Decodable by anything.
    Jpeg,
    /// AVIF via rav1e (speed 6).
    Avif,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Webp => "webp",
            Self::Jpeg => "jpeg",
            Self::Avif => "avif",
        }
    }

    /// Largest width or height the codec can write.
    pub fn max_dimension(self) -> u32 {
        match self {
            Self::Webp => 16383,
            Self::Jpeg | Self::Avif => 65535,
        }
    }
}

/// Interpolating resample filter. Nearest-neighbour is not offered: it aliases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    #[default]
    Lanczos3,
    CatmullRom,
    Triangle,
}

impl ResampleFilter {
    pub fn filter_type(self) -> FilterType {
        match self {
            Self::Lanczos3 => FilterType::Lanczos3,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Triangle => FilterType::Triangle,
        }
    }
}

/// Parameters for writing the final buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeParams {
    /// Destination; replaced atomically.
    pub output: PathBuf,
    pub format: OutputFormat,
    pub quality: Quality,
}

//! Shared test utilities for the capture-normalize test suite.
//!
//! Provides synthetic captures (JPEG bytes with an optional EXIF orientation
//! tag), pixel lookups, and a temp-dir fixture writer.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = write_capture(tmp.path(), "CAP1.jpg", 400, 300, Some(6));
//! let decoded = RustBackend::new().decode(&path).unwrap();
//! assert_eq!(decoded.orientation, Orientation::Rotate90);
//! ```

use image::{DynamicImage, GenericImageView, ImageEncoder, RgbImage};
use std::path::{Path, PathBuf};

// =========================================================================
// Synthetic pixels
// =========================================================================

/// An RGB image where every pixel in a small image is distinct.
pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, 128])
    }))
}

/// RGB value at `(x, y)`.
pub fn pixel_at(img: &DynamicImage, x: u32, y: u32) -> [u8; 3] {
    let p = img.get_pixel(x, y).0;
    [p[0], p[1], p[2]]
}

// =========================================================================
// Synthetic captures
// =========================================================================

/// Encode a gradient as JPEG, optionally carrying an EXIF orientation tag.
pub fn jpeg_bytes_with_orientation(width: u32, height: u32, orientation: Option<u16>) -> Vec<u8> {
    let img = gradient_image(width, height).to_rgb8();
    let mut jpeg = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, 95)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();

    match orientation {
        Some(value) => insert_exif_orientation(&jpeg, value),
        None => jpeg,
    }
}

/// Splice an APP1 EXIF segment holding only an Orientation entry right after SOI.
fn insert_exif_orientation(jpeg: &[u8], value: u16) -> Vec<u8> {
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "not a JPEG");

    let mut payload = Vec::new();
    payload.extend_from_slice(b"Exif\0\0");
    // Little-endian TIFF header, IFD0 at offset 8
    payload.extend_from_slice(&[0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00]);
    // One entry: tag 0x0112 (Orientation), type SHORT, count 1
    payload.extend_from_slice(&[0x01, 0x00]);
    payload.extend_from_slice(&[0x12, 0x01, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00]);
    payload.extend_from_slice(&value.to_le_bytes());
    payload.extend_from_slice(&[0x00, 0x00]);
    // No next IFD
    payload.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

    let segment_len = (payload.len() + 2) as u16;
    let mut out = Vec::with_capacity(jpeg.len() + payload.len() + 4);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// Write a synthetic capture into `dir` and return its path.
pub fn write_capture(
    dir: &Path,
    name: &str,
    width: u32,
    height: u32,
    orientation: Option<u16>,
) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, jpeg_bytes_with_orientation(width, height, orientation)).unwrap();
    path
}

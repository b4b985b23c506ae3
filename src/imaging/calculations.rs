//! Pure calculation functions for crop geometry.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::AspectRatio;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("image has zero dimension ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("output size {width}x{height} has a zero dimension")]
    EmptyTarget { width: u32, height: u32 },
    #[error("aspect ratio {width}:{height} has a zero term")]
    InvalidAspect { width: u32, height: u32 },
    #[error("{aspect_w}:{aspect_h} crop of {width}x{height} degenerates to {crop_width}x{crop_height}")]
    DegenerateCrop {
        width: u32,
        height: u32,
        aspect_w: u32,
        aspect_h: u32,
        crop_width: u32,
        crop_height: u32,
    },
}

/// A crop rectangle in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Calculate the centered crop rectangle for `aspect` inside `source`.
///
/// Starts from the full source width and derives the height from the ratio;
/// if that overflows the source, the full height is used instead and the
/// width derived from it. Both derivations floor, and the offset floors too,
/// so the rectangle always fits inside the source.
///
/// The ratio is applied as an exact fraction (`w * aspect_h / aspect_w`), so
/// results never depend on float rounding.
///
/// # Examples
/// ```
/// # use capture_normalize::imaging::{AspectRatio, CropRect, calculate_crop_rect};
/// // 4000x3000 landscape → full-height 3:4 strip from the middle
/// let rect = calculate_crop_rect((4000, 3000), AspectRatio::new(3, 4)).unwrap();
/// assert_eq!(rect, CropRect { x: 875, y: 0, width: 2250, height: 3000 });
/// ```
pub fn calculate_crop_rect(
    source: (u32, u32),
    aspect: AspectRatio,
) -> Result<CropRect, GeometryError> {
    let (src_w, src_h) = source;
    if src_w == 0 || src_h == 0 {
        return Err(GeometryError::EmptyImage {
            width: src_w,
            height: src_h,
        });
    }
    if aspect.width == 0 || aspect.height == 0 {
        return Err(GeometryError::InvalidAspect {
            width: aspect.width,
            height: aspect.height,
        });
    }

    let (aw, ah) = (u64::from(aspect.width), u64::from(aspect.height));

    // Full width first; fall back to full height when too tall.
    let mut crop_w = u64::from(src_w);
    let mut crop_h = crop_w * ah / aw;
    if crop_h > u64::from(src_h) {
        crop_h = u64::from(src_h);
        crop_w = crop_h * aw / ah;
    }

    // Both are bounded by the source dimensions at this point.
    let (crop_w, crop_h) = (crop_w as u32, crop_h as u32);
    if crop_w == 0 || crop_h == 0 {
        return Err(GeometryError::DegenerateCrop {
            width: src_w,
            height: src_h,
            aspect_w: aspect.width,
            aspect_h: aspect.height,
            crop_width: crop_w,
            crop_height: crop_h,
        });
    }

    Ok(CropRect {
        x: (src_w - crop_w) / 2,
        y: (src_h - crop_h) / 2,
        width: crop_w,
        height: crop_h,
    })
}

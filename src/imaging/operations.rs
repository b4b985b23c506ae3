//! High-level image operations.
//!
//! These functions combine the pure calculations with pixel work. Nothing
//! here touches the filesystem; decoding and encoding belong to the backend.

use super::calculations::{CropRect, GeometryError, calculate_crop_rect};
use super::orientation::Orientation;
use super::params::{AspectRatio, ResampleFilter};
use image::DynamicImage;
use serde::Serialize;

/// Geometry settings for the crop/resize stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropConfig {
    pub aspect: AspectRatio,
    /// Exact output `(width, height)`.
    pub target: (u32, u32),
    pub filter: ResampleFilter,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            aspect: AspectRatio::default(),
            target: (1000, 1334),
            filter: ResampleFilter::default(),
        }
    }
}

/// Everything the pipeline will do to a capture of a given size, computed
/// without touching pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NormalizePlan {
    pub source: (u32, u32),
    pub orientation: Orientation,
    pub upright: (u32, u32),
    pub crop: CropRect,
    pub output: (u32, u32),
}

/// Plan a normalization without executing it.
///
/// Useful for testing parameter generation and for the `plan` command.
pub fn plan_normalization(
    source: (u32, u32),
    orientation: Orientation,
    config: &CropConfig,
) -> Result<NormalizePlan, GeometryError> {
    check_target(config.target)?;
    let upright = orientation.upright_dimensions(source);
    let crop = calculate_crop_rect(upright, config.aspect)?;

    Ok(NormalizePlan {
        source,
        orientation,
        upright,
        crop,
        output: config.target,
    })
}

fn check_target((width, height): (u32, u32)) -> Result<(), GeometryError> {
    if width == 0 || height == 0 {
        return Err(GeometryError::EmptyTarget { width, height });
    }
    Ok(())
}

/// Turn pixels upright according to `orientation`.
pub fn normalize_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    orientation.apply(img)
}

/// Center-crop to the configured ratio, then resample to the exact target size.
///
/// The crop's own ratio can be a pixel off from the target's after flooring;
/// the resample stretches it to the exact target regardless.
pub fn crop_and_resize(
    img: &DynamicImage,
    config: &CropConfig,
) -> Result<(DynamicImage, CropRect), GeometryError> {
    check_target(config.target)?;
    let rect = calculate_crop_rect((img.width(), img.height()), config.aspect)?;

    let (target_w, target_h) = config.target;
    let resized = img
        .crop_imm(rect.x, rect.y, rect.width, rect.height)
        .resize_exact(target_w, target_h, config.filter.filter_type());

    Ok((resized, rect))
}

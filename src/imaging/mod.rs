//! Image processing in pure Rust, statically linked.
//!
//! | Stage | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (format sniffed from content) |
//! | **Orientation** | `kamadak-exif` tag → `rotate90`/`rotate180`/`rotate270` |
//! | **Crop → resize** | exact-fraction center crop + `resize_exact` (Lanczos3) |
//! | **Encode** | WebP (libwebp), JPEG or AVIF (rav1e) into a temp file, then atomic rename |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop geometry (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Orientation**: EXIF tag parsing and lossless rotation
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Pixel work combining calculations with buffers

pub mod backend;
mod calculations;
pub mod operations;
pub mod orientation;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Decoded, Dimensions, Identity, ImageBackend};
pub use calculations::{CropRect, GeometryError, calculate_crop_rect};
pub use operations::{
    CropConfig, NormalizePlan, crop_and_resize, normalize_orientation, plan_normalization,
};
pub use orientation::{Orientation, read_orientation};
pub use params::{AspectRatio, EncodeParams, OutputFormat, Quality, ResampleFilter};
pub use rust_backend::{RustBackend, has_supported_extension, supported_input_extensions};

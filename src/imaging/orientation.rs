//! EXIF orientation: reading the tag and turning pixels upright.
//!
//! Only the four pure rotations are honoured. Mirrored orientations
//! (EXIF 2, 4, 5, 7) and anything unknown are treated as [`Orientation::Normal`],
//! matching what camera pipelines actually write for still captures.
//!
//! | EXIF | Meaning | Transform |
//! |---|---|---|
//! | 1 | upright | none |
//! | 6 | rotated 90° CW | `rotate90` |
//! | 3 | rotated 180° | `rotate180` |
//! | 8 | rotated 270° CW | `rotate270` |

use image::DynamicImage;
use serde::Serialize;
use std::io::Cursor;
use tracing::debug;

/// Rotation implied by the capture's orientation tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Normal,
    Rotate90,
    Rotate180,
    Rotate270,
}

impl Orientation {
    /// Map a raw EXIF `Orientation` value.
    pub fn from_exif(value: u32) -> Self {
        match value {
            6 => Self::Rotate90,
            3 => Self::Rotate180,
            8 => Self::Rotate270,
            _ => Self::Normal,
        }
    }

    /// Clockwise rotation in degrees.
    pub fn degrees(self) -> u32 {
        match self {
            Self::Normal => 0,
            Self::Rotate90 => 90,
            Self::Rotate180 => 180,
            Self::Rotate270 => 270,
        }
    }

    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Self::Rotate90 | Self::Rotate270)
    }

    /// Dimensions after [`apply`](Self::apply), without touching pixels.
    pub fn upright_dimensions(self, (width, height): (u32, u32)) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }

    /// Rotate pixels clockwise so the image is stored upright.
    ///
    /// Pure remap, no interpolation: every source pixel lands in exactly one
    /// destination pixel.
    pub fn apply(self, img: DynamicImage) -> DynamicImage {
        match self {
            Self::Normal => img,
            Self::Rotate90 => img.rotate90(),
            Self::Rotate180 => img.rotate180(),
            Self::Rotate270 => img.rotate270(),
        }
    }
}

/// Read the orientation tag from an encoded image held in memory.
///
/// Missing EXIF, an unparseable EXIF block, or an absent tag all resolve to
/// [`Orientation::Normal`]; orientation is never a reason to fail.
pub fn read_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    let exif = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif,
        Err(e) => {
            debug!(error = %e, "no usable EXIF block, assuming upright");
            return Orientation::Normal;
        }
    };

    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .map(Orientation::from_exif)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{gradient_image, jpeg_bytes_with_orientation, pixel_at};

    #[test]
    fn exif_values_map_to_rotations() {
        assert_eq!(Orientation::from_exif(1), Orientation::Normal);
        assert_eq!(Orientation::from_exif(6), Orientation::Rotate90);
        assert_eq!(Orientation::from_exif(3), Orientation::Rotate180);
        assert_eq!(Orientation::from_exif(8), Orientation::Rotate270);
    }

    #[test]
    fn mirrored_and_unknown_values_are_normal() {
        for v in [0, 2, 4, 5, 7, 9, 255] {
            assert_eq!(Orientation::from_exif(v), Orientation::Normal, "value {v}");
        }
    }

    #[test]
    fn quarter_turns_swap_dimensions() {
        let img = gradient_image(40, 30);
        assert_eq!(
            Orientation::Rotate90.apply(img.clone()).to_rgb8().dimensions(),
            (30, 40)
        );
        assert_eq!(
            Orientation::Rotate270.apply(img.clone()).to_rgb8().dimensions(),
            (30, 40)
        );
        assert_eq!(
            Orientation::Rotate180.apply(img.clone()).to_rgb8().dimensions(),
            (40, 30)
        );
        assert_eq!(Orientation::Normal.apply(img).to_rgb8().dimensions(), (40, 30));
    }

    #[test]
    fn upright_dimensions_match_apply() {
        let img = gradient_image(17, 5);
        for o in [
            Orientation::Normal,
            Orientation::Rotate90,
            Orientation::Rotate180,
            Orientation::Rotate270,
        ] {
            let rotated = o.apply(img.clone());
            assert_eq!(
                o.upright_dimensions((17, 5)),
                (rotated.width(), rotated.height())
            );
        }
    }

    #[test]
    fn rotate_180_twice_keeps_dimensions() {
        let img = gradient_image(64, 48);
        let twice = Orientation::Rotate180.apply(Orientation::Rotate180.apply(img.clone()));
        assert_eq!((twice.width(), twice.height()), (64, 48));
        // And the pixels come back too
        assert_eq!(twice.to_rgb8(), img.to_rgb8());
    }

    #[test]
    fn rotate_90_then_270_restores_dimensions() {
        let img = gradient_image(64, 48);
        let back = Orientation::Rotate270.apply(Orientation::Rotate90.apply(img.clone()));
        assert_eq!((back.width(), back.height()), (64, 48));
        assert_eq!(back.to_rgb8(), img.to_rgb8());
    }

    #[test]
    fn rotate_90_is_clockwise_and_lossless() {
        let img = gradient_image(4, 3);
        let rotated = Orientation::Rotate90.apply(img.clone());
        // Clockwise: source bottom-left (0, h-1) lands on destination top-left
        assert_eq!(pixel_at(&rotated, 0, 0), pixel_at(&img, 0, 2));
        // Source top-left lands on destination top-right
        assert_eq!(pixel_at(&rotated, 2, 0), pixel_at(&img, 0, 0));
    }

    #[test]
    fn reads_tag_from_jpeg() {
        for (raw, expected) in [
            (1, Orientation::Normal),
            (3, Orientation::Rotate180),
            (6, Orientation::Rotate90),
            (8, Orientation::Rotate270),
            (5, Orientation::Normal),
        ] {
            let bytes = jpeg_bytes_with_orientation(16, 8, Some(raw));
            assert_eq!(read_orientation(&bytes), expected, "exif {raw}");
        }
    }

    #[test]
    fn missing_exif_is_normal() {
        let bytes = jpeg_bytes_with_orientation(16, 8, None);
        assert_eq!(read_orientation(&bytes), Orientation::Normal);
    }

    #[test]
    fn garbage_is_normal() {
        assert_eq!(read_orientation(b"not an image"), Orientation::Normal);
        assert_eq!(read_orientation(&[]), Orientation::Normal);
    }
}

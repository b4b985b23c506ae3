//! Image codec backend trait and shared types.
//!
//! The [`ImageBackend`] trait covers the two ends of the pipeline that touch
//! bytes: decode (pixels + orientation tag) and encode (pixels → file). The
//! geometry in between is backend-independent and lives in
//! [`operations`](super::operations).
//!
//! The production implementation,
//! [`RustBackend`](super::rust_backend::RustBackend), is pure Rust and
//! statically linked.

use super::orientation::Orientation;
use super::params::EncodeParams;
use image::DynamicImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// A decoded capture: owned pixels plus the orientation they were stored in.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub image: DynamicImage,
    pub orientation: Orientation,
}

/// Header-level facts about an image file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub dimensions: Dimensions,
    pub orientation: Orientation,
}

/// Trait for image codec backends.
///
/// `Sync` so a single backend can serve every worker in a batch.
pub trait ImageBackend: Sync {
    /// Read dimensions and orientation without decoding pixels where possible.
    fn identify(&self, path: &Path) -> Result<Identity, BackendError>;

    /// Decode pixels and read the orientation tag.
    fn decode(&self, path: &Path) -> Result<Decoded, BackendError>;

    /// Encode `image` to `params.output`, replacing it only once fully written.
    fn encode(&self, image: &DynamicImage, params: &EncodeParams) -> Result<(), BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::params::{OutputFormat, Quality};
    use crate::test_helpers::gradient_image;
    use std::sync::Mutex;

    /// Mock backend that serves queued images and records encodes.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct MockBackend {
        pub decode_results: Mutex<Vec<Decoded>>,
        pub fail_encode: bool,
        /// Decoding this path panics instead of returning.
        pub panic_on: Option<String>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify(String),
        Decode(String),
        Encode {
            output: String,
            width: u32,
            height: u32,
            format: OutputFormat,
            quality: u32,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// Serve one synthetic image per decode call, in order.
        pub fn with_images(images: Vec<((u32, u32), Orientation)>) -> Self {
            let decoded = images
                .into_iter()
                .rev()
                .map(|((w, h), orientation)| Decoded {
                    image: gradient_image(w, h),
                    orientation,
                })
                .collect();
            Self {
                decode_results: Mutex::new(decoded),
                ..Self::default()
            }
        }

        pub fn failing_encode(mut self) -> Self {
            self.fail_encode = true;
            self
        }

        /// Simulate a codec bug: decoding `path` panics.
        pub fn panicking_on(mut self, path: &str) -> Self {
            self.panic_on = Some(path.to_string());
            self
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }
    }

    impl ImageBackend for MockBackend {
        fn identify(&self, path: &Path) -> Result<Identity, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Identify(path.to_string_lossy().to_string()));

            let results = self.decode_results.lock().unwrap();
            let next = results
                .last()
                .ok_or_else(|| BackendError::ProcessingFailed("No mock image".to_string()))?;
            Ok(Identity {
                dimensions: Dimensions {
                    width: next.image.width(),
                    height: next.image.height(),
                },
                orientation: next.orientation,
            })
        }

        fn decode(&self, path: &Path) -> Result<Decoded, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Decode(path.to_string_lossy().to_string()));

            if self.panic_on.as_deref().is_some_and(|p| Path::new(p) == path) {
                panic!("mock decoder crashed on {}", path.display());
            }

            self.decode_results
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| BackendError::ProcessingFailed("No mock image".to_string()))
        }

        fn encode(&self, image: &DynamicImage, params: &EncodeParams) -> Result<(), BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Encode {
                output: params.output.to_string_lossy().to_string(),
                width: image.width(),
                height: image.height(),
                format: params.format,
                quality: params.quality.value(),
            });
            if self.fail_encode {
                return Err(BackendError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "mock destination unwritable",
                )));
            }
            Ok(())
        }
    }

    #[test]
    fn mock_serves_images_in_order() {
        let backend = MockBackend::with_images(vec![
            ((40, 30), Orientation::Normal),
            ((10, 20), Orientation::Rotate90),
        ]);

        let first = backend.decode(Path::new("/a.jpg")).unwrap();
        assert_eq!((first.image.width(), first.image.height()), (40, 30));
        let second = backend.decode(Path::new("/b.jpg")).unwrap();
        assert_eq!(second.orientation, Orientation::Rotate90);
        assert!(backend.decode(Path::new("/c.jpg")).is_err());

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 3);
        assert!(matches!(&ops[0], RecordedOp::Decode(p) if p == "/a.jpg"));
    }

    #[test]
    fn mock_identify_peeks_without_consuming() {
        let backend = MockBackend::with_images(vec![((64, 48), Orientation::Rotate180)]);
        let id = backend.identify(Path::new("/a.jpg")).unwrap();
        assert_eq!(
            id.dimensions,
            Dimensions {
                width: 64,
                height: 48
            }
        );
        assert_eq!(id.orientation, Orientation::Rotate180);
        assert!(backend.decode(Path::new("/a.jpg")).is_ok());
    }

    #[test]
    fn mock_records_encode() {
        let backend = MockBackend::new();

        backend
            .encode(
                &gradient_image(8, 6),
                &EncodeParams {
                    output: "/out.jpg".into(),
                    format: OutputFormat::Jpeg,
                    quality: Quality::new(90),
                },
            )
            .unwrap();

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(
            &ops[0],
            RecordedOp::Encode {
                width: 8,
                height: 6,
                quality: 90,
                ..
            }
        ));
    }

    #[test]
    fn mock_failing_encode_still_records() {
        let backend = MockBackend::new().failing_encode();
        let result = backend.encode(
            &gradient_image(2, 2),
            &EncodeParams {
                output: "/out.jpg".into(),
                format: OutputFormat::Avif,
                quality: Quality::MAX,
            },
        );
        assert!(matches!(result, Err(BackendError::Io(_))));
        assert_eq!(backend.get_operations().len(), 1);
    }
}

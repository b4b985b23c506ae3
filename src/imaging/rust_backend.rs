//! Pure Rust codec backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image` crate, format sniffed from content |
//! | Orientation tag | `kamadak-exif` via [`read_orientation`] |
//! | Identify (AVIF) | `avif-parse` container metadata |
//! | Encode → WebP | `webp::Encoder` (libwebp, lossy) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e, speed 6) |
//! | Atomic replace | `tempfile::NamedTempFile::persist`, permissions carried over |
//!
//! Capture files are named by whoever created them, so the extension is never
//! trusted for decoding: a JPEG saved as `CAP123.webp` decodes as JPEG.

use super::backend::{BackendError, Decoded, Dimensions, Identity, ImageBackend};
use super::orientation::read_orientation;
use super::params::{EncodeParams, OutputFormat};
use image::{DynamicImage, ImageFormat, ImageReader};
use std::borrow::Cow;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

/// Extensions whose decoders are compiled in.
///
/// AVIF is absent: the `image` crate's `"avif"` feature only enables the
/// encoder. AVIF files can be identified but not normalized a second time.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// True if `path` has one of [`supported_input_extensions`] (case-insensitive).
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(e))
        })
}

/// AVIF encoder speed (0 = slowest/best, 10 = fastest).
const AVIF_SPEED: u8 = 6;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Open in-memory bytes with the format guessed from their magic number.
fn sniffed_reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, BackendError> {
    Ok(ImageReader::new(Cursor::new(bytes)).with_guessed_format()?)
}

/// AVIF is an ISO-BMFF file whose `ftyp` box names an `avif`/`avis` brand.
fn is_avif(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[4..8] == b"ftyp" && matches!(&bytes[8..12], b"avif" | b"avis")
}

/// Extract dimensions from an AVIF file's container metadata (no full decode needed).
fn identify_avif(bytes: &[u8], path: &Path) -> Result<Dimensions, BackendError> {
    let avif = avif_parse::read_avif(&mut Cursor::new(bytes)).map_err(|e| {
        BackendError::ProcessingFailed(format!("Failed to parse AVIF {}: {e:?}", path.display()))
    })?;
    let meta = avif.primary_item_metadata().map_err(|e| {
        BackendError::ProcessingFailed(format!(
            "Failed to read AVIF metadata {}: {e:?}",
            path.display()
        ))
    })?;
    Ok(Dimensions {
        width: meta.max_frame_width.get(),
        height: meta.max_frame_height.get(),
    })
}

/// Encoders here take 8-bit RGB; borrow when the buffer already is.
fn as_rgb8(img: &DynamicImage) -> Cow<'_, DynamicImage> {
    match img {
        DynamicImage::ImageRgb8(_) => Cow::Borrowed(img),
        other => Cow::Owned(DynamicImage::ImageRgb8(other.to_rgb8())),
    }
}

/// Lossy WebP through libwebp. The `image` crate's own WebP encoder is
/// lossless only.
fn encode_webp<W: Write>(
    img: &DynamicImage,
    mut writer: W,
    quality: u8,
) -> Result<(), BackendError> {
    let encoder = webp::Encoder::from_image(img)
        .map_err(|e| BackendError::ProcessingFailed(format!("webp encode failed: {e}")))?;
    let encoded = encoder
        .encode_simple(false, f32::from(quality))
        .map_err(|e| BackendError::ProcessingFailed(format!("webp encode failed: {e:?}")))?;
    writer.write_all(&encoded)?;
    Ok(())
}

/// Encode `img` into `writer` with the requested codec.
fn encode_into<W: Write>(
    img: &DynamicImage,
    writer: W,
    format: OutputFormat,
    quality: u8,
) -> Result<(), BackendError> {
    let rgb = as_rgb8(img);
    let result = match format {
        OutputFormat::Webp => return encode_webp(&rgb, writer, quality),
        OutputFormat::Jpeg => rgb.write_with_encoder(
            image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality),
        ),
        OutputFormat::Avif => rgb.write_with_encoder(
            image::codecs::avif::AvifEncoder::new_with_speed_quality(writer, AVIF_SPEED, quality),
        ),
    };
    result.map_err(|e| {
        BackendError::ProcessingFailed(format!("{} encode failed: {}", format.as_str(), e))
    })
}

/// Write `img` next to the destination, sync it, then rename it into place.
///
/// The destination is either the old file or the complete new one; on any
/// error the temp file is dropped (and deleted) and the destination is
/// untouched. An existing destination keeps its permission bits.
fn save_atomically(img: &DynamicImage, params: &EncodeParams) -> Result<(), BackendError> {
    let dir = params
        .output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::Builder::new()
        .prefix(".capture-normalize-")
        .tempfile_in(dir)?;

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        encode_into(
            img,
            &mut writer,
            params.format,
            params.quality.value() as u8,
        )?;
        writer.flush()?;
    }
    if let Ok(existing) = std::fs::metadata(&params.output) {
        tmp.as_file().set_permissions(existing.permissions())?;
    }
    tmp.as_file().sync_all()?;

    tmp.persist(&params.output)
        .map_err(|e| BackendError::Io(e.error))?;
    Ok(())
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Identity, BackendError> {
        let bytes = std::fs::read(path)?;
        let orientation = read_orientation(&bytes);
        let dimensions = if is_avif(&bytes) {
            identify_avif(&bytes, path)?
        } else {
            let (width, height) = sniffed_reader(&bytes)?.into_dimensions().map_err(|e| {
                BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
            })?;
            Dimensions { width, height }
        };

        Ok(Identity {
            dimensions,
            orientation,
        })
    }

    fn decode(&self, path: &Path) -> Result<Decoded, BackendError> {
        let bytes = std::fs::read(path)?;
        let orientation = read_orientation(&bytes);
        let image = sniffed_reader(&bytes)?.decode().map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })?;

        debug!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            ?orientation,
            "decoded capture"
        );
        Ok(Decoded { image, orientation })
    }

    fn encode(&self, image: &DynamicImage, params: &EncodeParams) -> Result<(), BackendError> {
        save_atomically(image, params)?;
        debug!(
            path = %params.output.display(),
            format = params.format.as_str(),
            quality = params.quality.value(),
            "encoded capture"
        );
        Ok(())
    }
}

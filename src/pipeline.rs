//! The capture normalization pipeline.
//!
//! Four stages, strictly in order, on one thread:
//!
//! ```text
//! decode  path → (pixels, orientation)
//! rotate  pixels → upright pixels
//! crop    upright → centered aspect crop → resampled to exact size
//! encode  pixels → temp file → atomic rename onto path
//! ```
//!
//! ## Failure Policy
//!
//! [`run_stages`] returns a typed [`PipelineError`] naming the stage that
//! failed. [`normalize_capture`] wraps it and never fails: any error, and any
//! panic raised inside a codec, is logged and the caller gets back the
//! original path with the original bytes. A post-processing problem must not
//! cost the user the photo they just took.
//!
//! ## Batch Runs
//!
//! [`normalize_batch`] runs one independent pipeline per path on the rayon
//! pool. Runs share nothing but the backend and config, and each one only
//! writes its own destination, so distinct paths never interfere.

use crate::config::NormalizeConfig;
use crate::imaging::{
    BackendError, CropRect, GeometryError, ImageBackend, Orientation, crop_and_resize,
    has_supported_extension, normalize_orientation,
};
use rayon::prelude::*;
use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("decode failed: {0}")]
    Decode(#[source] BackendError),
    #[error("crop failed: {0}")]
    Geometry(#[from] GeometryError),
    #[error("encode failed: {0}")]
    Encode(#[source] BackendError),
    #[error("stage panicked: {0}")]
    Panicked(String),
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// What a successful run did to a capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Normalized {
    pub path: PathBuf,
    /// Decoded size, before rotation.
    pub source: (u32, u32),
    pub orientation: Orientation,
    /// Crop rectangle in upright coordinates.
    pub crop: CropRect,
    pub output: (u32, u32),
}

/// Result handed back to the caller. Both variants carry a usable path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The file at `path` now holds the normalized image.
    Normalized(Normalized),
    /// Normalization failed; the file at `path` is the untouched capture.
    Original { path: PathBuf, reason: String },
}

impl Outcome {
    /// The path to hand back. Always present.
    pub fn path(&self) -> &Path {
        match self {
            Outcome::Normalized(n) => &n.path,
            Outcome::Original { path, .. } => path,
        }
    }

    pub fn is_normalized(&self) -> bool {
        matches!(self, Outcome::Normalized(_))
    }
}

/// Run decode → rotate → crop/resize → encode against `path`, in place.
pub fn run_stages(
    backend: &impl ImageBackend,
    path: &Path,
    config: &NormalizeConfig,
) -> Result<Normalized, PipelineError> {
    let decoded = backend.decode(path).map_err(PipelineError::Decode)?;
    let source = (decoded.image.width(), decoded.image.height());
    let orientation = decoded.orientation;

    let upright = normalize_orientation(decoded.image, orientation);
    let (resized, crop) = crop_and_resize(&upright, &config.crop_config())?;
    drop(upright);
    debug!(
        path = %path.display(),
        ?orientation,
        crop = %format_args!("{}x{}+{}+{}", crop.width, crop.height, crop.x, crop.y),
        "cropped capture"
    );

    backend
        .encode(&resized, &config.encode_params(path))
        .map_err(PipelineError::Encode)?;

    Ok(Normalized {
        path: path.to_path_buf(),
        source,
        orientation,
        crop,
        output: (resized.width(), resized.height()),
    })
}

/// Normalize a capture in place, falling back to the original on any failure.
///
/// Never returns an error. When a stage fails or panics the error is logged
/// at `warn` and the result is [`Outcome::Original`]; the file is left as it
/// was.
pub fn normalize_capture(
    backend: &impl ImageBackend,
    path: &Path,
    config: &NormalizeConfig,
) -> Outcome {
    let result = panic::catch_unwind(AssertUnwindSafe(|| run_stages(backend, path, config)))
        .unwrap_or_else(|payload| Err(PipelineError::Panicked(panic_message(&*payload))));

    match result {
        Ok(normalized) => {
            info!(
                path = %path.display(),
                output = %format_args!("{}x{}", normalized.output.0, normalized.output.1),
                "normalized capture"
            );
            Outcome::Normalized(normalized)
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "normalization failed, keeping original capture"
            );
            Outcome::Original {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        }
    }
}

/// Progress events emitted by [`normalize_batch`].
#[derive(Debug, Clone)]
pub enum NormalizeEvent {
    Started { total: usize },
    Finished { index: usize, outcome: Outcome },
}

/// Normalize many captures in parallel.
///
/// Outcomes are returned in input order. `Finished` events arrive in
/// completion order and carry the input index.
pub fn normalize_batch(
    backend: &impl ImageBackend,
    paths: &[PathBuf],
    config: &NormalizeConfig,
    events: Option<Sender<NormalizeEvent>>,
) -> Vec<Outcome> {
    let emit = |event: NormalizeEvent| {
        if let Some(tx) = &events {
            tx.send(event).ok();
        }
    };

    emit(NormalizeEvent::Started { total: paths.len() });

    paths
        .par_iter()
        .enumerate()
        .map(|(index, path)| {
            let outcome = normalize_capture(backend, path, config);
            emit(NormalizeEvent::Finished {
                index,
                outcome: outcome.clone(),
            });
            outcome
        })
        .collect()
}

/// Expand inputs into capture files.
///
/// Directories are walked recursively and contribute files with a decodable
/// extension, sorted by path. Anything else is passed through unchanged: a
/// capture can carry any name, and a missing file simply falls back later.
pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        for entry in WalkDir::new(input).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() && has_supported_extension(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }
    Ok(files)
}

/// Number of outcomes that actually normalized their file.
pub fn count_normalized(outcomes: &[Outcome]) -> usize {
    outcomes.iter().filter(|o| o.is_normalized()).count()
}

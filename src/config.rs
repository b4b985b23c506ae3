//! Normalization configuration.
//!
//! Every constant the pipeline uses (crop ratio, output size, codec, quality,
//! resample filter) lives in one immutable [`NormalizeConfig`] that is passed
//! into the pipeline entry points. Nothing in the pipeline embeds these as
//! literals, so tests can run the whole chain with small targets.
//!
//! ## Config File
//!
//! The CLI reads `capture-normalize.toml` from the working directory (or the
//! path given with `--config`). A missing file means stock defaults.
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! aspect_ratio = [3, 4]     # crop ratio, width:height
//! resample = "lanczos3"     # lanczos3 | catmull-rom | triangle
//!
//! [output]
//! width = 1000              # exact output width in pixels
//! height = 1334             # exact output height in pixels
//! format = "webp"           # webp | jpeg | avif
//! quality = 100             # 1-100
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [output]
//! format = "avif"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{
    AspectRatio, CropConfig, EncodeParams, OutputFormat, Quality, ResampleFilter,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Config file the CLI looks for when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "capture-normalize.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Pipeline configuration loaded from a TOML file.
///
/// All fields have defaults matching the capture plugin's behaviour: 3:4
/// crop, 1000x1334 output, maximum quality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizeConfig {
    /// Crop ratio as `[width, height]`.
    pub aspect_ratio: [u32; 2],
    /// Interpolating filter for the final resample.
    pub resample: ResampleFilter,
    /// Output size and encoding.
    pub output: OutputConfig,
    /// Parallel processing settings for batch runs.
    pub processing: ProcessingConfig,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: [3, 4],
            resample: ResampleFilter::default(),
            output: OutputConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl NormalizeConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.aspect_ratio[0] == 0 || self.aspect_ratio[1] == 0 {
            return Err(ConfigError::Validation(
                "aspect_ratio values must be non-zero".into(),
            ));
        }
        if self.output.width == 0 || self.output.height == 0 {
            return Err(ConfigError::Validation(
                "output.width and output.height must be non-zero".into(),
            ));
        }
        let max = self.output.format.max_dimension();
        if self.output.width > max || self.output.height > max {
            return Err(ConfigError::Validation(format!(
                "output size {}x{} exceeds the {} limit of {} pixels per side",
                self.output.width,
                self.output.height,
                self.output.format.as_str(),
                max
            )));
        }
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        Ok(())
    }

    /// Geometry settings for the crop/resize stage.
    pub fn crop_config(&self) -> CropConfig {
        CropConfig {
            aspect: AspectRatio::from(self.aspect_ratio),
            target: (self.output.width, self.output.height),
            filter: self.resample,
        }
    }

    /// Encoder settings for writing to `output`.
    pub fn encode_params(&self, output: &Path) -> EncodeParams {
        EncodeParams {
            output: output.to_path_buf(),
            format: self.output.format,
            quality: Quality::new(self.output.quality),
        }
    }
}

/// Output size and encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Exact output width in pixels.
    pub width: u32,
    /// Exact output height in pixels.
    pub height: u32,
    /// Lossy codec.
    pub format: OutputFormat,
    /// Encoding quality (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 1334,
            format: OutputFormat::default(),
            quality: Quality::MAX.value(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel normalization workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(NormalizeConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<NormalizeConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: NormalizeConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the TOML file at `path`.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result. A missing file yields the stock defaults.
pub fn load_config(path: &Path) -> Result<NormalizeConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# capture-normalize configuration
# ===============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# Crop ratio as [width, height]. The largest centered rectangle of this
# ratio is cut from the upright capture before resampling.
aspect_ratio = [3, 4]

# Resample filter used to scale the crop to the output size.
# One of: "lanczos3", "catmull-rom", "triangle".
resample = "lanczos3"

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Exact output size in pixels. The crop is stretched to fit if its ratio
# is a pixel off after rounding.
width = 1000
height = 1334

# Lossy codec written over the capture: "webp", "jpeg" or "avif".
# WebP sides are limited to 16383 pixels, JPEG and AVIF to 65535.
format = "webp"

# Encoding quality (1 = worst, 100 = best).
quality = 100

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers when normalizing several files.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

//! CLI output formatting.
//!
//! Every `format_*` function is pure and returns the lines to print, so the
//! layout is unit-tested without capturing stdout. The `print_*` wrappers are
//! the only place that writes.
//!
//! ```text
//! 001 CAP123.jpg
//!     4000x3000 rotate_90 → crop 1500x2000+1250+0 → 1000x1334
//! 002 CAP124.jpg
//!     kept original: decode failed: Processing failed: ...
//! Normalized 1 of 2
//! ```

use crate::imaging::{Identity, NormalizePlan, Orientation};
use crate::pipeline::{NormalizeEvent, Outcome};
use std::path::Path;

fn format_index(pos: usize) -> String {
    format!("{:03}", pos)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn orientation_label(orientation: Orientation) -> &'static str {
    match orientation {
        Orientation::Normal => "upright",
        Orientation::Rotate90 => "rotate_90",
        Orientation::Rotate180 => "rotate_180",
        Orientation::Rotate270 => "rotate_270",
    }
}

/// Format one outcome as a header line plus an indented detail line.
///
/// `index` is zero-based; it is displayed one-based.
pub fn format_outcome(index: usize, outcome: &Outcome) -> Vec<String> {
    let header = format!("{} {}", format_index(index + 1), display_name(outcome.path()));
    let detail = match outcome {
        Outcome::Normalized(n) => format!(
            "    {}x{} {} → crop {}x{}+{}+{} → {}x{}",
            n.source.0,
            n.source.1,
            orientation_label(n.orientation),
            n.crop.width,
            n.crop.height,
            n.crop.x,
            n.crop.y,
            n.output.0,
            n.output.1,
        ),
        Outcome::Original { reason, .. } => format!("    kept original: {}", reason),
    };
    vec![header, detail]
}

/// Format a single batch progress event as display lines.
pub fn format_event(event: &NormalizeEvent) -> Vec<String> {
    match event {
        NormalizeEvent::Started { total } => {
            let noun = if *total == 1 { "capture" } else { "captures" };
            vec![format!("Normalizing {} {}", total, noun)]
        }
        NormalizeEvent::Finished { index, outcome } => format_outcome(*index, outcome),
    }
}

/// One-line summary after a batch.
pub fn format_summary(outcomes: &[Outcome]) -> String {
    let normalized = crate::pipeline::count_normalized(outcomes);
    format!("Normalized {} of {}", normalized, outcomes.len())
}

/// Format a crop plan for the `plan` command.
pub fn format_plan(plan: &NormalizePlan) -> Vec<String> {
    vec![
        format!("Source:      {}x{}", plan.source.0, plan.source.1),
        format!(
            "Orientation: {} ({}°)",
            orientation_label(plan.orientation),
            plan.orientation.degrees()
        ),
        format!("Upright:     {}x{}", plan.upright.0, plan.upright.1),
        format!(
            "Crop:        {}x{} at ({}, {})",
            plan.crop.width, plan.crop.height, plan.crop.x, plan.crop.y
        ),
        format!("Output:      {}x{}", plan.output.0, plan.output.1),
    ]
}

/// Format the result of `identify`.
pub fn format_identity(path: &Path, identity: &Identity) -> Vec<String> {
    vec![
        display_name(path),
        format!(
            "    {}x{} {}",
            identity.dimensions.width,
            identity.dimensions.height,
            orientation_label(identity.orientation)
        ),
    ]
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

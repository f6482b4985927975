//! CLI output formatting for the scan and crop stages.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Images in photos/
//! 001 beach_lt.jpg
//!     Anchor: left/top
//! 002 city.png
//!     Anchor: center/center (default)
//! 003 trip/day1_l.webp
//!     Anchor: left/center (default vertical)
//! ```
//!
//! ## Crop
//!
//! ```text
//! Cropping 3 images
//!     photos/beach_lt.jpg → output/beach_lt.jpg (3000x3000 @ 0,0, left/top)
//!     photos/city.png → output/city.png (1080x1080 @ 420,0, center/center)
//!     photos/broken.png skipped: Failed to read image photos/broken.png: ...
//!
//! Cropped 2 images, skipped 1
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure,
//! no I/O.

use crate::pivot::{Anchor, PivotSuffix};
use crate::process::{ProcessEvent, ProcessResult};
use crate::scan::ScanManifest;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Mark the axes that fell back to the default anchor.
fn default_marker(pivots: &PivotSuffix) -> &'static str {
    match (pivots.horizontal.is_some(), pivots.vertical.is_some()) {
        (true, true) => "",
        (false, false) => " (default)",
        (false, true) => " (default horizontal)",
        (true, false) => " (default vertical)",
    }
}

// ============================================================================
// Scan output
// ============================================================================

/// Format the scan manifest: one entry per image with its resolved anchor.
pub fn format_scan_output(manifest: &ScanManifest, default: Anchor) -> Vec<String> {
    if manifest.images.is_empty() {
        return vec![format!("No images found in {}", manifest.root.display())];
    }

    let mut lines = vec![format!("Images in {}", manifest.root.display())];
    for (i, image) in manifest.images.iter().enumerate() {
        lines.push(format!(
            "{} {}",
            format_index(i + 1),
            image.relative.display()
        ));
        lines.push(format!(
            "{}Anchor: {}{}",
            indent(1),
            image.pivots.resolve(default),
            default_marker(&image.pivots)
        ));
    }
    lines
}

pub fn print_scan_output(manifest: &ScanManifest, default: Anchor) {
    for line in format_scan_output(manifest, default) {
        println!("{}", line);
    }
}

// ============================================================================
// Crop output
// ============================================================================

/// Format a single crop progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::Started { total } => {
            vec![format!("Cropping {}", plural(*total, "image"))]
        }
        ProcessEvent::Cropped(cropped) => {
            let outcome = &cropped.outcome;
            vec![format!(
                "{}{} → {} ({}x{} @ {},{}, {})",
                indent(1),
                cropped.source.display(),
                cropped.output.display(),
                outcome.written.width,
                outcome.written.height,
                outcome.rect.x,
                outcome.rect.y,
                cropped.anchor
            )]
        }
        ProcessEvent::Skipped(skipped) => vec![format!(
            "{}{} skipped: {}",
            indent(1),
            skipped.source.display(),
            skipped.reason
        )],
    }
}

/// Format the closing summary of a crop run.
pub fn format_summary(result: &ProcessResult) -> Vec<String> {
    let cropped = format!("Cropped {}", plural(result.cropped.len(), "image"));
    if result.skipped.is_empty() {
        vec![cropped]
    } else {
        vec![format!("{cropped}, skipped {}", result.skipped.len())]
    }
}

pub fn print_summary(result: &ProcessResult) {
    println!();
    for line in format_summary(result) {
        println!("{}", line);
    }
}

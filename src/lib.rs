//! # squarecrop
//!
//! Crops every image in a directory to a square. The shorter side is kept
//! whole and the longer side is cut down to match; a pivot code at the end
//! of each filename picks which part of the longer side survives.
//!
//! ```text
//! sunset_lb.jpg
//!        ││
//!        │└─ vertical pivot:   t = top,  c = center, b = bottom
//!        └── horizontal pivot: l = left, c = center, r = right
//! ```
//!
//! Missing or unknown codes fall back to a configurable default anchor,
//! center/center out of the box.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Scan   source/   →  ScanManifest   (files → images + decoded pivots)
//! 2. Crop   manifest  →  output/        (square crops, same relative paths)
//! ```
//!
//! The crop geometry is pure integer math in [`imaging`], kept apart from
//! decoding and encoding so it can be tested without touching the filesystem.
//! Pixel work sits behind the [`imaging::ImageBackend`] trait.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pivot`] | Pivot enums and the filename suffix decoder |
//! | [`scan`] | Stage 1: walks the source directory, classifies image files, decodes pivots |
//! | [`process`] | Stage 2: crops every scanned image in parallel, skipping failures |
//! | [`imaging`] | Square crop geometry plus the pure-Rust decode/crop/encode backend |
//! | [`config`] | `config.toml` loading, validation and the stock config |
//! | [`output`] | CLI output formatting for both stages |
//!
//! # Design Decisions
//!
//! ## Same Format In, Same Format Out
//!
//! A cropped file keeps its name and format. JPEG output is re-encoded at the
//! configured quality; every other format is written losslessly.
//!
//! ## One Bad File Never Stops a Batch
//!
//! Unreadable or undecodable images are logged and reported as skipped. Only
//! a source directory that cannot be read at all is a fatal error.
//!
//! ## Atomic Writes
//!
//! Each crop is encoded in memory, written to a hidden sibling file and
//! renamed into place, so an interrupted run never leaves a truncated image
//! at the output path.

pub mod config;
pub mod imaging;
pub mod output;
pub mod pivot;
pub mod process;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;

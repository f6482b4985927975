//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take an anchor, compute the crop rectangle, and call the backend.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{CropRect, square_crop};
use super::params::{CropParams, Quality};
use crate::pivot::Anchor;
use std::path::Path;
use tracing::debug;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// What a finished square crop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropOutcome {
    /// Source image dimensions.
    pub original: Dimensions,
    /// Region taken from the source.
    pub rect: CropRect,
    /// Dimensions of the written image.
    pub written: Dimensions,
}

/// Plan a square crop without executing it.
///
/// Useful for testing parameter generation.
pub fn plan_square_crop(
    source: &Path,
    output: &Path,
    dims: (u32, u32),
    anchor: Anchor,
    quality: Quality,
) -> CropParams {
    let (width, height) = dims;
    CropParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        rect: square_crop(width, height, anchor),
        quality,
    }
}

/// Crop `source` to its largest square, positioned by `anchor`, and write it
/// to `output`.
pub fn crop_square(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    anchor: Anchor,
    quality: Quality,
) -> Result<CropOutcome> {
    let (width, height) = get_dimensions(backend, source)?;
    let params = plan_square_crop(source, output, (width, height), anchor, quality);
    debug!(
        source = %source.display(),
        %anchor,
        x = params.rect.x,
        y = params.rect.y,
        side = params.rect.width,
        "planned square crop"
    );
    let written = backend.crop(&params)?;

    Ok(CropOutcome {
        original: Dimensions { width, height },
        rect: params.rect,
        written,
    })
}

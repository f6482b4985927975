//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations every backend must
//! support: identify and crop.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Decoding and encoding stay behind this trait so crop planning can be
//! tested without touching pixels.

use super::params::CropParams;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure of a single image operation.
///
/// `Decode` and `Encode` are per-file problems: the batch driver reports
/// them and moves on to the next image.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to read image {}: {}", path.display(), reason)]
    Decode { path: PathBuf, reason: String },
    #[error("Failed to write image {}: {}", path.display(), reason)]
    Encode { path: PathBuf, reason: String },
}

impl BackendError {
    pub fn decode(path: &Path, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn encode(path: &Path, reason: impl ToString) -> Self {
        Self::Encode {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// `Sync` so one backend can be shared across the rayon pool.
pub trait ImageBackend: Sync {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Cut `params.rect` out of the source and write it to `params.output`.
    ///
    /// Missing parent directories are created and an existing file is
    /// replaced. On error the output path is left as it was.
    /// Returns the dimensions of the written image.
    fn crop(&self, params: &CropParams) -> Result<Dimensions, BackendError>;
}

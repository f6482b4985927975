//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageReader::into_dimensions` with content sniffing |
//! | Decode (BMP, GIF, JPEG, PNG, TIFF, WebP) | `image::ImageReader` with content sniffing |
//! | Crop | `image::DynamicImage::crop_imm` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` with [`Quality`](super::Quality) |
//! | Encode → other formats | `image::DynamicImage::write_to`, format from the output extension |
//!
//! Output is encoded in memory first, then written to a hidden sibling file
//! and renamed into place. A failed crop never leaves a half-written image
//! at the destination.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::CropParams;
use crate::scan::ImageType;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::debug;

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

/// Load and decode an image from disk.
///
/// The format is sniffed from the file content, so a PNG saved as `.jpg`
/// still decodes.
pub fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    let reader = ImageReader::open(path)
        .map_err(|e| BackendError::decode(path, e))?
        .with_guessed_format()
        .map_err(|e| BackendError::decode(path, e))?;
    let img = reader.decode().map_err(|e| BackendError::decode(path, e))?;
    debug!(
        path = %path.display(),
        width = img.width(),
        height = img.height(),
        "decoded image"
    );
    Ok(img)
}

/// Encode `img` for `format` into an in-memory buffer.
///
/// Pixels are converted to a color type each encoder accepts: JPEG has no
/// alpha, and the BMP/GIF/WebP encoders only take 8-bit channels.
fn encode(img: &DynamicImage, format: ImageType, quality: u32) -> image::ImageResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    match format {
        ImageType::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100) as u8);
            DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?;
        }
        ImageType::Bmp | ImageType::Gif | ImageType::Webp => {
            DynamicImage::ImageRgba8(img.to_rgba8()).write_to(&mut buf, format.image_format())?;
        }
        ImageType::Png | ImageType::Tiff => {
            img.write_to(&mut buf, format.image_format())?;
        }
    }
    Ok(buf.into_inner())
}

/// Hidden sibling used while writing `path`.
fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.partial"))
}

/// Write `bytes` to `path`, creating parent directories and replacing any
/// existing file. Either the whole file lands or nothing changes.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), BackendError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| BackendError::encode(path, e))?;
    }
    let partial = partial_path(path);
    if let Err(e) = std::fs::write(&partial, bytes).and_then(|()| std::fs::rename(&partial, path))
    {
        let _ = std::fs::remove_file(&partial);
        return Err(BackendError::encode(path, e));
    }
    Ok(())
}

/// Encode and save an image, inferring the format from the path's extension.
pub fn save_image(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let format = ImageType::from_path(path)
        .ok_or_else(|| BackendError::encode(path, "unsupported output format"))?;
    let bytes = encode(img, format, quality).map_err(|e| BackendError::encode(path, e))?;
    write_atomically(path, &bytes)
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        // Content decides the format, as in load_image
        let (width, height) = ImageReader::open(path)
            .map_err(|e| BackendError::decode(path, e))?
            .with_guessed_format()
            .map_err(|e| BackendError::decode(path, e))?
            .into_dimensions()
            .map_err(|e| BackendError::decode(path, e))?;
        Ok(Dimensions { width, height })
    }

    fn crop(&self, params: &CropParams) -> Result<Dimensions, BackendError> {
        let img = load_image(&params.source)?;
        let rect = params.rect;
        if !rect.is_within(img.width(), img.height()) {
            return Err(BackendError::decode(
                &params.source,
                format!(
                    "crop {}x{}+{}+{} outside {}x{} image",
                    rect.width,
                    rect.height,
                    rect.x,
                    rect.y,
                    img.width(),
                    img.height()
                ),
            ));
        }

        let cropped = img.crop_imm(rect.x, rect.y, rect.width, rect.height);
        save_image(&cropped, &params.output, params.quality.value())?;
        debug!(
            output = %params.output.display(),
            width = cropped.width(),
            height = cropped.height(),
            "wrote cropped image"
        );
        Ok(Dimensions {
            width: cropped.width(),
            height: cropped.height(),
        })
    }
}

//! Shared test utilities for the squarecrop test suite.
//!
//! Builds throwaway source directories: empty placeholder files for scan
//! tests, and small real images for backend tests.

use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use std::fs;
use std::path::Path;

// =========================================================================
// Fixture setup
// =========================================================================

/// Create empty files (and their parent directories) under `dir`.
///
/// Content does not matter to the scanner, only names do.
pub fn touch_files(dir: &Path, names: &[&str]) {
    for name in names {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, b"").unwrap();
    }
}

/// Write a real `width` x `height` image, format chosen by the extension.
pub fn create_test_image(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    });
    let is_jpeg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"));
    let dynamic = if is_jpeg {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(img).to_rgb8())
    } else {
        DynamicImage::ImageRgba8(img)
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    dynamic.save(path).unwrap();
}

/// Write a lossless PNG whose red channel is the x coordinate and green
/// channel the y coordinate, so crops can be checked pixel by pixel.
///
/// Both dimensions must be at most 256.
pub fn create_gradient_png(path: &Path, width: u32, height: u32) {
    assert!(width <= 256 && height <= 256);
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 0]));
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

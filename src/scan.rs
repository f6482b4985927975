//! Image discovery.
//!
//! Stage 1 of a crop run. Lists the image files in a source directory and
//! decodes the pivot suffix of each, producing a [`ScanManifest`] the
//! [`process`](crate::process) stage consumes.
//!
//! ## Classification
//!
//! A file is an image when it exists and the text after the final `.` of its
//! name is one of these (case-insensitive):
//!
//! | Extension | Type |
//! |-----------|------|
//! | `bmp` | [`ImageType::Bmp`] |
//! | `gif` | [`ImageType::Gif`] |
//! | `jpg`, `jpeg` | [`ImageType::Jpeg`] |
//! | `png` | [`ImageType::Png`] |
//! | `tiff` | [`ImageType::Tiff`] |
//! | `webp` | [`ImageType::Webp`] |
//!
//! Classification looks at the name only. A `.pdf` full of JPEG bytes is
//! skipped; a `.png` that is really text is listed and fails later, at
//! decode time.
//!
//! ## Walk
//!
//! Only the top level is listed unless [`ScanOptions::recursive`] is set.
//! Hidden entries (leading `.`) and any [`ScanOptions::exclude`] directory
//! are skipped. Results are sorted by path so runs are reproducible.

use crate::pivot::{PivotSuffix, parse_pivot_suffix};
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Source directory not found: {0}")]
    NotFound(PathBuf),
    #[error("Source is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Image file types recognized by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    Bmp,
    Gif,
    Jpeg,
    Png,
    Tiff,
    Webp,
}

impl ImageType {
    /// Classify an extension (without the dot), ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "bmp" => Some(Self::Bmp),
            "gif" => Some(Self::Gif),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "tiff" => Some(Self::Tiff),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Classify a path by its file name. Does not touch the filesystem.
    pub fn from_path(path: &Path) -> Option<Self> {
        file_type(path).and_then(|ext| Self::from_extension(&ext))
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Bmp => ImageFormat::Bmp,
            Self::Gif => ImageFormat::Gif,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::Tiff => ImageFormat::Tiff,
            Self::Webp => ImageFormat::WebP,
        }
    }
}

/// Lower-cased text after the final `.` of the file name.
///
/// `doc/document.txt` → `txt`, `image/familyPhoto.JPG` → `jpg`,
/// `README` → `None`.
pub fn file_type(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    let dot = name.rfind('.')?;
    Some(name[dot + 1..].to_lowercase())
}

/// True if `path` is an existing file with a recognized image extension.
pub fn is_image_file(path: &Path) -> bool {
    path.is_file() && ImageType::from_path(path).is_some()
}

/// File name without its final extension, or `None` if `path` does not exist.
///
/// `doc/document.txt` → `document`, `image/familyPhoto.jpg` → `familyPhoto`,
/// `archive.tar.gz` → `archive.tar`.
pub fn file_stem(path: &Path) -> Option<String> {
    if !path.exists() {
        return None;
    }
    let name = path.file_name()?.to_string_lossy();
    let end = name.rfind('.').unwrap_or(name.len());
    Some(name[..end].to_string())
}

/// How to walk the source directory.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Directories to leave out of the walk (e.g. the output directory).
    pub exclude: Vec<PathBuf>,
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn is_excluded(entry: &DirEntry, excluded: &[PathBuf]) -> bool {
    if excluded.is_empty() || !entry.file_type().is_dir() {
        return false;
    }
    std::fs::canonicalize(entry.path())
        .map(|p| excluded.contains(&p))
        .unwrap_or(false)
}

/// Find every image file under `dir`, sorted by path.
pub fn find_image_files(dir: &Path, options: &ScanOptions) -> Result<Vec<PathBuf>, ScanError> {
    if !dir.exists() {
        return Err(ScanError::NotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(ScanError::NotADirectory(dir.to_path_buf()));
    }

    // Only directories that already exist can contain stale output
    let excluded: Vec<PathBuf> = options
        .exclude
        .iter()
        .filter_map(|p| std::fs::canonicalize(p).ok())
        .collect();

    let max_depth = if options.recursive { usize::MAX } else { 1 };
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e) && !is_excluded(e, &excluded));

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            // The root itself is unreadable
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if is_image_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// One discovered image.
#[derive(Debug, Clone, Serialize)]
pub struct ScannedImage {
    /// Path as found during the walk.
    pub source: PathBuf,
    /// Path relative to the scan root; also the output-relative path.
    pub relative: PathBuf,
    /// File name without extension.
    pub stem: String,
    pub image_type: ImageType,
    /// Pivots encoded in the stem, if any.
    pub pivots: PivotSuffix,
}

/// Output of the scan stage.
#[derive(Debug, Serialize)]
pub struct ScanManifest {
    pub root: PathBuf,
    pub images: Vec<ScannedImage>,
}

/// Scan `root` and decode the pivot suffix of every image found.
pub fn scan(root: &Path, options: &ScanOptions) -> Result<ScanManifest, ScanError> {
    let images = find_image_files(root, options)?
        .into_iter()
        .filter_map(|source| {
            let image_type = ImageType::from_path(&source)?;
            let stem = file_stem(&source).unwrap_or_default();
            let relative = source
                .strip_prefix(root)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| PathBuf::from(source.file_name().unwrap_or_default()));
            Some(ScannedImage {
                pivots: parse_pivot_suffix(&stem),
                source,
                relative,
                stem,
                image_type,
            })
        })
        .collect();

    Ok(ScanManifest {
        root: root.to_path_buf(),
        images,
    })
}

//! Batch square cropping.
//!
//! Stage 2 of a crop run. Takes the [`ScanManifest`] from the scan stage and
//! crops every image to a square, writing it under the output directory at
//! the same relative path:
//!
//! ```text
//! photos/                     output/
//! ├── beach_lt.jpg   ──────▶  ├── beach_lt.jpg     (left/top)
//! ├── city.png       ──────▶  ├── city.png         (default anchor)
//! └── trip/                   └── trip/
//!     └── day1_rb.webp ────▶      └── day1_rb.webp (right/bottom)
//! ```
//!
//! ## Failure handling
//!
//! Each image stands alone. An image that cannot be decoded or written is
//! logged, reported as [`ProcessEvent::Skipped`], and the batch carries on.
//! Only a source directory that cannot be scanned fails the whole run.
//!
//! ## Parallel Processing
//!
//! Images are cropped in parallel using [rayon](https://docs.rs/rayon). No
//! state is shared between images and every image has its own output path,
//! so the only ordering is in reporting: events arrive as crops finish,
//! while [`ProcessResult`] lists images in scan order.

use crate::config::CropConfig;
use crate::imaging::{CropOutcome, ImageBackend, Quality, RustBackend, crop_square};
use crate::pivot::Anchor;
use crate::scan::{ScanError, ScanManifest, ScanOptions, ScannedImage, scan};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),
}

/// Settings for a crop run.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Anchor for axes the filename does not encode.
    pub default_anchor: Anchor,
    pub quality: Quality,
    pub recursive: bool,
}

impl ProcessOptions {
    pub fn from_config(config: &CropConfig) -> Self {
        Self {
            default_anchor: config.default_anchor(),
            quality: Quality::new(config.output.quality),
            recursive: config.scan.recursive,
        }
    }
}

/// An image that was cropped and written.
#[derive(Debug, Clone)]
pub struct CroppedImage {
    pub source: PathBuf,
    pub output: PathBuf,
    pub anchor: Anchor,
    pub outcome: CropOutcome,
}

/// An image that was left alone, and why.
#[derive(Debug, Clone)]
pub struct SkippedImage {
    pub source: PathBuf,
    pub reason: String,
}

/// Progress reported while a batch runs.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    /// Scan finished; `total` images will be attempted.
    Started { total: usize },
    Cropped(CroppedImage),
    Skipped(SkippedImage),
}

/// Outcome of a whole batch, in scan order.
#[derive(Debug, Default)]
pub struct ProcessResult {
    pub cropped: Vec<CroppedImage>,
    pub skipped: Vec<SkippedImage>,
}

impl ProcessResult {
    pub fn total(&self) -> usize {
        self.cropped.len() + self.skipped.len()
    }
}

/// Scan `source` and crop every image found into `output_dir`.
pub fn process(
    source: &Path,
    output_dir: &Path,
    options: &ProcessOptions,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    let backend = RustBackend::new();
    process_with_backend(&backend, source, output_dir, options, events)
}

/// Process images using a specific backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl ImageBackend,
    source: &Path,
    output_dir: &Path,
    options: &ProcessOptions,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    let scan_options = ScanOptions {
        recursive: options.recursive,
        exclude: vec![output_dir.to_path_buf()],
    };
    let manifest = scan(source, &scan_options)?;
    Ok(process_manifest(
        backend,
        &manifest,
        output_dir,
        options,
        events.as_ref(),
    ))
}

/// Crop every image of an existing manifest.
///
/// Never fails as a whole: per-image errors end up in
/// [`ProcessResult::skipped`].
pub fn process_manifest(
    backend: &impl ImageBackend,
    manifest: &ScanManifest,
    output_dir: &Path,
    options: &ProcessOptions,
    events: Option<&Sender<ProcessEvent>>,
) -> ProcessResult {
    let total = manifest.images.len();
    info!(
        source = %manifest.root.display(),
        output = %output_dir.display(),
        total,
        "cropping images"
    );
    emit(events, ProcessEvent::Started { total });

    let outcomes: Vec<Result<CroppedImage, SkippedImage>> = manifest
        .images
        .par_iter()
        .map(|image| {
            let result = crop_one(backend, image, output_dir, options);
            let event = match &result {
                Ok(cropped) => ProcessEvent::Cropped(cropped.clone()),
                Err(skipped) => ProcessEvent::Skipped(skipped.clone()),
            };
            emit(events, event);
            result
        })
        .collect();

    let mut result = ProcessResult::default();
    for outcome in outcomes {
        match outcome {
            Ok(cropped) => result.cropped.push(cropped),
            Err(skipped) => result.skipped.push(skipped),
        }
    }
    info!(
        cropped = result.cropped.len(),
        skipped = result.skipped.len(),
        "batch finished"
    );
    result
}

fn emit(events: Option<&Sender<ProcessEvent>>, event: ProcessEvent) {
    if let Some(tx) = events {
        // A dropped receiver only means nobody is watching
        let _ = tx.send(event);
    }
}

fn crop_one(
    backend: &impl ImageBackend,
    image: &ScannedImage,
    output_dir: &Path,
    options: &ProcessOptions,
) -> Result<CroppedImage, SkippedImage> {
    let anchor = image.pivots.resolve(options.default_anchor);
    let output = output_dir.join(&image.relative);

    match crop_square(backend, &image.source, &output, anchor, options.quality) {
        Ok(outcome) => Ok(CroppedImage {
            source: image.source.clone(),
            output,
            anchor,
            outcome,
        }),
        Err(e) => {
            warn!(source = %image.source.display(), error = %e, "skipping image");
            Err(SkippedImage {
                source: image.source.clone(),
                reason: e.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::imaging::{CropRect, Dimensions};
    use crate::pivot::{HorizontalPivot, VerticalPivot};
    use crate::test_helpers::touch_files;
    use tempfile::TempDir;

    fn crop_rects(backend: &MockBackend) -> Vec<(String, CropRect)> {
        backend
            .crops()
            .into_iter()
            .filter_map(|op| match op {
                RecordedOp::Crop { output, rect, .. } => Some((output, rect)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn options_from_config() {
        let mut config = CropConfig::default();
        config.pivot.horizontal = HorizontalPivot::Right;
        config.output.quality = 70;
        config.scan.recursive = true;

        let options = ProcessOptions::from_config(&config);
        assert_eq!(
            options.default_anchor,
            Anchor::new(HorizontalPivot::Right, VerticalPivot::Center)
        );
        assert_eq!(options.quality, Quality::new(70));
        assert!(options.recursive);
    }

    #[test]
    fn process_applies_filename_pivots() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("in");
        touch_files(&source, &["wide.png", "tall_lb.jpg", "square_rt.bmp"]);
        let out = tmp.path().join("out");

        let backend = MockBackend::with_dimensions(&[
            ("wide.png", 1920, 1080),
            ("tall_lb.jpg", 1080, 1920),
            ("square_rt.bmp", 640, 640),
        ]);
        let result =
            process_with_backend(&backend, &source, &out, &ProcessOptions::default(), None)
                .unwrap();

        assert_eq!(result.cropped.len(), 3);
        assert!(result.skipped.is_empty());

        // Scan order is sorted by path
        let anchors: Vec<Anchor> = result.cropped.iter().map(|c| c.anchor).collect();
        assert_eq!(
            anchors,
            vec![
                Anchor::new(HorizontalPivot::Right, VerticalPivot::Top),
                Anchor::new(HorizontalPivot::Left, VerticalPivot::Bottom),
                Anchor::default(),
            ]
        );

        let wide = &result.cropped[2];
        assert_eq!(wide.output, out.join("wide.png"));
        assert_eq!(
            wide.outcome.rect,
            CropRect {
                x: 420,
                y: 0,
                width: 1080,
                height: 1080
            }
        );

        let tall = &result.cropped[1];
        assert_eq!((tall.outcome.rect.x, tall.outcome.rect.y), (0, 840));

        let square = &result.cropped[0];
        assert_eq!(square.outcome.written, square.outcome.original);
    }

    #[test]
    fn default_anchor_fills_missing_axes() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("in");
        touch_files(&source, &["plain.png", "half_l.png"]);

        let backend =
            MockBackend::with_dimensions(&[("plain.png", 100, 300), ("half_l.png", 100, 300)]);
        let options = ProcessOptions {
            default_anchor: Anchor::new(HorizontalPivot::Right, VerticalPivot::Bottom),
            ..ProcessOptions::default()
        };
        let result =
            process_with_backend(&backend, &source, &tmp.path().join("out"), &options, None)
                .unwrap();

        let half = &result.cropped[0];
        assert_eq!(
            half.anchor,
            Anchor::new(HorizontalPivot::Left, VerticalPivot::Bottom)
        );
        assert_eq!(half.outcome.rect.y, 200);

        let plain = &result.cropped[1];
        assert_eq!(
            plain.anchor,
            Anchor::new(HorizontalPivot::Right, VerticalPivot::Bottom)
        );
    }

    #[test]
    fn decode_failure_is_skipped_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("in");
        touch_files(&source, &["broken.jpg", "good.jpg"]);

        // No dimensions for broken.jpg → decode error
        let backend = MockBackend::with_dimensions(&[("good.jpg", 300, 200)]);
        let result = process_with_backend(
            &backend,
            &source,
            &tmp.path().join("out"),
            &ProcessOptions::default(),
            None,
        )
        .unwrap();

        assert_eq!(result.cropped.len(), 1);
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].source, source.join("broken.jpg"));
        assert!(result.skipped[0].reason.contains("Failed to read image"));
        assert_eq!(crop_rects(&backend).len(), 1);
    }

    #[test]
    fn encode_failure_is_skipped_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("in");
        touch_files(&source, &["a.png", "b.png"]);

        let backend = MockBackend::with_dimensions(&[("a.png", 20, 10), ("b.png", 20, 10)])
            .failing_writes(&["a.png"]);
        let result = process_with_backend(
            &backend,
            &source,
            &tmp.path().join("out"),
            &ProcessOptions::default(),
            None,
        )
        .unwrap();

        assert_eq!(result.cropped.len(), 1);
        assert_eq!(result.cropped[0].source, source.join("b.png"));
        assert_eq!(result.skipped.len(), 1);
        assert!(result.skipped[0].reason.contains("Failed to write image"));
        assert_eq!(result.total(), 2);
    }

    #[test]
    fn non_images_are_never_attempted() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("in");
        touch_files(&source, &["report.pdf", "notes.txt", "photo.webp"]);

        let backend = MockBackend::with_dimensions(&[("photo.webp", 10, 10)]);
        let result = process_with_backend(
            &backend,
            &source,
            &tmp.path().join("out"),
            &ProcessOptions::default(),
            None,
        )
        .unwrap();

        assert_eq!(result.total(), 1);
        let identified: Vec<RecordedOp> = backend
            .get_operations()
            .into_iter()
            .filter(|op| matches!(op, RecordedOp::Identify(_)))
            .collect();
        assert_eq!(identified.len(), 1);
    }

    #[test]
    fn missing_source_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();
        let result = process_with_backend(
            &backend,
            &tmp.path().join("nope"),
            &tmp.path().join("out"),
            &ProcessOptions::default(),
            None,
        );
        assert!(matches!(result, Err(ProcessError::Scan(_))));
    }

    #[test]
    fn recursive_mirrors_layout_and_skips_output_dir() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().to_path_buf();
        touch_files(&source, &["top.png", "trip/day1.png", "output/old.png"]);
        let out = source.join("output");

        let backend = MockBackend::with_dimensions(&[
            ("top.png", 10, 10),
            ("day1.png", 10, 10),
            ("old.png", 10, 10),
        ]);
        let options = ProcessOptions {
            recursive: true,
            ..ProcessOptions::default()
        };
        let result = process_with_backend(&backend, &source, &out, &options, None).unwrap();

        let outputs: Vec<PathBuf> = result.cropped.iter().map(|c| c.output.clone()).collect();
        assert_eq!(outputs, vec![out.join("top.png"), out.join("trip/day1.png")]);
    }

    #[test]
    fn events_report_every_image() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("in");
        touch_files(&source, &["a.png", "b.png", "c.png"]);

        let backend = MockBackend::with_dimensions(&[("a.png", 4, 2), ("c.png", 2, 4)]);
        let (tx, rx) = std::sync::mpsc::channel();
        process_with_backend(
            &backend,
            &source,
            &tmp.path().join("out"),
            &ProcessOptions::default(),
            Some(tx),
        )
        .unwrap();

        let events: Vec<ProcessEvent> = rx.iter().collect();
        assert!(matches!(events[0], ProcessEvent::Started { total: 3 }));
        let cropped = events
            .iter()
            .filter(|e| matches!(e, ProcessEvent::Cropped(_)))
            .count();
        let skipped = events
            .iter()
            .filter(|e| matches!(e, ProcessEvent::Skipped(_)))
            .count();
        assert_eq!((cropped, skipped), (2, 1));
    }

    #[test]
    fn quality_is_passed_to_backend() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("in");
        touch_files(&source, &["a.jpg"]);

        let backend = MockBackend::with_dimensions(&[("a.jpg", 8, 8)]);
        let options = ProcessOptions {
            quality: Quality::new(42),
            ..ProcessOptions::default()
        };
        process_with_backend(&backend, &source, &tmp.path().join("out"), &options, None)
            .unwrap();

        assert!(matches!(
            &backend.crops()[0],
            RecordedOp::Crop { quality: 42, .. }
        ));
    }

    #[test]
    fn written_dimensions_are_square() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("in");
        touch_files(&source, &["x.tiff"]);

        let backend = MockBackend::with_dimensions(&[("x.tiff", 1000, 1080)]);
        let result = process_with_backend(
            &backend,
            &source,
            &tmp.path().join("out"),
            &ProcessOptions::default(),
            None,
        )
        .unwrap();

        assert_eq!(
            result.cropped[0].outcome.written,
            Dimensions {
                width: 1000,
                height: 1000
            }
        );
        assert_eq!(result.cropped[0].outcome.rect.y, 40);
    }
}

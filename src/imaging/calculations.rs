//! Pure calculation functions for square crop geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! The square side is the shorter image edge. Along the longer edge there is
//! some *free space* left over; the pivot decides where it goes:
//!
//! ```text
//! 1920x1080, center/center:
//!
//! |<- 420 ->|<------ 1080 ------>|<- 420 ->|
//! +---------+--------------------+---------+
//! |         |                    |         |
//! |         |       crop         |         |
//! |         |                    |         |
//! +---------+--------------------+---------+
//! ```
//!
//! Each axis is resolved on its own, so every combination of the nine
//! anchor pairs falls out of two small functions.

use crate::pivot::{Anchor, HorizontalPivot, VerticalPivot};
use serde::Serialize;

/// A span along one axis: start coordinate and extent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisRange {
    pub offset: u32,
    pub length: u32,
}

/// Axis-aligned crop rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    /// Combine a horizontal and a vertical range into one rectangle.
    pub fn from_ranges(horizontal: AxisRange, vertical: AxisRange) -> Self {
        Self {
            x: horizontal.offset,
            y: vertical.offset,
            width: horizontal.length,
            height: vertical.length,
        }
    }

    /// True if the rectangle lies entirely inside a `width` x `height` image.
    pub fn is_within(&self, width: u32, height: u32) -> bool {
        self.x.checked_add(self.width).is_some_and(|r| r <= width)
            && self.y.checked_add(self.height).is_some_and(|b| b <= height)
    }
}

/// Where to put the leading edge of the kept span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Start,
    Middle,
    End,
}

fn axis_range(dimension: u32, edge: Edge, free: u32) -> AxisRange {
    assert!(
        free <= dimension,
        "free space {free} exceeds axis dimension {dimension}"
    );
    let offset = match edge {
        Edge::Start => 0,
        Edge::Middle => free / 2,
        Edge::End => free,
    };
    AxisRange {
        offset,
        length: dimension - free,
    }
}

/// Resolve the horizontal span of the crop.
///
/// `free` is how many columns are dropped; the kept span is `width - free`
/// wide. Odd free space under [`HorizontalPivot::Center`] rounds the offset
/// down, toward the leading edge: the extra dropped column comes off the right.
///
/// # Panics
///
/// If `free > width`.
pub fn horizontal_range(width: u32, pivot: HorizontalPivot, free: u32) -> AxisRange {
    let edge = match pivot {
        HorizontalPivot::Left => Edge::Start,
        HorizontalPivot::Center => Edge::Middle,
        HorizontalPivot::Right => Edge::End,
    };
    axis_range(width, edge, free)
}

/// Resolve the vertical span of the crop. Mirrors [`horizontal_range`]:
/// odd free space under center rounds toward the top.
///
/// # Panics
///
/// If `free > height`.
pub fn vertical_range(height: u32, pivot: VerticalPivot, free: u32) -> AxisRange {
    let edge = match pivot {
        VerticalPivot::Top => Edge::Start,
        VerticalPivot::Center => Edge::Middle,
        VerticalPivot::Bottom => Edge::End,
    };
    axis_range(height, edge, free)
}

/// Largest square that fits in a `width` x `height` image, placed by `anchor`.
///
/// # Examples
/// ```
/// # use squarecrop::imaging::{CropRect, square_crop};
/// # use squarecrop::pivot::Anchor;
/// let rect = square_crop(1920, 1080, Anchor::default());
/// assert_eq!(rect, CropRect { x: 420, y: 0, width: 1080, height: 1080 });
/// ```
pub fn square_crop(width: u32, height: u32, anchor: Anchor) -> CropRect {
    let side = width.min(height);
    let horizontal = horizontal_range(width, anchor.horizontal, width - side);
    let vertical = vertical_range(height, anchor.vertical, height - side);
    CropRect::from_ranges(horizontal, vertical)
}

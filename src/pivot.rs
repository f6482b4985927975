//! Filename pivot convention: `<name>_<h><v>.<ext>`.
//!
//! The characters after the last underscore of a file stem choose where the
//! square crop is anchored. The first selects the horizontal pivot, the
//! second the vertical one:
//!
//! | Code | Horizontal | Vertical |
//! |------|------------|----------|
//! | `l`  | left       |          |
//! | `r`  | right      |          |
//! | `t`  |            | top      |
//! | `b`  |            | bottom   |
//! | `c`  | center     | center   |
//!
//! Examples:
//! - `photo_lt.jpg` → left / top
//! - `photo_rb.png` → right / bottom
//! - `photo_x.jpg`  → center / center (`x` is not a horizontal code)
//! - `photo.jpg`    → center / center (no suffix)
//!
//! Decoding is lenient: anything that does not match falls back to the
//! caller's default anchor instead of failing. [`PivotSuffix`] still records
//! which pivots were actually present so callers can tell an explicit `_cc`
//! apart from a defaulted one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Horizontal anchor of the crop square.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalPivot {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical anchor of the crop square.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalPivot {
    Top,
    #[default]
    Center,
    Bottom,
}

impl HorizontalPivot {
    /// Look up a single-character filename code.
    pub fn from_code(c: char) -> Option<Self> {
        match c {
            'l' => Some(Self::Left),
            'c' => Some(Self::Center),
            'r' => Some(Self::Right),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            Self::Left => 'l',
            Self::Center => 'c',
            Self::Right => 'r',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

impl VerticalPivot {
    /// Look up a single-character filename code.
    pub fn from_code(c: char) -> Option<Self> {
        match c {
            't' => Some(Self::Top),
            'c' => Some(Self::Center),
            'b' => Some(Self::Bottom),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            Self::Top => 't',
            Self::Center => 'c',
            Self::Bottom => 'b',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Center => "center",
            Self::Bottom => "bottom",
        }
    }
}

/// Convert a character to a [`HorizontalPivot`], or `default` if it is not a code.
pub fn char_to_horizontal_pivot(c: char, default: HorizontalPivot) -> HorizontalPivot {
    HorizontalPivot::from_code(c).unwrap_or(default)
}

/// Convert a character to a [`VerticalPivot`], or `default` if it is not a code.
pub fn char_to_vertical_pivot(c: char, default: VerticalPivot) -> VerticalPivot {
    VerticalPivot::from_code(c).unwrap_or(default)
}

/// Error for pivot names given on the command line or in config.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {axis} pivot '{value}' (expected one of: {expected})")]
pub struct ParsePivotError {
    axis: &'static str,
    value: String,
    expected: &'static str,
}

impl FromStr for HorizontalPivot {
    type Err = ParsePivotError;

    /// Accepts the full name (`left`) or the filename code (`l`), any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(Self::Left),
            "center" | "c" => Ok(Self::Center),
            "right" | "r" => Ok(Self::Right),
            _ => Err(ParsePivotError {
                axis: "horizontal",
                value: s.to_string(),
                expected: "left, center, right",
            }),
        }
    }
}

impl FromStr for VerticalPivot {
    type Err = ParsePivotError;

    /// Accepts the full name (`top`) or the filename code (`t`), any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top" | "t" => Ok(Self::Top),
            "center" | "c" => Ok(Self::Center),
            "bottom" | "b" => Ok(Self::Bottom),
            _ => Err(ParsePivotError {
                axis: "vertical",
                value: s.to_string(),
                expected: "top, center, bottom",
            }),
        }
    }
}

impl fmt::Display for HorizontalPivot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for VerticalPivot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A horizontal/vertical pivot pair. Defaults to center/center.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Anchor {
    pub horizontal: HorizontalPivot,
    pub vertical: VerticalPivot,
}

impl Anchor {
    pub fn new(horizontal: HorizontalPivot, vertical: VerticalPivot) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.horizontal, self.vertical)
    }
}

/// Pivots found in a file stem. `None` means absent or unrecognized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotSuffix {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<HorizontalPivot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical: Option<VerticalPivot>,
}

impl PivotSuffix {
    /// Fill in missing pivots from `default`.
    pub fn resolve(self, default: Anchor) -> Anchor {
        Anchor {
            horizontal: self.horizontal.unwrap_or(default.horizontal),
            vertical: self.vertical.unwrap_or(default.vertical),
        }
    }

    /// True if neither pivot was encoded in the filename.
    pub fn is_empty(&self) -> bool {
        self.horizontal.is_none() && self.vertical.is_none()
    }
}

/// Parse the pivot codes following the last `_` of a file stem.
///
/// - `"photo_lt"` → left, top
/// - `"photo_l"` → left, (none)
/// - `"photo_x"` → (none), (none)
/// - `"photo_"` → (none), (none)
/// - `"photo"` → (none), (none)
/// - `"a_b_rb"` → right, bottom (only the last separator counts)
pub fn parse_pivot_suffix(stem: &str) -> PivotSuffix {
    let Some(sep) = stem.rfind('_') else {
        return PivotSuffix::default();
    };
    let mut codes = stem[sep + 1..].chars();
    PivotSuffix {
        horizontal: codes.next().and_then(HorizontalPivot::from_code),
        vertical: codes.next().and_then(VerticalPivot::from_code),
    }
}

/// Decode the anchor for a file stem, falling back to `default` per axis.
pub fn decode_anchor(stem: &str, default: Anchor) -> Anchor {
    parse_pivot_suffix(stem).resolve(default)
}

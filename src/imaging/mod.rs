//! Image processing in pure Rust, built on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Square crop geometry** | [`square_crop`] (pure integer math) |
//! | **Crop → encode** | `crop_imm` + per-format encoder |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop geometry (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{AxisRange, CropRect, horizontal_range, square_crop, vertical_range};
pub use operations::{CropOutcome, crop_square, get_dimensions, plan_square_crop};
pub use params::{CropParams, Quality};
pub use rust_backend::RustBackend;

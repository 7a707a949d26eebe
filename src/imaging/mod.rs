//! Image processing, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Geometry** | [`crop_to_ratio`] / [`fit_exact`] (no I/O) |
//! | **Flatten** | alpha-composite onto a [`Background`] |
//! | **Crop + resize → PNG** | `crop_imm` + Lanczos3 + `PngEncoder` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for ratio and crop math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::{
    CropBox, FIT_TOLERANCE, Fit, FitResult, GeometryError, ImageSize, RATIO_EPSILON, TargetSpec,
    calculate_fill_dimensions, crop_to_ratio, fit, fit_exact,
};
pub use operations::{
    CardConfig, CardError, CardTarget, FitMode, RenderedCard, create_card, plan_card,
};
pub use params::{Background, CardParams, CardPlan, Compression, ParseBackgroundError};
pub use rust_backend::RustBackend;

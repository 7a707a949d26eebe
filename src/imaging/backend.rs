//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations every backend must
//! support: identify (read dimensions without decoding pixels) and render
//! (decode, flatten, crop/resize per a [`CardPlan`](super::params::CardPlan),
//! encode).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use a recording mock.

use super::calculations::ImageSize;
use super::params::CardParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },
    #[error("Failed to encode {path}: {reason}")]
    Encode { path: String, reason: String },
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Trait for image processing backends.
///
/// Implementations must release every file handle they open before returning,
/// on success and on error alike.
pub trait ImageBackend {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<ImageSize, BackendError>;

    /// Decode the source, flatten it to opaque RGB, apply the plan and write the card.
    fn render(&self, params: &CardParams) -> Result<(), BackendError>;
}

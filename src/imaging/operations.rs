//! High-level image operations.
//!
//! These functions combine calculations with backend execution. They take a
//! card target, compute a [`CardPlan`], and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{Fit, GeometryError, ImageSize, TargetSpec, fit};
use super::params::{Background, CardParams, CardPlan, Compression};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Everything that can go wrong with a single card.
#[derive(Error, Debug)]
pub enum CardError {
    #[error("Source not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error(transparent)]
    InvalidGeometry(#[from] GeometryError),
    #[error("Codec error: {0}")]
    Codec(#[from] BackendError),
}

impl CardError {
    /// Short machine-friendly label for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            CardError::SourceNotFound(_) => "source_not_found",
            CardError::InvalidGeometry(_) => "invalid_geometry",
            CardError::Codec(_) => "codec",
        }
    }
}

/// How a source's excess dimension is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Center-crop to the target ratio in source space, then resize.
    #[default]
    Crop,
    /// Resize to cover the target, then center-crop the overflow.
    Fill,
}

/// An exact card size plus the policy used to reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardTarget {
    pub size: ImageSize,
    pub mode: FitMode,
}

impl CardTarget {
    pub fn spec(&self) -> TargetSpec {
        match self.mode {
            FitMode::Crop => TargetSpec::Ratio(self.size.ratio()),
            FitMode::Fill => TargetSpec::Exact(self.size),
        }
    }
}

/// Encoding settings shared by every card in a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CardConfig {
    pub background: Background,
    pub compression: Compression,
}

/// Plan a card without executing it.
pub fn plan_card(source: ImageSize, target: &CardTarget) -> Result<CardPlan, GeometryError> {
    Ok(match fit(source, target.spec())? {
        Fit::Crop(crop) => CardPlan::CropThenResize {
            crop,
            size: target.size,
        },
        Fit::Exact(result) => CardPlan::ResizeThenCrop(result),
    })
}

/// What was done for a successfully rendered card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderedCard {
    pub source_size: ImageSize,
    pub plan: CardPlan,
}

/// Create one card image.
///
/// Missing sources are reported without touching the backend.
pub fn create_card(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    target: &CardTarget,
    config: &CardConfig,
) -> Result<RenderedCard, CardError> {
    if !source.exists() {
        return Err(CardError::SourceNotFound(source.to_path_buf()));
    }

    let source_size = backend.identify(source)?;
    let plan = plan_card(source_size, target)?;
    tracing::debug!(
        source = %source.display(),
        %source_size,
        ?plan,
        "planned card"
    );

    backend.render(&CardParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        plan,
        background: config.background,
        compression: config.compression,
    })?;

    Ok(RenderedCard { source_size, plan })
}

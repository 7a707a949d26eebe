//! Pure geometry for normalizing an image to a target aspect ratio.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! Two fit policies share the same centering rule:
//!
//! | Policy | Input | Output |
//! |---|---|---|
//! | [`crop_to_ratio`] | source size + target ratio | [`CropBox`] in source space |
//! | [`fit_exact`] | source size + exact target size | [`FitResult`]: scale, then crop |
//!
//! Leftover pixels are split between the two excluded edges; when the amount
//! removed is odd, the extra pixel comes off the trailing (right/bottom) edge.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Ratio difference below which [`crop_to_ratio`] treats the source as already matching.
pub const RATIO_EPSILON: f64 = 1e-9;

/// Ratio difference below which [`fit_exact`] skips cropping and resizes directly.
pub const FIT_TOLERANCE: f64 = 0.01;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width divided by height.
    pub fn ratio(self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<(u32, u32)> for ImageSize {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A crop rectangle as `(left, top, right, bottom)` pixel offsets.
///
/// `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CropBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropBox {
    /// The box covering the whole of an image.
    pub const fn full(size: ImageSize) -> Self {
        Self {
            left: 0,
            top: 0,
            right: size.width,
            bottom: size.height,
        }
    }

    pub fn width(self) -> u32 {
        self.right - self.left
    }

    pub fn height(self) -> u32 {
        self.bottom - self.top
    }

    pub fn size(self) -> ImageSize {
        ImageSize::new(self.width(), self.height())
    }

    /// True when the box is exactly the full extent of `size` (no pixels removed).
    pub fn is_full(self, size: ImageSize) -> bool {
        self == Self::full(size)
    }

    /// True when the box is non-empty and lies entirely inside `size`.
    pub fn fits_within(self, size: ImageSize) -> bool {
        self.left < self.right
            && self.top < self.bottom
            && self.right <= size.width
            && self.bottom <= size.height
    }
}

impl fmt::Display for CropBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

/// Instructions for reaching an exact target size: resize to `scaled`,
/// then crop `crop` (in scaled coordinates) out of it.
///
/// `crop.size()` always equals `final_size`. Backends should not materialize
/// `scaled` for extreme ratios; [`FitResult::source_region`] gives the same
/// crop in source pixels, to be resized straight to `final_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FitResult {
    pub scaled: ImageSize,
    pub crop: CropBox,
    pub final_size: ImageSize,
}

impl FitResult {
    /// False when the scaled image already has the final size.
    pub fn needs_crop(&self) -> bool {
        !self.crop.is_full(self.scaled)
    }

    /// The region of the unscaled `source` that lands on `crop` after scaling.
    ///
    /// Edges are widened outward to whole source pixels and the region is at
    /// least one pixel on each axis. A full-extent crop maps to the full source.
    ///
    /// # Examples
    /// ```
    /// # use cardcrop::imaging::{CropBox, ImageSize, fit_exact};
    /// let source = ImageSize::new(2, 10000);
    /// let fit = fit_exact(source, ImageSize::new(1200, 628)).unwrap();
    /// assert_eq!(fit.scaled, ImageSize::new(1200, 6_000_000));
    /// let region = fit.source_region(source);
    /// assert_eq!(region, CropBox { left: 0, top: 4999, right: 2, bottom: 5001 });
    /// ```
    pub fn source_region(&self, source: ImageSize) -> CropBox {
        let (left, right) = unscale_span(
            self.crop.left,
            self.crop.right,
            source.width,
            self.scaled.width,
        );
        let (top, bottom) = unscale_span(
            self.crop.top,
            self.crop.bottom,
            source.height,
            self.scaled.height,
        );
        CropBox {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// Map `[start, end)` on an axis of length `scaled` back onto one of length `source`.
fn unscale_span(start: u32, end: u32, source: u32, scaled: u32) -> (u32, u32) {
    let (source, scaled) = (source as u64, scaled.max(1) as u64);
    let lo = (start as u64 * source / scaled).min(source.saturating_sub(1));
    let hi = (end as u64 * source).div_ceil(scaled).max(lo + 1).min(source);
    (lo as u32, hi as u32)
}

/// What the caller wants the image normalized to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetSpec {
    /// Only the aspect ratio is fixed; see [`crop_to_ratio`].
    Ratio(f64),
    /// The exact output size is fixed; see [`fit_exact`].
    Exact(ImageSize),
}

/// Outcome of [`fit`], one variant per [`TargetSpec`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    Crop(CropBox),
    Exact(FitResult),
}

/// Normalize `source` against either kind of target.
pub fn fit(source: ImageSize, spec: TargetSpec) -> Result<Fit, GeometryError> {
    match spec {
        TargetSpec::Ratio(ratio) => crop_to_ratio(source, ratio).map(Fit::Crop),
        TargetSpec::Exact(target) => fit_exact(source, target).map(Fit::Exact),
    }
}

/// Center-crop box that brings `source` to `target_ratio` without scaling.
///
/// The trimmed dimension is floored, so the box never exceeds the source.
/// Fails when the trimmed dimension would be zero pixels.
///
/// # Examples
/// ```
/// # use cardcrop::imaging::{CropBox, ImageSize, crop_to_ratio};
/// // 2000x800 is wider than 1.91:1, so the width is trimmed
/// let crop = crop_to_ratio(ImageSize::new(2000, 800), 1.91).unwrap();
/// assert_eq!(crop, CropBox { left: 236, top: 0, right: 1764, bottom: 800 });
/// ```
pub fn crop_to_ratio(source: ImageSize, target_ratio: f64) -> Result<CropBox, GeometryError> {
    ensure_non_empty(source, "source")?;
    if !target_ratio.is_finite() || target_ratio <= 0.0 {
        return Err(GeometryError::InvalidGeometry(format!(
            "target ratio {target_ratio} must be a positive finite number"
        )));
    }

    let ImageSize { width, height } = source;
    let current = source.ratio();

    if (current - target_ratio).abs() < RATIO_EPSILON {
        return Ok(CropBox::full(source));
    }

    if current > target_ratio {
        // Wider than target: trim left and right
        let new_width = ((height as f64 * target_ratio).floor() as u32).min(width);
        if new_width == 0 {
            return Err(degenerate(source, target_ratio, "width"));
        }
        let left = centered_offset(width, new_width);
        Ok(CropBox {
            left,
            top: 0,
            right: left + new_width,
            bottom: height,
        })
    } else {
        // Taller than target: trim top and bottom
        let new_height = ((width as f64 / target_ratio).floor() as u32).min(height);
        if new_height == 0 {
            return Err(degenerate(source, target_ratio, "height"));
        }
        let top = centered_offset(height, new_height);
        Ok(CropBox {
            left: 0,
            top,
            right: width,
            bottom: top + new_height,
        })
    }
}

/// Scale `source` to cover `target`, then center-crop the overflow.
///
/// Sources within [`FIT_TOLERANCE`] of the target ratio are resized straight
/// to `target` with no crop.
///
/// # Examples
/// ```
/// # use cardcrop::imaging::{ImageSize, fit_exact};
/// let fit = fit_exact(ImageSize::new(1000, 1000), ImageSize::new(1200, 628)).unwrap();
/// assert_eq!(fit.scaled, ImageSize::new(1200, 1200));
/// assert_eq!(fit.crop.top, 286);
/// assert_eq!(fit.final_size, ImageSize::new(1200, 628));
/// ```
pub fn fit_exact(source: ImageSize, target: ImageSize) -> Result<FitResult, GeometryError> {
    ensure_non_empty(source, "source")?;
    ensure_non_empty(target, "target")?;

    if (source.ratio() - target.ratio()).abs() < FIT_TOLERANCE {
        return Ok(FitResult {
            scaled: target,
            crop: CropBox::full(target),
            final_size: target,
        });
    }

    let scaled = calculate_fill_dimensions(source, target);
    let left = centered_offset(scaled.width, target.width);
    let top = centered_offset(scaled.height, target.height);

    Ok(FitResult {
        scaled,
        crop: CropBox {
            left,
            top,
            right: left + target.width,
            bottom: top + target.height,
        },
        final_size: target,
    })
}

/// Calculate dimensions needed to fill a target area (resize before crop).
///
/// One dimension matches the target exactly; the other is rounded and never
/// falls below the target, so a full-size crop always fits.
pub fn calculate_fill_dimensions(source: ImageSize, target: ImageSize) -> ImageSize {
    if source.ratio() > target.ratio() {
        // Source is wider: height will match, width will exceed
        let scale = target.height as f64 / source.height as f64;
        let w = (source.width as f64 * scale).round() as u32;
        ImageSize::new(w.max(target.width), target.height)
    } else {
        // Source is taller: width will match, height will exceed
        let scale = target.width as f64 / source.width as f64;
        let h = (source.height as f64 * scale).round() as u32;
        ImageSize::new(target.width, h.max(target.height))
    }
}

/// Offset that centers `keep` pixels inside `total`; the odd pixel goes to the trailing edge.
fn centered_offset(total: u32, keep: u32) -> u32 {
    (total - keep) / 2
}

fn ensure_non_empty(size: ImageSize, what: &str) -> Result<(), GeometryError> {
    if size.is_empty() {
        return Err(GeometryError::InvalidGeometry(format!(
            "{what} size {size} has a zero dimension"
        )));
    }
    Ok(())
}

fn degenerate(source: ImageSize, target_ratio: f64, dimension: &str) -> GeometryError {
    GeometryError::InvalidGeometry(format!(
        "cropping {source} to ratio {target_ratio:.4} leaves a zero {dimension}"
    ))
}

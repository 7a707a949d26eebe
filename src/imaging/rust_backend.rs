//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::image_dimensions` (header only) |
//! | Decode (PNG, JPEG, GIF, BMP, TIFF, WebP) | `image::ImageReader` with content sniffing |
//! | Flatten alpha / palette | alpha-composite onto [`Background`] → `RgbImage` |
//! | Crop | `image::imageops::crop_imm` |
//! | Resize | `image::imageops::resize` with `Lanczos3` filter |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (compression + adaptive filtering) |
//! | Write | `tempfile::NamedTempFile` in the output directory, persisted on success |
//!
//! Fill plans never build the full scaled image: the crop is mapped back to
//! source pixels first, so a 2x10000 sliver costs a 2x2 crop rather than a
//! 1200x6000000 buffer.
//!
//! Nearest-neighbour and bilinear filters are never used: cards often carry
//! small text and UI detail that they smear.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{CropBox, ImageSize};
use super::params::{Background, CardParams, CardPlan, Compression};
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageError, ImageReader, RgbImage};
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_error(path: &Path, err: ImageError) -> BackendError {
    match err {
        ImageError::IoError(e) => BackendError::Io(e),
        other => BackendError::Decode {
            path: path.display().to_string(),
            reason: other.to_string(),
        },
    }
}

/// Load and decode an image from disk. The file is closed before returning.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| decode_error(path, e))
}

/// Flatten any pixel layout onto an opaque RGB canvas.
///
/// Layouts with alpha (RGBA, LA, and palettes with transparency, which the
/// decoders expand to RGBA) are composited over `background`. Opaque layouts
/// are converted directly.
pub(crate) fn flatten(img: DynamicImage, background: Background) -> RgbImage {
    if !img.color().has_alpha() {
        return img.into_rgb8();
    }
    let rgba = img.into_rgba8();
    let bg = background.rgb();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let a = a as u32;
        let blend =
            |fg: u8, back: u8| ((fg as u32 * a + back as u32 * (255 - a) + 127) / 255) as u8;
        image::Rgb([blend(r, bg[0]), blend(g, bg[1]), blend(b, bg[2])])
    })
}

fn crop(img: &RgbImage, crop: CropBox) -> Result<RgbImage, BackendError> {
    let size = ImageSize::new(img.width(), img.height());
    if !crop.fits_within(size) {
        return Err(BackendError::ProcessingFailed(format!(
            "crop box {crop} does not fit inside {size}"
        )));
    }
    Ok(imageops::crop_imm(img, crop.left, crop.top, crop.width(), crop.height()).to_image())
}

fn resize(img: &RgbImage, size: ImageSize) -> RgbImage {
    if img.dimensions() == (size.width, size.height) {
        return img.clone();
    }
    imageops::resize(img, size.width, size.height, FilterType::Lanczos3)
}

/// Run the plan's crop and resize steps in order.
pub(crate) fn apply_plan(img: &RgbImage, plan: &CardPlan) -> Result<RgbImage, BackendError> {
    let out = match plan {
        CardPlan::CropThenResize { crop: region, size } => resize(&crop(img, *region)?, *size),
        CardPlan::ResizeThenCrop(fit) => {
            let region = fit.source_region(ImageSize::new(img.width(), img.height()));
            resize(&crop(img, region)?, fit.final_size)
        }
    };

    let expected = plan.final_size();
    if out.dimensions() != (expected.width, expected.height) {
        return Err(BackendError::ProcessingFailed(format!(
            "produced {}x{}, expected {expected}",
            out.width(),
            out.height()
        )));
    }
    Ok(out)
}

fn compression_type(compression: Compression) -> CompressionType {
    match compression {
        Compression::Fast => CompressionType::Fast,
        Compression::Default => CompressionType::Default,
        Compression::Best => CompressionType::Best,
    }
}

/// Encode and save as an opaque RGB8 PNG, creating parent directories as needed.
///
/// The PNG is written to a temp file next to `path` and renamed over it only
/// once fully flushed, so a failed encode leaves any existing card untouched.
pub(crate) fn save_png(
    img: &RgbImage,
    path: &Path,
    compression: Compression,
) -> Result<(), BackendError> {
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            std::fs::create_dir_all(parent)?;
            parent
        }
        None => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        let encoder = PngEncoder::new_with_quality(
            &mut writer,
            compression_type(compression),
            PngFilter::Adaptive,
        );
        encoder
            .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)
            .map_err(|e| BackendError::Encode {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        writer.flush()?;
    }
    tmp.persist(path).map_err(|e| BackendError::Io(e.error))?;
    Ok(())
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<ImageSize, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| decode_error(path, e))?;
        Ok(ImageSize::new(width, height))
    }

    fn render(&self, params: &CardParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let rgb = flatten(img, params.background);
        let card = apply_plan(&rgb, &params.plan)?;
        save_png(&card, &params.output, params.compression)
    }
}

//! # cardcrop
//!
//! Batch generator for social preview card images. Every source image, of any
//! size and aspect ratio, becomes a PNG of exactly the requested size: a
//! Twitter `summary_large_image` card (1200x628), an Open Graph image
//! (1200x630), or any named target in the manifest.
//!
//! # Architecture
//!
//! ```text
//! cards.toml ──→ manifest ──→ [BatchItem] ──→ process ──→ BatchReport
//!                                               │
//!                          per item: identify → plan → render (backend)
//! ```
//!
//! The geometry is a pure function of `(source size, target)`, so nearly all
//! of the interesting behavior is unit-testable without decoding a pixel.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Ratio math, card planning, [`imaging::ImageBackend`] and the `image` backend |
//! | [`manifest`] | `cards.toml` loading, stock targets, validation, path resolution |
//! | [`process`] | Runs a batch item by item, collecting failures into a [`process::BatchReport`] |
//! | [`output`] | CLI output formatting for progress, summaries and plans |
//!
//! # Fit Policies
//!
//! ## `crop`: trim to ratio, then resize
//!
//! The source is center-cropped in its own pixel space until its ratio matches
//! the target, then resized to the exact target size. Sources already at the
//! ratio (within `1e-9`) are only resized. A source so thin that the trimmed
//! edge would round to zero pixels is rejected as invalid geometry.
//!
//! ## `fill`: resize to cover, then trim the overflow
//!
//! The source is scaled so one edge matches the target and the other covers
//! it, then the overflow is center-cropped. Sources within `0.01` of the
//! target ratio skip the crop and are resized directly, which avoids
//! one-pixel trims of near-matching artwork.
//!
//! In both policies, when an odd number of pixels is removed, the extra pixel
//! comes off the right or bottom edge.
//!
//! # Output
//!
//! Cards are always opaque RGB8 PNGs. Transparent and palette sources are
//! flattened onto the manifest's `background` color first. Resampling is
//! Lanczos3.

pub mod imaging;
pub mod manifest;
pub mod output;
pub mod process;

//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which plans each card) and the [`backend`](super::backend) (which does the
//! actual pixel work). This separation allows swapping backends (e.g. for
//! testing with a mock) without changing operation logic.
//!
//! ## Types
//!
//! - [`Background`] — Opaque color that alpha and palette sources are flattened onto.
//! - [`Compression`] — PNG compression effort.
//! - [`CardPlan`] — The geometric steps to run, in order.
//! - [`CardParams`] — Full specification for one card: paths, plan, and encoding settings.

use super::calculations::{CropBox, FitResult, ImageSize};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Opaque RGB background used when flattening transparency.
///
/// Serialized as its `#rrggbb` string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Background(pub [u8; 3]);

impl Background {
    pub fn rgb(self) -> [u8; 3] {
        self.0
    }
}

/// Near-black default, matching dark-themed card artwork.
impl Default for Background {
    fn default() -> Self {
        Self([13, 13, 15])
    }
}

/// Parse error for [`Background`] hex strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected a #rrggbb color, got {0:?}")]
pub struct ParseBackgroundError(pub String);

impl FromStr for Background {
    type Err = ParseBackgroundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseBackgroundError(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(err)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(err());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        Ok(Self([channel(0)?, channel(2)?, channel(4)?]))
    }
}

impl TryFrom<String> for Background {
    type Error = ParseBackgroundError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Background> for String {
    fn from(background: Background) -> Self {
        background.to_string()
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

/// PNG compression effort. Output is lossless at every level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    Fast,
    Default,
    #[default]
    Best,
}

/// Geometric steps for one card, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardPlan {
    /// Crop in source coordinates, then resize the region to `size`.
    CropThenResize { crop: CropBox, size: ImageSize },
    /// Scale to cover, then crop the overflow. Backends cut
    /// [`FitResult::source_region`] and resize it to `fit.final_size`.
    ResizeThenCrop(FitResult),
}

impl CardPlan {
    /// Dimensions of the image the plan produces.
    pub fn final_size(&self) -> ImageSize {
        match self {
            CardPlan::CropThenResize { size, .. } => *size,
            CardPlan::ResizeThenCrop(fit) => fit.final_size,
        }
    }
}

/// Parameters for rendering a single card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub plan: CardPlan,
    pub background: Background,
    pub compression: Compression,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_parses_hex() {
        assert_eq!("#0d0d0f".parse::<Background>().unwrap().rgb(), [13, 13, 15]);
        assert_eq!("#FFffFF".parse::<Background>().unwrap().rgb(), [255, 255, 255]);
    }

    #[test]
    fn background_rejects_malformed() {
        for bad in ["0d0d0f", "#0d0d0", "#0d0d0f0", "#zzzzzz", "", "#", "#0d0d\u{e9}"] {
            assert!(bad.parse::<Background>().is_err(), "{bad:?} should fail");
        }
    }

    #[test]
    fn background_default_displays_as_hex() {
        assert_eq!(Background::default().to_string(), "#0d0d0f");
    }

    #[test]
    fn background_serde_uses_hex_string() {
        let json = serde_json::to_string(&Background([255, 128, 0])).unwrap();
        assert_eq!(json, "\"#ff8000\"");
        let back: Background = serde_json::from_str(&json).unwrap();
        assert_eq!(back.rgb(), [255, 128, 0]);
        assert!(serde_json::from_str::<Background>("\"dark\"").is_err());
    }

    #[test]
    fn compression_default_is_best() {
        assert_eq!(Compression::default(), Compression::Best);
    }

    #[test]
    fn plan_final_size() {
        let size = ImageSize::new(1200, 628);
        let crop = CardPlan::CropThenResize {
            crop: CropBox::full(ImageSize::new(10, 10)),
            size,
        };
        assert_eq!(crop.final_size(), size);

        let fill = CardPlan::ResizeThenCrop(FitResult {
            scaled: size,
            crop: CropBox::full(size),
            final_size: size,
        });
        assert_eq!(fill.final_size(), size);
    }
}

//! Batch manifest loading.
//!
//! A manifest is a `cards.toml` file listing which source images become which
//! card images, and at what target. User values are merged on top of stock
//! defaults, unknown keys are rejected, and the result is validated before any
//! image is touched. A manifest that fails here is the only fatal error of a run.
//!
//! ## Manifest Format
//!
//! ```toml
//! # All top-level options are optional - defaults shown below
//!
//! source_dir = "."          # Base directory for relative `source` paths
//! output_dir = "."          # Base directory for relative `output` paths
//! background = "#0d0d0f"    # Flatten color for transparent / palette sources
//! compression = "best"      # PNG effort: fast | default | best
//!
//! [targets.twitter]         # Stock: Twitter summary_large_image
//! width = 1200
//! height = 628
//! mode = "crop"             # crop: trim to ratio, then resize
//!
//! [targets.og]              # Stock: Open Graph
//! width = 1200
//! height = 630
//! mode = "fill"             # fill: resize to cover, then trim overflow
//!
//! [[cards]]
//! source = "calm the storm.png"
//! output = "twitter-calm-the-storm.png"
//! target = "twitter"
//! ```
//!
//! Relative `source_dir` / `output_dir` values are resolved against the
//! directory containing the manifest file.

use crate::imaging::{Background, CardConfig, CardTarget, Compression, FitMode, ImageSize};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Manifest validation error: {0}")]
    Validation(String),
}

/// Batch manifest loaded from `cards.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    /// Base directory for relative card sources.
    pub source_dir: String,
    /// Base directory for relative card outputs.
    pub output_dir: String,
    /// `#rrggbb` color that transparency is flattened onto.
    pub background: Background,
    /// PNG compression effort.
    pub compression: Compression,
    /// Named output sizes and fit policies.
    pub targets: BTreeMap<String, TargetConfig>,
    /// Cards to generate, in processing order.
    pub cards: Vec<CardEntry>,
}

impl Default for Manifest {
    fn default() -> Self {
        let mut targets = BTreeMap::new();
        targets.insert(
            "twitter".to_string(),
            TargetConfig {
                width: 1200,
                height: 628,
                mode: FitMode::Crop,
            },
        );
        targets.insert(
            "og".to_string(),
            TargetConfig {
                width: 1200,
                height: 630,
                mode: FitMode::Fill,
            },
        );
        Self {
            source_dir: ".".to_string(),
            output_dir: ".".to_string(),
            background: Background::default(),
            compression: Compression::default(),
            targets,
            cards: Vec::new(),
        }
    }
}

/// A named card size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub mode: FitMode,
}

impl TargetConfig {
    pub fn card_target(&self) -> CardTarget {
        CardTarget {
            size: ImageSize::new(self.width, self.height),
            mode: self.mode,
        }
    }
}

/// One `(source, output, target)` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CardEntry {
    pub source: String,
    pub output: String,
    pub target: String,
}

/// A manifest entry with paths and target resolved, ready to process.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    /// The source as written in the manifest; used to identify the item in reports.
    pub id: String,
    pub source: PathBuf,
    pub output: PathBuf,
    pub target_name: String,
    pub target: CardTarget,
}

impl Manifest {
    /// Validate values and cross-references.
    pub fn validate(&self) -> Result<(), ManifestError> {
        for (name, target) in &self.targets {
            if target.width == 0 || target.height == 0 {
                return Err(ManifestError::Validation(format!(
                    "targets.{name} width and height must be non-zero"
                )));
            }
        }

        if self.cards.is_empty() {
            return Err(ManifestError::Validation("cards must not be empty".into()));
        }

        for (i, card) in self.cards.iter().enumerate() {
            if card.source.trim().is_empty() || card.output.trim().is_empty() {
                return Err(ManifestError::Validation(format!(
                    "cards[{i}] needs both source and output"
                )));
            }
            if !self.targets.contains_key(&card.target) {
                let known: Vec<&str> = self.targets.keys().map(String::as_str).collect();
                return Err(ManifestError::Validation(format!(
                    "cards[{i}] uses unknown target {:?} (known: {known:?})",
                    card.target
                )));
            }
        }
        Ok(())
    }

    /// Encoding settings for the whole batch.
    pub fn card_config(&self) -> CardConfig {
        CardConfig {
            background: self.background,
            compression: self.compression,
        }
    }

    /// Resolve every card against `base` (usually the manifest's directory).
    ///
    /// Cards whose target is undefined are skipped; [`validate`](Self::validate)
    /// rejects those up front.
    pub fn items(&self, base: &Path) -> Vec<BatchItem> {
        let source_dir = base.join(&self.source_dir);
        let output_dir = base.join(&self.output_dir);
        self.cards
            .iter()
            .filter_map(|card| {
                let target = self.targets.get(&card.target)?;
                Some(BatchItem {
                    id: card.source.clone(),
                    source: source_dir.join(&card.source),
                    output: output_dir.join(&card.output),
                    target_name: card.target.clone(),
                    target: target.card_target(),
                })
            })
            .collect()
    }
}

// =============================================================================
// Loading, merging, and validation
// =============================================================================

/// Returns the stock default manifest as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Manifest::default()).expect("default manifest must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay, arrays included, replace base values entirely.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_manifest(overlay: toml::Value) -> Result<Manifest, ManifestError> {
    let merged = merge_toml(stock_defaults_value(), overlay);
    let manifest: Manifest = merged.try_into()?;
    manifest.validate()?;
    Ok(manifest)
}

/// Parse manifest text.
pub fn parse_manifest(content: &str) -> Result<Manifest, ManifestError> {
    let value: toml::Value = toml::from_str(content)?;
    resolve_manifest(value)
}

/// Load a manifest file. A missing file is an error.
pub fn load_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    let content = fs::read_to_string(path)?;
    parse_manifest(&content)
}

/// Directory that relative manifest paths are resolved against.
pub fn manifest_base(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns a fully-commented stock `cards.toml`.
///
/// Used by the `gen-manifest` CLI command.
pub fn stock_manifest_toml() -> &'static str {
    r##"# cardcrop manifest
# ==================
# Every top-level setting is optional. Values shown below are the defaults.
# Unknown keys cause an error.

# Base directories for relative card paths, resolved against this file's directory.
source_dir = "."
output_dir = "."

# Transparent and palette sources are flattened onto this opaque color.
background = "#0d0d0f"

# PNG compression effort: "fast", "default" or "best". Output is always lossless.
compression = "best"

# ---------------------------------------------------------------------------
# Targets
# ---------------------------------------------------------------------------
# mode = "crop": center-crop the source to the target ratio, then resize.
# mode = "fill": resize to cover the target, then center-crop the overflow.
#                Sources within 0.01 of the target ratio are resized uncropped.

# Twitter summary_large_image card
[targets.twitter]
width = 1200
height = 628
mode = "crop"

# Open Graph image
[targets.og]
width = 1200
height = 630
mode = "fill"

# ---------------------------------------------------------------------------
# Cards, processed in order
# ---------------------------------------------------------------------------
[[cards]]
source = "feature.png"
output = "twitter-card.png"
target = "twitter"

[[cards]]
source = "feature.png"
output = "og-image.png"
target = "og"
"##
}
